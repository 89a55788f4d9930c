use std::ops::Range;

use printpdf::{BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb};

use super::summary::{CategoryRow, ReportContent};
use super::ReportError;

// A4 geometry, all in millimetres.
const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN_LEFT: f64 = 18.0;
const MARGIN_BOTTOM: f64 = 18.0;
const TOP_Y: f64 = 277.0;

// Category rows are the only repeating content; everything else fits the
// first page by construction. A row carries the category name, the weight
// and rating line, and the dot indicator.
const ROW_HEIGHT: f64 = 16.0;
const CONTINUATION_TOP_Y: f64 = TOP_Y - 10.0;

const WRAP_COLUMNS: usize = 92;

/// Render the assembled report to PDF bytes. Pure function of the content;
/// the only varying field between identical assessments is the timestamp
/// already captured on `ReportContent`.
pub fn render_pdf(content: &ReportContent) -> Result<Vec<u8>, ReportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Facility Readiness Assessment",
        mm(PAGE_WIDTH),
        mm(PAGE_HEIGHT),
        "content",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_err)?;

    {
        let layer = doc.get_page(first_page).get_layer(first_layer);
        let after_header_y = draw_header(&layer, content, &regular, &bold);

        let pages = paginate(
            content.categories.len(),
            rows_fitting(after_header_y),
            rows_fitting(CONTINUATION_TOP_Y),
        );

        for (page_number, range) in pages.iter().enumerate() {
            let (layer, mut y) = if page_number == 0 {
                (layer.clone(), after_header_y)
            } else {
                let (page, layer_index) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
                let layer = doc.get_page(page).get_layer(layer_index);
                set_color(&layer, 0.0, 0.0, 0.0);
                layer.use_text(
                    "Category Ratings (continued)",
                    12.0,
                    mm(MARGIN_LEFT),
                    mm(TOP_Y),
                    &bold,
                );
                (layer, CONTINUATION_TOP_Y)
            };

            for row in &content.categories[range.clone()] {
                draw_row(&layer, row, y, &regular, &bold);
                y -= ROW_HEIGHT;
            }
        }
    }

    doc.save_to_bytes().map_err(render_err)
}

/// Rows that fit between `start_y` and the bottom margin.
pub(crate) fn rows_fitting(start_y: f64) -> usize {
    if start_y <= MARGIN_BOTTOM {
        return 0;
    }
    ((start_y - MARGIN_BOTTOM) / ROW_HEIGHT) as usize
}

/// Split `total` rows into per-page ranges. No row is ever dropped or
/// clipped: once the current page's budget is exhausted the next row opens
/// a fresh page.
pub(crate) fn paginate(
    total: usize,
    first_capacity: usize,
    continuation_capacity: usize,
) -> Vec<Range<usize>> {
    let continuation_capacity = continuation_capacity.max(1);
    let mut pages = Vec::new();
    let mut start = 0;
    let first = first_capacity.min(total);
    pages.push(0..first);
    start += first;

    while start < total {
        let end = (start + continuation_capacity).min(total);
        pages.push(start..end);
        start = end;
    }

    pages
}

fn draw_header(
    layer: &PdfLayerReference,
    content: &ReportContent,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) -> f64 {
    let mut y = TOP_Y;
    set_color(layer, 0.0, 0.0, 0.0);

    layer.use_text(
        "Facility Readiness Assessment",
        18.0,
        mm(MARGIN_LEFT),
        mm(y),
        bold,
    );
    y -= 10.0;

    set_color(layer, 0.4, 0.4, 0.4);
    let generated = format!(
        "Generated {}",
        content.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    layer.use_text(generated, 9.0, mm(MARGIN_LEFT), mm(y), regular);
    y -= 9.0;

    set_color(layer, 0.0, 0.0, 0.0);
    layer.use_text("Facility", 12.0, mm(MARGIN_LEFT), mm(y), bold);
    y -= 9.0;
    for field in &content.facility {
        layer.use_text(
            format!("{}: {}", field.label, field.value),
            10.0,
            mm(MARGIN_LEFT),
            mm(y),
            regular,
        );
        y -= 6.5;
    }

    y -= 2.5;
    layer.use_text("Scores", 12.0, mm(MARGIN_LEFT), mm(y), bold);
    y -= 9.0;
    let score_lines = [
        ("Readiness", content.scores.readiness),
        ("Scalability", content.scores.scalability),
        ("Operational", content.scores.operational),
        ("Overall", content.scores.overall),
    ];
    for (label, score) in score_lines {
        layer.use_text(
            format!("{label}: {score} / 100"),
            10.0,
            mm(MARGIN_LEFT),
            mm(y),
            regular,
        );
        y -= 6.5;
    }

    y -= 2.5;
    layer.use_text("Assessment Outcome", 12.0, mm(MARGIN_LEFT), mm(y), bold);
    y -= 9.0;

    let (r, g, b) = hex_color(content.quadrant.color_token);
    set_color(layer, r, g, b);
    layer.use_text(content.quadrant.label, 13.0, mm(MARGIN_LEFT), mm(y), bold);
    y -= 8.0;

    set_color(layer, 0.0, 0.0, 0.0);
    for line in wrap_text(content.quadrant.description, WRAP_COLUMNS) {
        layer.use_text(line, 10.0, mm(MARGIN_LEFT), mm(y), regular);
        y -= 6.0;
    }
    for line in wrap_text(
        &format!("Recommended action: {}", content.quadrant.recommended_action),
        WRAP_COLUMNS,
    ) {
        layer.use_text(line, 10.0, mm(MARGIN_LEFT), mm(y), regular);
        y -= 6.0;
    }

    y -= 4.0;
    layer.use_text("Category Ratings", 12.0, mm(MARGIN_LEFT), mm(y), bold);
    y -= 9.0;

    y
}

fn draw_row(
    layer: &PdfLayerReference,
    row: &CategoryRow,
    y: f64,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    set_color(layer, 0.0, 0.0, 0.0);
    layer.use_text(row.name, 11.0, mm(MARGIN_LEFT), mm(y), bold);

    set_color(layer, 0.3, 0.3, 0.3);
    layer.use_text(
        format!("Weight {} - {}", row.weight, row.rating_label()),
        9.0,
        mm(MARGIN_LEFT),
        mm(y - 5.5),
        regular,
    );

    for dot in 0..4u8 {
        let filled = dot < row.filled_dots;
        let cx = MARGIN_LEFT + 2.0 + f64::from(dot) * 5.5;
        let cy = y - 10.5;
        draw_dot(layer, cx, cy, filled);
    }
}

fn draw_dot(layer: &PdfLayerReference, cx: f64, cy: f64, filled: bool) {
    let radius = 1.6;
    let points = (0..12)
        .map(|step| {
            let angle = f64::from(step) * std::f64::consts::TAU / 12.0;
            (
                Point::new(mm(cx + radius * angle.cos()), mm(cy + radius * angle.sin())),
                false,
            )
        })
        .collect();

    layer.set_fill_color(Color::Rgb(Rgb::new(0.15 as _, 0.15 as _, 0.15 as _, None)));
    layer.set_outline_color(Color::Rgb(Rgb::new(0.15 as _, 0.15 as _, 0.15 as _, None)));
    layer.set_outline_thickness(0.4 as _);

    let shape = Line {
        points,
        is_closed: true,
        has_fill: filled,
        has_stroke: true,
        is_clipping_path: false,
    };
    layer.add_shape(shape);
}

fn set_color(layer: &PdfLayerReference, r: f64, g: f64, b: f64) {
    layer.set_fill_color(Color::Rgb(Rgb::new(r as _, g as _, b as _, None)));
}

/// `#rrggbb` palette token to unit-interval RGB; anything unparsable falls
/// back to black.
fn hex_color(token: &str) -> (f64, f64, f64) {
    let hex = token.trim_start_matches('#');
    if hex.len() != 6 {
        return (0.0, 0.0, 0.0);
    }
    let channel = |range: Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map(|value| f64::from(value) / 255.0)
            .unwrap_or(0.0)
    };
    (channel(0..2), channel(2..4), channel(4..6))
}

/// Greedy word wrap; words longer than the budget get a line of their own.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn mm(value: f64) -> Mm {
    Mm(value as _)
}

fn render_err(err: impl std::fmt::Display) -> ReportError {
    ReportError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::super::super::catalog::AssessmentCatalog;
    use super::super::super::domain::{CategoryId, FacilityInfo, Rating, RatingSet, Scores};
    use super::super::super::quadrant::Quadrant;
    use super::super::super::session::AssessmentOutcome;
    use super::*;

    fn reference_content() -> ReportContent {
        let facility = FacilityInfo {
            name: "Acme DC".to_string(),
            location: Some("Des Moines, IA".to_string()),
            contact_name: "Jane".to_string(),
            email: "jane@acme.example".to_string(),
            company: Some("Acme".to_string()),
            target_mw: Some("40".to_string()),
        };
        let ratings: RatingSet = CategoryId::ordered()
            .into_iter()
            .map(|id| (id, Rating::Fair))
            .collect();
        let outcome = AssessmentOutcome {
            scores: Scores {
                readiness: 50.0,
                scalability: 50.0,
                operational: 50.0,
                overall: 50.0,
            },
            quadrant: Quadrant::Develop,
            completed_at: chrono::Utc::now(),
        };
        ReportContent::assemble(&facility, &AssessmentCatalog::standard(), &ratings, &outcome)
    }

    #[test]
    fn pagination_never_drops_a_row() {
        for total in [0usize, 1, 5, 9, 23] {
            for first in [0usize, 3, 6, 10] {
                let pages = paginate(total, first, 15);
                let covered: usize = pages.iter().map(|range| range.len()).sum();
                assert_eq!(covered, total, "total={total} first={first}");

                // Ranges are contiguous and ordered.
                let mut expected_start = 0;
                for range in &pages {
                    assert_eq!(range.start, expected_start);
                    expected_start = range.end;
                }
            }
        }
    }

    #[test]
    fn nine_reference_rows_overflow_the_first_page() {
        let content = reference_content();
        let after_header = draw_header_budget(&content);
        let pages = paginate(
            content.categories.len(),
            rows_fitting(after_header),
            rows_fitting(CONTINUATION_TOP_Y),
        );
        assert!(
            pages.len() >= 2,
            "nine categories at the current row height must paginate, got {} page(s)",
            pages.len()
        );
        let covered: usize = pages.iter().map(|range| range.len()).sum();
        assert_eq!(covered, 9);
    }

    // Mirror of draw_header's cursor arithmetic so pagination can be
    // asserted without a rendering backend.
    fn draw_header_budget(content: &ReportContent) -> f64 {
        let mut y = TOP_Y;
        y -= 10.0; // title
        y -= 9.0; // generated line
        y -= 9.0; // facility heading
        y -= 6.5 * content.facility.len() as f64;
        y -= 2.5;
        y -= 9.0; // scores heading
        y -= 6.5 * 4.0;
        y -= 2.5;
        y -= 9.0; // outcome heading
        y -= 8.0; // quadrant label
        y -= 6.0 * wrap_text(content.quadrant.description, WRAP_COLUMNS).len() as f64;
        let action = format!(
            "Recommended action: {}",
            content.quadrant.recommended_action
        );
        y -= 6.0 * wrap_text(&action, WRAP_COLUMNS).len() as f64;
        y -= 4.0;
        y -= 9.0; // table heading
        y
    }

    #[test]
    fn rows_fitting_guards_exhausted_pages() {
        assert_eq!(rows_fitting(MARGIN_BOTTOM), 0);
        assert_eq!(rows_fitting(MARGIN_BOTTOM - 5.0), 0);
        assert_eq!(rows_fitting(MARGIN_BOTTOM + ROW_HEIGHT), 1);
        assert_eq!(rows_fitting(MARGIN_BOTTOM + 2.5 * ROW_HEIGHT), 2);
    }

    #[test]
    fn render_produces_a_pdf_byte_blob() {
        let bytes = render_pdf(&reference_content()).expect("report renders");
        assert!(bytes.starts_with(b"%PDF"), "output is not a PDF stream");
        assert!(bytes.len() > 1_000, "suspiciously small document");
    }

    #[test]
    fn wrap_text_respects_the_column_budget() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
        assert!(wrap_text("", 10).is_empty());

        let long = wrap_text("supercalifragilistic word", 5);
        assert_eq!(long, vec!["supercalifragilistic", "word"]);
    }

    #[test]
    fn hex_tokens_parse_to_unit_rgb() {
        let (r, g, b) = hex_color("#ff0080");
        assert!((r - 1.0).abs() < 1e-9);
        assert_eq!(g, 0.0);
        assert!((b - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(hex_color("nonsense"), (0.0, 0.0, 0.0));
    }
}
