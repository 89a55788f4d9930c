use chrono::{DateTime, Utc};

use super::super::catalog::AssessmentCatalog;
use super::super::domain::{FacilityInfo, Rating, RatingSet, RoundedScores};
use super::super::session::AssessmentOutcome;
use super::REPORT_PREFIX;

/// One labelled value on the facility block. Optional facility fields that
/// were left blank produce no line at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLine {
    pub label: &'static str,
    pub value: String,
}

/// Quadrant panel of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadrantSection {
    pub label: &'static str,
    pub color_token: &'static str,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

/// One category line: name, weight, and the dot indicator. `filled_dots`
/// is min(rating, 4); a rating of 0 and an unrated category both show four
/// empty dots, distinguished by the rating label text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub name: &'static str,
    pub weight: u32,
    pub rating: Option<Rating>,
    pub filled_dots: u8,
}

impl CategoryRow {
    pub fn rating_label(&self) -> &'static str {
        match self.rating {
            Some(rating) => rating.label(),
            None => "Not rated",
        }
    }
}

/// Everything the renderer needs, assembled deterministically from the
/// session data. Only `generated_at` varies between two assemblies of the
/// same assessment.
#[derive(Debug, Clone)]
pub struct ReportContent {
    pub facility_name: String,
    pub facility: Vec<FieldLine>,
    pub scores: RoundedScores,
    pub quadrant: QuadrantSection,
    pub categories: Vec<CategoryRow>,
    pub generated_at: DateTime<Utc>,
}

impl ReportContent {
    pub fn assemble(
        facility: &FacilityInfo,
        catalog: &AssessmentCatalog,
        ratings: &RatingSet,
        outcome: &AssessmentOutcome,
    ) -> Self {
        let mut fields = vec![FieldLine {
            label: "Facility",
            value: facility.name.trim().to_string(),
        }];
        if let Some(location) = trimmed(&facility.location) {
            fields.push(FieldLine {
                label: "Location",
                value: location,
            });
        }
        fields.push(FieldLine {
            label: "Contact",
            value: facility.contact_name.trim().to_string(),
        });
        fields.push(FieldLine {
            label: "Email",
            value: facility.email.trim().to_string(),
        });
        if let Some(company) = trimmed(&facility.company) {
            fields.push(FieldLine {
                label: "Company",
                value: company,
            });
        }
        if let Some(target_mw) = trimmed(&facility.target_mw) {
            fields.push(FieldLine {
                label: "Target Capacity (MW)",
                value: target_mw,
            });
        }

        let categories = catalog
            .categories()
            .iter()
            .map(|category| {
                let rating = ratings.get(&category.id).copied();
                CategoryRow {
                    name: category.name,
                    weight: category.weight,
                    rating,
                    filled_dots: rating
                        .map(|rating| rating.value().min(Rating::MAX_VALUE))
                        .unwrap_or(0),
                }
            })
            .collect();

        Self {
            facility_name: facility.name.trim().to_string(),
            facility: fields,
            scores: outcome.scores.rounded(),
            quadrant: QuadrantSection {
                label: outcome.quadrant.label(),
                color_token: outcome.quadrant.color_token(),
                description: outcome.quadrant.description(),
                recommended_action: outcome.quadrant.recommended_action(),
            },
            categories,
            generated_at: Utc::now(),
        }
    }

    pub fn filename(&self) -> String {
        report_filename(&self.facility_name)
    }
}

/// `<prefix>_<facility name with spaces replaced by underscores>.pdf`
pub fn report_filename(facility_name: &str) -> String {
    let cleaned = facility_name.trim().replace(' ', "_");
    format!("{REPORT_PREFIX}_{cleaned}.pdf")
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
