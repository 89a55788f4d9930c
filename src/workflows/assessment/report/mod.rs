mod pdf;
mod summary;

pub use summary::{report_filename, CategoryRow, FieldLine, QuadrantSection, ReportContent};

pub use pdf::render_pdf;

/// Filename prefix for downloaded reports.
pub const REPORT_PREFIX: &str = "Readiness_Assessment";

/// A rendered report ready for download or attachment.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ReportDocument {
    pub fn content_type() -> mime::Mime {
        mime::APPLICATION_PDF
    }
}

/// Failure constructing the document. Callers surface this as retryable;
/// it is never swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unable to render report document: {0}")]
    Render(String),
}
