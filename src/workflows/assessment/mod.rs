//! Facility readiness assessment: the weighted scoring engine, quadrant
//! classification, the three-phase session state machine, PDF report
//! generation, and the persistence/mail seams around them.

pub mod catalog;
pub mod domain;
pub mod quadrant;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use catalog::{AssessmentCatalog, Category};
pub use domain::{
    CategoryId, FacilityInfo, Rating, RatingSet, RoundedScores, ScoreGroup, Scores,
    ValidationError,
};
pub use quadrant::{Quadrant, QUADRANT_THRESHOLD};
pub use report::{
    render_pdf, report_filename, ReportContent, ReportDocument, ReportError, REPORT_PREFIX,
};
pub use repository::{
    AssessmentRecord, AssessmentStore, LogMailer, MailerError, MemoryAssessmentStore,
    OutboundReport, ReportMailer, StoreError, IN_PROGRESS_QUADRANT,
};
pub use router::assessment_router;
pub use scoring::compute_scores;
pub use service::{
    AssessmentService, AssessmentServiceError, AssessmentStatusView, OutcomeView, QuadrantView,
    StepView,
};
pub use session::{
    AssessmentOutcome, AssessmentPhase, AssessmentSession, SessionError, StepOutcome,
};
