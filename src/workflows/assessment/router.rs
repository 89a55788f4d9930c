use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CategoryId, FacilityInfo, Rating};
use super::report::ReportDocument;
use super::repository::{AssessmentStore, MailerError, ReportMailer};
use super::service::{AssessmentService, AssessmentServiceError};
use super::session::SessionError;

/// Router builder exposing the assessment flow over HTTP. The email path
/// segment is the session key and the eventual persistence conflict key.
pub fn assessment_router<S, M>(service: Arc<AssessmentService<S, M>>) -> Router
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(begin_handler::<S, M>))
        .route(
            "/api/v1/assessments/:email/ratings",
            post(rate_handler::<S, M>),
        )
        .route(
            "/api/v1/assessments/:email/advance",
            post(advance_handler::<S, M>),
        )
        .route("/api/v1/assessments/:email/back", post(back_handler::<S, M>))
        .route("/api/v1/assessments/:email/jump", post(jump_handler::<S, M>))
        .route(
            "/api/v1/assessments/:email/restart",
            post(restart_handler::<S, M>),
        )
        .route(
            "/api/v1/assessments/:email/results",
            get(results_handler::<S, M>),
        )
        .route(
            "/api/v1/assessments/:email/report",
            get(report_handler::<S, M>),
        )
        .route(
            "/api/v1/assessments/:email/report/email",
            post(email_report_handler::<S, M>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateRequest {
    pub category: CategoryId,
    pub rating: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JumpRequest {
    pub index: usize,
}

pub(crate) async fn begin_handler<S, M>(
    State(service): State<Arc<AssessmentService<S, M>>>,
    axum::Json(facility): axum::Json<FacilityInfo>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    match service.begin(facility).await {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn rate_handler<S, M>(
    State(service): State<Arc<AssessmentService<S, M>>>,
    Path(email): Path<String>,
    axum::Json(request): axum::Json<RateRequest>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    let Some(rating) = Rating::from_value(request.rating) else {
        let payload = json!({
            "error": format!("rating {} is out of range (0-4)", request.rating),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    };

    match service.rate(&email, request.category, rating) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn advance_handler<S, M>(
    State(service): State<Arc<AssessmentService<S, M>>>,
    Path(email): Path<String>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    match service.advance(&email).await {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn back_handler<S, M>(
    State(service): State<Arc<AssessmentService<S, M>>>,
    Path(email): Path<String>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    match service.retreat(&email) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn jump_handler<S, M>(
    State(service): State<Arc<AssessmentService<S, M>>>,
    Path(email): Path<String>,
    axum::Json(request): axum::Json<JumpRequest>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    match service.jump_to(&email, request.index) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn restart_handler<S, M>(
    State(service): State<Arc<AssessmentService<S, M>>>,
    Path(email): Path<String>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    match service.restart(&email) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn results_handler<S, M>(
    State(service): State<Arc<AssessmentService<S, M>>>,
    Path(email): Path<String>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    match service.results(&email) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn report_handler<S, M>(
    State(service): State<Arc<AssessmentService<S, M>>>,
    Path(email): Path<String>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    match service.report(&email) {
        Ok(document) => {
            let disposition = format!("attachment; filename=\"{}\"", document.filename);
            (
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        ReportDocument::content_type().to_string(),
                    ),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.bytes,
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn email_report_handler<S, M>(
    State(service): State<Arc<AssessmentService<S, M>>>,
    Path(email): Path<String>,
) -> Response
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    match service.email_report(&email).await {
        Ok(message_id) => (
            StatusCode::ACCEPTED,
            axum::Json(json!({ "message_id": message_id })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AssessmentServiceError) -> Response {
    let status = match &err {
        AssessmentServiceError::Session(session) => match session {
            SessionError::Validation(_) | SessionError::UnknownCategory(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SessionError::CategoryUnrated(_)
            | SessionError::AlreadyStarted
            | SessionError::NotStarted
            | SessionError::AlreadyCompleted => StatusCode::CONFLICT,
        },
        AssessmentServiceError::UnknownSession(_) => StatusCode::NOT_FOUND,
        AssessmentServiceError::ResultsNotReady(_) => StatusCode::CONFLICT,
        AssessmentServiceError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AssessmentServiceError::Mail(MailerError::InvalidRecipient(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssessmentServiceError::Mail(_) => StatusCode::BAD_GATEWAY,
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
