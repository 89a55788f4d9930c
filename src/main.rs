use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use facility_assess::config::AppConfig;
use facility_assess::error::AppError;
use facility_assess::telemetry;
use facility_assess::workflows::assessment::{
    assessment_router, AssessmentService, AssessmentServiceError, AssessmentStore, CategoryId,
    FacilityInfo, LogMailer, MemoryAssessmentStore, Rating, ReportMailer,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Facility Readiness Assessor",
    about = "Score data center facilities for AI-infrastructure readiness",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk a canned assessment end to end and write the PDF report
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct DemoArgs {
    /// Facility name used for the canned submission
    #[arg(long, default_value = "Evergreen Data Campus")]
    facility: String,
    /// Contact email used as the session key
    #[arg(long, default_value = "demo@example.com")]
    email: String,
    /// Where to write the generated PDF (defaults to the report filename)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => serve(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: Arc<PrometheusHandle>,
}

async fn serve(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryAssessmentStore::default());
    let mailer = Arc::new(LogMailer::default());
    let service = Arc::new(AssessmentService::new(
        store,
        mailer,
        config.assessment.store_budget(),
    ));

    let app = with_operational_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "facility readiness assessor ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn with_operational_routes<S, M>(service: Arc<AssessmentService<S, M>>) -> axum::Router
where
    S: AssessmentStore + 'static,
    M: ReportMailer + 'static,
{
    assessment_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Canned rating profile: strong core infrastructure, weaker growth and
/// operational posture, so the demo lands somewhere interesting.
fn demo_rating(category: CategoryId) -> Rating {
    match category {
        CategoryId::PowerInfrastructure | CategoryId::CoolingCapability => Rating::Excellent,
        CategoryId::NetworkConnectivity | CategoryId::SiteInfrastructure => Rating::Good,
        CategoryId::ExpansionCapacity | CategoryId::OperationsTeam => Rating::Fair,
        CategoryId::UtilityPartnership | CategoryId::ComplianceCertifications => Rating::Poor,
        CategoryId::FinancialReadiness => Rating::Good,
    }
}

async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = Arc::new(MemoryAssessmentStore::default());
    let mailer = Arc::new(LogMailer::default());
    let service = AssessmentService::new(store, mailer, config.assessment.store_budget());

    let facility = FacilityInfo {
        name: args.facility,
        location: Some("Columbus, OH".to_string()),
        contact_name: "Demo Operator".to_string(),
        email: args.email.clone(),
        company: Some("Evergreen Holdings".to_string()),
        target_mw: Some("40".to_string()),
    };

    println!("Facility readiness demo: {}", facility.name);
    service.begin(facility).await?;

    let mut finished = None;
    for category in CategoryId::ordered() {
        let rating = demo_rating(category);
        println!("  {:<28} {}", category.label(), rating.label());
        service.rate(&args.email, category, rating)?;
        let step = service.advance(&args.email).await?;
        finished = step.outcome;
    }

    let outcome = finished.ok_or(AppError::Assessment(
        AssessmentServiceError::ResultsNotReady(args.email.clone()),
    ))?;

    println!("\nScores");
    println!("  readiness:    {}", outcome.scores.readiness);
    println!("  scalability:  {}", outcome.scores.scalability);
    println!("  operational:  {}", outcome.scores.operational);
    println!("  overall:      {}", outcome.scores.overall);
    println!(
        "\nQuadrant: {} - {}",
        outcome.quadrant.label, outcome.quadrant.description
    );
    println!("Next step: {}", outcome.quadrant.recommended_action);

    let document = service.report(&args.email)?;
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&document.filename));
    std::fs::write(&path, &document.bytes)?;
    println!("\nReport written to {}", path.display());

    Ok(())
}
