use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use pipe_cutter::observer::TracingObserver;
use pipe_cutter::report::{ReportRow, Summary, report_rows};
use pipe_cutter::validate::{validate_input, validate_results};
use pipe_cutter::{CutResult, Job, Solver};
use serde::Serialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
struct OptimizeResponse {
    results: Vec<CutResult>,
    rows: Vec<ReportRow>,
    summary: Summary,
    waste_percent: f64,
    warnings: Vec<String>,
}

async fn optimize(Json(job): Json<Job>) -> Result<Json<OptimizeResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&job).unwrap_or_default(),
        "POST /optimize"
    );

    validate_input(&job.stocks, &job.demands, &job.config)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let results = Solver::new(job.config)
        .with_observer(TracingObserver)
        .solve(&job.stocks, &job.demands)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let warnings = validate_results(&results, &job.demands).warnings;
    let summary = Summary::from_results(&results);

    Ok(Json(OptimizeResponse {
        rows: report_rows(&results),
        waste_percent: summary.waste_percent(),
        summary,
        results,
        warnings,
    }))
}

#[tokio::main]
async fn main() {
    let _sentry = sentry::init(sentry::ClientOptions {
        release: sentry::release_name!(),
        ..Default::default()
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
