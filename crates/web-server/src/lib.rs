use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch},
};
use configuration::Settings;
use database::DbRepository;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod export;
pub mod format;
pub mod handlers;
pub mod params;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub db_repo: DbRepository,
    pub settings: Settings,
}

/// Builds the router with every report route, CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/reports/lead", get(handlers::lead_report))
        .route("/reports/contact", get(handlers::contact_report))
        .route("/reports/enrollment", get(handlers::enrollment_report))
        .route("/reports/cancel", get(handlers::cancel_report))
        .route("/reports/nsf", get(handlers::nsf_report))
        .route("/reports/marketing", get(handlers::marketing_report))
        .route("/reports/marketing/:pk/mail", patch(handlers::update_mail_cost))
        .route("/reports/marketing/:pk/data", patch(handlers::update_data_cost))
        .route("/reports/program-completion", get(handlers::program_completion_report))
        .route("/reports/program-completion/data", get(handlers::program_completion_data))
        .route("/reports/tranche-summary", get(handlers::tranche_summary))
        .route("/reports/team-ranks", get(handlers::team_ranks_report))
        .route("/reports/negotiator", get(handlers::negotiator_report))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

/// Connects to the reporting database and serves the report routes until the
/// process is stopped.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let db_pool = database::connect(&settings.database).await?;
    let db_repo = DbRepository::new(db_pool);

    let addr = settings.server.address();
    let app_state = Arc::new(AppState { db_repo, settings });
    let router = app(app_state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server started and listening on {}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
