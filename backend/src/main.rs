use std::net::SocketAddr;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use weekgoals_backend::db::DbConnection;
use weekgoals_backend::domain::{CompletionService, GoalService, SummaryService};
use weekgoals_backend::rest::{self, AppState};

const DEFAULT_PORT: u16 = 3333;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Setting up database");
    let db = DbConnection::init().await?;

    let state = AppState::new(
        GoalService::new(db.clone()),
        CompletionService::new(db.clone()),
        SummaryService::new(db),
    );

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/goals", post(rest::create_goal))
        .route("/goals/:goal_id", delete(rest::delete_goal))
        .route("/completions", post(rest::create_completion))
        .route("/completions/:completion_id", delete(rest::delete_completion))
        .route("/pending-goals", get(rest::get_pending_goals))
        .route("/summary", get(rest::get_week_summary))
        .layer(cors)
        .with_state(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
