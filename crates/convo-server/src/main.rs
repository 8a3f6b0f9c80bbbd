use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use convo_api::{AppState, AppStateInner};
use convo_db::Database;
use convo_session::connection;

#[derive(Clone)]
struct ServerState {
    db: Arc<Database>,
    poll_interval: Duration,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "convo=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("CONVO_DB_PATH").unwrap_or_else(|_| "convo.db".into());
    let host = std::env::var("CONVO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CONVO_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let poll_ms: u64 = std::env::var("CONVO_POLL_INTERVAL_MS")
        .unwrap_or_else(|_| "1000".into())
        .parse()?;

    // Init database
    let db = Arc::new(Database::open(&PathBuf::from(&db_path))?);

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner { db: db.clone() });
    let state = ServerState {
        db,
        poll_interval: Duration::from_millis(poll_ms),
    };

    // Routes
    let session_routes = Router::new()
        .route("/session", get(session_upgrade))
        .route("/session/transient", get(transient_upgrade))
        .with_state(state);

    let app = convo_api::router(app_state)
        .merge(session_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Convo server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn session_upgrade(
    State(state): State<ServerState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection::handle_session(socket, state.db, state.poll_interval))
}

async fn transient_upgrade(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(connection::handle_transient_session)
}
