mod api;
mod db;
mod domain;
mod error;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "organlink_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get database path from environment or use default
    let db_path = std::env::var("ORGANLINK_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("organlink").join("organlink.db"));

    let db = db::init_database(&db_path)
        .await
        .expect("Failed to initialize database");
    tracing::info!("Database initialized at {:?}", db_path);

    let state = Arc::new(AppState::new(db));

    // Ensure bootstrap admin account exists
    let admin_email = std::env::var("ORGANLINK_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@organlink.local".to_string());
    let admin_password =
        std::env::var("ORGANLINK_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
    state
        .ensure_admin_user(&admin_email, &admin_password)
        .await
        .expect("Failed to create admin account");

    let app = api::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("OrganLink Server starting on http://{}", addr);
    tracing::info!("Admin account: {}", admin_email);
    tracing::info!("");
    tracing::info!("API Endpoints:");
    tracing::info!("  POST  /api/auth/register          - Register new account");
    tracing::info!("  POST  /api/auth/login             - Login and get token");
    tracing::info!("  PATCH /api/auth/role              - Select account role");
    tracing::info!("  POST  /api/organ-requests         - Create organ request (patient)");
    tracing::info!("  POST  /api/organ-pledges          - Create organ pledge (donor)");
    tracing::info!("  POST  /api/organ-matches          - Create match (doctor/admin)");
    tracing::info!("  GET   /api/admin/stats            - System statistics (admin)");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
