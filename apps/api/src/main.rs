use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
use meeting_cell::{HostRegistry, InMemoryHostRegistry};
use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Physio Clinic API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    let store: Arc<dyn AppointmentStore> = if config.is_configured() {
        Arc::new(SupabaseAppointmentStore::new(&config))
    } else {
        warn!("Supabase is not configured, appointments are kept in memory");
        Arc::new(InMemoryAppointmentStore::new())
    };

    if !config.can_verify_tokens() {
        warn!("SUPABASE_JWT_SECRET is empty: every request is anonymous and booking will require registration");
    }

    // One registry for booking (writes hosts) and meetings (reads them)
    let hosts: Arc<dyn HostRegistry> = Arc::new(InMemoryHostRegistry::new());

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(config.clone(), store, hosts)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
