use agentic_service::api::{self, AppState};
use agentic_service::assistant::AgentSystem;
use agentic_service::config::Config;
use agentic_service::waitlist::WaitlistStore;
use dotenv::dotenv;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/", "Main application"),
    ("GET", "/api/status", "System status"),
    ("POST", "/api/waitlist", "Join waitlist"),
    ("GET", "/api/waitlist", "Waitlist stats"),
    ("POST", "/api/ai/search", "AI search"),
    ("POST", "/api/ai/message", "Send AI message"),
    ("GET", "/api/ai/config", "Get AI config"),
    ("POST", "/api/ai/config", "Update AI config"),
];

/// Resolves once Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Main entry point for the agentic service.
///
/// This function:
/// 1. Loads environment variables from .env file
/// 2. Initializes the AI system and opens the waitlist
/// 3. Starts the HTTP server and runs until Ctrl-C
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .pretty()
        .init();

    let config = Config::from_env()?;

    let agent = AgentSystem::initialize(&config.ai_config_file)?;
    info!("AgenticAI System v{} starting", agent.version());
    let waitlist = WaitlistStore::open(&config.waitlist_file).await?;

    let state = AppState::new(waitlist, agent, config.index_file.clone());
    let app = api::create_router(state);

    for (method, path, description) in ENDPOINTS {
        info!("  {:<5} {:<16} - {}", method, path, description);
    }

    let addr = config.socket_addr();
    info!("Server listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
