use findcoach::application::coach_service::CoachService;
use findcoach::application::session_service::SessionService;
use findcoach::data::remote::RestBackend;
use findcoach::data::storage::FileStorage;
use findcoach::infrastructure::config::BackendConfig;
use findcoach::infrastructure::logging::init_logging;
use findcoach::presentation::router::coach_app_routes;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging();
    info!("Logging initialized");

    info!("Loading backend configuration from environment");
    let config = BackendConfig::from_env()?;
    info!(database_url = %config.database_url, "Configuration loaded");

    info!("Opening session storage");
    let storage = Arc::new(FileStorage::new("findcoach-session.json"));
    let backend = Arc::new(RestBackend::new(config));

    let sessions = SessionService::new(Arc::clone(&backend), storage);
    let coaches = CoachService::new(Arc::clone(&backend));
    let routes = coach_app_routes();

    info!("Restoring persisted session");
    sessions.try_login().await?;
    match sessions.user_id().await {
        Some(user_id) => info!(user_id = %user_id, "Session restored"),
        None => info!("No active session"),
    }

    info!("Loading coach list");
    if let Err(e) = coaches.load_coaches(false).await {
        warn!(error = %e, "Coach list could not be loaded");
    }
    for coach in coaches.coaches().await {
        info!(
            id = %coach.id,
            name = %coach.full_name(),
            rate = %coach.hourly_rate,
            areas = ?coach.areas,
            "Coach"
        );
    }

    let session = sessions.session().await;
    let landing = routes.navigate("/", session.as_ref());
    match landing {
        Some(route) => info!(route = ?route.name, pattern = %route.pattern, "Landing route resolved"),
        None => warn!("Landing route did not resolve"),
    }

    Ok(())
}
