use crate::cli::commands::open_store;
use crate::config::config;
use crate::server;
use crate::services::ServiceError;
use crate::state::AppState;

pub async fn handle(port: Option<u16>, bootstrap_admin: Option<String>) -> anyhow::Result<()> {
    let mut app_config = config().clone();
    if let Some(port) = port {
        app_config.server.port = port;
    }
    if bootstrap_admin.is_some() {
        app_config.security.bootstrap_admin_email = bootstrap_admin;
    }
    app_config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    tracing::info!("Starting Finance API in {:?} mode", app_config.environment);

    let bootstrap_email = app_config.security.bootstrap_admin_email.clone();

    let store = open_store(&app_config).await?;
    let state = AppState::new(store, app_config);

    if let Some(email) = bootstrap_email {
        match state.admin().promote_by_email(&email).await {
            Ok(user) => tracing::info!("Bootstrap admin ready: {}", user.email),
            Err(ServiceError::NotFound(_)) => {
                tracing::warn!("Bootstrap admin {} is not registered yet; it becomes admin on registration", email)
            }
            Err(e) => return Err(anyhow::anyhow!("failed to bootstrap admin {}: {}", email, e)),
        }
    }

    server::serve(state).await
}
