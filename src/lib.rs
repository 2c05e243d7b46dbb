mod app;
mod domain;
mod infra;
mod portal;
mod shared;
pub mod test_support;

pub use domain::token_payload::{DeepLink, TokenData, UserInfo};
pub use infra::settings::{GoogleSettings, LogSettings, PortalSettings};
pub use portal::server::{start, RunningPortal};
pub use shared::error::{AppError, AppResult};

/// Binary entry: load settings, set up logging, serve until Ctrl-C.
pub async fn run() -> AppResult<()> {
    let settings = infra::settings::load()?;
    let _log_guard = app::logging::init(&settings.log);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %settings.listen_address,
        redirect_uri = %settings.google_redirect_uri(),
        "starting tenxr web portal"
    );

    let portal = start(settings).await?;

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("ctrl-c listener failed: {err}");
    }
    tracing::info!("shutdown requested");
    portal.stop().await;
    Ok(())
}
