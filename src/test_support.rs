//! Usage: Public test helpers for integration tests.

use crate::app::app_state::PortalState;
use crate::infra::settings::{self, PortalSettings};
use crate::shared::error::AppResult;

/// Router wired exactly like the running server, minus the listener.
pub fn router(settings: PortalSettings) -> AppResult<axum::Router> {
    Ok(crate::portal::routes::build_router(PortalState::new(
        settings,
    )?))
}

pub fn settings_from_toml(raw: &str) -> AppResult<PortalSettings> {
    settings::parse_toml(raw)
}

/// Same loading path as the binary (config file, env overrides, sanitize, validate).
pub fn load_settings() -> AppResult<PortalSettings> {
    settings::load()
}
