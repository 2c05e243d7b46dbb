//! Usage: Shared axum state handed to every portal route.

use crate::domain::token_payload::DeepLink;
use crate::infra::settings::PortalSettings;
use crate::portal::oauth::adapters::google::GoogleOAuthProvider;
use crate::portal::oauth::pending::PendingLoginStore;
use crate::portal::oauth::provider_trait::OAuthProvider;
use crate::shared::error::AppResult;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct PortalState {
    pub(crate) settings: Arc<PortalSettings>,
    pub(crate) client: reqwest::Client,
    pub(crate) provider: Arc<dyn OAuthProvider>,
    pub(crate) pending: Arc<PendingLoginStore>,
    pub(crate) deep_link: DeepLink,
}

impl PortalState {
    pub(crate) fn new(settings: PortalSettings) -> AppResult<Self> {
        let client = build_http_client(&settings)?;
        let provider: Arc<dyn OAuthProvider> =
            Arc::new(GoogleOAuthProvider::from_settings(&settings));
        let pending = Arc::new(PendingLoginStore::new(i64::from(
            settings.pending_login_ttl_seconds,
        )));
        let deep_link = DeepLink::new(
            settings.deep_link_scheme.clone(),
            settings.deep_link_path.clone(),
        );

        Ok(Self {
            settings: Arc::new(settings),
            client,
            provider,
            pending,
            deep_link,
        })
    }
}

fn build_http_client(settings: &PortalSettings) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!("tenxr-web-portal/{}", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(u64::from(
            settings.http_connect_timeout_seconds,
        )))
        .timeout(Duration::from_secs(u64::from(
            settings.http_request_timeout_seconds,
        )))
        .build()
        .map_err(|e| format!("SYSTEM_ERROR: oauth client init failed: {e}").into())
}
