//! Usage: Google OAuth adapter.
//!
//! Specializations:
//! - Extra authorize params: `prompt=consent`, `access_type=offline`
//! - Token validation: `ya29.*` prefix warning
//! - Profile from the OpenID userinfo endpoint

use crate::domain::token_payload::UserInfo;
use crate::infra::settings::PortalSettings;
use crate::portal::oauth::provider_trait::{
    BoxFuture, OAuthEndpoints, OAuthProvider, OAuthTokenSet,
};
use crate::portal::oauth::user_info;
use crate::shared::error::AppResult;

pub(crate) struct GoogleOAuthProvider {
    endpoints: OAuthEndpoints,
}

impl GoogleOAuthProvider {
    pub(crate) fn from_settings(settings: &PortalSettings) -> Self {
        let google = &settings.google;
        Self {
            endpoints: OAuthEndpoints {
                auth_url: google.auth_url.clone(),
                token_url: google.token_url.clone(),
                userinfo_url: google.userinfo_url.clone(),
                tokeninfo_url: google.tokeninfo_url.clone(),
                client_id: google.client_id.clone(),
                client_secret: google.client_secret.clone(),
                scopes: google.scopes.clone(),
                redirect_uri: settings.google_redirect_uri(),
            },
        }
    }
}

impl OAuthProvider for GoogleOAuthProvider {
    fn key(&self) -> &'static str {
        "google"
    }

    fn endpoints(&self) -> &OAuthEndpoints {
        &self.endpoints
    }

    fn extra_authorize_params(&self) -> Vec<(&'static str, &'static str)> {
        vec![("prompt", "consent"), ("access_type", "offline")]
    }

    fn resolve_effective_token(&self, token_set: &OAuthTokenSet) -> String {
        if !token_set.access_token.trim().starts_with("ya29.") {
            tracing::warn!(
                "google oauth access_token does not match expected ya29.* format; exchange response may be invalid"
            );
        }
        token_set.access_token.trim().to_string()
    }

    fn fetch_user_info<'a>(
        &'a self,
        client: &'a reqwest::Client,
        access_token: &'a str,
    ) -> BoxFuture<'a, AppResult<UserInfo>> {
        Box::pin(user_info::fetch_user_info(
            client,
            &self.endpoints.userinfo_url,
            access_token,
        ))
    }
}
