//! Usage: OAuthProvider trait definition - the seam between the portal routes and a concrete provider.

use crate::domain::token_payload::UserInfo;
use crate::shared::error::AppResult;
use std::future::Future;
use std::pin::Pin;

/// Endpoint configuration for an OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OAuthEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub tokeninfo_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
    pub redirect_uri: String,
}

/// Token set returned from the authorization code exchange.
#[derive(Debug, Clone)]
pub(crate) struct OAuthTokenSet {
    pub access_token: String,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub expires_at: Option<i64>,
}

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The trait is object-safe so the portal state can hold `Arc<dyn OAuthProvider>`.
pub(crate) trait OAuthProvider: Send + Sync {
    /// Short provider key used in logs (e.g., "google").
    fn key(&self) -> &'static str;

    fn endpoints(&self) -> &OAuthEndpoints;

    /// Extra query params for the authorization URL.
    fn extra_authorize_params(&self) -> Vec<(&'static str, &'static str)> {
        vec![]
    }

    /// Pick the access token to hand off from the exchange response.
    fn resolve_effective_token(&self, token_set: &OAuthTokenSet) -> String {
        token_set.access_token.clone()
    }

    /// Fetch the signed-in user's profile with the access token.
    fn fetch_user_info<'a>(
        &'a self,
        client: &'a reqwest::Client,
        access_token: &'a str,
    ) -> BoxFuture<'a, AppResult<UserInfo>>;
}

/// Build the authorization URL for the code flow with PKCE (S256).
pub(crate) fn build_authorize_url(
    provider: &dyn OAuthProvider,
    state: &str,
    code_challenge: &str,
) -> AppResult<String> {
    let endpoints = provider.endpoints();
    let mut url = reqwest::Url::parse(&endpoints.auth_url)
        .map_err(|e| format!("SYSTEM_ERROR: invalid oauth authorize url: {e}"))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &endpoints.client_id)
            .append_pair("redirect_uri", &endpoints.redirect_uri)
            .append_pair("scope", &endpoints.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        for (key, value) in provider.extra_authorize_params() {
            query.append_pair(key, value);
        }
    }

    Ok(url.to_string())
}
