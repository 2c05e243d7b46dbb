//! Usage: Desktop sign-in sequence: start consent, then exchange code, fetch profile, build the deep link.

use crate::app::app_state::PortalState;
use crate::domain::token_payload::{TokenData, UserInfo};
use crate::portal::oauth::pkce::{generate_pkce_pair, generate_state};
use crate::portal::oauth::provider_trait::build_authorize_url;
use crate::portal::oauth::token_exchange::{exchange_authorization_code, TokenExchangeRequest};
use crate::shared::error::{AppError, AppResult};
use crate::shared::security::mask_token;
use crate::shared::time::now_unix_seconds;

/// Query the provider sends back to the redirect URI.
#[derive(Debug, Clone, Default)]
pub(crate) struct GoogleCallback {
    pub(crate) code: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) error_description: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompletedLogin {
    pub(crate) user: UserInfo,
    pub(crate) deep_link: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Remember a fresh state + PKCE verifier and return the consent URL to redirect to.
pub(crate) fn start_login(state: &PortalState) -> AppResult<String> {
    let pkce = generate_pkce_pair();
    let login_state = generate_state();
    let url = build_authorize_url(state.provider.as_ref(), &login_state, &pkce.code_challenge)?;

    state
        .pending
        .insert(&login_state, &pkce.code_verifier, now_unix_seconds());
    tracing::info!(
        provider = state.provider.key(),
        pending = state.pending.len(),
        "starting desktop sign-in"
    );
    Ok(url)
}

pub(crate) async fn complete_login(
    state: &PortalState,
    callback: &GoogleCallback,
) -> AppResult<CompletedLogin> {
    let now = now_unix_seconds();
    let login_state = non_empty(callback.state.as_deref());

    if let Some(error) = non_empty(callback.error.as_deref()) {
        // Consume the login so the state cannot be replayed.
        if let Some(s) = login_state {
            let _ = state.pending.take(s, now);
        }
        let detail = non_empty(callback.error_description.as_deref())
            .map(|d| format!(" ({d})"))
            .unwrap_or_default();
        return Err(AppError::new(
            "AUTH_DENIED",
            format!("Auth error: {error}{detail}"),
        ));
    }

    let code = non_empty(callback.code.as_deref())
        .ok_or_else(|| "SEC_INVALID_INPUT: oauth callback missing code".to_string())?;
    let login_state = login_state
        .ok_or_else(|| "SEC_INVALID_INPUT: oauth callback missing state".to_string())?;
    let code_verifier = state.pending.take(login_state, now).ok_or_else(|| {
        "SEC_INVALID_INPUT: oauth callback state unknown, expired or already used".to_string()
    })?;

    let endpoints = state.provider.endpoints();
    let token_set = exchange_authorization_code(
        &state.client,
        &TokenExchangeRequest {
            token_uri: endpoints.token_url.clone(),
            client_id: endpoints.client_id.clone(),
            client_secret: endpoints.client_secret.clone(),
            code: code.to_string(),
            redirect_uri: endpoints.redirect_uri.clone(),
            code_verifier,
        },
    )
    .await?;
    let access_token = state.provider.resolve_effective_token(&token_set);

    let user = state
        .provider
        .fetch_user_info(&state.client, &access_token)
        .await?;

    let payload = TokenData::from_parts(access_token, &user);
    let deep_link = payload.to_deep_link(&state.deep_link)?;

    tracing::debug!(provider = state.provider.key(), email = %user.email, "signed-in profile");
    tracing::info!(
        provider = state.provider.key(),
        token = %mask_token(&payload.access_token),
        token_type = ?token_set.token_type,
        scope = ?token_set.scope,
        expires_at = ?token_set.expires_at,
        "desktop sign-in completed"
    );

    Ok(CompletedLogin { user, deep_link })
}
