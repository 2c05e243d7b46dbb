//! Usage: OAuth token endpoint helper (authorization_code grant with PKCE).

use super::provider_trait::OAuthTokenSet;
use crate::shared::error::AppResult;
use crate::shared::security::mask_token;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) struct TokenExchangeRequest {
    pub(crate) token_uri: String,
    pub(crate) client_id: String,
    pub(crate) client_secret: Option<String>,
    pub(crate) code: String,
    pub(crate) redirect_uri: String,
    pub(crate) code_verifier: String,
}

pub(crate) async fn exchange_authorization_code(
    client: &reqwest::Client,
    req: &TokenExchangeRequest,
) -> AppResult<OAuthTokenSet> {
    let mut form: HashMap<&str, String> = HashMap::new();
    form.insert("grant_type", "authorization_code".to_string());
    form.insert("code", req.code.trim().to_string());
    form.insert("redirect_uri", req.redirect_uri.trim().to_string());
    form.insert("client_id", req.client_id.trim().to_string());
    form.insert("code_verifier", req.code_verifier.trim().to_string());
    if let Some(secret) = req.client_secret.as_deref().map(str::trim) {
        if !secret.is_empty() {
            form.insert("client_secret", secret.to_string());
        }
    }

    let response = client
        .post(req.token_uri.trim())
        .form(&form)
        .send()
        .await
        .map_err(|e| format!("OAUTH_TOKEN_EXCHANGE: token request failed: {e}"))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| format!("OAUTH_TOKEN_EXCHANGE: token response read failed: {e}"))?;

    parse_token_response(status, &body, crate::shared::time::now_unix_seconds())
}

fn parse_token_response(
    status: reqwest::StatusCode,
    body: &str,
    now: i64,
) -> AppResult<OAuthTokenSet> {
    let value: Option<Value> = serde_json::from_str(body).ok();
    // Google reports some failures as 200 with an `error` field.
    let has_error_field = value
        .as_ref()
        .and_then(|v| v.get("error"))
        .is_some_and(|e| !e.is_null());

    if !status.is_success() || has_error_field {
        let (error_code, error_message) = parse_oauth_error_details(body);
        let snippet = sanitize_oauth_error_body_snippet(body);
        let mut msg = format!(
            "OAUTH_TOKEN_EXCHANGE: token endpoint returned status={}",
            status.as_u16()
        );
        if let Some(code) = error_code {
            msg.push_str(" code=");
            msg.push_str(code.as_str());
        }
        if let Some(detail) = error_message {
            msg.push_str(" message=");
            msg.push_str(detail.chars().take(240).collect::<String>().as_str());
        }
        msg.push_str(" body=");
        msg.push_str(snippet.as_str());
        return Err(msg.into());
    }

    let value = value.ok_or_else(|| {
        "OAUTH_TOKEN_EXCHANGE: token response json invalid".to_string()
    })?;

    let access_token = non_empty_str(&value, "access_token")
        .ok_or_else(|| "OAUTH_TOKEN_EXCHANGE: token response missing access_token".to_string())?;

    let expires_in = value.get("expires_in").and_then(parse_i64_lossy);
    let expires_at = expires_in.and_then(|v| {
        if v <= 0 {
            None
        } else {
            Some(now.saturating_add(v))
        }
    });

    if value.get("refresh_token").is_some() {
        tracing::debug!("discarding refresh_token from token response");
    }

    Ok(OAuthTokenSet {
        access_token,
        token_type: non_empty_str(&value, "token_type"),
        scope: non_empty_str(&value, "scope"),
        expires_at,
    })
}

fn non_empty_str(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_i64_lossy(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let key_lc = key.trim().to_ascii_lowercase();
    key_lc.contains("token")
        || key_lc.contains("secret")
        || key_lc == "code"
        || key_lc == "authorization"
}

fn redact_sensitive_json_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if is_sensitive_key(key) {
                    if let Some(raw) = nested.as_str() {
                        *nested = Value::String(mask_token(raw));
                        continue;
                    }
                }
                redact_sensitive_json_fields(nested);
            }
        }
        Value::Array(items) => {
            for nested in items {
                redact_sensitive_json_fields(nested);
            }
        }
        _ => {}
    }
}

fn sanitize_oauth_error_body_snippet(body: &str) -> String {
    if let Ok(mut value) = serde_json::from_str::<Value>(body) {
        redact_sensitive_json_fields(&mut value);
        if let Ok(encoded) = serde_json::to_string(&value) {
            return encoded.chars().take(500).collect();
        }
    }
    body.chars().take(500).collect()
}

fn parse_oauth_error_details(body: &str) -> (Option<String>, Option<String>) {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return (None, None),
    };

    let mut code = None;
    let mut message = non_empty_str(&value, "error_description");

    match value.get("error") {
        Some(Value::String(err)) => {
            let err = err.trim();
            if !err.is_empty() {
                code = Some(err.to_string());
            }
        }
        Some(Value::Object(err_obj)) => {
            code = err_obj
                .get("status")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            if message.is_none() {
                message = err_obj
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
            }
        }
        _ => {}
    }

    (code, message)
}
