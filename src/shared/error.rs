//! Usage: Unified application error model (maps internal failures to `CODE: message` strings).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct AppError {
    code: String,
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        code: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status used when this error reaches a client.
    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "SEC_INVALID_INPUT" | "INVALID_INPUT" | "AUTH_DENIED" => StatusCode::BAD_REQUEST,
            code if code.starts_with("OAUTH_") => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn split_code_message(raw: &str) -> Option<(&str, &str)> {
    let msg = raw.trim();
    let msg = msg.strip_prefix("Error:").unwrap_or(msg).trim();
    if msg.is_empty() {
        return None;
    }

    let (maybe_code, rest) = msg.split_once(':')?;
    let code = maybe_code.trim();
    if code.is_empty() {
        return None;
    }
    let mut chars = code.chars();
    let first = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    if !chars.all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_') {
        return None;
    }
    Some((code, rest.trim()))
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        if let Some((code, rest)) = split_code_message(&value) {
            let message = if rest.is_empty() { value.trim() } else { rest };
            return AppError::new(code.to_string(), message.to_string());
        }
        AppError::new("INTERNAL_ERROR", value)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            code: &self.code,
            message: &self.message,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_splits_code_prefix() {
        let err = AppError::from("OAUTH_USERINFO: status=401".to_string());
        assert_eq!(err.code(), "OAUTH_USERINFO");
        assert_eq!(err.message(), "status=401");
        assert_eq!(err.to_string(), "OAUTH_USERINFO: status=401");
    }

    #[test]
    fn from_string_without_code_is_internal() {
        let err = AppError::from("something broke: badly".to_string());
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.message(), "something broke: badly");
    }

    #[test]
    fn status_maps_codes() {
        assert_eq!(
            AppError::new("SEC_INVALID_INPUT", "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::new("AUTH_DENIED", "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::new("OAUTH_TOKEN_EXCHANGE", "x").status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::new("CONFIG_INVALID", "x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
