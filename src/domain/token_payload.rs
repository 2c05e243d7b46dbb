//! Usage: Token handoff payload and the custom-scheme deep link that carries it to the desktop app.

use crate::shared::error::AppResult;
use serde::{Deserialize, Serialize};

/// Minimal Google profile forwarded to the desktop app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
    pub picture: String,
}

/// JSON object handed to the desktop app through the deep link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub access_token: String,
    pub user: UserInfo,
}

impl TokenData {
    pub fn from_parts(access_token: impl Into<String>, user: &UserInfo) -> Self {
        Self {
            access_token: access_token.into(),
            user: UserInfo {
                email: user.email.clone(),
                name: user.name.clone(),
                picture: user.picture.clone(),
            },
        }
    }

    pub fn to_json(&self) -> AppResult<String> {
        serde_json::to_string(self)
            .map_err(|e| format!("SYSTEM_ERROR: token payload encode failed: {e}").into())
    }

    pub fn to_deep_link(&self, link: &DeepLink) -> AppResult<String> {
        Ok(link.with_token(&self.to_json()?))
    }
}

/// Custom URL scheme target registered by the desktop app, e.g. `10xr://auth/callback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    scheme: String,
    path: String,
}

impl DeepLink {
    pub fn new(scheme: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            path: path.into().trim_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> String {
        format!("{}://{}", self.scheme, self.path)
    }

    /// `{scheme}://{path}?token={percent-encoded raw}`.
    pub fn with_token(&self, raw: &str) -> String {
        format!("{}?token={}", self.base(), urlencoding::encode(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserInfo {
        UserInfo {
            email: "ada@example.com".to_string(),
            name: "Ada Lovelace".to_string(),
            picture: "https://lh3.googleusercontent.com/a/pic".to_string(),
        }
    }

    #[test]
    fn json_keeps_field_order() {
        let data = TokenData::from_parts("ya29.abc", &profile());
        assert_eq!(
            data.to_json().expect("json"),
            r#"{"access_token":"ya29.abc","user":{"email":"ada@example.com","name":"Ada Lovelace","picture":"https://lh3.googleusercontent.com/a/pic"}}"#
        );
    }

    #[test]
    fn user_info_tolerates_missing_fields() {
        let user: UserInfo =
            serde_json::from_str(r#"{"email":"a@b.c","sub":"123","email_verified":true}"#)
                .expect("parse");
        assert_eq!(user.email, "a@b.c");
        assert_eq!(user.name, "");
        assert_eq!(user.picture, "");
    }

    #[test]
    fn deep_link_percent_encodes_token() {
        let link = DeepLink::new("10xr", "/auth/callback/");
        assert_eq!(link.base(), "10xr://auth/callback");
        assert_eq!(
            link.with_token("a b&c=d/e"),
            "10xr://auth/callback?token=a%20b%26c%3Dd%2Fe"
        );
    }

    #[test]
    fn payload_round_trips_through_deep_link() {
        let link = DeepLink::new("10xr", "auth/callback");
        let data = TokenData::from_parts("ya29.abc", &profile());
        let url = data.to_deep_link(&link).expect("link");

        let encoded = url
            .strip_prefix("10xr://auth/callback?token=")
            .expect("prefix");
        assert!(!encoded.contains('&'));
        let decoded = urlencoding::decode(encoded).expect("decode");
        let back: TokenData = serde_json::from_str(&decoded).expect("json");
        assert_eq!(back, data);
    }
}
