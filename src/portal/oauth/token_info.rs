//! Usage: Unauthenticated tokeninfo check for an access token.

use crate::shared::security::mask_token;

/// Returns whether the provider accepts `access_token`. Failures are logged and count as invalid.
pub(crate) async fn validate_token(
    client: &reqwest::Client,
    tokeninfo_url: &str,
    access_token: &str,
) -> bool {
    let token = access_token.trim();
    if token.is_empty() {
        return false;
    }

    match client
        .post(tokeninfo_url.trim())
        .form(&[("access_token", token)])
        .send()
        .await
    {
        Ok(response) => {
            let ok = response.status().is_success();
            if !ok {
                tracing::debug!(
                    status = response.status().as_u16(),
                    token = %mask_token(token),
                    "tokeninfo rejected access token"
                );
            }
            ok
        }
        Err(err) => {
            tracing::error!(token = %mask_token(token), "error validating token: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn accepted_token_is_valid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tokeninfo"))
            .and(body_string_contains("access_token=ya29.good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "azp": "cid",
                "expires_in": "3599"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/tokeninfo", server.uri());
        assert!(validate_token(&client, &url, "ya29.good").await);
    }

    #[tokio::test]
    async fn rejected_token_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tokeninfo"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_token"
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/tokeninfo", server.uri());
        assert!(!validate_token(&client, &url, "expired").await);
    }

    #[tokio::test]
    async fn empty_token_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/tokeninfo", server.uri());
        assert!(!validate_token(&client, &url, "   ").await);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_invalid() {
        let client = reqwest::Client::new();
        assert!(!validate_token(&client, "http://127.0.0.1:1/tokeninfo", "ya29.x").await);
    }
}
