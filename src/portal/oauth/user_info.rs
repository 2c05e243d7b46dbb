//! Usage: Profile lookup against the provider's userinfo endpoint.

use crate::domain::token_payload::UserInfo;
use crate::shared::error::AppResult;

pub(crate) async fn fetch_user_info(
    client: &reqwest::Client,
    userinfo_url: &str,
    access_token: &str,
) -> AppResult<UserInfo> {
    let response = client
        .get(userinfo_url.trim())
        .bearer_auth(access_token.trim())
        .send()
        .await
        .map_err(|e| format!("OAUTH_USERINFO: userinfo request failed: {e}"))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| format!("OAUTH_USERINFO: userinfo response read failed: {e}"))?;

    if !status.is_success() {
        let snippet: String = body.chars().take(240).collect();
        return Err(format!(
            "OAUTH_USERINFO: userinfo endpoint returned status={} body={snippet}",
            status.as_u16()
        )
        .into());
    }

    serde_json::from_str::<UserInfo>(&body)
        .map_err(|e| format!("OAUTH_USERINFO: userinfo response json invalid: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_bearer_token_and_parses_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer ya29.good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "1",
                "email": "ada@example.com",
                "name": "Ada",
                "picture": "https://example.com/ada.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let user = fetch_user_info(&client, &format!("{}/userinfo", server.uri()), "ya29.good")
            .await
            .expect("profile");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "Ada");
        assert_eq!(user.picture, "https://example.com/ada.png");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_token"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_user_info(&client, &format!("{}/userinfo", server.uri()), "bad")
            .await
            .expect_err("should fail");
        assert_eq!(err.code(), "OAUTH_USERINFO");
        assert!(err.message().contains("status=401"));
    }
}
