mod support;

#[tokio::test]
async fn server_serves_health_and_stops() {
    let mut settings = support::settings_for("http://127.0.0.1:9");
    settings.listen_address = "127.0.0.1:0".to_string();

    let portal = tenxr_web_portal_lib::start(settings).await.expect("start");
    let addr = portal.local_addr();
    assert_ne!(addr.port(), 0);

    let response = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("health request");
    assert!(response.status().is_success());
    let body: serde_json::Value =
        serde_json::from_str(&response.text().await.expect("body")).expect("json");
    assert_eq!(body["status"], "ok");

    portal.stop().await;

    assert!(reqwest::get(format!("http://{addr}/health")).await.is_err());
}

#[tokio::test]
async fn occupied_port_fails_to_start() {
    let mut settings = support::settings_for("http://127.0.0.1:9");
    settings.listen_address = "127.0.0.1:0".to_string();
    let first = tenxr_web_portal_lib::start(settings.clone())
        .await
        .expect("start first");

    settings.listen_address = format!("127.0.0.1:{}", first.local_addr().port());
    let err = match tenxr_web_portal_lib::start(settings).await {
        Ok(_) => panic!("second bind on the same port should fail"),
        Err(err) => err,
    };
    assert_eq!(err.code(), "SYSTEM_ERROR");
    assert!(err.message().contains("bind failed"));

    first.stop().await;
}

#[tokio::test]
async fn invalid_listen_address_is_a_config_error() {
    let mut settings = support::settings_for("http://127.0.0.1:9");
    settings.listen_address = "http://0.0.0.0:80".to_string();

    let err = match tenxr_web_portal_lib::start(settings).await {
        Ok(_) => panic!("url listen address should be rejected"),
        Err(err) => err,
    };
    assert_eq!(err.code(), "CONFIG_INVALID");
}
