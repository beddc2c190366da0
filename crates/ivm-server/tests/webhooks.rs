use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use ivm_server::{app, config, AppState};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

const MACHINE: &str = "Polly.Matthew-Neural";
const HUMAN: &str = "Polly.Salli-Neural";

fn test_config() -> config::Config {
    let overrides: toml::Table = toml::from_str(
        r#"
        [provider]
        account_sid = "AC123"
        auth_token = "secret"
        api_base_url = "http://127.0.0.1:9"

        [call]
        from_number = "+15550000001"
        to_number = "+15550000002"

        [variables]
        from_name = "From"
        subject = "Apple"
        main_message = "Apples are red"
        email = "test@example.com"
        "#,
    )
    .unwrap();
    config::load_layers(None, Some(overrides), std::iter::empty()).unwrap()
}

fn test_app() -> Router {
    let config = test_config();
    app(AppState::from_config(&config, "https://ivm.example.com"))
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn post_markup(uri: &str, body: &str) -> String {
    let response = test_app().oneshot(form_post(uri, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/xml"
    );
    body_text(response).await
}

#[tokio::test]
async fn index_serves_start_form() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/calls""#));
    assert!(html.contains(r#"method="post""#));
}

#[tokio::test]
async fn health_check_returns_ok() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn keypress_one_replays_message_and_menu() {
    let xml = post_markup("/menu-callback", "Digits=1").await;

    assert!(xml.contains(&format!(r#"<Say voice="{HUMAN}">Apples are red</Say>"#)));
    assert!(xml.contains(r#"<Gather action="/menu-callback" method="POST""#));
    assert!(!xml.contains("<Hangup"));
}

#[tokio::test]
async fn keypress_two_spells_email_address() {
    let xml = post_markup("/menu-callback", "Digits=2").await;

    assert!(xml.contains(&format!(r#"<Say voice="{HUMAN}">My email address is,"#)));
    assert!(xml.contains(r#"<say-as interpret-as="spell-out">test@example.com</say-as>"#));
    assert!(xml.contains("<Gather "));
}

#[tokio::test]
async fn keypress_three_starts_recording() {
    let xml = post_markup("/menu-callback", "Digits=3").await;

    assert!(xml.contains(&format!(r#"<Say voice="{MACHINE}">Please leave a reply"#)));
    assert!(xml.contains(r#"<Record action="/voice-reply-callback" method="POST" maxLength="120""#));
    assert!(xml.contains(r#"transcribeCallback="/transcribe-callback""#));
    assert!(!xml.contains("<Gather"));
    assert!(!xml.contains("<Hangup"));
}

#[tokio::test]
async fn unmapped_keypress_repeats_menu() {
    let xml = post_markup("/menu-callback", "Digits=9").await;

    assert!(xml.contains("<Gather "));
    assert!(xml.contains("Please press 1 "));
    assert!(!xml.contains("Apples are red"));
}

#[tokio::test]
async fn missing_digits_repeats_menu() {
    let xml = post_markup("/menu-callback", "CallSid=CA1").await;
    assert!(xml.contains("<Gather "));

    let request = Request::builder()
        .method("POST")
        .uri("/menu-callback")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<Gather "));
}

#[tokio::test]
async fn voice_reply_says_goodbye_and_hangs_up() {
    let xml = post_markup("/voice-reply-callback", "RecordingUrl=https%3A%2F%2Fx").await;

    assert!(xml.contains(&format!(
        r#"<Say voice="{HUMAN}">Thank you. Your reply will be delivered to From. "#
    )));
    assert!(xml.ends_with(r#"<Pause length="1"/><Hangup/></Response>"#));
}

#[tokio::test]
async fn transcription_is_acknowledged_with_empty_body() {
    let response = test_app()
        .oneshot(form_post(
            "/transcribe-callback",
            "TranscriptionText=hello&TranscriptionStatus=completed",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn missing_variable_is_internal_error() {
    let mut config = test_config();
    config.variables.remove("main_message");
    let app = app(AppState::from_config(&config, "https://ivm.example.com"));

    let response = app.oneshot(form_post("/menu-callback", "Digits=1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(json["error"].as_str().unwrap().contains("main_message"));
}
