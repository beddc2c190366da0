use axum::{
    body::Body,
    extract::{Extension, Form, Path},
    http::{header, HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use ivm_server::{app, config, AppState};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceExt; // for oneshot

/// What the mock provider saw.
#[derive(Debug, Default, Clone)]
struct Captured {
    account: String,
    authorization: String,
    form: HashMap<String, String>,
}

type Capture = Arc<Mutex<Option<Captured>>>;

async fn accept_call(
    Extension(capture): Extension<Capture>,
    Path(account): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    *capture.lock().unwrap() = Some(Captured {
        account,
        authorization,
        form,
    });
    (
        StatusCode::CREATED,
        Json(json!({ "sid": "CA0123456789", "status": "queued" })),
    )
}

async fn reject_call() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "code": 20003, "message": "Authenticate" })),
    )
}

async fn spawn_provider(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn app_for_provider(api_base_url: &str) -> Router {
    let mut overrides: toml::Table = toml::from_str(
        r#"
        [provider]
        account_sid = "a"
        auth_token = "b"

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
    if let Some(toml::Value::Table(provider)) = overrides.get_mut("provider") {
        provider.insert(
            "api_base_url".to_string(),
            toml::Value::String(api_base_url.to_string()),
        );
    }
    let config = config::load_layers(None, Some(overrides), std::iter::empty()).unwrap();
    app(AppState::from_config(&config, "https://ivm.example.com"))
}

fn start_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/calls")
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn places_call_with_opening_script() {
    let capture: Capture = Arc::new(Mutex::new(None));
    let provider = Router::new()
        .route("/2010-04-01/Accounts/{sid}/Calls.json", post(accept_call))
        .layer(Extension(capture.clone()));
    let addr = spawn_provider(provider).await;

    let response = app_for_provider(&format!("http://{addr}"))
        .oneshot(start_request())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    let (heading, markup) = text.split_once('\n').unwrap();
    assert_eq!(
        heading,
        "Initiated call with SID CA0123456789 with the following VoiceResponse:"
    );

    let captured = capture.lock().unwrap().clone().unwrap();
    assert_eq!(captured.account, "a");
    assert_eq!(captured.authorization, "Basic YTpi");
    assert_eq!(captured.form["To"], "+15550000002");
    assert_eq!(captured.form["From"], "+15550000001");
    assert_eq!(captured.form["Twiml"], markup);

    let intro = markup.find("Hello, this is a voice message from From about Apple.").unwrap();
    let main = markup.find("Apples are red").unwrap();
    let email = markup.find("My email address is,").unwrap();
    let gather = markup
        .find(r#"<Gather action="https://ivm.example.com/menu-callback""#)
        .unwrap();
    let closing = markup.find("Okay, thank you very much!").unwrap();
    assert!(intro < main && main < email && email < gather && gather < closing);
}

#[tokio::test]
async fn provider_rejection_is_bad_gateway() {
    let provider = Router::new().route("/2010-04-01/Accounts/{sid}/Calls.json", post(reject_call));
    let addr = spawn_provider(provider).await;

    let response = app_for_provider(&format!("http://{addr}"))
        .oneshot(start_request())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("401"));
    assert!(error.contains("Authenticate"));
}

#[tokio::test]
async fn unreachable_provider_is_bad_gateway() {
    // Bind and drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let response = app_for_provider(&format!("http://{addr}"))
        .oneshot(start_request())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
