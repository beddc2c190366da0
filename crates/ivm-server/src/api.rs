//! Webhook and call-placement handlers.

use crate::provider::ProviderError;
use crate::AppState;
use axum::{
    extract::{rejection::FormRejection, Extension, Form},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use ivm_call::{handle_keypress, handle_recording_finished, start_call, PromptError};
use ivm_twiml::VoiceResponse;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad gateway: {0}")]
    BadGateway(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<PromptError> for ApiError {
    fn from(e: PromptError) -> Self {
        tracing::error!("failed to render prompt: {}", e);
        ApiError::InternalServerError(e.to_string())
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        tracing::error!("call placement failed: {}", e);
        ApiError::BadGateway(e.to_string())
    }
}

/// Voice markup document served as `text/xml`.
#[derive(Debug)]
pub struct Markup(pub String);

impl From<&VoiceResponse> for Markup {
    fn from(response: &VoiceResponse) -> Self {
        Markup(response.to_xml())
    }
}

impl IntoResponse for Markup {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "text/xml")], self.0).into_response()
    }
}

/// Form posted by the provider after a menu keypress.
#[derive(Debug, Default, Deserialize)]
pub struct MenuCallbackForm {
    #[serde(rename = "Digits", default)]
    pub digits: String,
}

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Interactive voice message</title></head>
  <body>
    <form action="/calls" method="post">
      <button type="submit">Start call</button>
    </form>
  </body>
</html>
"#;

/// Handler for `GET /`.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Handler for `POST /calls`. Builds the opening script and places the call.
pub async fn start_call_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<String, ApiError> {
    let mut response = VoiceResponse::new();
    start_call(&state.call, &mut response)?;
    let markup = response.to_xml();

    let placed = state
        .provider
        .create_call(&state.to_number, &state.from_number, &markup)
        .await?;

    tracing::info!(sid = %placed.sid, to = %state.to_number, "initiated call");
    Ok(format!(
        "Initiated call with SID {} with the following VoiceResponse:\n{}",
        placed.sid, markup
    ))
}

/// Handler for `POST /menu-callback`.
///
/// A missing or unreadable `Digits` field is treated as an unmapped key.
pub async fn menu_callback_handler(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<MenuCallbackForm>, FormRejection>,
) -> Result<Markup, ApiError> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!("unreadable menu callback form: {}", rejection);
            MenuCallbackForm::default()
        }
    };
    tracing::info!(digits = %form.digits, "menu keypress received");

    let mut response = VoiceResponse::new();
    handle_keypress(&state.call, &form.digits, &mut response)?;
    Ok(Markup::from(&response))
}

/// Handler for `POST /voice-reply-callback`.
pub async fn voice_reply_callback_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Markup, ApiError> {
    tracing::info!("voice reply recording finished");

    let mut response = VoiceResponse::new();
    handle_recording_finished(&state.call, &mut response)?;
    Ok(Markup::from(&response))
}

/// Handler for `POST /transcribe-callback`. Acknowledged and otherwise ignored.
pub async fn transcribe_callback_handler() -> StatusCode {
    tracing::debug!("transcription callback acknowledged");
    StatusCode::OK
}
