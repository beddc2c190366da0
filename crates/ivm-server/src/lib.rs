//! HTTP server that places interactive voice message calls and answers the
//! provider's webhooks.

pub mod api;
pub mod config;
pub mod provider;
pub mod tunnel;

use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use config::Config;
use ivm_call::{
    CallContext, Callbacks, Menu, Voices, MENU_CALLBACK_PATH, TRANSCRIBE_CALLBACK_PATH,
    VOICE_REPLY_CALLBACK_PATH,
};
use provider::ProviderClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Voices, variables, menu and callback URLs for the call.
    pub call: Arc<CallContext>,
    /// Provider REST client.
    pub provider: Arc<ProviderClient>,
    /// The number that gets called.
    pub to_number: String,
    /// Caller ID.
    pub from_number: String,
}

impl AppState {
    /// Builds the state for a validated config, with callbacks rooted at
    /// `public_base_url`.
    pub fn from_config(config: &Config, public_base_url: &str) -> Self {
        let call = CallContext::new(
            Voices {
                machine: config.voices.machine.clone(),
                human: config.voices.human.clone(),
            },
            config.variables.clone(),
            Menu::standard(),
            Callbacks::new(public_base_url),
        );

        Self {
            call: Arc::new(call),
            provider: Arc::new(ProviderClient::new(&config.provider)),
            to_number: config.call.to_number.clone(),
            from_number: config.call.from_number.clone(),
        }
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::index_handler))
        .route("/health", get(health))
        .route("/calls", post(api::start_call_handler))
        .route(MENU_CALLBACK_PATH, post(api::menu_callback_handler))
        .route(
            VOICE_REPLY_CALLBACK_PATH,
            post(api::voice_reply_callback_handler),
        )
        .route(
            TRANSCRIBE_CALLBACK_PATH,
            post(api::transcribe_callback_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
