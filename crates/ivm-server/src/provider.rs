//! REST client for placing outbound calls with the voice-call provider.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

use crate::config::ProviderConfig;

/// Provider REST API version segment.
const API_VERSION: &str = "2010-04-01";

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or the response could not be read.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider accepted the request but the body was not understood.
    #[error("unexpected provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A call the provider accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacedCall {
    /// Provider call identifier.
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<i64>,
}

#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    api_base_url: String,
    account_sid: String,
    auth_token: String,
}

impl fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClient")
            .field("api_base_url", &self.api_base_url)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    fn calls_url(&self) -> String {
        format!(
            "{}/{}/Accounts/{}/Calls.json",
            self.api_base_url, API_VERSION, self.account_sid
        )
    }

    /// Places a call from `from` to `to` that executes `twiml` once answered.
    ///
    /// Failures are returned as-is; there is no retry.
    pub async fn create_call(
        &self,
        to: &str,
        from: &str,
        twiml: &str,
    ) -> Result<PlacedCall, ProviderError> {
        let response = self
            .http
            .post(self.calls_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Twiml", twiml)])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<ApiErrorBody>(&body) {
                Ok(ApiErrorBody {
                    message: Some(message),
                    code,
                }) => match code {
                    Some(code) => format!("{message} (code {code})"),
                    None => message,
                },
                _ => String::from_utf8_lossy(&body).into_owned(),
            };
            tracing::warn!(status = status.as_u16(), %message, "provider rejected call placement");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let call: PlacedCall = serde_json::from_slice(&body)?;
        tracing::info!(sid = %call.sid, status = ?call.status, "provider accepted call");
        Ok(call)
    }
}
