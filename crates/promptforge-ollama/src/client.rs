//! Blocking client for Ollama's native `/api/chat` endpoint.
//!
//! One `chat` call is one non-streaming POST. Failures are classified here,
//! where the transport details are still visible:
//!
//! - could not connect, or the request timed out: `ForgeError::Connection`
//! - any other transport failure, a non-2xx status, or an undecodable body:
//!   `ForgeError::Generation`

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use promptforge_contracts::{
    chat::{ChatMessage, ChatRequest, ModelReply},
    error::{ForgeError, ForgeResult},
};
use promptforge_core::traits::ModelClient;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct WireRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub format: &'a serde_json::Value,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireResponse {
    pub message: WireMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMessage {
    pub content: String,
}

// ── Client ────────────────────────────────────────────────────────────────────

/// A `ModelClient` talking to a local or remote Ollama server.
pub struct OllamaClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Build a client for `model` at `base_url` with a per-request timeout.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> ForgeResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForgeError::Config {
                reason: format!("failed to build http client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: normalize_base_url(&base_url.into()),
            model: model.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

/// Trim whitespace and trailing slashes; assume `http://` when no scheme is
/// given. An empty value falls back to the local default.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_BASE_URL.to_string()
    } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

/// Map a transport error to the pipeline's error kinds.
pub(crate) fn classify_transport(url: &str, e: &reqwest::Error) -> ForgeError {
    if e.is_connect() || e.is_timeout() {
        ForgeError::Connection {
            reason: format!("failed to reach ollama at {url} (is it running?): {e}"),
        }
    } else {
        ForgeError::Generation {
            reason: format!("request to {url} failed: {e}"),
        }
    }
}

/// Decode a successful response body into the reply text.
pub(crate) fn decode_body(body: &str) -> ForgeResult<ModelReply> {
    let wire: WireResponse = serde_json::from_str(body).map_err(|e| ForgeError::Generation {
        reason: format!("unexpected ollama response body: {e}"),
    })?;
    Ok(ModelReply::new(wire.message.content))
}

impl ModelClient for OllamaClient {
    fn chat(&self, request: &ChatRequest) -> ForgeResult<ModelReply> {
        let url = self.chat_url();
        let body = WireRequest {
            model: &self.model,
            messages: &request.messages,
            format: &request.format,
            stream: false,
        };

        let started = Instant::now();
        debug!(%url, model = %self.model, "posting chat request");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| classify_transport(&url, &e))?;

        let status = response.status();
        let text = response.text().map_err(|e| classify_transport(&url, &e))?;
        debug!(
            %status,
            bytes = text.len(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "chat response received"
        );

        if !status.is_success() {
            warn!(%status, body = %text, "ollama returned an error status");
            return Err(ForgeError::Generation {
                reason: format!("ollama returned {status}: {text}"),
            });
        }

        decode_body(&text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use promptforge_contracts::{
        chat::{ChatMessage, PromptSpec},
        error::ForgeError,
    };
    use promptforge_core::traits::ModelClient;

    use super::{decode_body, normalize_base_url, OllamaClient, WireRequest};

    #[test]
    fn wire_request_is_non_streaming_chat() {
        let messages = vec![ChatMessage::user("hi")];
        let format = json!({ "type": "object" });
        let body = WireRequest {
            model: "llama3.2",
            messages: &messages,
            format: &format,
            stream: false,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "model": "llama3.2",
                "messages": [{ "role": "user", "content": "hi" }],
                "format": { "type": "object" },
                "stream": false
            })
        );
    }

    #[test]
    fn body_decodes_to_message_content() {
        let body = r#"{"model":"llama3.2","message":{"role":"assistant","content":"{\"a\":1}"},"done":true}"#;
        assert_eq!(decode_body(body).unwrap().content, "{\"a\":1}");
    }

    #[test]
    fn undecodable_body_is_a_generation_error() {
        let err = decode_body("<html>502</html>").unwrap_err();
        assert!(matches!(err, ForgeError::Generation { .. }));
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(normalize_base_url("http://gpu:11434/"), "http://gpu:11434");
        assert_eq!(normalize_base_url("gpu:11434"), "http://gpu:11434");
        assert_eq!(normalize_base_url("  "), "http://localhost:11434");
        assert_eq!(normalize_base_url("https://ollama.internal"), "https://ollama.internal");
    }

    #[test]
    fn client_reports_normalized_endpoint_and_model() {
        let client = OllamaClient::new("gpu:11434/", "llama3.1:70b", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://gpu:11434");
        assert_eq!(client.model(), "llama3.1:70b");
        assert_eq!(client.chat_url(), "http://gpu:11434/api/chat");
    }

    #[test]
    fn refused_connection_is_classified_as_connection() {
        // Port 1 on loopback has no listener.
        let client = OllamaClient::new("http://127.0.0.1:1", "llama3.2", Duration::from_secs(5)).unwrap();
        let request = PromptSpec::new("Say", "hi").to_request(json!({}));

        let err = client.chat(&request).unwrap_err();
        assert!(matches!(err, ForgeError::Connection { .. }), "got {:?}", err);
    }
}
