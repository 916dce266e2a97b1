//! Streaming generation port
//!
//! Defines the interface the executor uses to run one step against the
//! hosted generation API. Adapters live in the infrastructure layer.

use async_trait::async_trait;
use muse_domain::{Focus, GenerationMode, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

const OFFLINE_MESSAGE: &str = "You appear to be offline. Please check your internet connection.";
const API_KEY_MESSAGE: &str =
    "The API key is missing or invalid. Please configure it to use the AI features.";
const QUOTA_MESSAGE: &str = "You have exceeded your API quota. Please check your account status.";
const NETWORK_MESSAGE: &str =
    "A network error occurred. Please check your connection and try again.";

/// Errors that can occur during generation gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Offline")]
    Offline,

    #[error("API key is missing")]
    MissingApiKey,

    #[error("API key rejected: {0}")]
    Unauthorized(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Offline => OFFLINE_MESSAGE.to_string(),
            GatewayError::MissingApiKey | GatewayError::Unauthorized(_) => {
                API_KEY_MESSAGE.to_string()
            }
            GatewayError::QuotaExceeded(_) => QUOTA_MESSAGE.to_string(),
            GatewayError::ConnectionError(_) | GatewayError::TransportClosed => {
                NETWORK_MESSAGE.to_string()
            }
            GatewayError::RequestFailed(msg)
            | GatewayError::InvalidResponse(msg)
            | GatewayError::Other(msg) => friendly_message(msg),
        }
    }
}

/// Map a raw provider error message to a user-facing one.
///
/// Recognises key, quota and network failures; anything else is returned
/// with the provider prefix stripped.
pub fn friendly_message(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if raw.contains("API_KEY") || lower.contains("api key") {
        return API_KEY_MESSAGE.to_string();
    }
    if lower.contains("quota") {
        return QUOTA_MESSAGE.to_string();
    }
    if lower.contains("offline") {
        return OFFLINE_MESSAGE.to_string();
    }
    if lower.contains("fetch") || lower.contains("connection") {
        return NETWORK_MESSAGE.to_string();
    }
    let trimmed = raw.replace("Gemini API Error:", "").trim().to_string();
    if trimmed.is_empty() {
        "An unexpected error occurred. Please try again.".to_string()
    } else {
        trimmed
    }
}

/// Parameters of one streaming generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub mode: GenerationMode,
    pub focuses: Vec<Focus>,
    /// Prior-context text (earlier steps' descriptions and results)
    pub context: Option<String>,
    /// Request the grounding-enabled (web search) variant
    pub grounding: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, mode: GenerationMode) -> Self {
        Self {
            prompt: prompt.into(),
            mode,
            focuses: Vec::new(),
            context: None,
            grounding: false,
        }
    }

    pub fn with_focuses(mut self, focuses: Vec<Focus>) -> Self {
        self.focuses = focuses;
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }
}

/// Handle for receiving streaming events from one generation call.
///
/// Dropping the handle tells the producer to stop; remaining fragments
/// are discarded. A handle is single-use: retrying needs a fresh call.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once the producer is gone.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

/// Gateway for streaming generation
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Start a streaming generation call.
    ///
    /// Errors raised before the first event are returned here; errors after
    /// that arrive as [`StreamEvent::Error`] carrying a user-facing message
    /// (see [`GatewayError::user_message`]).
    async fn stream(&self, request: GenerationRequest) -> Result<StreamHandle, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use muse_domain::Fragment;

    #[test]
    fn test_user_messages_for_typed_errors() {
        assert_eq!(GatewayError::Offline.user_message(), OFFLINE_MESSAGE);
        assert_eq!(GatewayError::MissingApiKey.user_message(), API_KEY_MESSAGE);
        assert_eq!(
            GatewayError::QuotaExceeded("429".to_string()).user_message(),
            QUOTA_MESSAGE
        );
        assert_eq!(
            GatewayError::ConnectionError("reset".to_string()).user_message(),
            NETWORK_MESSAGE
        );
    }

    #[test]
    fn test_friendly_message_heuristics() {
        assert_eq!(friendly_message("API_KEY_INVALID"), API_KEY_MESSAGE);
        assert_eq!(friendly_message("Resource has been exhausted (e.g. check Quota)"), QUOTA_MESSAGE);
        assert_eq!(friendly_message("failed to fetch"), NETWORK_MESSAGE);
        assert_eq!(friendly_message(OFFLINE_MESSAGE), OFFLINE_MESSAGE);
        assert_eq!(friendly_message(NETWORK_MESSAGE), NETWORK_MESSAGE);
        assert_eq!(
            friendly_message("Gemini API Error: model overloaded"),
            "model overloaded"
        );
        assert_eq!(
            friendly_message("   "),
            "An unexpected error occurred. Please try again."
        );
    }

    #[tokio::test]
    async fn test_handle_yields_events_until_producer_drops() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Fragment(Fragment::text("Waves "))).await.unwrap();
        tx.send(StreamEvent::Completed).await.unwrap();
        drop(tx);

        let mut handle = StreamHandle::new(rx);
        assert_eq!(handle.recv().await.unwrap().text(), Some("Waves "));
        assert_eq!(handle.recv().await, Some(StreamEvent::Completed));
        assert_eq!(handle.recv().await, None);
    }

    #[test]
    fn test_request_builder() {
        let req = GenerationRequest::new("Critique", GenerationMode::Thinker)
            .with_focuses(vec![Focus::Creative])
            .with_context(Some("Step: a\nResult: b".to_string()))
            .with_grounding(true);
        assert!(req.grounding);
        assert_eq!(req.focuses, vec![Focus::Creative]);
        assert_eq!(req.context.as_deref(), Some("Step: a\nResult: b"));
    }
}
