//! Gemini streaming generation gateway

use super::config::GeminiConfig;
use super::error::{from_body, from_status, from_transport};
use super::protocol::{
    Content, GenerateContentRequest, GenerationConfig, ThinkingConfig, Tool,
};
use super::sse::{CitationAccumulator, SseDecoder, decode_payload};
use async_trait::async_trait;
use futures::StreamExt;
use muse_application::{GatewayError, GenerationGateway, GenerationRequest, StreamHandle};
use muse_domain::{PromptTemplate, StreamEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client for the Gemini adapters.
pub(crate) fn http_client(config: &GeminiConfig) -> Result<reqwest::Client, GatewayError> {
    let mut builder = reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| GatewayError::Other(format!("Failed to build HTTP client: {}", e)))
}

/// [`GenerationGateway`] over `streamGenerateContent?alt=sse`
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GeminiConfig,
    channel_capacity: usize,
}

impl GeminiGateway {
    pub fn new(config: GeminiConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http_client(&config)?,
            config,
            channel_capacity: 64,
        })
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Request body for one call: mode framing, prior context, focus-aware
    /// system instruction, grounding tool and thinking budget.
    pub fn build_request(&self, request: &GenerationRequest) -> GenerateContentRequest {
        let mode = request.mode;
        let text = PromptTemplate::user_turn(mode, &request.prompt, request.context.as_deref());
        let grounded = request.grounding || mode.always_grounded();

        GenerateContentRequest {
            contents: vec![Content::user(text)],
            system_instruction: Some(Content::plain(PromptTemplate::system_instruction(
                mode,
                &request.focuses,
            ))),
            tools: if grounded {
                vec![Tool::default()]
            } else {
                Vec::new()
            },
            generation_config: mode.uses_thinking().then(|| GenerationConfig {
                thinking_config: Some(ThinkingConfig {
                    thinking_budget: self.config.thinking_budget,
                }),
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl GenerationGateway for GeminiGateway {
    async fn stream(&self, request: GenerationRequest) -> Result<StreamHandle, GatewayError> {
        let api_key = self.config.api_key().ok_or(GatewayError::MissingApiKey)?;
        let model = self.config.model_for(request.mode);
        let url = format!(
            "{}?alt=sse",
            self.config.endpoint(model, "streamGenerateContent")
        );
        let body = self.build_request(&request);

        debug!(
            "Streaming {} ({} mode, grounding: {})",
            model,
            request.mode,
            !body.tools.is_empty()
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(from_status(status.as_u16(), &text));
        }

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        tokio::spawn(pump(response, tx));
        Ok(StreamHandle::new(rx))
    }
}

/// Forward decoded SSE chunks until the body ends, fails, or the receiver
/// goes away.
async fn pump(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::default();
    let mut citations = CitationAccumulator::default();

    loop {
        let chunk = tokio::select! {
            _ = tx.closed() => {
                debug!("Stream receiver dropped; aborting request");
                return;
            }
            chunk = body.next() => chunk,
        };
        let payloads = match chunk {
            Some(Ok(bytes)) => decoder.push(&bytes),
            Some(Err(e)) => {
                warn!("Stream transport failed: {}", e);
                let error = from_body(e);
                let _ = tx.send(StreamEvent::Error(error.user_message())).await;
                return;
            }
            None => break,
        };
        if !forward(&tx, payloads, &mut citations).await {
            return;
        }
    }

    let tail: Vec<String> = decoder.finish().into_iter().collect();
    if forward(&tx, tail, &mut citations).await {
        let _ = tx.send(StreamEvent::Completed).await;
    }
}

async fn forward(
    tx: &mpsc::Sender<StreamEvent>,
    payloads: Vec<String>,
    citations: &mut CitationAccumulator,
) -> bool {
    for payload in payloads {
        let event = match decode_payload(&payload, citations) {
            Ok(Some(fragment)) => StreamEvent::Fragment(fragment),
            Ok(None) => continue,
            Err(e) => {
                warn!("Stream chunk rejected: {}", e);
                let _ = tx.send(StreamEvent::Error(e.user_message())).await;
                return false;
            }
        };
        if tx.send(event).await.is_err() {
            return false;
        }
    }
    true
}
