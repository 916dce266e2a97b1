//! Gemini-backed plan generator
//!
//! Asks the plan model for a JSON object `{"plan": [{description, input_prompt}]}`
//! using a response schema, then parses it leniently.

use super::config::GeminiConfig;
use super::error::{from_body, from_status, from_transport};
use super::gateway::http_client;
use super::protocol::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};
use async_trait::async_trait;
use muse_application::{GatewayError, PlanGenerator};
use muse_domain::{AgentPromptTemplate, PlanStepDraft};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

pub struct GeminiPlanGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiPlanGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: http_client(&config)?,
            config,
        })
    }

    pub fn build_request(goal: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(AgentPromptTemplate::plan_request(goal))],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(plan_schema()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

fn plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "plan": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "description": {
                            "type": "STRING",
                            "description": "A clear, concise description of the step to be executed."
                        },
                        "input_prompt": {
                            "type": "STRING",
                            "description": "A question to ask the user if this step requires their input before execution. Leave empty if no input is needed."
                        }
                    }
                }
            }
        }
    })
}

#[derive(Deserialize)]
struct PlanEnvelope {
    plan: Option<Vec<PlanEntry>>,
}

#[derive(Deserialize)]
struct PlanEntry {
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "inputPrompt")]
    input_prompt: Option<String>,
}

/// Parse the model's JSON answer into step drafts.
///
/// Tolerates a surrounding markdown code fence. Blank input prompts become
/// `None`; blank descriptions are kept so plan validation can reject them.
pub fn parse_plan(text: &str) -> Result<Vec<PlanStepDraft>, GatewayError> {
    let body = strip_code_fence(text);
    let envelope: PlanEnvelope = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("Plan is not valid JSON: {}", e)))?;
    let entries = envelope
        .plan
        .ok_or_else(|| GatewayError::InvalidResponse("Plan response has no plan".to_string()))?;

    Ok(entries
        .into_iter()
        .map(|entry| PlanStepDraft {
            description: entry.description.unwrap_or_default().trim().to_string(),
            input_prompt: entry
                .input_prompt
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        })
        .collect())
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[async_trait]
impl PlanGenerator for GeminiPlanGenerator {
    async fn generate_plan(&self, goal: &str) -> Result<Vec<PlanStepDraft>, GatewayError> {
        let api_key = self.config.api_key().ok_or(GatewayError::MissingApiKey)?;
        let model = &self.config.plan_model;
        let url = self.config.endpoint(model, "generateContent");

        debug!("Requesting plan from {}", model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&Self::build_request(goal))
            .send()
            .await
            .map_err(from_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(from_body)?;
        if !status.is_success() {
            return Err(from_status(status.as_u16(), &text));
        }

        let body: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::InvalidResponse(format!("Bad plan response: {}", e)))?;
        if let Some(reason) = body.block_reason() {
            return Err(GatewayError::RequestFailed(format!(
                "Response blocked: {}",
                reason
            )));
        }

        let drafts = parse_plan(&body.text())?;
        info!("Plan model returned {} steps", drafts.len());
        Ok(drafts)
    }
}
