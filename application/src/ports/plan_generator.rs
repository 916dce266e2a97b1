//! Plan generator port
//!
//! Turns a free-text goal into ordered step drafts. The adapter performs
//! the network call and response parsing; mapping drafts into plan steps
//! happens in [`GeneratePlanUseCase`](crate::use_cases::generate_plan::GeneratePlanUseCase).

use crate::ports::generation_gateway::GatewayError;
use async_trait::async_trait;
use muse_domain::PlanStepDraft;

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Produce the ordered step drafts for `goal`.
    async fn generate_plan(&self, goal: &str) -> Result<Vec<PlanStepDraft>, GatewayError>;
}
