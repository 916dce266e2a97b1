//! Prompt templates for single generation calls
//!
//! Mode-specific system instructions, focus expertise suffixes and the
//! context wrapper applied before a prompt reaches the model.

use crate::generation::{Focus, GenerationMode};

/// Templates for generation-call prompts
pub struct PromptTemplate;

const CODE_BLOCK_RULE: &str = "When providing code, always enclose it in a markdown code block with the appropriate language identifier (e.g., ```python).";

impl PromptTemplate {
    /// Base system instruction for a mode, without focuses.
    pub fn base_instruction(mode: GenerationMode) -> String {
        let body = match mode {
            GenerationMode::Quick => {
                "As The Muse Engine, your role is to provide a fast and concise answer. Be direct and helpful."
            }
            GenerationMode::Chat => {
                "You are The Muse Engine, a collaborative AI partner designed for creative and technical exploration. Your purpose is to act as a co-creator, helping users explore concepts, write, and solve problems. Answer questions conversationally, drawing from your knowledge and up-to-date search results. Your identity is that of an imaginative and analytical assistant, always ready to collaborate."
            }
            GenerationMode::Thinker => {
                "You are The Muse Engine, operating in Thinker mode. Your purpose is to perform deep comprehension and analysis. Tackle the user's complex, multi-step problem with maximum effort, providing a comprehensive, well-reasoned response. Leverage your imagination and analytical skills, using Google Search to find up-to-date information when necessary."
            }
            GenerationMode::Professor => {
                "You are The Muse Engine, in Professor mode. Your role is to act as an expert educator. Take the user's topic and break it down into a structured, easy-to-understand lesson. Use clear explanations, analogies, and examples. After explaining a concept, ask a thoughtful question to check for understanding before proceeding. Your goal is to teach, not just to answer. Structure your response like a course module. Use Google Search for accurate and up-to-date information."
            }
        };
        format!("{} {}", body, CODE_BLOCK_RULE)
    }

    /// System instruction for a mode, with the focus expertise suffix.
    pub fn system_instruction(mode: GenerationMode, focuses: &[Focus]) -> String {
        let base = Self::base_instruction(mode);
        if focuses.is_empty() {
            return base;
        }
        let names = focuses
            .iter()
            .map(Focus::display_name)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{}\n\nAdditionally, incorporate expertise from the following fields into your response: {}.",
            base, names
        )
    }

    /// Mode-specific framing of the user's prompt.
    pub fn frame_query(mode: GenerationMode, prompt: &str) -> String {
        match mode {
            GenerationMode::Thinker => format!("User query: \"{}\"", prompt),
            GenerationMode::Professor => format!("Teach me about: \"{}\"", prompt),
            GenerationMode::Quick | GenerationMode::Chat => prompt.to_string(),
        }
    }

    /// Wrap a prompt with prior context, if any.
    pub fn contextual_prompt(prompt: &str, context: Option<&str>) -> String {
        match context {
            Some(ctx) if !ctx.is_empty() => format!(
                "Given the following context:\n---\n{}\n---\n\nNow, please respond to the following request: \"{}\"",
                ctx, prompt
            ),
            _ => prompt.to_string(),
        }
    }

    /// Full user-turn text for a generation call.
    pub fn user_turn(mode: GenerationMode, prompt: &str, context: Option<&str>) -> String {
        Self::contextual_prompt(&Self::frame_query(mode, prompt), context)
    }
}
