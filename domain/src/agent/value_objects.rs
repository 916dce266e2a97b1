//! Agent domain value objects - immutable types shared by plans and results.
//!
//! # Identifiers
//! - [`ResultId`] - Unique identifier for one agent invocation (the owning result)
//! - [`StepId`] - Unique identifier for a step within a plan
//!
//! # Grounding
//! - [`Citation`] - A source reference attached to generated text

use serde::{Deserialize, Serialize};

/// Unique identifier for an agent result (one user-initiated agent request).
///
/// Also serves as the task identifier in the execution registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(String);

impl ResultId {
    /// Creates a ResultId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random ResultId.
    pub fn generate() -> Self {
        Self(format!("result_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for ResultId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ResultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a step within a plan.
///
/// Assigned once at plan-generation time and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Creates a StepId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random StepId.
    pub fn generate() -> Self {
        Self(format!("step_{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for StepId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A grounding source attached to a step's result.
///
/// Citations are identified by `uri`; two citations with the same URI are
/// the same source regardless of title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

impl Citation {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }
}

/// Merge `incoming` into `existing`, skipping any URI already present.
///
/// Order of first appearance is preserved. Returns the number of citations added.
pub fn merge_citations(existing: &mut Vec<Citation>, incoming: &[Citation]) -> usize {
    let mut added = 0;
    for citation in incoming {
        if !existing.iter().any(|c| c.uri == citation.uri) {
            existing.push(citation.clone());
            added += 1;
        }
    }
    added
}
