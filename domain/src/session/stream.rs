//! Streaming events for generation calls.
//!
//! [`StreamEvent`] represents individual events in a streaming generation
//! response. Text arrives as [`Fragment`]s; a fragment may also carry the
//! cumulative citation list known so far.

use crate::agent::value_objects::Citation;

/// One incremental piece of a streamed generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    /// Text to append, if any
    pub text: Option<String>,
    /// Cumulative citations, if this fragment updated them
    pub citations: Option<Vec<Citation>>,
}

impl Fragment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            citations: None,
        }
    }

    pub fn citations(citations: Vec<Citation>) -> Self {
        Self {
            text: None,
            citations: Some(citations),
        }
    }

    /// Neither text nor citations.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(str::is_empty)
            && self.citations.as_ref().is_none_or(Vec::is_empty)
    }
}

/// An event in a streaming generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// An incremental fragment.
    Fragment(Fragment),
    /// The stream finished cleanly.
    Completed,
    /// The stream failed; no further events follow.
    Error(String),
}

impl StreamEvent {
    /// Returns the fragment text, if this event carries any.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Fragment(f) => f.text.as_deref(),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed | StreamEvent::Error(_))
    }
}
