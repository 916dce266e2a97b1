//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] — domain-level errors
//! - [`string`] — text helpers for previews and log lines

pub mod error;
pub mod string;
