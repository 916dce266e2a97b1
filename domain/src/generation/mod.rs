//! Generation domain
//!
//! Parameters of a single streaming generation call: the behaviour mode and
//! the focus tags.

pub mod focus;
pub mod mode;

pub use focus::Focus;
pub use mode::GenerationMode;
