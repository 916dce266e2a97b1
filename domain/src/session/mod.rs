//! Session domain
//!
//! Events exchanged with the streaming generation port.

pub mod stream;

pub use stream::{Fragment, StreamEvent};
