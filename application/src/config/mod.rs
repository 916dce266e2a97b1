//! Application-level configuration.
//!
//! - [`ExecutionParams`] — step loop control (mode, grounding, channel size)

pub mod execution_params;

pub use execution_params::ExecutionParams;
