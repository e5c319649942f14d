//! Application-level configuration.
//!
//! - [`ExecutionParams`] — orchestration loop limits (tool turns, time budget)

pub mod execution_params;

pub use execution_params::ExecutionParams;
