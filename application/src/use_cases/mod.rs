//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod process_message;
pub mod tool_helpers;
