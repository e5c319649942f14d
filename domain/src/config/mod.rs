//! Configuration-related domain types.

pub mod validation;

pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
