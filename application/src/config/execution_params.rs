//! Execution parameters — orchestration loop control.
//!
//! [`ExecutionParams`] bounds the tool-calling loop in
//! [`ProcessMessageUseCase`](crate::use_cases::process_message::ProcessMessageUseCase)
//! so a model that keeps requesting tools cannot run forever.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orchestration loop limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum number of tool-call rounds in one run.
    ///
    /// A round is one assistant turn with tool calls plus their results.
    /// The completion after the last allowed round must be a final answer.
    pub max_tool_turns: usize,
    /// Wall-clock budget for one run; `None` disables it.
    pub time_budget: Option<Duration>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_tool_turns: 10,
            time_budget: Some(Duration::from_secs(300)),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_tool_turns(mut self, max: usize) -> Self {
        self.max_tool_turns = max;
        self
    }

    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget = budget;
        self
    }
}
