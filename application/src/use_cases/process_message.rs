//! Process Message use case.
//!
//! Turns one user message into one final answer by letting the LLM call
//! tools on the tool server until it answers in plain text.
//!
//! ```text
//! list_tools ──► complete ──► text? ──────────────────────────► answer
//!                   ▲            │ tool calls
//!                   │            ▼
//!                   └──── call_tool (in order, one result per call)
//! ```
//!
//! The conversation lives only for the duration of one [`execute`] call.
//! Tool failures are handed back to the LLM as text; only discovery
//! failures, LLM failures and an exhausted budget end the run with an error.
//!
//! [`execute`]: ProcessMessageUseCase::execute

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_client::{LlmClient, LlmError};
use crate::ports::tool_gateway::{GatewayError, ToolGateway};
use crate::use_cases::tool_helpers::{
    extract_tool_text, function_schemas, tool_args_preview, unique_calls,
};
use bridge_domain::util::log_preview;
use bridge_domain::{
    Completion, Conversation, DEFAULT_SYSTEM_PROMPT, FunctionSchema,
    ToolCallRequest, ToolCallResult,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Answer returned when the final completion carries no text.
pub const FALLBACK_ANSWER: &str = "I apologize, but I could not generate a response.";

/// Which limit stopped a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetLimit {
    ToolTurns { max: usize },
    WallClock { limit: Duration },
}

impl std::fmt::Display for BudgetLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetLimit::ToolTurns { max } => write!(f, "more than {} tool turns", max),
            BudgetLimit::WallClock { limit } => {
                write!(f, "time budget of {}s elapsed", limit.as_secs())
            }
        }
    }
}

/// Errors that end a run without a final answer.
#[derive(Error, Debug)]
pub enum ProcessMessageError {
    #[error("Tool discovery failed: {0}")]
    ToolDiscoveryFailed(#[source] GatewayError),

    /// Passed through unchanged from the LLM client.
    #[error(transparent)]
    LlmRequestFailed(#[from] LlmError),

    #[error("Orchestration budget exceeded: {0}")]
    OrchestrationBudgetExceeded(BudgetLimit),
}

/// Use case for answering one user message with tool access.
pub struct ProcessMessageUseCase {
    llm: Arc<dyn LlmClient>,
    gateway: Arc<dyn ToolGateway>,
    conversation_logger: Arc<dyn ConversationLogger>,
    params: ExecutionParams,
    system_prompt: String,
}

impl Clone for ProcessMessageUseCase {
    fn clone(&self) -> Self {
        Self {
            llm: self.llm.clone(),
            gateway: self.gateway.clone(),
            conversation_logger: self.conversation_logger.clone(),
            params: self.params.clone(),
            system_prompt: self.system_prompt.clone(),
        }
    }
}

impl ProcessMessageUseCase {
    pub fn new(llm: Arc<dyn LlmClient>, gateway: Arc<dyn ToolGateway>) -> Self {
        Self {
            llm,
            gateway,
            conversation_logger: Arc::new(NoConversationLogger),
            params: ExecutionParams::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn gateway(&self) -> &Arc<dyn ToolGateway> {
        &self.gateway
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    /// Run the tool-calling loop for one user message.
    pub async fn execute(&self, user_text: &str) -> Result<String, ProcessMessageError> {
        let started = Instant::now();
        info!("Processing message: {}", log_preview(user_text, 100));

        self.conversation_logger.log(ConversationEvent::new(
            "user_message",
            serde_json::json!({ "bytes": user_text.len(), "text": user_text }),
        ));

        let descriptors = self
            .within_budget(started, self.gateway.list_tools())
            .await?
            .map_err(ProcessMessageError::ToolDiscoveryFailed)?;
        let tools = function_schemas(&descriptors);

        debug!(
            "Offering {} tools to model {}",
            tools.len(),
            self.llm.model()
        );

        let mut conversation = Conversation::new(&self.system_prompt, user_text);
        let max_turns = self.params.max_tool_turns;
        let mut turn_count = 0;

        loop {
            let completion = self.request_completion(started, &conversation, &tools).await?;

            if !completion.has_tool_calls() {
                let answer = completion
                    .non_empty_text()
                    .unwrap_or(FALLBACK_ANSWER)
                    .to_string();

                info!("Message processed in {} tool turns", turn_count);
                self.conversation_logger.log(ConversationEvent::new(
                    "final_answer",
                    serde_json::json!({
                        "tool_turns": turn_count,
                        "bytes": answer.len(),
                        "text": answer,
                    }),
                ));
                return Ok(answer);
            }

            turn_count += 1;
            if turn_count > max_turns {
                warn!("Tool loop exceeded max_tool_turns ({})", max_turns);
                return Err(ProcessMessageError::OrchestrationBudgetExceeded(
                    BudgetLimit::ToolTurns { max: max_turns },
                ));
            }

            // Repeated ids are dropped before anything runs
            let calls = unique_calls(&completion.tool_calls);

            debug!(
                "Tool turn {}/{}: resolving {} tool calls",
                turn_count,
                max_turns,
                calls.len()
            );

            // Calls run one at a time in the order the model listed them.
            let mut answered = Vec::with_capacity(calls.len());
            for call in calls {
                let result = self.resolve_call(started, call).await?;
                answered.push((call.clone(), result.content));
            }
            conversation.push_tool_round(completion.text.clone(), answered);
        }
    }

    async fn request_completion(
        &self,
        started: Instant,
        conversation: &Conversation,
        tools: &[FunctionSchema],
    ) -> Result<Completion, ProcessMessageError> {
        let completion = self
            .within_budget(started, self.llm.complete(conversation.turns(), tools))
            .await??;

        self.conversation_logger.log(ConversationEvent::new(
            "llm_response",
            serde_json::json!({
                "model": completion.model.as_deref().unwrap_or(self.llm.model()),
                "text": completion.text,
                "tool_calls": completion
                    .tool_calls
                    .iter()
                    .map(|c| c.tool_name.as_str())
                    .collect::<Vec<_>>(),
            }),
        ));

        Ok(completion)
    }

    /// Produce exactly one result for a requested call.
    ///
    /// Every failure short of an exhausted budget becomes an error text for
    /// the LLM.
    async fn resolve_call(
        &self,
        started: Instant,
        call: &ToolCallRequest,
    ) -> Result<ToolCallResult, ProcessMessageError> {
        if !call.is_function() {
            warn!(
                "Skipping tool call '{}' of unsupported type '{}'",
                call.id, call.kind
            );
            return Ok(ToolCallResult::new(
                &call.id,
                format!("Skipped: unsupported tool call type '{}'", call.kind),
            ));
        }

        let arguments = match call.parse_arguments() {
            Ok(arguments) => arguments,
            Err(e) => {
                warn!("Invalid arguments for tool '{}': {}", call.tool_name, e);
                return Ok(ToolCallResult::error(
                    &call.id,
                    format!("invalid arguments for '{}': {}", call.tool_name, e),
                ));
            }
        };

        info!(
            "Calling tool {} {}",
            call.tool_name,
            tool_args_preview(&arguments)
        );
        self.conversation_logger.log(ConversationEvent::new(
            "tool_call",
            serde_json::json!({
                "id": call.id,
                "tool": call.tool_name,
                "arguments": arguments,
            }),
        ));

        let outcome = self
            .within_budget(started, self.gateway.call_tool(&call.tool_name, arguments))
            .await?;

        let (result, is_error) = match outcome {
            Ok(output) => {
                if output.is_error {
                    debug!("Tool '{}' reported an error result", call.tool_name);
                }
                (
                    ToolCallResult::new(&call.id, extract_tool_text(&output)),
                    output.is_error,
                )
            }
            Err(e) => {
                warn!("Tool '{}' failed: {}", call.tool_name, e);
                (ToolCallResult::error(&call.id, &e), true)
            }
        };

        self.conversation_logger.log(ConversationEvent::new(
            "tool_result",
            serde_json::json!({
                "id": call.id,
                "tool": call.tool_name,
                "is_error": is_error,
                "bytes": result.content.len(),
                "text": result.content,
            }),
        ));

        Ok(result)
    }

    /// Await `fut` within the remaining wall-clock budget.
    async fn within_budget<F: Future>(
        &self,
        started: Instant,
        fut: F,
    ) -> Result<F::Output, ProcessMessageError> {
        let Some(limit) = self.params.time_budget else {
            return Ok(fut.await);
        };

        let remaining = limit
            .checked_sub(started.elapsed())
            .filter(|d| !d.is_zero())
            .ok_or_else(|| self.time_exceeded(limit))?;

        tokio::time::timeout(remaining, fut)
            .await
            .map_err(|_| self.time_exceeded(limit))
    }

    fn time_exceeded(&self, limit: Duration) -> ProcessMessageError {
        warn!("Run exceeded time budget of {:?}", limit);
        ProcessMessageError::OrchestrationBudgetExceeded(BudgetLimit::WallClock { limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_domain::{
        ConnectionState, ConversationTurn, ToolCallKind, ToolContent, ToolDescriptor, ToolOutput,
    };
    use serde_json::{Map, Value};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    /// Replays scripted completions and records every request it receives.
    struct ScriptedLlm {
        responses: Mutex<VecDeque<Result<Completion, LlmError>>>,
        requests: Mutex<Vec<(Vec<ConversationTurn>, Vec<FunctionSchema>)>>,
        delay: Option<Duration>,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<Result<Completion, LlmError>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from(responses)),
                requests: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, idx: usize) -> (Vec<ConversationTurn>, Vec<FunctionSchema>) {
            self.requests.lock().unwrap()[idx].clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(
            &self,
            turns: &[ConversationTurn],
            tools: &[FunctionSchema],
        ) -> Result<Completion, LlmError> {
            self.requests
                .lock()
                .unwrap()
                .push((turns.to_vec(), tools.to_vec()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::InvalidResponse("No more responses".into())))
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    /// Serves a fixed tool list and records every invocation.
    struct RecordingGateway {
        tools: Vec<ToolDescriptor>,
        list_error: bool,
        outcomes: HashMap<String, Result<ToolOutput, String>>,
        calls: Mutex<Vec<(String, Map<String, Value>)>>,
    }

    impl RecordingGateway {
        fn new(tools: &[&str]) -> Self {
            Self {
                tools: tools.iter().map(|n| ToolDescriptor::new(*n)).collect(),
                list_error: false,
                outcomes: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_discovery() -> Self {
            Self {
                list_error: true,
                ..Self::new(&[])
            }
        }

        fn with_text(mut self, tool: &str, text: &str) -> Self {
            self.outcomes.insert(
                tool.to_string(),
                Ok(ToolOutput::from_blocks(vec![ToolContent::text(text)])),
            );
            self
        }

        fn with_failure(mut self, tool: &str, cause: &str) -> Self {
            self.outcomes.insert(tool.to_string(), Err(cause.to_string()));
            self
        }

        fn call_names(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(name, _)| name.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ToolGateway for RecordingGateway {
        async fn connect(&self) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, GatewayError> {
            if self.list_error {
                return Err(GatewayError::NotConnected);
            }
            Ok(self.tools.clone())
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: Map<String, Value>,
        ) -> Result<ToolOutput, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments));
            match self.outcomes.get(name) {
                Some(Ok(output)) => Ok(output.clone()),
                Some(Err(cause)) => Err(GatewayError::InvocationFailed(cause.clone())),
                None => Ok(ToolOutput::default()),
            }
        }

        async fn disconnect(&self) {}

        fn state(&self) -> ConnectionState {
            ConnectionState::Connected
        }
    }

    /// Collects event types for assertions.
    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn tool_turn(calls: &[(&str, &str, &str)]) -> Result<Completion, LlmError> {
        Ok(Completion::from_tool_calls(
            calls
                .iter()
                .map(|(id, name, args)| ToolCallRequest::function(*id, *name, *args))
                .collect(),
        ))
    }

    fn text_turn(text: &str) -> Result<Completion, LlmError> {
        Ok(Completion::from_text(text))
    }

    fn use_case(llm: &Arc<ScriptedLlm>, gateway: &Arc<RecordingGateway>) -> ProcessMessageUseCase {
        ProcessMessageUseCase::new(llm.clone(), gateway.clone())
    }

    fn tool_results(turns: &[ConversationTurn]) -> Vec<ToolCallResult> {
        turns
            .iter()
            .filter_map(ConversationTurn::as_tool_result)
            .cloned()
            .collect()
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_text_answer_needs_one_completion() {
        let llm = Arc::new(ScriptedLlm::new(vec![text_turn("Hello there.")]));
        let gateway = Arc::new(RecordingGateway::new(&["search"]));

        let answer = use_case(&llm, &gateway).execute("hi").await.unwrap();

        assert_eq!(answer, "Hello there.");
        assert_eq!(llm.request_count(), 1);
        assert!(gateway.call_names().is_empty());

        let (turns, tools) = llm.request(0);
        assert_eq!(turns.len(), 2);
        assert_eq!(
            turns[0],
            ConversationTurn::System {
                content: DEFAULT_SYSTEM_PROMPT.to_string()
            }
        );
        assert_eq!(
            turns[1],
            ConversationTurn::User {
                content: "hi".to_string()
            }
        );
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "search");
    }

    #[tokio::test]
    async fn test_single_tool_round_then_answer() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_turn(&[("call_1", "search", r#"{"query":"home"}"#)]),
            text_turn("Found the home page."),
        ]));
        let gateway = Arc::new(RecordingGateway::new(&["search"]).with_text("search", "/home"));

        let answer = use_case(&llm, &gateway)
            .execute("where is home?")
            .await
            .unwrap();

        assert_eq!(answer, "Found the home page.");
        assert_eq!(llm.request_count(), 2);
        assert_eq!(gateway.call_names(), vec!["search"]);
        assert_eq!(gateway.calls.lock().unwrap()[0].1["query"], "home");

        let (turns, _) = llm.request(1);
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].tool_calls()[0].id, "call_1");
        assert_eq!(
            tool_results(&turns),
            vec![ToolCallResult::new("call_1", "/home")]
        );
    }

    #[tokio::test]
    async fn test_failed_call_does_not_abort_siblings() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_turn(&[("a", "broken", "{}"), ("b", "search", "{}")]),
            text_turn("Partial success."),
        ]));
        let gateway = Arc::new(
            RecordingGateway::new(&["broken", "search"])
                .with_failure("broken", "server crashed")
                .with_text("search", "ok"),
        );

        let answer = use_case(&llm, &gateway).execute("go").await.unwrap();

        assert_eq!(answer, "Partial success.");
        assert_eq!(gateway.call_names(), vec!["broken", "search"]);

        let results = tool_results(&llm.request(1).0);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].correlation_id, "a");
        assert!(results[0].content.starts_with("Error executing tool: "));
        assert!(results[0].content.contains("server crashed"));
        assert_eq!(results[1], ToolCallResult::new("b", "ok"));
    }

    #[tokio::test]
    async fn test_every_call_gets_exactly_one_result() {
        let mut skipped = ToolCallRequest::function("c", "search", "{}");
        skipped.kind = ToolCallKind::Other("custom".to_string());

        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(Completion::from_tool_calls(vec![
                ToolCallRequest::function("a", "search", "{}"),
                ToolCallRequest::function("b", "search", "{not json"),
                skipped,
            ])),
            text_turn("done"),
        ]));
        let gateway = Arc::new(RecordingGateway::new(&["search"]));

        use_case(&llm, &gateway).execute("go").await.unwrap();

        // Only the well-formed function call reaches the server
        assert_eq!(gateway.call_names(), vec!["search"]);

        let results = tool_results(&llm.request(1).0);
        let ids: Vec<_> = results.iter().map(|r| r.correlation_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(results[0].content, "Operation completed successfully.");
        assert!(results[1].content.starts_with("Error executing tool: invalid arguments"));
        assert_eq!(
            results[2].content,
            "Skipped: unsupported tool call type 'custom'"
        );
    }

    #[tokio::test]
    async fn test_repeated_call_id_runs_once_and_run_continues() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_turn(&[("dup", "search", "{}"), ("dup", "search", "{}")]),
            text_turn("done"),
        ]));
        let gateway = Arc::new(RecordingGateway::new(&["search"]).with_text("search", "hit"));

        let answer = use_case(&llm, &gateway).execute("go").await.unwrap();

        assert_eq!(answer, "done");
        assert_eq!(gateway.call_names(), vec!["search"]);
        assert_eq!(llm.request_count(), 2);

        let (turns, _) = llm.request(1);
        assert_eq!(turns[2].tool_calls().len(), 1);
        assert_eq!(tool_results(&turns), vec![ToolCallResult::new("dup", "hit")]);
    }

    #[tokio::test]
    async fn test_empty_final_text_uses_fallback() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(Completion {
            text: Some(String::new()),
            ..Completion::default()
        })]));
        let gateway = Arc::new(RecordingGateway::new(&[]));

        let answer = use_case(&llm, &gateway).execute("hi").await.unwrap();
        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_discovery_failure_skips_llm() {
        let llm = Arc::new(ScriptedLlm::new(vec![text_turn("unused")]));
        let gateway = Arc::new(RecordingGateway::failing_discovery());

        let err = use_case(&llm, &gateway).execute("hi").await.unwrap_err();

        assert!(matches!(
            err,
            ProcessMessageError::ToolDiscoveryFailed(GatewayError::NotConnected)
        ));
        assert_eq!(llm.request_count(), 0);
    }

    #[tokio::test]
    async fn test_llm_error_propagates_unchanged() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_turn(&[("a", "search", "{}")]),
            Err(LlmError::RateLimited {
                retry_after_secs: 7,
            }),
        ]));
        let gateway = Arc::new(RecordingGateway::new(&["search"]));

        let err = use_case(&llm, &gateway).execute("hi").await.unwrap_err();

        assert_eq!(err.to_string(), "Rate limited (retry after 7s)");
        assert!(matches!(
            err,
            ProcessMessageError::LlmRequestFailed(LlmError::RateLimited {
                retry_after_secs: 7
            })
        ));
    }

    #[tokio::test]
    async fn test_tool_turn_limit() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_turn(&[("1", "search", "{}")]),
            tool_turn(&[("2", "search", "{}")]),
            tool_turn(&[("3", "search", "{}")]),
            text_turn("never reached"),
        ]));
        let gateway = Arc::new(RecordingGateway::new(&["search"]));
        let use_case = use_case(&llm, &gateway)
            .with_params(ExecutionParams::default().with_max_tool_turns(2));

        let err = use_case.execute("loop").await.unwrap_err();

        assert!(matches!(
            err,
            ProcessMessageError::OrchestrationBudgetExceeded(BudgetLimit::ToolTurns { max: 2 })
        ));
        assert_eq!(gateway.call_names().len(), 2);
        assert_eq!(llm.request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_budget() {
        let llm = Arc::new(
            ScriptedLlm::new(vec![text_turn("too late")]).with_delay(Duration::from_secs(30)),
        );
        let gateway = Arc::new(RecordingGateway::new(&[]));
        let use_case = use_case(&llm, &gateway).with_params(
            ExecutionParams::default().with_time_budget(Some(Duration::from_secs(5))),
        );

        let err = use_case.execute("slow").await.unwrap_err();

        assert!(matches!(
            err,
            ProcessMessageError::OrchestrationBudgetExceeded(BudgetLimit::WallClock { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_time_budget_waits() {
        let llm = Arc::new(
            ScriptedLlm::new(vec![text_turn("eventually")]).with_delay(Duration::from_secs(600)),
        );
        let gateway = Arc::new(RecordingGateway::new(&[]));
        let use_case = use_case(&llm, &gateway)
            .with_params(ExecutionParams::default().with_time_budget(None));

        assert_eq!(use_case.execute("slow").await.unwrap(), "eventually");
    }

    #[tokio::test]
    async fn test_duplicate_tools_offered_once() {
        let llm = Arc::new(ScriptedLlm::new(vec![text_turn("ok")]));
        let gateway = Arc::new(RecordingGateway::new(&["search", "search", "replace"]));

        use_case(&llm, &gateway).execute("hi").await.unwrap();

        let names: Vec<_> = llm.request(0).1.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["search", "replace"]);
    }

    #[tokio::test]
    async fn test_custom_system_prompt_and_events() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_turn(&[("a", "search", r#"{"path":"/x"}"#)]),
            text_turn("done"),
        ]));
        let gateway = Arc::new(RecordingGateway::new(&["search"]));
        let logger = Arc::new(RecordingLogger::default());
        let use_case = use_case(&llm, &gateway)
            .with_system_prompt("be terse")
            .with_conversation_logger(logger.clone());

        use_case.execute("hi").await.unwrap();

        assert_eq!(
            llm.request(0).0[0],
            ConversationTurn::System {
                content: "be terse".to_string()
            }
        );
        assert_eq!(
            *logger.events.lock().unwrap(),
            vec![
                "user_message",
                "llm_response",
                "tool_call",
                "tool_result",
                "llm_response",
                "final_answer"
            ]
        );
    }

    #[test]
    fn test_budget_limit_display() {
        let err = ProcessMessageError::OrchestrationBudgetExceeded(BudgetLimit::ToolTurns {
            max: 10,
        });
        assert_eq!(
            err.to_string(),
            "Orchestration budget exceeded: more than 10 tool turns"
        );

        let limit = BudgetLimit::WallClock {
            limit: Duration::from_secs(300),
        };
        assert_eq!(limit.to_string(), "time budget of 300s elapsed");
    }
}
