//! Process connection: one spawned tool server and its JSON-RPC channel.
//!
//! [`McpConnection`] owns the child process for its lifetime and runs three
//! background tasks:
//!
//! | Task | Owns | Job |
//! |------|------|-----|
//! | reader | stdout | correlate responses, answer server requests, request a kill at EOF |
//! | stderr | stderr | re-emit diagnostics as `tool_server` log events |
//! | watcher | the [`Child`] | observe exit, or kill on request |
//!
//! Writes go through a single `Mutex`-guarded writer so concurrent requests
//! never interleave on stdin. Responses are matched to requests by id
//! through `pending_responses`, so concurrent callers cannot receive each
//! other's results.

use crate::mcp::error::{McpError, Result};
use crate::mcp::protocol::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JsonRpcResponseOut,
};
use crate::mcp::transport::{MessageKind, classify_message, read_frame, write_frame};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// How long `shutdown` waits for the killed process to be reaped.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

type PendingResponses = Arc<RwLock<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;
type SharedWriter = Arc<Mutex<Option<BufWriter<ChildStdin>>>>;

/// How to launch the tool server: an explicit argument vector, never a
/// shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables layered over the inherited environment.
    pub env: BTreeMap<String, String>,
}

impl ServerCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Human-readable command line for log messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A live JSON-RPC channel to one spawned tool server process.
pub struct McpConnection {
    /// Background reader task handle.
    _reader_handle: JoinHandle<()>,

    /// Background stderr forwarding task handle.
    _stderr_handle: Option<JoinHandle<()>>,

    /// Request-response correlation (request_id -> oneshot sender).
    pending_responses: PendingResponses,

    /// Writer (serialized writes). `None` once the session is closed.
    writer: SharedWriter,

    /// Set once stdout hits EOF, the process exits, or `shutdown` starts.
    closed: Arc<AtomicBool>,

    /// Per-request deadline.
    request_timeout: Duration,

    /// Cancelled to make the watcher task kill the child.
    kill: CancellationToken,

    /// Exit watcher; awaited by `shutdown` so the process is reaped.
    watcher: Mutex<Option<JoinHandle<()>>>,

    pid: Option<u32>,
}

impl McpConnection {
    /// Spawn the tool server and start the background tasks.
    ///
    /// `on_exit` runs exactly once, from the watcher task, after the process
    /// has terminated for any reason.
    pub fn spawn<F>(command: &ServerCommand, request_timeout: Duration, on_exit: F) -> Result<Self>
    where
        F: FnOnce(Option<ExitStatus>) + Send + 'static,
    {
        debug!("Spawning tool server: {}", command.display());

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn()?;
        let pid = child.id();

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::SpawnError(std::io::Error::other("Failed to capture stdin")))?;
        let stdout = child.stdout.take().ok_or_else(|| {
            McpError::SpawnError(std::io::Error::other("Failed to capture stdout"))
        })?;
        let stderr_handle = child.stderr.take().map(|stderr| tokio::spawn(forward_stderr(stderr)));

        let pending_responses: PendingResponses = Arc::new(RwLock::new(HashMap::new()));
        let writer: SharedWriter = Arc::new(Mutex::new(Some(BufWriter::new(stdin))));
        let closed = Arc::new(AtomicBool::new(false));

        let kill = CancellationToken::new();

        // Clone refs for the background reader task
        let pending_bg = Arc::clone(&pending_responses);
        let writer_bg = Arc::clone(&writer);
        let closed_bg = Arc::clone(&closed);
        let kill_bg = kill.clone();

        let reader_handle = tokio::spawn(async move {
            Self::reader_loop(stdout, pending_bg, writer_bg, closed_bg).await;
            // No responses can arrive any more; a process that outlives its
            // stdout is killed so the exit watcher reports the disconnect.
            kill_bg.cancel();
        });

        let kill_watcher = kill.clone();
        let closed_watcher = Arc::clone(&closed);
        let watcher = tokio::spawn(async move {
            let status = Self::watch_exit(child, kill_watcher).await;
            closed_watcher.store(true, Ordering::SeqCst);
            on_exit(status);
        });

        info!(
            "Tool server started (pid {})",
            pid.map(|p| p.to_string()).unwrap_or_else(|| "?".into())
        );

        Ok(Self {
            _reader_handle: reader_handle,
            _stderr_handle: stderr_handle,
            pending_responses,
            writer,
            closed,
            request_timeout,
            kill,
            watcher: Mutex::new(Some(watcher)),
            pid,
        })
    }

    /// Wait for the child to exit on its own, or kill it when asked.
    async fn watch_exit(mut child: Child, kill: CancellationToken) -> Option<ExitStatus> {
        let exited = tokio::select! {
            status = child.wait() => Some(status),
            _ = kill.cancelled() => None,
        };

        let status = match exited {
            Some(status) => status,
            None => {
                debug!("Killing tool server process");
                if let Err(e) = child.start_kill() {
                    debug!("Tool server kill failed: {}", e);
                }
                child.wait().await
            }
        };

        match status {
            Ok(status) => {
                info!("Tool server process exited ({})", status);
                Some(status)
            }
            Err(e) => {
                warn!("Failed to reap tool server process: {}", e);
                None
            }
        }
    }

    /// Background reader loop — single owner of the child's stdout.
    ///
    /// Each incoming message is classified by [`classify_message`] and
    /// dispatched:
    ///
    /// - **Response** → `pending_responses` oneshot (request correlation)
    /// - **IncomingRequest** → answered directly (`ping` → `{}`, anything
    ///   else → method not found)
    /// - **Notification** → logged
    ///
    /// When the loop exits, all pending senders are dropped so waiting
    /// callers observe [`McpError::TransportClosed`].
    async fn reader_loop(
        stdout: ChildStdout,
        pending_responses: PendingResponses,
        writer: SharedWriter,
        closed: Arc<AtomicBool>,
    ) {
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();

        loop {
            match read_frame(&mut reader, &mut line).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Reader loop: tool server closed stdout");
                    break;
                }
                Err(e) => {
                    warn!("Reader loop: read error: {}", e);
                    break;
                }
            }

            let frame = line.trim();
            trace!("Tool server sent: {}", frame);

            let json_value: Value = match serde_json::from_str(frame) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Reader loop: ignoring non-JSON output: {} ({})", frame, e);
                    continue;
                }
            };

            match classify_message(&json_value) {
                MessageKind::Response => {
                    let response: JsonRpcResponse = match serde_json::from_value(json_value) {
                        Ok(r) => r,
                        Err(e) => {
                            warn!("Reader loop: failed to parse response: {}", e);
                            continue;
                        }
                    };
                    let Some(id) = response.id else {
                        warn!("Reader loop: response without usable id: {:?}", response.error);
                        continue;
                    };
                    let sender = {
                        let mut pending = pending_responses.write().await;
                        pending.remove(&id)
                    };
                    if let Some(tx) = sender {
                        let _ = tx.send(response);
                    } else {
                        debug!("Reader loop: no pending receiver for response id={}", id);
                    }
                }

                MessageKind::IncomingRequest { id } => {
                    let method = json_value
                        .get("method")
                        .and_then(|m| m.as_str())
                        .unwrap_or_default();
                    let reply = if method == "ping" {
                        JsonRpcResponseOut::success(id, Value::Object(Default::default()))
                    } else {
                        debug!("Reader loop: rejecting server request method={}", method);
                        JsonRpcResponseOut::method_not_found(id, method)
                    };
                    if let Some(w) = writer.lock().await.as_mut()
                        && let Err(e) = write_frame(w, &reply).await
                    {
                        warn!("Reader loop: failed to answer server request: {}", e);
                    }
                }

                MessageKind::Notification => {
                    let method = json_value
                        .get("method")
                        .and_then(|m| m.as_str())
                        .unwrap_or_default();
                    debug!("Tool server notification: {}", method);
                }
            }
        }

        // Reader ended — drop all senders so receivers get an error
        closed.store(true, Ordering::SeqCst);
        let mut pending = pending_responses.write().await;
        if !pending.is_empty() {
            debug!("Reader loop: failing {} pending requests", pending.len());
        }
        pending.clear();
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// `true` once the process is gone or the session was closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a JSON-RPC request and wait for the correlated response.
    ///
    /// Returns the `result` member; a JSON-RPC error object becomes
    /// [`McpError::RpcError`].
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        if self.is_closed() {
            return Err(McpError::TransportClosed);
        }

        let request = JsonRpcRequest::new(method, params);
        let request_id = request.id;
        let (tx, rx) = oneshot::channel();

        {
            let mut pending = self.pending_responses.write().await;
            pending.insert(request_id, tx);
        }

        // The reader sets `closed` before draining the table, so an entry
        // inserted after the drain is caught here.
        if self.is_closed() {
            self.forget(request_id).await;
            return Err(McpError::TransportClosed);
        }

        // One deadline covers writing the request and waiting for its response
        let deadline = Instant::now() + self.request_timeout;

        if let Err(e) = self.send_by(&request, method, deadline).await {
            // Clean up the pending entry to prevent leaks
            self.forget(request_id).await;
            return Err(e);
        }

        let response = match tokio::time::timeout_at(deadline, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(McpError::TransportClosed),
            Err(_) => {
                self.forget(request_id).await;
                return Err(McpError::Timeout {
                    method: method.to_string(),
                    timeout: self.request_timeout,
                });
            }
        };

        if let Some(error) = response.error {
            return Err(McpError::RpcError {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    /// [`request`](Self::request) and decode the result.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T> {
        let result = self.request(method, params).await?;
        serde_json::from_value(result).map_err(|e| {
            McpError::UnexpectedResponse(format!("malformed '{}' result: {}", method, e))
        })
    }

    /// Send a notification (no response expected).
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        let deadline = Instant::now() + self.request_timeout;
        self.send_by(&JsonRpcNotification::new(method, params), method, deadline)
            .await
    }

    /// Write one frame, giving up at `deadline`.
    ///
    /// A write cut short leaves a partial frame on stdin, so the session is
    /// closed and the process killed.
    async fn send_by<T: serde::Serialize>(
        &self,
        message: &T,
        method: &str,
        deadline: Instant,
    ) -> Result<()> {
        match tokio::time::timeout_at(deadline, self.send(message)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Tool server is not reading its input ('{}' write timed out); closing",
                    method
                );
                self.closed.store(true, Ordering::SeqCst);
                self.request_kill();
                Err(McpError::Timeout {
                    method: method.to_string(),
                    timeout: self.request_timeout,
                })
            }
        }
    }

    async fn send<T: serde::Serialize>(&self, message: &T) -> Result<()> {
        let mut writer = self.writer.lock().await;
        let writer = writer.as_mut().ok_or(McpError::TransportClosed)?;
        write_frame(writer, message).await
    }

    async fn forget(&self, request_id: u64) {
        let mut pending = self.pending_responses.write().await;
        pending.remove(&request_id);
    }

    /// Close the session, then kill the process and wait for it to exit.
    ///
    /// Never fails; problems are logged.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);

        // Closing stdin ends the session for stdio servers
        if let Some(mut writer) = self.writer.lock().await.take()
            && let Err(e) = writer.shutdown().await
        {
            debug!("Closing tool server stdin failed: {}", e);
        }

        self.request_kill();

        let watcher = self.watcher.lock().await.take();
        if let Some(handle) = watcher
            && tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await.is_err()
        {
            warn!("Tool server did not exit within {:?}", SHUTDOWN_TIMEOUT);
        }
    }

    fn request_kill(&self) {
        self.kill.cancel();
    }
}

impl Drop for McpConnection {
    fn drop(&mut self) {
        debug!("McpConnection dropping, killing tool server process");
        self.request_kill();
    }
}

/// Re-emit every stderr line as a `tool_server` log event.
async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => info!(target: "tool_server", "{}", line),
            Ok(None) => break,
            Err(e) => {
                debug!("Tool server stderr read failed: {}", e);
                break;
            }
        }
    }
}
