//! Tests for the completions client against a one-shot local HTTP server.

use bridge_application::{LlmClient, LlmError};
use bridge_domain::{ConversationTurn, FunctionSchema, ToolDescriptor};
use bridge_infrastructure::openai::{OpenAiClient, OpenAiSettings};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// What the fake server saw.
#[derive(Debug)]
struct CapturedRequest {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Value,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Serve exactly one request with the given status line, extra headers and body.
async fn serve_once(
    status: &'static str,
    extra_headers: &'static str,
    body: String,
) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).await.unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((k, v)) = line.split_once(':') {
                headers.push((k.trim().to_string(), v.trim().to_string()));
            }
        }

        let length: usize = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .map(|(_, v)| v.parse().unwrap())
            .unwrap_or(0);
        let mut raw = vec![0u8; length];
        reader.read_exact(&mut raw).await.unwrap();

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
            status,
            body.len(),
            extra_headers,
            body
        );
        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: serde_json::from_slice(&raw).unwrap_or(Value::Null),
        }
    });

    (format!("http://{}/v1", addr), handle)
}

fn client(endpoint: &str) -> OpenAiClient {
    OpenAiClient::new(OpenAiSettings::new("sk-test", "gpt-4o").with_endpoint(endpoint)).unwrap()
}

fn user(text: &str) -> Vec<ConversationTurn> {
    vec![
        ConversationTurn::System {
            content: "sys".into(),
        },
        ConversationTurn::User {
            content: text.into(),
        },
    ]
}

#[tokio::test]
async fn posts_chat_completion_and_parses_text() {
    let body = json!({
        "model": "gpt-4o-2024-08-06",
        "choices": [{"message": {"role": "assistant", "content": "Hello there"}}]
    })
    .to_string();
    let (endpoint, server) = serve_once("200 OK", "", body).await;

    let completion = client(&endpoint).complete(&user("hi"), &[]).await.unwrap();
    assert_eq!(completion.text.as_deref(), Some("Hello there"));
    assert!(completion.tool_calls.is_empty());

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line, "POST /v1/chat/completions HTTP/1.1");
    assert_eq!(captured.header("authorization"), Some("Bearer sk-test"));
    assert_eq!(captured.body["model"], "gpt-4o");
    assert_eq!(captured.body["messages"][0]["role"], "system");
    assert_eq!(captured.body["messages"][1]["content"], "hi");
    assert!(captured.body.get("tools").is_none());
}

#[tokio::test]
async fn offers_tools_and_parses_tool_calls() {
    let body = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "lookup", "arguments": "{\"id\":7}"}
                }]
            }
        }]
    })
    .to_string();
    let (endpoint, server) = serve_once("200 OK", "", body).await;

    let tools = vec![FunctionSchema::from_descriptor(
        &ToolDescriptor::new("lookup").with_description("Find a record"),
    )];
    let completion = client(&endpoint)
        .complete(&user("find 7"), &tools)
        .await
        .unwrap();

    assert!(completion.has_tool_calls());
    let call = &completion.tool_calls[0];
    assert_eq!(call.id, "call_1");
    assert_eq!(call.tool_name, "lookup");
    assert_eq!(call.parse_arguments().unwrap()["id"], 7);

    let captured = server.await.unwrap();
    assert_eq!(captured.body["tool_choice"], "auto");
    assert_eq!(captured.body["tools"][0]["function"]["name"], "lookup");
    assert_eq!(
        captured.body["tools"][0]["function"]["description"],
        "Find a record"
    );
}

#[tokio::test]
async fn rate_limit_reads_retry_after() {
    let (endpoint, server) = serve_once(
        "429 Too Many Requests",
        "Retry-After: 17\r\n",
        json!({"error": {"message": "slow down"}}).to_string(),
    )
    .await;

    let err = client(&endpoint).complete(&user("hi"), &[]).await.unwrap_err();
    assert!(matches!(err, LlmError::RateLimited { retry_after_secs: 17 }));
    server.await.unwrap();
}

#[tokio::test]
async fn rate_limit_without_header_uses_default() {
    let (endpoint, server) = serve_once("429 Too Many Requests", "", "{}".to_string()).await;

    let err = client(&endpoint).complete(&user("hi"), &[]).await.unwrap_err();
    assert!(matches!(err, LlmError::RateLimited { retry_after_secs: 5 }));
    server.await.unwrap();
}

#[tokio::test]
async fn unauthorized_is_authentication_error() {
    let (endpoint, server) = serve_once(
        "401 Unauthorized",
        "",
        json!({"error": {"message": "bad key"}}).to_string(),
    )
    .await;

    let err = client(&endpoint).complete(&user("hi"), &[]).await.unwrap_err();
    match err {
        LlmError::Authentication(msg) => assert!(msg.contains("bad key")),
        other => panic!("expected Authentication, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let (endpoint, server) =
        serve_once("503 Service Unavailable", "", "overloaded".to_string()).await;

    let err = client(&endpoint).complete(&user("hi"), &[]).await.unwrap_err();
    match err {
        LlmError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "overloaded");
        }
        other => panic!("expected Api, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let (endpoint, server) = serve_once("200 OK", "", "not json".to_string()).await;

    let err = client(&endpoint).complete(&user("hi"), &[]).await.unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn empty_choices_is_invalid_response() {
    let (endpoint, server) =
        serve_once("200 OK", "", json!({"choices": []}).to_string()).await;

    let err = client(&endpoint).complete(&user("hi"), &[]).await.unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_endpoint_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}/v1", addr))
        .complete(&user("hi"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Network(_)));
}
