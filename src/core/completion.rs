//! Turns one user utterance into one reply from the remote completion API.
//!
//! [`CompletionClient::complete`] never fails: a missing credential, a
//! transport problem or an unusable response all come back as reply text so
//! the caller can append them to the transcript like any other answer.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::{ChatCompletionResponse, ChatMessage, ChatRequest};
use crate::core::credential::{Credential, MISSING_CREDENTIAL_REPLY};
use crate::core::persona::PersonaConfig;
use crate::utils::url::construct_api_url;

pub const ERROR_REPLY_PREFIX: &str = "Error communicating with OpenAI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    EmptyPrompt,
    /// The request never produced an HTTP response.
    Transport(String),
    /// The API answered with a non-success status.
    Api { status: String, message: String },
    MalformedResponse(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::EmptyPrompt => write!(f, "prompt is empty"),
            CompletionError::Transport(detail) => write!(f, "{detail}"),
            CompletionError::Api { status, message } => write!(f, "HTTP {status}: {message}"),
            CompletionError::MalformedResponse(detail) => {
                write!(f, "malformed response: {detail}")
            }
        }
    }
}

impl Error for CompletionError {}

/// Sends a fully built request and returns the generated text.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(&self, api_key: &str, request: &ChatRequest) -> Result<String, CompletionError>;
}

/// `chat/completions` over HTTP with bearer authentication.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        construct_api_url(&self.base_url, "chat/completions")
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(&self, api_key: &str, request: &ChatRequest) -> Result<String, CompletionError> {
        let url = self.endpoint();
        debug!(%url, model = %request.model, "sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|err| CompletionError::Transport(describe_error(&err)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| CompletionError::Transport(describe_error(&err)))?;

        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.to_string(),
                message: summarize_error_body(&body),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|err| CompletionError::MalformedResponse(err.to_string()))?;
        parsed.into_first_content().ok_or_else(|| {
            CompletionError::MalformedResponse("no message content in response".to_string())
        })
    }
}

/// Flattens an error and its sources into one line; reqwest keeps the
/// useful part (connection refused, dns failure) in the source chain.
fn describe_error(err: &dyn Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let inner_text = inner.to_string();
        if !text.contains(&inner_text) {
            text.push_str(": ");
            text.push_str(&inner_text);
        }
        source = inner.source();
    }
    text
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

/// Best one-line description of an error body: the API's own message when
/// the body is JSON, the trimmed body otherwise.
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            return summary;
        }
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stateless client: only the latest user turn is sent, so the remote model
/// has no memory of earlier turns.
#[derive(Clone)]
pub struct CompletionClient {
    persona: PersonaConfig,
    credential: Credential,
    transport: Arc<dyn CompletionTransport>,
}

impl CompletionClient {
    pub fn new(
        persona: PersonaConfig,
        credential: Credential,
        transport: Arc<dyn CompletionTransport>,
    ) -> Self {
        Self {
            persona,
            credential,
            transport,
        }
    }

    pub fn over_http(persona: PersonaConfig, credential: Credential, base_url: &str) -> Self {
        Self::new(persona, credential, Arc::new(HttpTransport::new(base_url)))
    }

    pub fn persona(&self) -> &PersonaConfig {
        &self.persona
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn build_request(&self, user_text: &str) -> Result<ChatRequest, CompletionError> {
        if user_text.trim().is_empty() {
            return Err(CompletionError::EmptyPrompt);
        }

        Ok(ChatRequest {
            model: self.persona.model().to_string(),
            messages: vec![self.persona.system_message(), ChatMessage::user(user_text)],
            max_tokens: self.persona.max_output_tokens(),
        })
    }

    /// Reply text for `user_text`. Every failure is rendered into the
    /// returned string.
    pub async fn complete(&self, user_text: &str) -> String {
        let Some(api_key) = self.credential.api_key() else {
            debug!("no API key configured; skipping remote call");
            return MISSING_CREDENTIAL_REPLY.to_string();
        };

        let result = match self.build_request(user_text) {
            Ok(request) => self.transport.send(api_key, &request).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "completion request failed");
                format!("{ERROR_REPLY_PREFIX}: {err}")
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted transport that records every request it receives.
    pub(crate) struct MockTransport {
        replies: Mutex<Vec<Result<String, CompletionError>>>,
        pub(crate) calls: AtomicUsize,
        pub(crate) requests: Mutex<Vec<ChatRequest>>,
    }

    impl MockTransport {
        pub(crate) fn scripted(replies: Vec<Result<String, CompletionError>>) -> Arc<Self> {
            let mut replies = replies;
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionTransport for MockTransport {
        async fn send(
            &self,
            _api_key: &str,
            request: &ChatRequest,
        ) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("default reply".to_string()))
        }
    }

    pub(crate) fn client_with(
        transport: Arc<MockTransport>,
        credential: Credential,
    ) -> CompletionClient {
        CompletionClient::new(PersonaConfig::default(), credential, transport)
    }

    pub(crate) fn test_credential() -> Credential {
        Credential::from_value(Some("sk-test".to_string()))
    }

    #[tokio::test]
    async fn successful_reply_is_returned_verbatim() {
        let transport = MockTransport::scripted(vec![Ok("  Hi there!\n".to_string())]);
        let client = client_with(transport.clone(), test_credential());

        assert_eq!(client.complete("Hello").await, "  Hi there!\n");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn request_carries_persona_and_latest_turn_only() {
        let transport = MockTransport::scripted(vec![Ok("one".into()), Ok("two".into())]);
        let client = client_with(transport.clone(), test_credential());

        client.complete("first").await;
        client.complete("second").await;

        let requests = transport.requests.lock().unwrap();
        let last = requests.last().expect("request recorded");
        assert_eq!(last.model, "gpt-3.5-turbo");
        assert_eq!(last.max_tokens, 150);
        assert_eq!(last.messages.len(), 2);
        assert_eq!(last.messages[0].role, "system");
        assert_eq!(last.messages[1], ChatMessage::user("second"));
    }

    #[tokio::test]
    async fn missing_credential_skips_the_remote_call() {
        let transport = MockTransport::scripted(vec![]);
        let client = client_with(transport.clone(), Credential::missing());

        assert_eq!(client.complete("Hello").await, MISSING_CREDENTIAL_REPLY);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn transport_errors_become_reply_text() {
        let transport = MockTransport::scripted(vec![Err(CompletionError::Transport(
            "connection refused".to_string(),
        ))]);
        let client = client_with(transport, test_credential());

        let reply = client.complete("Hello").await;
        assert_eq!(reply, "Error communicating with OpenAI: connection refused");
    }

    #[tokio::test]
    async fn empty_prompt_is_reported_without_calling() {
        let transport = MockTransport::scripted(vec![]);
        let client = client_with(transport.clone(), test_credential());

        let reply = client.complete("   ").await;
        assert!(reply.starts_with(ERROR_REPLY_PREFIX));
        assert!(reply.contains("prompt is empty"));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn api_errors_display_status_and_message() {
        let err = CompletionError::Api {
            status: "401 Unauthorized".to_string(),
            message: "Incorrect API key provided".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401 Unauthorized: Incorrect API key provided");
    }

    #[test]
    fn summarize_error_body_prefers_api_message() {
        let raw = r#"{"error":{"message":"Rate limit   reached","type":"requests"}}"#;
        assert_eq!(summarize_error_body(raw), "Rate limit reached");
        assert_eq!(summarize_error_body(r#"{"error":"bad key"}"#), "bad key");
        assert_eq!(summarize_error_body(r#"{"message":"nope"}"#), "nope");
    }

    #[test]
    fn summarize_error_body_falls_back_to_text() {
        assert_eq!(summarize_error_body("  upstream\n timeout "), "upstream timeout");
        assert_eq!(summarize_error_body(""), "<empty body>");
        assert_eq!(
            summarize_error_body(r#"{"status":"failed"}"#),
            r#"{"status":"failed"}"#
        );
    }

    mod http {
        use super::super::*;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        /// Serves one canned response and hands back the raw request text.
        async fn serve_once(
            status_line: &'static str,
            body: &'static str,
        ) -> (String, tokio::task::JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("listener should bind");
            let addr = listener.local_addr().expect("local addr should resolve");

            let handle = tokio::spawn(async move {
                let (mut stream, _) = listener.accept().await.expect("accept");
                let mut buffer = Vec::new();
                loop {
                    let mut chunk = [0_u8; 4096];
                    let read = stream.read(&mut chunk).await.expect("read");
                    if read == 0 {
                        break;
                    }
                    buffer.extend_from_slice(&chunk[..read]);
                    if request_complete(&buffer) {
                        break;
                    }
                }

                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream
                    .write_all(response.as_bytes())
                    .await
                    .expect("write response");
                let _ = stream.shutdown().await;
                String::from_utf8_lossy(&buffer).to_string()
            });

            (format!("http://{addr}/v1/"), handle)
        }

        fn request_complete(buffer: &[u8]) -> bool {
            let Some(header_end) = buffer
                .windows(4)
                .position(|window| window == b"\r\n\r\n")
                .map(|index| index + 4)
            else {
                return false;
            };
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            buffer.len() >= header_end + content_length
        }

        fn sample_request() -> ChatRequest {
            ChatRequest {
                model: "gpt-3.5-turbo".to_string(),
                messages: vec![ChatMessage::system("persona"), ChatMessage::user("Hello")],
                max_tokens: 150,
            }
        }

        #[tokio::test]
        async fn posts_to_chat_completions_with_bearer_auth() {
            let (base_url, server) = serve_once(
                "200 OK",
                r#"{"choices":[{"message":{"role":"assistant","content":"Hi there!"}}]}"#,
            )
            .await;

            let transport = HttpTransport::new(base_url);
            let reply = transport
                .send("sk-test", &sample_request())
                .await
                .expect("successful completion");
            assert_eq!(reply, "Hi there!");

            let raw_request = server.await.expect("server task");
            assert!(raw_request.starts_with("POST /v1/chat/completions HTTP/1.1"));
            assert!(raw_request
                .to_ascii_lowercase()
                .contains("authorization: bearer sk-test"));
            assert!(raw_request.contains(r#""max_tokens":150"#));
        }

        #[tokio::test]
        async fn non_success_status_maps_to_api_error() {
            let (base_url, _server) = serve_once(
                "401 Unauthorized",
                r#"{"error":{"message":"Incorrect API key provided"}}"#,
            )
            .await;

            let err = HttpTransport::new(base_url)
                .send("bad", &sample_request())
                .await
                .expect_err("should fail");
            assert_eq!(
                err,
                CompletionError::Api {
                    status: "401 Unauthorized".to_string(),
                    message: "Incorrect API key provided".to_string(),
                }
            );
        }

        #[tokio::test]
        async fn unparseable_body_maps_to_malformed_response() {
            let (base_url, _server) = serve_once("200 OK", "not json").await;

            let err = HttpTransport::new(base_url)
                .send("sk-test", &sample_request())
                .await
                .expect_err("should fail");
            assert!(matches!(err, CompletionError::MalformedResponse(_)));
        }

        #[tokio::test]
        async fn connection_failures_map_to_transport_error() {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
            let addr = listener.local_addr().expect("addr");
            drop(listener);

            let err = HttpTransport::new(format!("http://{addr}"))
                .send("sk-test", &sample_request())
                .await
                .expect_err("nothing is listening");
            assert!(matches!(err, CompletionError::Transport(_)));
        }
    }
}
