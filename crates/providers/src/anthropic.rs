//! Anthropic Messages API gateway.
//!
//! Features:
//! - `x-api-key` and `Authorization: Bearer` authentication
//! - `anthropic-version` header
//! - System prompt as top-level field
//! - Tool results re-roled as tagged `user` messages (no native tool role here)
//! - Placeholder replies when no API key is configured, so the agent runs offline

use async_trait::async_trait;
use ferrule_config::{AppConfig, DEFAULT_ENDPOINT};
use ferrule_core::error::ProviderError;
use ferrule_core::gateway::{Completion, Gateway};
use ferrule_core::message::{Message, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Prefix put in front of tool output when it is sent as a user message.
pub const TOOL_OUTPUT_TAG: &str = "[Tool Output]";

/// Anthropic Messages API gateway.
pub struct AnthropicGateway {
    name: String,
    endpoint: String,
    /// `None` switches the gateway into placeholder mode.
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicGateway {
    /// Create a gateway with default endpoint, model and limits.
    ///
    /// A missing or blank key is not an error: the gateway answers with
    /// placeholder replies instead of calling the API.
    pub fn new(api_key: Option<String>) -> Result<Self, ProviderError> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a gateway whose HTTP requests time out after `timeout_secs`.
    pub fn with_timeout(
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            name: "anthropic".into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
        })
    }

    /// Create a gateway from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Ok(Self::with_timeout(config.api_key.clone(), config.timeout_secs)?
            .with_endpoint(&config.endpoint)
            .with_model(&config.model)
            .with_max_tokens(config.max_tokens))
    }

    /// Override the full Messages API URL (e.g., for testing or proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Whether replies are placeholders (no API key configured).
    pub fn is_placeholder(&self) -> bool {
        self.api_key.is_none()
    }

    /// Deterministic reply used when no API key is configured.
    fn placeholder_reply(messages: &[Message]) -> String {
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or_default();
        format!("[placeholder] Mock Claude response to: {last}")
    }

    /// Split the transcript into the system prompt and the turn sequence.
    ///
    /// Only one system prompt is sent; when several are present the last wins.
    fn extract_system(messages: &[Message]) -> (Option<String>, Vec<ApiMessage>) {
        let mut system = None;
        let mut api_messages = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system = Some(msg.content.clone()),
                Role::User | Role::Assistant => api_messages.push(ApiMessage {
                    role: msg.role.to_string(),
                    content: msg.content.clone(),
                }),
                Role::Tool => api_messages.push(ApiMessage {
                    role: "user".into(),
                    content: format!("{TOOL_OUTPUT_TAG} {}", msg.content),
                }),
            }
        }

        (system, api_messages)
    }

    fn build_request(&self, messages: &[Message]) -> ApiRequest {
        let (system, messages) = Self::extract_system(messages);
        ApiRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages,
            system,
        }
    }

    /// Concatenate the `text` blocks of a response, in order.
    fn response_text(resp: ApiResponse) -> Result<String, ProviderError> {
        if resp.content.is_empty() {
            return Err(ProviderError::EmptyResponse("no content blocks in response".into()));
        }

        let text: String = resp
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse("no text content in response".into()));
        }
        Ok(text)
    }
}

#[async_trait]
impl Gateway for AnthropicGateway {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, messages: &[Message]) -> Result<Completion, ProviderError> {
        let Some(api_key) = &self.api_key else {
            debug!(gateway = "anthropic", "No API key configured, returning placeholder reply");
            return Ok(Completion::text(Self::placeholder_reply(messages)));
        };

        let body = self.build_request(messages);

        debug!(
            gateway = "anthropic",
            model = %self.model,
            messages = body.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_body, "Anthropic API error");
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_body,
            });
        }

        let api_resp: ApiResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse Anthropic response: {e}"))
        })?;

        Self::response_text(api_resp).map(Completion::text)
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transcript() -> Vec<Message> {
        vec![
            Message::system("You are helpful"),
            Message::user("Read the README"),
            Message::assistant("I'll use the file_read tool on README.md"),
            Message::tool_result("file_read", "# Title"),
        ]
    }

    fn live_gateway(server: &MockServer) -> AnthropicGateway {
        AnthropicGateway::new(Some("sk-ant-test".into()))
            .unwrap()
            .with_endpoint(format!("{}/v1/messages", server.uri()))
    }

    #[test]
    fn constructor_defaults() {
        let gateway = AnthropicGateway::new(Some("sk-ant-test".into())).unwrap();
        assert_eq!(gateway.name(), "anthropic");
        assert_eq!(gateway.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(gateway.max_tokens, 1024);
        assert!(!gateway.is_placeholder());
    }

    #[test]
    fn blank_key_means_placeholder_mode() {
        assert!(AnthropicGateway::new(None).unwrap().is_placeholder());
        assert!(AnthropicGateway::new(Some("  ".into())).unwrap().is_placeholder());
    }

    #[test]
    fn from_config_applies_overrides() {
        let config = AppConfig {
            api_key: Some("sk-ant-config".into()),
            endpoint: "http://proxy.local/v1/messages".into(),
            model: "claude-test".into(),
            max_tokens: 64,
            ..AppConfig::default()
        };
        let gateway = AnthropicGateway::from_config(&config).unwrap();
        assert_eq!(gateway.endpoint, "http://proxy.local/v1/messages");
        assert_eq!(gateway.model, "claude-test");
        assert_eq!(gateway.max_tokens, 64);
        assert!(!gateway.is_placeholder());
    }

    #[test]
    fn system_extraction_and_tool_reroling() {
        let (system, api_msgs) = AnthropicGateway::extract_system(&transcript());
        assert_eq!(system.as_deref(), Some("You are helpful"));
        assert_eq!(api_msgs.len(), 3);
        assert_eq!(api_msgs[0].role, "user");
        assert_eq!(api_msgs[1].role, "assistant");
        assert_eq!(api_msgs[2].role, "user");
        assert_eq!(
            api_msgs[2].content,
            "[Tool Output] Tool 'file_read' returned: # Title"
        );
    }

    #[test]
    fn last_system_message_wins() {
        let messages = vec![
            Message::system("first"),
            Message::system("second"),
            Message::user("hi"),
        ];
        let (system, api_msgs) = AnthropicGateway::extract_system(&messages);
        assert_eq!(system.as_deref(), Some("second"));
        assert_eq!(api_msgs.len(), 1);
    }

    #[test]
    fn request_omits_absent_system() {
        let gateway = AnthropicGateway::new(None).unwrap();
        let body = serde_json::to_value(gateway.build_request(&[Message::user("hi")])).unwrap();
        assert!(body.get("system").is_none());
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["content"], "hi");
    }

    #[test]
    fn text_blocks_are_concatenated_in_order() {
        let resp: ApiResponse = serde_json::from_str(
            r#"{
                "id": "msg_01",
                "content": [
                    {"type": "text", "text": "Hello, "},
                    {"type": "tool_use", "id": "toolu_1", "name": "x", "input": {}},
                    {"type": "text", "text": "world"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(AnthropicGateway::response_text(resp).unwrap(), "Hello, world");
    }

    #[test]
    fn empty_content_is_an_error() {
        let resp: ApiResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(
            AnthropicGateway::response_text(resp),
            Err(ProviderError::EmptyResponse(_))
        ));

        let resp: ApiResponse =
            serde_json::from_str(r#"{"content": [{"type": "thinking", "thinking": "hm"}]}"#)
                .unwrap();
        assert!(matches!(
            AnthropicGateway::response_text(resp),
            Err(ProviderError::EmptyResponse(_))
        ));
    }

    #[tokio::test]
    async fn placeholder_reply_echoes_last_message() {
        let gateway = AnthropicGateway::new(None).unwrap();
        let completion = gateway.query(&transcript()).await.unwrap();
        assert_eq!(
            completion.text,
            "[placeholder] Mock Claude response to: Tool 'file_read' returned: # Title"
        );
        assert!(completion.tool_call.is_none());

        // Deterministic: same transcript, same reply
        let again = gateway.query(&transcript()).await.unwrap();
        assert_eq!(completion, again);
    }

    #[tokio::test]
    async fn placeholder_handles_empty_transcript() {
        let gateway = AnthropicGateway::new(None).unwrap();
        let completion = gateway.query(&[]).await.unwrap();
        assert_eq!(completion.text, "[placeholder] Mock Claude response to: ");
    }

    #[tokio::test]
    async fn sends_wire_request_and_reads_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("authorization", "Bearer sk-ant-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(serde_json::json!({
                "model": DEFAULT_MODEL,
                "max_tokens": 1024,
                "system": "You are helpful",
                "messages": [
                    {"role": "user", "content": "Read the README"},
                    {"role": "assistant", "content": "I'll use the file_read tool on README.md"},
                    {"role": "user", "content": "[Tool Output] Tool 'file_read' returned: # Title"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "The README has a title."}],
                "stop_reason": "end_turn"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = live_gateway(&server);
        let completion = gateway.query(&transcript()).await.unwrap();
        assert_eq!(completion.text, "The README has a title.");
    }

    #[tokio::test]
    async fn non_success_status_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"type":"error","error":{"message":"invalid x-api-key"}}"#),
            )
            .mount(&server)
            .await;

        let gateway = live_gateway(&server);
        let err = gateway.query(&[Message::user("hi")]).await.unwrap_err();
        match err {
            ProviderError::ApiError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 401);
                assert!(message.contains("invalid x-api-key"));
            }
            other => panic!("Expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let gateway = live_gateway(&server);
        let err = gateway.query(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let gateway = AnthropicGateway::new(Some("sk-ant-test".into()))
            .unwrap()
            .with_endpoint("http://127.0.0.1:1/v1/messages");
        let err = gateway.query(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }
}
