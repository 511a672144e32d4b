//! Reasoning-engine backends and their wire formats.
//!
//! Enum dispatch over concrete backends, each speaking one vendor's
//! tool-calling protocol over `reqwest`. Request building and response
//! parsing are plain functions over `serde_json::Value` so they can be
//! tested without a network.
//!
//! Every backend wraps its HTTP call in [`retry_with_backoff`] with
//! [`EngineError::is_retryable`] as the predicate.

use serde_json::{Map, Value, json};
use storyloom_tools::ToolSchema;
use storyloom_types::{ToolArgs, ToolCall};
use tracing::{debug, warn};

use crate::config::{BackendType, LlmBackendConfig};
use crate::engine::{Candidate, EngineRequest, EngineResponse, Message, Part, ReasoningEngine, Role};
use crate::error::EngineError;
use crate::retry::{RetryPolicy, retry_with_backoff};

// ---------------------------------------------------------------------------
// Unified backend enum
// ---------------------------------------------------------------------------

/// A reasoning-engine backend reached over HTTP.
#[derive(Debug)]
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl ReasoningEngine for LlmBackend {
    fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }

    fn has_credential(&self) -> bool {
        match self {
            Self::OpenAi(backend) => backend.http.api_key.is_some(),
            Self::Anthropic(backend) => backend.http.api_key.is_some(),
        }
    }

    async fn send(&self, request: &EngineRequest<'_>) -> Result<EngineResponse, EngineError> {
        match self {
            Self::OpenAi(backend) => backend.send(request).await,
            Self::Anthropic(backend) => backend.send(request).await,
        }
    }
}

/// Connection settings shared by every backend.
#[derive(Debug)]
struct HttpSettings {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    retry: RetryPolicy,
}

impl HttpSettings {
    fn new(config: &LlmBackendConfig, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry,
        }
    }

    fn api_key(&self) -> Result<&str, EngineError> {
        self.api_key.as_deref().ok_or(EngineError::MissingCredential)
    }
}

/// POST a JSON body and return the JSON response.
async fn post_json(
    request: reqwest::RequestBuilder,
    body: &Value,
    vendor: &str,
) -> Result<Value, EngineError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| EngineError::Transport(format!("{vendor} request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        return Err(EngineError::Status { status: status.as_u16(), body });
    }

    response
        .json()
        .await
        .map_err(|e| EngineError::Decode(format!("{vendor} response parse failed: {e}")))
}

/// Decode tool-call arguments that may arrive as an object or as JSON text.
/// Anything unusable becomes an empty map, so validation reports the
/// missing fields instead of the turn failing.
fn decode_arguments(raw: Option<&Value>) -> ToolArgs {
    match raw {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(text)) if text.trim().is_empty() => ToolArgs::new(),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(arguments = text.as_str(), "discarding malformed tool-call arguments");
                ToolArgs::new()
            }
        },
        _ => ToolArgs::new(),
    }
}

fn str_field<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str)
}

fn text_of(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ---------------------------------------------------------------------------
// OpenAI-compatible backend
// ---------------------------------------------------------------------------

/// Backend for OpenAI-compatible chat completions with function calling.
///
/// Sends requests to `{api_url}/chat/completions`.
#[derive(Debug)]
pub struct OpenAiBackend {
    http: HttpSettings,
}

impl OpenAiBackend {
    /// Create a new `OpenAI`-compatible backend.
    pub fn new(config: &LlmBackendConfig, retry: RetryPolicy) -> Self {
        Self { http: HttpSettings::new(config, retry) }
    }

    async fn send(&self, request: &EngineRequest<'_>) -> Result<EngineResponse, EngineError> {
        let api_key = self.http.api_key()?;
        let url = format!("{}/chat/completions", self.http.api_url);
        let body = openai_body(&self.http.model, self.http.temperature, self.http.max_tokens, request);
        debug!(url = url.as_str(), tools = request.tools.len(), "sending OpenAI request");

        let json = retry_with_backoff(
            &self.http.retry,
            "openai",
            || {
                let builder = self.http.client.post(&url).bearer_auth(api_key);
                post_json(builder, &body, "OpenAI")
            },
            EngineError::is_retryable,
        )
        .await?;

        parse_openai_response(&json)
    }
}

/// Build an `OpenAI` chat completions request body.
fn openai_body(model: &str, temperature: f32, max_tokens: u32, request: &EngineRequest<'_>) -> Value {
    let mut messages = vec![json!({"role": "system", "content": request.system})];
    for message in request.messages {
        push_openai_messages(&mut messages, message);
    }

    let mut body = Map::new();
    body.insert("model".to_owned(), json!(model));
    body.insert("messages".to_owned(), Value::Array(messages));
    body.insert("temperature".to_owned(), json!(temperature));
    body.insert("max_tokens".to_owned(), json!(max_tokens));
    if request.tools_enabled() {
        body.insert("tools".to_owned(), request.tools.iter().map(openai_tool).collect());
    }
    Value::Object(body)
}

fn openai_tool(schema: &ToolSchema) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": schema.name,
            "description": schema.description,
            "parameters": schema.parameters,
        }
    })
}

fn push_openai_messages(out: &mut Vec<Value>, message: &Message) {
    match message.role {
        Role::User => out.push(json!({"role": "user", "content": text_of(&message.parts)})),
        Role::Model => {
            let text = text_of(&message.parts);
            let calls: Vec<Value> = message
                .parts
                .iter()
                .filter_map(|part| match part {
                    Part::ToolCall(call) => Some(json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": Value::Object(call.args.clone()).to_string(),
                        }
                    })),
                    _ => None,
                })
                .collect();
            let mut entry = Map::new();
            entry.insert("role".to_owned(), json!("assistant"));
            entry.insert(
                "content".to_owned(),
                if text.is_empty() { Value::Null } else { Value::String(text) },
            );
            if !calls.is_empty() {
                entry.insert("tool_calls".to_owned(), Value::Array(calls));
            }
            out.push(Value::Object(entry));
        }
        Role::Tool => {
            for part in &message.parts {
                if let Part::ToolResult { call_id, content, .. } = part {
                    out.push(json!({"role": "tool", "tool_call_id": call_id, "content": content}));
                }
            }
            let context = text_of(&message.parts);
            if !context.is_empty() {
                out.push(json!({"role": "user", "content": context}));
            }
        }
    }
}

/// Parse an `OpenAI` chat completions response into candidates.
fn parse_openai_response(json: &Value) -> Result<EngineResponse, EngineError> {
    let choices = json
        .get("choices")
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::Decode("OpenAI response missing choices".to_owned()))?;

    let candidates = choices
        .iter()
        .filter_map(|choice| choice.get("message"))
        .map(|message| Candidate {
            text_parts: str_field(message, "content")
                .filter(|text| !text.trim().is_empty())
                .map(|text| vec![text.to_owned()])
                .unwrap_or_default(),
            tool_calls: message
                .get("tool_calls")
                .and_then(Value::as_array)
                .map(|calls| calls.iter().filter_map(openai_tool_call).collect())
                .unwrap_or_default(),
        })
        .collect();

    Ok(EngineResponse { candidates })
}

fn openai_tool_call(raw: &Value) -> Option<ToolCall> {
    let function = raw.get("function")?;
    Some(ToolCall {
        id: str_field(raw, "id").unwrap_or_default().to_owned(),
        name: str_field(function, "name")?.to_owned(),
        args: decode_arguments(function.get("arguments")),
    })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API backend
// ---------------------------------------------------------------------------

/// Backend for the Anthropic Messages API with tool use.
///
/// Differences from `OpenAI`:
/// - `x-api-key` header instead of `Authorization: Bearer`
/// - the system instruction is a top-level field
/// - tool calls and results are content blocks (`tool_use`, `tool_result`)
#[derive(Debug)]
pub struct AnthropicBackend {
    http: HttpSettings,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    pub fn new(config: &LlmBackendConfig, retry: RetryPolicy) -> Self {
        Self { http: HttpSettings::new(config, retry) }
    }

    async fn send(&self, request: &EngineRequest<'_>) -> Result<EngineResponse, EngineError> {
        let api_key = self.http.api_key()?;
        let url = format!("{}/messages", self.http.api_url);
        let body =
            anthropic_body(&self.http.model, self.http.temperature, self.http.max_tokens, request);
        debug!(url = url.as_str(), tools = request.tools.len(), "sending Anthropic request");

        let json = retry_with_backoff(
            &self.http.retry,
            "anthropic",
            || {
                let builder = self
                    .http
                    .client
                    .post(&url)
                    .header("x-api-key", api_key)
                    .header("anthropic-version", "2023-06-01");
                post_json(builder, &body, "Anthropic")
            },
            EngineError::is_retryable,
        )
        .await?;

        parse_anthropic_response(&json)
    }
}

/// Build an Anthropic Messages request body.
fn anthropic_body(
    model: &str,
    temperature: f32,
    max_tokens: u32,
    request: &EngineRequest<'_>,
) -> Value {
    // The API refuses tool_use/tool_result blocks in a request without tool
    // definitions, so the narrative request replays earlier tool traffic as text.
    let tool_blocks = request.tools_enabled();
    let mut messages: Vec<(&'static str, Vec<Value>)> = Vec::new();
    for message in request.messages {
        let (role, blocks) = anthropic_message(message, tool_blocks);
        if blocks.is_empty() {
            continue;
        }
        // Consecutive messages from the same side are merged into one turn.
        if let Some((_, content)) = messages.last_mut().filter(|(last, _)| *last == role) {
            content.extend(blocks);
        } else {
            messages.push((role, blocks));
        }
    }
    let messages: Vec<Value> = messages
        .into_iter()
        .map(|(role, content)| json!({"role": role, "content": content}))
        .collect();

    let mut body = Map::new();
    body.insert("model".to_owned(), json!(model));
    body.insert("max_tokens".to_owned(), json!(max_tokens));
    body.insert("temperature".to_owned(), json!(temperature));
    body.insert("system".to_owned(), json!(request.system));
    body.insert("messages".to_owned(), Value::Array(messages));
    if request.tools_enabled() {
        let tools = request
            .tools
            .iter()
            .map(|schema| {
                json!({
                    "name": schema.name,
                    "description": schema.description,
                    "input_schema": schema.parameters,
                })
            })
            .collect();
        body.insert("tools".to_owned(), tools);
    }
    Value::Object(body)
}

fn anthropic_message(message: &Message, tool_blocks: bool) -> (&'static str, Vec<Value>) {
    let role = match message.role {
        Role::Model => "assistant",
        Role::User | Role::Tool => "user",
    };
    let blocks = message
        .parts
        .iter()
        .filter_map(|part| match part {
            Part::Text(text) if text.trim().is_empty() => None,
            Part::Text(text) => Some(json!({"type": "text", "text": text})),
            Part::ToolCall(call) if !tool_blocks => Some(json!({
                "type": "text",
                "text": format!("[called {} with {}]", call.name, Value::Object(call.args.clone())),
            })),
            Part::ToolResult { name, content, .. } if !tool_blocks => Some(json!({
                "type": "text",
                "text": format!("[{name} result] {content}"),
            })),
            Part::ToolCall(call) => Some(json!({
                "type": "tool_use",
                "id": call.id,
                "name": call.name,
                "input": call.args,
            })),
            Part::ToolResult { call_id, content, .. } => Some(json!({
                "type": "tool_result",
                "tool_use_id": call_id,
                "content": content,
            })),
        })
        .collect();
    (role, blocks)
}

/// Parse an Anthropic Messages response into a single candidate.
fn parse_anthropic_response(json: &Value) -> Result<EngineResponse, EngineError> {
    let blocks = json
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::Decode("Anthropic response missing content".to_owned()))?;

    let mut candidate = Candidate::default();
    for block in blocks {
        match str_field(block, "type") {
            Some("text") => {
                if let Some(text) = str_field(block, "text").filter(|t| !t.trim().is_empty()) {
                    candidate.text_parts.push(text.to_owned());
                }
            }
            Some("tool_use") => {
                let Some(name) = str_field(block, "name") else {
                    continue;
                };
                candidate.tool_calls.push(ToolCall {
                    id: str_field(block, "id").unwrap_or_default().to_owned(),
                    name: name.to_owned(),
                    args: decode_arguments(block.get("input")),
                });
            }
            _ => {}
        }
    }
    Ok(EngineResponse::single(candidate))
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create a backend from configuration.
pub fn create_backend(config: &LlmBackendConfig, retry: RetryPolicy) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config, retry)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config, retry)),
    }
}

#[cfg(test)]
mod tests {
    use storyloom_tools::ToolRegistry;

    use super::*;

    fn call(id: &str, name: &str, args: Value) -> ToolCall {
        ToolCall { id: id.to_owned(), name: name.to_owned(), args: decode_arguments(Some(&args)) }
    }

    fn conversation() -> Vec<Message> {
        vec![
            Message::user("Alice picks up the key."),
            Message::model(&Candidate {
                text_parts: Vec::new(),
                tool_calls: vec![call(
                    "call_1",
                    "move_object",
                    json!({"objectId": "obj_key", "targetId": "char_001"}),
                )],
            }),
            Message::tool_results(vec![
                Part::ToolResult {
                    call_id: "call_1".to_owned(),
                    name: "move_object".to_owned(),
                    content: "Moved Brass Key from Drawer to Alice".to_owned(),
                },
                Part::Text("Updated state: ...".to_owned()),
            ]),
            Message::user("Now narrate."),
        ]
    }

    fn config(backend_type: BackendType, api_key: Option<&str>) -> LlmBackendConfig {
        LlmBackendConfig {
            backend_type,
            api_url: backend_type.default_api_url().to_owned(),
            api_key: api_key.map(ToOwned::to_owned),
            model: "test-model".to_owned(),
            temperature: 0.5,
            max_tokens: 256,
        }
    }

    #[test]
    fn openai_body_translates_conversation_and_tools() {
        let schemas = ToolRegistry::standard().schemas();
        let messages = conversation();
        let request = EngineRequest { system: "rules", messages: &messages, tools: &schemas };
        let body = openai_body("gpt-test", 0.5, 256, &request);

        let sent = body.get("messages").and_then(Value::as_array).cloned().unwrap_or_default();
        let roles: Vec<&str> = sent.iter().filter_map(|m| str_field(m, "role")).collect();
        assert_eq!(roles, ["system", "user", "assistant", "tool", "user", "user"]);

        let assistant = sent.get(2).cloned().unwrap_or_default();
        assert_eq!(assistant.get("content"), Some(&Value::Null));
        let arguments = assistant
            .pointer("/tool_calls/0/function/arguments")
            .and_then(Value::as_str)
            .unwrap_or_default();
        assert_eq!(
            serde_json::from_str::<Value>(arguments).ok(),
            Some(json!({"objectId": "obj_key", "targetId": "char_001"}))
        );
        assert_eq!(
            sent.get(3).and_then(|m| str_field(m, "tool_call_id")),
            Some("call_1")
        );

        let tools = body.get("tools").and_then(Value::as_array).map_or(0, Vec::len);
        assert_eq!(tools, schemas.len());
        assert_eq!(
            body.pointer("/tools/0/function/parameters/required/0").and_then(Value::as_str),
            Some("objectId")
        );
    }

    #[test]
    fn tools_are_omitted_when_disabled() {
        let messages = conversation();
        let request = EngineRequest { system: "rules", messages: &messages, tools: &[] };
        assert!(openai_body("m", 0.5, 256, &request).get("tools").is_none());
        assert!(anthropic_body("m", 0.5, 256, &request).get("tools").is_none());
    }

    #[test]
    fn parse_openai_tool_calls_and_text() {
        let json = json!({
            "choices": [{
                "message": {
                    "content": "Alice reaches for the drawer.",
                    "tool_calls": [
                        {"id": "a", "type": "function",
                         "function": {"name": "move_object", "arguments": "{\"objectId\":\"obj_key\",\"targetId\":\"char_001\"}"}},
                        {"id": "b", "type": "function",
                         "function": {"name": "find_entity_location", "arguments": "{not json"}}
                    ]
                }
            }]
        });
        assert!(parse_openai_response(&json).is_ok());
        let candidate = parse_openai_response(&json)
            .ok()
            .and_then(EngineResponse::into_first)
            .unwrap_or_default();
        assert_eq!(candidate.text(), "Alice reaches for the drawer.");
        assert_eq!(candidate.tool_calls.len(), 2);
        assert_eq!(
            candidate.tool_calls.first().and_then(|c| c.args.get("objectId")),
            Some(&json!("obj_key"))
        );
        assert!(candidate.tool_calls.get(1).is_some_and(|c| c.args.is_empty()));
    }

    #[test]
    fn parse_openai_empty_and_missing() {
        let empty = parse_openai_response(&json!({"choices": []})).unwrap_or_default();
        assert!(empty.candidates.is_empty());
        assert!(matches!(
            parse_openai_response(&json!({"error": "rate_limit"})),
            Err(EngineError::Decode(_))
        ));
    }

    #[test]
    fn anthropic_body_merges_consecutive_user_turns() {
        let schemas = ToolRegistry::standard().subset(&["move_object"]).schemas();
        let messages = conversation();
        let request = EngineRequest { system: "rules", messages: &messages, tools: &schemas };
        let body = anthropic_body("claude-test", 0.5, 256, &request);

        assert_eq!(str_field(&body, "system"), Some("rules"));
        let sent = body.get("messages").and_then(Value::as_array).cloned().unwrap_or_default();
        let roles: Vec<&str> = sent.iter().filter_map(|m| str_field(m, "role")).collect();
        assert_eq!(roles, ["user", "assistant", "user"]);

        assert_eq!(body.pointer("/messages/1/content/0/type"), Some(&json!("tool_use")));
        assert_eq!(body.pointer("/messages/1/content/0/input/objectId"), Some(&json!("obj_key")));
        let last = body.pointer("/messages/2/content").and_then(Value::as_array).map_or(0, Vec::len);
        assert_eq!(last, 3);
        assert_eq!(body.pointer("/messages/2/content/0/type"), Some(&json!("tool_result")));
        assert_eq!(body.pointer("/tools/0/input_schema/type"), Some(&json!("object")));
    }

    #[test]
    fn anthropic_narrative_request_replays_tool_traffic_as_text() {
        let messages = conversation();
        let request = EngineRequest { system: "rules", messages: &messages, tools: &[] };
        let body = anthropic_body("claude-test", 0.5, 256, &request);

        assert!(body.get("tools").is_none());
        let sent = body.get("messages").and_then(Value::as_array).cloned().unwrap_or_default();
        let roles: Vec<&str> = sent.iter().filter_map(|m| str_field(m, "role")).collect();
        assert_eq!(roles, ["user", "assistant", "user"]);

        let block_types: Vec<&str> = sent
            .iter()
            .filter_map(|m| m.get("content").and_then(Value::as_array))
            .flatten()
            .filter_map(|block| str_field(block, "type"))
            .collect();
        assert!(block_types.iter().all(|t| *t == "text"), "{block_types:?}");

        let call_text = body.pointer("/messages/1/content/0/text").and_then(Value::as_str);
        assert!(call_text.is_some_and(|t| t.starts_with("[called move_object with")
            && t.contains("obj_key")));
        assert_eq!(
            body.pointer("/messages/2/content/0/text").and_then(Value::as_str),
            Some("[move_object result] Moved Brass Key from Drawer to Alice")
        );
    }

    #[test]
    fn parse_anthropic_blocks() {
        let json = json!({
            "content": [
                {"type": "text", "text": "Checking."},
                {"type": "tool_use", "id": "toolu_1", "name": "find_entity_location",
                 "input": {"entityId": "obj_key"}}
            ]
        });
        let candidate = parse_anthropic_response(&json)
            .ok()
            .and_then(EngineResponse::into_first)
            .unwrap_or_default();
        assert_eq!(candidate.text_parts, ["Checking."]);
        assert_eq!(candidate.tool_calls.first().map(|c| c.id.as_str()), Some("toolu_1"));
        assert!(parse_anthropic_response(&json!({"type": "error"})).is_err());
    }

    #[test]
    fn create_backend_dispatches_correctly() {
        let backend = create_backend(&config(BackendType::OpenAi, Some("k")), RetryPolicy::none());
        assert_eq!(backend.name(), "openai-compatible");
        assert!(backend.has_credential());

        let backend = create_backend(&config(BackendType::Anthropic, None), RetryPolicy::none());
        assert_eq!(backend.name(), "anthropic");
        assert!(!backend.has_credential());
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        let backend = create_backend(&config(BackendType::OpenAi, None), RetryPolicy::default());
        let request = EngineRequest { system: "rules", messages: &[], tools: &[] };
        assert_eq!(backend.send(&request).await, Err(EngineError::MissingCredential));
    }
}
