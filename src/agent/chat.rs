// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! OpenAI-compatible chat completions runtime
//!
//! Works against OpenAI itself and anything speaking the same
//! `/chat/completions` dialect (Ollama's `/v1` endpoint included).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::prompt::SYSTEM_PROMPT;
use super::tools::{ToolDefinition, Toolbox};
use super::AgentRuntime;
use crate::config::ApiConfig;
use crate::{OrganizerError, Result};

/// Chat completions client driving the tool-calling loop
pub struct ChatRuntime {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    organization: Option<String>,
    max_turns: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    tools: Vec<ToolSpec<'a>>,
}

#[derive(Serialize)]
struct ToolSpec<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool_result(tool_call_id: &str, content: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    /// JSON-encoded arguments, as the API sends them
    #[serde(default)]
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

impl ChatRuntime {
    /// Create a runtime from the `api` config section
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let api_key = api.resolve_key()?;
        let base_url = api.endpoint()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model: api.model.clone(),
            organization: api.organization.clone(),
            max_turns: api.max_turns,
        })
    }

    /// Send one completion request
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<ChatMessage> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            tools: tools
                .iter()
                .map(|function| ToolSpec { kind: "function", function })
                .collect(),
        };

        debug!("Sending chat request: model={} messages={}", self.model, messages.len());

        let mut builder = self.client.post(&url).bearer_auth(&self.api_key).json(&request);
        if let Some(org) = &self.organization {
            builder = builder.header("OpenAI-Organization", org);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OrganizerError::Agent(format!(
                "Chat endpoint returned status {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| OrganizerError::Agent("Chat response had no choices".to_string()))
    }
}

#[async_trait]
impl AgentRuntime for ChatRuntime {
    fn name(&self) -> &'static str {
        "chat-completions"
    }

    async fn run(&self, task: &str, toolbox: &Toolbox) -> Result<String> {
        let tools = toolbox.definitions();
        let mut messages = vec![
            ChatMessage::text("system", SYSTEM_PROMPT),
            ChatMessage::text("user", task),
        ];

        for turn in 1..=self.max_turns {
            let reply = self.complete(&messages, &tools).await?;
            let calls = reply.tool_calls.clone().unwrap_or_default();

            if calls.is_empty() {
                info!("Agent done after {} turn(s)", turn);
                return Ok(reply.content.unwrap_or_default());
            }

            debug!("Turn {}: {} tool call(s)", turn, calls.len());
            messages.push(reply);

            // Sequential on purpose: moves may depend on earlier ones
            for call in calls {
                let output = match serde_json::from_str::<Value>(&call.function.arguments) {
                    Ok(args) => toolbox.call(&call.function.name, &args),
                    Err(e) => format!("Arguments for {} are not valid JSON: {}", call.function.name, e),
                };
                messages.push(ChatMessage::tool_result(&call.id, output));
            }
        }

        Err(OrganizerError::Agent(format!(
            "Agent did not finish within {} turns",
            self.max_turns
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tool_call_response() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "ls", "arguments": "{}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let parsed: ChatResponse = serde_json::from_value(body).unwrap();
        let message = &parsed.choices[0].message;
        assert!(message.content.is_none());
        let calls = message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "ls");
    }

    #[test]
    fn test_parse_final_answer_with_null_tool_calls() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "done", "tool_calls": null}}]
        });
        let parsed: ChatResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("done"));
        assert!(parsed.choices[0].message.tool_calls.is_none());
    }

    #[test]
    fn test_tool_result_serialization() {
        let message = ChatMessage::tool_result("call_9", "Moved a -> b".to_string());
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({"role": "tool", "content": "Moved a -> b", "tool_call_id": "call_9"})
        );
    }

    #[test]
    fn test_request_wraps_tools_as_functions() {
        let dir = tempfile::TempDir::new().unwrap();
        let toolbox = Toolbox::new(crate::workspace::Workspace::new(dir.path()).unwrap());
        let tools = toolbox.definitions();
        let messages = vec![ChatMessage::text("user", "hi")];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            tools: tools.iter().map(|function| ToolSpec { kind: "function", function }).collect(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tools"][3]["type"], "function");
        assert_eq!(value["tools"][3]["function"]["name"], "move_file");
        assert_eq!(value["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_from_config_uses_configured_key() {
        let api = ApiConfig {
            key: Some("sk-test".into()),
            provider: "ollama".into(),
            ..ApiConfig::default()
        };
        let runtime = ChatRuntime::from_config(&api).unwrap();
        assert_eq!(runtime.base_url, "http://localhost:11434/v1");
        assert_eq!(runtime.api_key, "sk-test");
        assert_eq!(runtime.max_turns, 25);
    }
}
