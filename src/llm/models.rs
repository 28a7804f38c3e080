use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    // Replies are shown but never fed back into the history.
    #[allow(dead_code)]
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A function the model may ask us to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON text exactly as the model produced it.
    pub arguments: String,
}

/// Outcome of one chat completion, keyed on the finish reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Stop(String),
    ToolCalls(Vec<ToolCall>),
    /// Any other finish reason (length, content_filter, ...).
    Incomplete(String),
}

// OpenAI chat completions wire format, shared by OpenAI and Azure OpenAI.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ChatTool>,
}

#[derive(Debug, Serialize)]
pub struct ChatTool {
    pub r#type: &'static str,
    pub function: ChatFunction,
}

#[derive(Debug, Serialize)]
pub struct ChatFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<&Tool> for ChatTool {
    fn from(tool: &Tool) -> Self {
        Self {
            r#type: "function",
            function: ChatFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ChatToolCall>,
}

#[derive(Debug, Deserialize)]
pub struct ChatToolCall {
    #[serde(default)]
    pub id: String,
    pub function: ChatToolCallFunction,
}

#[derive(Debug, Deserialize)]
pub struct ChatToolCallFunction {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl From<ChatChoice> for Completion {
    fn from(choice: ChatChoice) -> Self {
        match choice.finish_reason.as_deref() {
            Some("stop") => Completion::Stop(choice.message.content.unwrap_or_default()),
            Some("tool_calls") => Completion::ToolCalls(
                choice
                    .message
                    .tool_calls
                    .into_iter()
                    .map(|call| ToolCall {
                        id: call.id,
                        name: call.function.name,
                        arguments: call.function.arguments,
                    })
                    .collect(),
            ),
            Some(other) => Completion::Incomplete(other.to_string()),
            None => Completion::Incomplete("unknown".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_choice_keeps_raw_arguments() {
        let choice: ChatChoice = serde_json::from_value(json!({
            "finish_reason": "tool_calls",
            "message": {
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": { "name": "get_weather", "arguments": "{\"city\":\"Boston\"}" }
                }]
            }
        }))
        .unwrap();

        assert_eq!(
            Completion::from(choice),
            Completion::ToolCalls(vec![ToolCall {
                id: "call_1".to_string(),
                name: "get_weather".to_string(),
                arguments: "{\"city\":\"Boston\"}".to_string(),
            }])
        );
    }

    #[test]
    fn test_stop_without_content_is_empty_text() {
        let choice: ChatChoice = serde_json::from_value(json!({
            "finish_reason": "stop",
            "message": { "content": null }
        }))
        .unwrap();

        assert_eq!(Completion::from(choice), Completion::Stop(String::new()));
    }

    #[test]
    fn test_other_finish_reason_is_incomplete() {
        let choice: ChatChoice = serde_json::from_value(json!({
            "finish_reason": "length",
            "message": { "content": "partial" }
        }))
        .unwrap();

        assert_eq!(
            Completion::from(choice),
            Completion::Incomplete("length".to_string())
        );
    }

    #[test]
    fn test_request_omits_model_when_bound_by_url() {
        let request = ChatRequest {
            model: None,
            messages: vec![Message::user("hi")],
            tools: vec![],
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({ "messages": [{ "role": "user", "content": "hi" }] })
        );
    }
}
