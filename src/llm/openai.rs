use super::models::{ChatRequest, ChatResponse, Completion, Message, Tool};
use super::ChatClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Models offered when talking to OpenAI directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiModel {
    Gpt4o,
    Gpt4oMini,
}

impl OpenAiModel {
    pub const ALL: [OpenAiModel; 2] = [OpenAiModel::Gpt4o, OpenAiModel::Gpt4oMini];

    pub fn id(&self) -> &'static str {
        match self {
            OpenAiModel::Gpt4o => "gpt-4o",
            OpenAiModel::Gpt4oMini => "gpt-4o-mini",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|model| model.id() == id)
    }
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: OpenAiModel) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: model.id().to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<Completion> {
        let request = ChatRequest {
            model: Some(self.model.clone()),
            messages: messages.to_vec(),
            tools: tools.iter().map(Into::into).collect(),
        };

        let builder = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key);

        send_chat_request(builder, &request, "OpenAI").await
    }
}

/// Posts a chat completion request and reduces the first choice to a [`Completion`].
pub(super) async fn send_chat_request(
    builder: reqwest::RequestBuilder,
    request: &ChatRequest,
    provider: &str,
) -> Result<Completion> {
    debug!(
        provider,
        messages = request.messages.len(),
        tools = request.tools.len(),
        "Sending chat completion request"
    );

    let response = builder
        .header("content-type", "application/json")
        .json(request)
        .send()
        .await
        .with_context(|| format!("Failed to send request to {provider} API"))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await?;
        anyhow::bail!("{} API error: {}: {}", provider, status, text);
    }

    let chat_response: ChatResponse = response
        .json()
        .await
        .with_context(|| format!("Failed to parse {provider} API response"))?;

    let choice = chat_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Empty response from {} API", provider))?;

    debug!(provider, finish_reason = ?choice.finish_reason, "Received chat completion");

    Ok(choice.into())
}
