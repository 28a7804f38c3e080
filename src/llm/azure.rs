use super::models::{ChatRequest, Completion, Message, Tool};
use super::openai::send_chat_request;
use super::ChatClient;
use anyhow::Result;
use async_trait::async_trait;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "2024-06-01";

/// Azure OpenAI deployment. The model is fixed by the deployment in the URL.
pub struct AzureOpenAiClient {
    http: reqwest::Client,
    api_key: String,
    deployment: String,
    completions_url: String,
}

impl AzureOpenAiClient {
    pub fn new(endpoint: &Url, api_key: String, deployment: String, api_version: &str) -> Self {
        let completions_url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint.as_str().trim_end_matches('/'),
            deployment,
            api_version
        );

        Self {
            http: reqwest::Client::new(),
            api_key,
            deployment,
            completions_url,
        }
    }
}

#[async_trait]
impl ChatClient for AzureOpenAiClient {
    fn model(&self) -> &str {
        &self.deployment
    }

    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<Completion> {
        let request = ChatRequest {
            model: None,
            messages: messages.to_vec(),
            tools: tools.iter().map(Into::into).collect(),
        };

        let builder = self
            .http
            .post(&self.completions_url)
            .header("api-key", &self.api_key);

        send_chat_request(builder, &request, "Azure OpenAI").await
    }
}
