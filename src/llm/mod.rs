mod azure;
mod models;
mod openai;

pub use azure::{AzureOpenAiClient, DEFAULT_API_VERSION as AZURE_DEFAULT_API_VERSION};
pub use models::{Completion, Message, Role, Tool, ToolCall};
pub use openai::{OpenAiClient, OpenAiModel};

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Model or deployment the client is bound to.
    fn model(&self) -> &str;

    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<Completion>;
}
