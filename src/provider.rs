use anyhow::Result;
use std::fmt;
use tracing::info;
use url::Url;

use crate::console::{prompt_string, prompt_url, select_option, Console};
use crate::llm::{AzureOpenAiClient, ChatClient, OpenAiClient, OpenAiModel};

/// Where chat completions are served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    AzureOpenAi,
    OpenAi,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::AzureOpenAi, ProviderKind::OpenAi];

    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::AzureOpenAi => "Azure OpenAI",
            ProviderKind::OpenAi => "OpenAI",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

/// Answers supplied ahead of time through flags, the environment or `.env`.
/// Anything left unset is asked for interactively.
#[derive(Clone, Default)]
pub struct ProviderSettings {
    pub provider: Option<ProviderKind>,
    pub azure_endpoint: Option<Url>,
    pub azure_api_key: Option<String>,
    pub azure_deployment: Option<String>,
    pub azure_api_version: String,
    pub openai_api_key: Option<String>,
    pub openai_model: Option<OpenAiModel>,
}

// Keys are never printed, only whether one was supplied.
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");

        f.debug_struct("ProviderSettings")
            .field("provider", &self.provider)
            .field("azure_endpoint", &self.azure_endpoint)
            .field("azure_api_key", &redact(&self.azure_api_key))
            .field("azure_deployment", &self.azure_deployment)
            .field("azure_api_version", &self.azure_api_version)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_model", &self.openai_model)
            .finish()
    }
}

/// Asks which provider to use and builds the session's chat client.
///
/// Returns `Ok(None)` when no known provider is selected or the input
/// closes before every answer is given.
pub fn select_provider(
    console: &mut dyn Console,
    settings: &ProviderSettings,
) -> Result<Option<Box<dyn ChatClient>>> {
    let host = match settings.provider {
        Some(kind) => kind.label().to_string(),
        None => {
            let labels: Vec<&str> = ProviderKind::ALL.iter().map(ProviderKind::label).collect();
            let Some(host) = select_option(console, "Which host do you want to use?", &labels)?
            else {
                return Ok(None);
            };
            host
        }
    };

    let client: Box<dyn ChatClient> = match ProviderKind::from_label(&host) {
        Some(ProviderKind::AzureOpenAi) => {
            let endpoint = match &settings.azure_endpoint {
                Some(endpoint) => Some(endpoint.clone()),
                None => prompt_url(console, "Please insert your Azure OpenAI endpoint:")?,
            };
            let Some(endpoint) = endpoint else {
                return Ok(None);
            };

            let api_key = match &settings.azure_api_key {
                Some(key) => Some(key.clone()),
                None => prompt_string(console, "Please insert your Azure OpenAI API key:", true)?,
            };
            let Some(api_key) = api_key else {
                return Ok(None);
            };

            let deployment = match &settings.azure_deployment {
                Some(deployment) => Some(deployment.clone()),
                None => prompt_string(
                    console,
                    "Please insert the deployment name of the model:",
                    true,
                )?,
            };
            let Some(deployment) = deployment else {
                return Ok(None);
            };

            info!(endpoint = %endpoint, "Using Azure OpenAI");
            Box::new(AzureOpenAiClient::new(
                &endpoint,
                api_key,
                deployment,
                &settings.azure_api_version,
            ))
        }
        Some(ProviderKind::OpenAi) => {
            let api_key = match &settings.openai_api_key {
                Some(key) => Some(key.clone()),
                None => prompt_string(console, "Please insert your OpenAI API key:", true)?,
            };
            let Some(api_key) = api_key else {
                return Ok(None);
            };

            let model = match settings.openai_model {
                Some(model) => Some(model),
                None => {
                    let ids: Vec<&str> = OpenAiModel::ALL.iter().map(OpenAiModel::id).collect();
                    select_option(console, "Which model do you want to use?", &ids)?
                        .as_deref()
                        .and_then(OpenAiModel::from_id)
                }
            };
            let Some(model) = model else {
                return Ok(None);
            };

            info!(model = model.id(), "Using OpenAI");
            Box::new(OpenAiClient::new(api_key, model))
        }
        None => return Ok(None),
    };

    Ok(Some(client))
}
