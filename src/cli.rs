use clap::{Parser, Subcommand};
use std::env;
use url::Url;

use crate::llm::{OpenAiModel, AZURE_DEFAULT_API_VERSION};
use crate::provider::{ProviderKind, ProviderSettings};

#[derive(Parser)]
#[command(author, version, about = "Chat with OpenAI or Azure OpenAI about the weather", long_about = None)]
pub struct Cli {
    /// Optional command to run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat host to use: "azure" or "openai"
    #[arg(long, global = true, env = "COPILOT_PROVIDER", value_parser = parse_provider)]
    pub provider: Option<ProviderKind>,

    /// Azure OpenAI endpoint, e.g. https://my-resource.openai.azure.com
    #[arg(long, global = true, env = "AZURE_OPENAI_ENDPOINT")]
    pub azure_endpoint: Option<Url>,

    /// Azure OpenAI deployment name
    #[arg(long, global = true, env = "AZURE_OPENAI_DEPLOYMENT")]
    pub deployment: Option<String>,

    /// Azure OpenAI REST API version
    #[arg(long, global = true, env = "AZURE_OPENAI_API_VERSION", default_value = AZURE_DEFAULT_API_VERSION)]
    pub azure_api_version: String,

    /// OpenAI model: "gpt-4o" or "gpt-4o-mini"
    #[arg(long, global = true, env = "OPENAI_MODEL", value_parser = parse_model)]
    pub model: Option<OpenAiModel>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a single message and print the reply
    Ask {
        /// The message to send
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Look up the weather for a city without involving the model
    Weather {
        /// City name, e.g. Boston
        #[arg(required = true)]
        city: Vec<String>,
    },
}

impl Cli {
    /// Provider answers from flags and the environment. API keys are only
    /// read from the environment so they never show up in shell history.
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            provider: self.provider,
            azure_endpoint: self.azure_endpoint.clone(),
            azure_api_key: env_secret("AZURE_OPENAI_API_KEY"),
            azure_deployment: self.deployment.clone(),
            azure_api_version: self.azure_api_version.clone(),
            openai_api_key: env_secret("OPENAI_API_KEY"),
            openai_model: self.model,
        }
    }
}

pub fn env_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_provider(value: &str) -> Result<ProviderKind, String> {
    match value.to_ascii_lowercase().as_str() {
        "azure" | "azure-openai" | "azure openai" => Ok(ProviderKind::AzureOpenAi),
        "openai" => Ok(ProviderKind::OpenAi),
        other => Err(format!("unknown provider '{}', expected 'azure' or 'openai'", other)),
    }
}

fn parse_model(value: &str) -> Result<OpenAiModel, String> {
    OpenAiModel::from_id(value).ok_or_else(|| {
        let known: Vec<&str> = OpenAiModel::ALL.iter().map(OpenAiModel::id).collect();
        format!("unknown model '{}', expected one of: {}", value, known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "weather-copilot",
            "--provider",
            "openai",
            "--model",
            "gpt-4o-mini",
            "ask",
            "weather",
            "in",
            "Boston?",
        ])
        .unwrap();

        assert_eq!(cli.provider, Some(ProviderKind::OpenAi));
        assert_eq!(cli.model, Some(OpenAiModel::Gpt4oMini));
        match cli.command {
            Some(Commands::Ask { message }) => assert_eq!(message.join(" "), "weather in Boston?"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_rejects_unknown_model() {
        let result = Cli::try_parse_from(["weather-copilot", "--model", "gpt-3.5-turbo"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_provider_aliases() {
        assert_eq!(parse_provider("Azure"), Ok(ProviderKind::AzureOpenAi));
        assert_eq!(parse_provider("Azure OpenAI"), Ok(ProviderKind::AzureOpenAi));
        assert_eq!(parse_provider("OPENAI"), Ok(ProviderKind::OpenAi));
        assert!(parse_provider("ollama").is_err());
    }
}
