mod cli;
mod console;
mod llm;
mod provider;
mod session;
mod tools;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use console::{prompt_string, Console, TerminalConsole};
use provider::ProviderSettings;
use session::Session;
use tools::weather::OpenWeatherMapClient;
use tools::ToolBox;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut console = TerminalConsole::new();
    console.show_header()?;

    let weather_api_key = match cli::env_secret("OPENWEATHERMAP_API_KEY") {
        Some(key) => Some(key),
        None => prompt_string(
            &mut console,
            "Please insert the OpenWeatherMap API key:",
            true,
        )?,
    };
    let Some(weather_api_key) = weather_api_key else {
        console.write_line("No OpenWeatherMap API key was provided.")?;
        return Ok(());
    };
    let toolbox = ToolBox::new(Box::new(OpenWeatherMapClient::new(weather_api_key)));

    let settings = cli.provider_settings();

    match cli.command {
        Some(Commands::Weather { city }) => {
            console.write_line(&toolbox.weather(&city.join(" ")).await)?;
        }
        Some(Commands::Ask { message }) => {
            let Some(mut session) = start_session(&mut console, &settings, toolbox)? else {
                return Ok(());
            };
            let reply = session.respond(message.join(" ")).await?;
            console.write_label("Copilot:")?;
            if let Some(reply) = reply {
                console.write_line(&reply)?;
            }
        }
        None => {
            let Some(mut session) = start_session(&mut console, &settings, toolbox)? else {
                return Ok(());
            };
            console.show_header()?;
            session.run(&mut console).await?;
        }
    }

    Ok(())
}

/// Builds the chat client, reporting a failed selection on the console.
fn start_session(
    console: &mut dyn Console,
    settings: &ProviderSettings,
    toolbox: ToolBox,
) -> Result<Option<Session>> {
    match provider::select_provider(console, settings)? {
        Some(client) => Ok(Some(Session::new(client, toolbox))),
        None => {
            console.write_line("Client creation failed.")?;
            Ok(None)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
