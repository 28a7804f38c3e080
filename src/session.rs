use anyhow::Result;
use std::time::Duration;
use tracing::{debug, warn};

use crate::console::Console;
use crate::llm::{ChatClient, Completion, Message, Tool};
use crate::tools::{ToolBox, ToolKind};

/// Pause after a read that produced no line, so a closed stdin does not spin.
const EMPTY_READ_BACKOFF: Duration = Duration::from_millis(200);

/// One chat session: the selected client, the declared tools and the
/// conversation so far.
pub struct Session {
    client: Box<dyn ChatClient>,
    toolbox: ToolBox,
    tools: Vec<Tool>,
    history: Vec<Message>,
}

impl Session {
    pub fn new(client: Box<dyn ChatClient>, toolbox: ToolBox) -> Self {
        Self {
            client,
            toolbox,
            tools: ToolKind::definitions(),
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Reads prompts and answers them until the process is stopped or the
    /// chat service fails.
    pub async fn run(&mut self, console: &mut dyn Console) -> Result<()> {
        loop {
            console.write_label("User:")?;
            let prompt = loop {
                match console.read_line()? {
                    Some(line) => break line,
                    None => tokio::time::sleep(EMPTY_READ_BACKOFF).await,
                }
            };
            console.write_line("")?;

            let reply = self.respond(prompt).await?;
            debug!(turns = self.history().len(), "Turn complete");

            console.write_label("Copilot:")?;
            if let Some(reply) = reply {
                console.write_line(&reply)?;
            }
            console.write_line("")?;
        }
    }

    /// Handles one user prompt and returns the text to show for this turn.
    ///
    /// Only the prompt is kept in the history; neither the model's reply nor
    /// tool output is fed back.
    pub async fn respond(&mut self, prompt: String) -> Result<Option<String>> {
        self.history.push(Message::user(prompt));

        let completion = self.client.complete(&self.history, &self.tools).await?;

        match completion {
            Completion::Stop(text) => Ok(Some(text)),
            Completion::ToolCalls(calls) => match calls.first() {
                Some(call) => {
                    if calls.len() > 1 {
                        debug!(ignored = calls.len() - 1, "Ignoring additional tool calls");
                    }
                    Ok(Some(self.toolbox.dispatch(call).await))
                }
                None => {
                    warn!("Model finished with tool_calls but sent none");
                    Ok(None)
                }
            },
            Completion::Incomplete(reason) => {
                warn!(reason = %reason, model = self.client.model(), "Completion ended without an answer");
                Ok(None)
            }
        }
    }
}
