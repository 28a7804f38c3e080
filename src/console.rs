use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    style::Stylize,
    terminal::{self, Clear, ClearType},
    tty::IsTty,
};
use std::io::{self, BufRead, Write};
use url::Url;

/// Terminal interaction used by the provider selector and the chat session.
pub trait Console {
    /// Reads one line without its terminator. `None` means no line was available.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Like [`Console::read_line`] but without echoing the typed characters.
    fn read_secret(&mut self) -> Result<Option<String>>;

    fn write_line(&mut self, text: &str) -> Result<()>;

    /// Writes a highlighted speaker label such as `User:`.
    fn write_label(&mut self, label: &str) -> Result<()>;

    fn show_header(&mut self) -> Result<()>;
}

/// Asks for a non-empty value, repeating the question until one is given.
/// Returns `None` once the input is closed.
pub fn prompt_string(
    console: &mut dyn Console,
    prompt: &str,
    secret: bool,
) -> Result<Option<String>> {
    loop {
        console.write_line(prompt)?;
        let answer = if secret {
            console.read_secret()?
        } else {
            console.read_line()?
        };

        let Some(answer) = answer else {
            return Ok(None);
        };
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(Some(answer.to_string()));
        }
        console.write_line("A value is required.")?;
    }
}

/// Asks for an absolute http(s) URL. Returns `None` once the input is closed.
pub fn prompt_url(console: &mut dyn Console, prompt: &str) -> Result<Option<Url>> {
    loop {
        let Some(answer) = prompt_string(console, prompt, false)? else {
            return Ok(None);
        };
        match Url::parse(&answer) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => return Ok(Some(url)),
            _ => console.write_line("Please enter a valid http(s) URL.")?,
        }
    }
}

/// Shows a numbered menu and returns the chosen label. Accepts either the
/// number or the label itself. Returns `None` once the input is closed.
pub fn select_option(
    console: &mut dyn Console,
    prompt: &str,
    options: &[&str],
) -> Result<Option<String>> {
    loop {
        console.write_line(prompt)?;
        for (index, option) in options.iter().enumerate() {
            console.write_line(&format!("  {}) {}", index + 1, option))?;
        }

        let Some(answer) = console.read_line()? else {
            return Ok(None);
        };
        let answer = answer.trim();

        let by_number = answer
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| options.get(index));
        let by_label = options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(answer));

        match by_number.or(by_label) {
            Some(option) => return Ok(Some(option.to_string())),
            None => console.write_line("Please choose one of the listed options.")?,
        }
    }
}

/// Console backed by stdin/stdout.
pub struct TerminalConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_masked(&mut self) -> Result<Option<String>> {
        terminal::enable_raw_mode()?;
        let result = self.read_masked_raw();
        terminal::disable_raw_mode()?;
        write!(self.stdout, "\r\n")?;
        self.stdout.flush()?;
        result
    }

    fn read_masked_raw(&mut self) -> Result<Option<String>> {
        let mut secret = String::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Enter => return Ok(Some(secret)),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    anyhow::bail!("Input interrupted");
                }
                KeyCode::Char(c) => {
                    secret.push(c);
                    write!(self.stdout, "*")?;
                }
                KeyCode::Backspace => {
                    if secret.pop().is_some() {
                        write!(self.stdout, "\u{8} \u{8}")?;
                    }
                }
                _ => {}
            }
            self.stdout.flush()?;
        }
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn read_secret(&mut self) -> Result<Option<String>> {
        // Piped input has no terminal to switch into raw mode.
        if !self.stdin.is_tty() {
            return self.read_line();
        }
        self.read_masked()
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.stdout, "{}", text)?;
        Ok(())
    }

    fn write_label(&mut self, label: &str) -> Result<()> {
        writeln!(self.stdout, "{}", label.green().bold())?;
        Ok(())
    }

    fn show_header(&mut self) -> Result<()> {
        if self.stdout.is_tty() {
            execute!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        writeln!(self.stdout, "{}", "Weather Copilot".cyan().bold())?;
        writeln!(
            self.stdout,
            "{}",
            "OpenAI / Azure OpenAI + OpenWeatherMap".dark_grey()
        )?;
        writeln!(self.stdout)?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedConsole;
    use super::*;
    use std::collections::VecDeque;

    #[test]
    fn test_prompt_string_repeats_until_value() {
        let mut console = ScriptedConsole::with_lines(&["", "   ", "  abc  "]);
        let value = prompt_string(&mut console, "Key:", true).unwrap();
        assert_eq!(value.as_deref(), Some("abc"));
        assert_eq!(
            console
                .output
                .iter()
                .filter(|line| *line == "A value is required.")
                .count(),
            2
        );
    }

    #[test]
    fn test_prompt_url_rejects_non_http() {
        let mut console = ScriptedConsole::with_lines(&[
            "contoso.openai.azure.com",
            "ftp://contoso",
            "https://contoso.openai.azure.com/",
        ]);
        let url = prompt_url(&mut console, "Endpoint:").unwrap().unwrap();
        assert_eq!(url.host_str(), Some("contoso.openai.azure.com"));
    }

    #[test]
    fn test_select_option_by_number_or_label() {
        let options = ["Azure OpenAI", "OpenAI"];

        let mut console = ScriptedConsole::with_lines(&["2"]);
        assert_eq!(
            select_option(&mut console, "Host:", &options).unwrap().as_deref(),
            Some("OpenAI")
        );

        let mut console = ScriptedConsole::with_lines(&["azure openai"]);
        assert_eq!(
            select_option(&mut console, "Host:", &options).unwrap().as_deref(),
            Some("Azure OpenAI")
        );
    }

    #[test]
    fn test_select_option_repeats_on_invalid_choice() {
        let options = ["gpt-4o", "gpt-4o-mini"];
        let mut console = ScriptedConsole::with_lines(&["0", "3", "gpt-5", "1"]);

        assert_eq!(
            select_option(&mut console, "Model:", &options).unwrap().as_deref(),
            Some("gpt-4o")
        );
        assert_eq!(
            console
                .output
                .iter()
                .filter(|line| *line == "Please choose one of the listed options.")
                .count(),
            3
        );
    }

    fn closed_input() -> ScriptedConsole {
        ScriptedConsole {
            inputs: VecDeque::from(vec![None]),
            ..Default::default()
        }
    }

    #[test]
    fn test_prompts_stop_when_input_is_closed() {
        let mut console = closed_input();
        assert_eq!(prompt_string(&mut console, "Key:", true).unwrap(), None);
        assert_eq!(console.output, vec!["Key:".to_string()]);

        let mut console = closed_input();
        assert_eq!(prompt_url(&mut console, "Endpoint:").unwrap(), None);

        let mut console = closed_input();
        assert_eq!(
            select_option(&mut console, "Host:", &["Azure OpenAI", "OpenAI"]).unwrap(),
            None
        );
        assert!(console.inputs.is_empty());
        assert_eq!(console.output.len(), 3);
    }

    #[test]
    fn test_prompt_string_stops_when_input_closes_after_blank_answer() {
        let mut console = ScriptedConsole {
            inputs: VecDeque::from(vec![Some("   ".to_string()), None]),
            ..Default::default()
        };
        assert_eq!(prompt_string(&mut console, "Key:", false).unwrap(), None);
        assert_eq!(
            console.output,
            vec![
                "Key:".to_string(),
                "A value is required.".to_string(),
                "Key:".to_string(),
            ]
        );
    }
}
