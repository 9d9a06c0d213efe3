//! Stdin/stdout driver for the terminal.

use super::{AppContext, Terminal, commands::general::LOGIN_PROMPT};
use crate::{backend::Backend, core::ConfirmationGate, errors::Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tracing::info;

/// Line-oriented console over the process's standard streams.
pub struct Console {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Console over stdin/stdout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
        }
    }

    /// Next input line, `None` at end of input.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }

    /// Prints each line.
    pub async fn print(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            self.stdout.write_all(line.as_bytes()).await?;
            self.stdout.write_all(b"\n").await?;
        }
        self.stdout.flush().await?;
        Ok(())
    }

    async fn prompt(&mut self, text: &str) -> Result<()> {
        self.stdout.write_all(text.as_bytes()).await?;
        self.stdout.flush().await?;
        Ok(())
    }
}

impl ConfirmationGate for Console {
    async fn confirm(&mut self, prompt: &str) -> bool {
        if self.prompt(&format!("{prompt} (s/n) ")).await.is_err() {
            return false;
        }
        matches!(self.read_line().await, Ok(Some(answer)) if is_yes(&answer))
    }
}

/// `s`/`si`/`y`/`yes`, any case.
fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

/// Runs the terminal until `quit` or end of input.
///
/// # Errors
/// Returns an error only if the console itself fails; command failures are printed.
pub async fn run_terminal<B: Backend + Clone>(ctx: AppContext<B>) -> Result<()> {
    let mut terminal = Terminal::new(ctx);
    let mut console = Console::new();
    console.print(&[LOGIN_PROMPT.to_string()]).await?;

    while terminal.is_running() {
        console
            .prompt(&format!("{}> ", terminal.screen().path()))
            .await?;
        let Some(line) = console.read_line().await? else {
            break;
        };
        let out = terminal.handle_line(&line, &mut console).await;
        console.print(&out).await?;
    }

    info!("Terminal closed");
    Ok(())
}
