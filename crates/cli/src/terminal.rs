//! Terminal operator — the human at the keyboard.
//!
//! Reads answers line by line from stdin. EOF (Ctrl+D) or an exit command
//! closes the input, which ends the session.

use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use wrapwright_core::error::OperatorError;
use wrapwright_core::operator::Operator;

pub struct TerminalOperator {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl TerminalOperator {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(io::stdin()).lines()),
        }
    }

    async fn ask(&self, text: &str) -> Result<String, OperatorError> {
        let io_error = |e: std::io::Error| OperatorError::Io(e.to_string());

        let mut stdout = io::stdout();
        stdout.write_all(text.as_bytes()).await.map_err(io_error)?;
        stdout.flush().await.map_err(io_error)?;

        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) if is_exit_command(&line) => Err(OperatorError::InputClosed),
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(OperatorError::InputClosed),
            Err(e) => Err(io_error(e)),
        }
    }
}

impl Default for TerminalOperator {
    fn default() -> Self {
        Self::new()
    }
}

fn is_exit_command(line: &str) -> bool {
    matches!(line.trim(), "exit" | "quit" | "/exit" | "/quit" | ":q")
}

#[async_trait]
impl Operator for TerminalOperator {
    async fn prompt(&self, label: &str) -> Result<String, OperatorError> {
        self.ask(&format!("\n  {label}")).await
    }

    async fn confirm(&self, question: &str) -> Result<String, OperatorError> {
        self.ask(&format!("\n{question}> ")).await
    }
}
