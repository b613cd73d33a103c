//! Line-oriented terminal input.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Reads answers from stdin one line at a time.
pub struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    /// Console over the process's standard input.
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `prompt` and wait for a line. `None` at end of input.
    pub async fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        print!("{}", prompt);
        std::io::stdout().flush()?;
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }

    /// Ask until a non-blank answer arrives.
    pub async fn ask_required(&mut self, prompt: &str) -> std::io::Result<String> {
        loop {
            match self.ask(prompt).await? {
                Some(answer) if !answer.is_empty() => return Ok(answer),
                Some(_) => continue,
                None => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "input closed before an answer was given",
                    ));
                }
            }
        }
    }
}
