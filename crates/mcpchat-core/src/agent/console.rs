//! Line-oriented console used by the chat loop.

use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Notify;
use tracing::warn;

/// What a single read from the console produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl+C while waiting for input.
    Interrupted,
    /// The input stream was closed (EOF).
    Closed,
}

#[async_trait]
pub trait Console: Send {
    /// Show `prompt` and wait for the next line.
    async fn read_line(&mut self, prompt: &str) -> io::Result<Input>;

    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Resolves when the user interrupts outside of `read_line`, e.g. while
    /// a query is in flight. Consoles without interrupts never resolve.
    async fn interrupted(&mut self) {
        std::future::pending::<()>().await
    }
}

/// Console backed by the process stdin/stdout.
pub struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
    interrupts: Option<Arc<Notify>>,
}

impl StdConsole {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            interrupts: None,
        }
    }

    /// Shared Ctrl+C notifier. The listener task is spawned on first use
    /// and keeps one pending permit, so a signal that arrives between two
    /// waits is still delivered to the next one.
    fn interrupts(&mut self) -> Arc<Notify> {
        self.interrupts
            .get_or_insert_with(|| {
                let notify = Arc::new(Notify::new());
                let tx = Arc::clone(&notify);
                tokio::spawn(async move {
                    loop {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            warn!(error = %e, "Failed to listen for Ctrl+C");
                            break;
                        }
                        tx.notify_one();
                    }
                });
                notify
            })
            .clone()
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn read_line(&mut self, prompt: &str) -> io::Result<Input> {
        let interrupts = self.interrupts();
        {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
        }

        tokio::select! {
            line = self.lines.next_line() => match line? {
                Some(line) => Ok(Input::Line(line)),
                None => Ok(Input::Closed),
            },
            _ = interrupts.notified() => Ok(Input::Interrupted),
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", line)
    }

    async fn interrupted(&mut self) {
        let interrupts = self.interrupts();
        interrupts.notified().await;
    }
}
