//! Chat session: the interactive loop.
//!
//! Each iteration:
//! 1. Reads a line from the console (blank lines are skipped)
//! 2. Handles `exit`, `history` and `clear` without spending a step
//! 3. Otherwise sends the line to the LLM with the memory window in the
//!    system prompt, records both sides of the exchange, and prints the reply
//!
//! The loop stops on `exit`, on interrupt (at the prompt or while a query is
//! in flight), at end of input, or once `max_steps` queries have been
//! answered. Provider failures are reported as the reply and still count as
//! a step. Console failures are printed and the loop carries on, unless the
//! console reports a broken pipe or fails `MAX_CONSOLE_FAILURES` times in a
//! row.

pub mod bootstrap;
pub mod console;
pub mod memory;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;
use std::io;
use tracing::{debug, info, warn};

use crate::config::{ModelSettings, SessionConfig};
use crate::provider::types::{ChatMessage, Role};
use crate::provider::LlmProvider;
use crate::tools::McpClient;
use console::{Console, Input};
use memory::SessionMemory;

pub const PROMPT: &str = "You: ";

const PERSONA: &str = "You are a helpful AI assistant. \
    You engage in friendly conversation and can help with various tasks. \
    Be concise and helpful.";

/// History entries are cut to this many characters when displayed.
const HISTORY_PREVIEW_CHARS: usize = 100;

const RULE_WIDTH: usize = 60;

/// Consecutive failed iterations before the console is given up on.
const MAX_CONSOLE_FAILURES: u32 = 3;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Terminated,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Exit,
    StepBudget,
    Interrupted,
    EndOfInput,
    ConsoleLost,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::Exit => "exit",
            ExitReason::StepBudget => "step budget reached",
            ExitReason::Interrupted => "interrupted",
            ExitReason::EndOfInput => "end of input",
            ExitReason::ConsoleLost => "console unavailable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub steps: u32,
    pub reason: ExitReason,
}

/// A line of user input, classified.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Empty,
    Exit,
    History,
    Clear,
    Query(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Command::Empty
        } else if line.eq_ignore_ascii_case("exit") {
            Command::Exit
        } else if line.eq_ignore_ascii_case("history") {
            Command::History
        } else if line.eq_ignore_ascii_case("clear") {
            Command::Clear
        } else {
            Command::Query(line)
        }
    }
}

enum Flow {
    Continue,
    Stop(ExitReason),
}

pub struct ChatSession {
    settings: SessionConfig,
    model: ModelSettings,
    provider: Box<dyn LlmProvider>,
    tools: Option<McpClient>,
    memory: SessionMemory,
    state: SessionState,
    step_count: u32,
}

impl ChatSession {
    pub fn new(
        settings: SessionConfig,
        model: ModelSettings,
        provider: Box<dyn LlmProvider>,
        tools: Option<McpClient>,
    ) -> Self {
        let memory = SessionMemory::new(settings.memory_enabled());
        Self {
            settings,
            model,
            provider,
            tools,
            memory,
            state: SessionState::Running,
            step_count: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn tools(&self) -> Option<&McpClient> {
        self.tools.as_ref()
    }

    /// Run the interactive loop until it terminates.
    pub async fn run<C: Console + ?Sized>(&mut self, console: &mut C) -> SessionSummary {
        info!(settings = %self.settings, "Starting chat session");
        if let Err(e) = self.print_banner(console) {
            warn!(error = %e, "Failed to print session banner");
        }

        let mut failures = 0;
        let reason = loop {
            if self.step_count >= self.settings.max_steps() {
                break ExitReason::StepBudget;
            }

            match self.iterate(console).await {
                Ok(Flow::Continue) => failures = 0,
                Ok(Flow::Stop(reason)) => break reason,
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    warn!(error = %e, "Console closed");
                    break ExitReason::ConsoleLost;
                }
                Err(e) => {
                    warn!(error = %e, failures, "Chat iteration failed");
                    let _ = console.write_line(&format!("\nError: {}\n", e));
                    failures += 1;
                    if failures >= MAX_CONSOLE_FAILURES {
                        break ExitReason::ConsoleLost;
                    }
                }
            }
        };

        self.state = SessionState::Terminated;
        info!(steps = self.step_count, %reason, "Chat session ended");

        let rule = "=".repeat(RULE_WIDTH);
        let _ = console.write_line(&format!("\n{}", rule));
        let _ = console.write_line(&format!("Session ended. Total steps: {}", self.step_count));
        let _ = console.write_line(&rule);

        SessionSummary {
            steps: self.step_count,
            reason,
        }
    }

    async fn iterate<C: Console + ?Sized>(&mut self, console: &mut C) -> io::Result<Flow> {
        let line = match console.read_line(PROMPT).await? {
            Input::Line(line) => line,
            Input::Interrupted => return Ok(interrupted(console)),
            Input::Closed => {
                debug!("Console input closed");
                return Ok(Flow::Stop(ExitReason::EndOfInput));
            }
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Exit => {
                let _ = console.write_line("\nGoodbye! Thanks for chatting.");
                return Ok(Flow::Stop(ExitReason::Exit));
            }
            Command::History => self.print_history(console)?,
            Command::Clear => {
                self.memory.clear();
                console.write_line("\n✓ Memory cleared\n")?;
            }
            Command::Query(query) => {
                let reply = tokio::select! {
                    reply = self.process_query(query) => reply,
                    _ = console.interrupted() => return Ok(interrupted(console)),
                };
                self.step_count += 1;
                console.write_line(&format!("\nAgent: {}\n", reply))?;
            }
        }

        Ok(Flow::Continue)
    }

    /// Send one query to the provider and record the exchange.
    ///
    /// Always returns text to show the user: the reply, or the error message
    /// when the provider call failed.
    pub async fn process_query(&mut self, input: &str) -> String {
        self.memory.record(Role::User, input);

        let messages = [
            ChatMessage::system(self.system_prompt()),
            ChatMessage::user(input),
        ];

        debug!(chars = input.len(), history = self.memory.len(), "Processing query");

        match self
            .provider
            .chat(&messages, None, self.model.max_tokens, self.model.temperature)
            .await
        {
            Ok(response) => {
                debug!(tokens = response.usage.total_tokens, "Query answered");
                self.memory.record(Role::Assistant, &response.content);
                response.content
            }
            Err(e) => {
                warn!(error = %e, "LLM request failed");
                let error_msg = format!("Error processing query: {:#}", e);
                self.memory
                    .record(Role::Assistant, &format!("Error: {}", error_msg));
                error_msg
            }
        }
    }

    fn system_prompt(&self) -> String {
        let context = self.memory.render_context();
        if context.is_empty() {
            PERSONA.to_string()
        } else {
            format!("{}\n\n{}", PERSONA, context)
        }
    }

    /// Every recorded message, each cut to `HISTORY_PREVIEW_CHARS`. Unlike a
    /// fixed suffix, `...` marks only entries that were actually shortened.
    fn print_history<C: Console + ?Sized>(&self, console: &mut C) -> io::Result<()> {
        let entries = self.memory.entries();
        if entries.is_empty() {
            return console.write_line("\nNo conversation history yet.\n");
        }

        console.write_line("\n=== Conversation Memory ===")?;
        for msg in entries {
            console.write_line(&format!(
                "{}: {}",
                msg.role.label(),
                preview(&msg.content, HISTORY_PREVIEW_CHARS)
            ))?;
        }
        console.write_line("")
    }

    fn print_banner<C: Console + ?Sized>(&self, console: &mut C) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        let servers = match &self.tools {
            Some(client) => client.len().to_string(),
            None => "disabled".to_string(),
        };

        console.write_line(&format!("\n{}", rule))?;
        console.write_line("MCP Chat with Conversation Memory - CLI Interface")?;
        console.write_line(&rule)?;
        console.write_line(&format!("Model: {}", self.provider.default_model()))?;
        console.write_line(&format!("MCP Servers: {}", servers))?;
        console.write_line(&format!("Max Steps: {}", self.settings.max_steps()))?;
        console.write_line(&format!("Memory Enabled: {}", self.memory.is_enabled()))?;
        console.write_line("Type 'exit' to quit, 'history' to see memory, 'clear' to reset\n")
    }
}

fn interrupted<C: Console + ?Sized>(console: &mut C) -> Flow {
    let _ = console.write_line("\n\nInterrupted by user.");
    Flow::Stop(ExitReason::Interrupted)
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
