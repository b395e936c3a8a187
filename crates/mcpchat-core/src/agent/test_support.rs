//! Test doubles for the chat loop: a scripted console and a canned provider.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use super::console::{Console, Input};
use crate::provider::types::{ChatMessage, LlmResponse, Usage};
use crate::provider::LlmProvider;

enum Step {
    Input(Input),
    ReadError(String),
}

/// Console that replays scripted input and captures everything written.
/// Reads past the end of the script return `Input::Closed`.
pub struct ScriptedConsole {
    script: VecDeque<Step>,
    output: Vec<String>,
    prompts: usize,
    write_error: Option<io::ErrorKind>,
    prompt_error: Option<io::ErrorKind>,
    query_interrupts: usize,
}

impl ScriptedConsole {
    pub fn lines(lines: &[&str]) -> Self {
        Self {
            script: lines
                .iter()
                .map(|l| Step::Input(Input::Line(l.to_string())))
                .collect(),
            output: Vec::new(),
            prompts: 0,
            write_error: None,
            prompt_error: None,
            query_interrupts: 0,
        }
    }

    /// Every `write_line` fails with `kind`. Reads still succeed.
    pub fn failing_writes(mut self, kind: io::ErrorKind) -> Self {
        self.write_error = Some(kind);
        self
    }

    /// Showing the prompt fails with `kind`, so no input is ever consumed.
    pub fn failing_prompt(mut self, kind: io::ErrorKind) -> Self {
        self.prompt_error = Some(kind);
        self
    }

    /// Interrupt the next in-flight query.
    pub fn interrupt_query(mut self) -> Self {
        self.query_interrupts += 1;
        self
    }

    pub fn then(mut self, input: Input) -> Self {
        self.script.push_back(Step::Input(input));
        self
    }

    pub fn then_read_error(mut self, message: &str) -> Self {
        self.script.push_back(Step::ReadError(message.to_string()));
        self
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    /// Number of times a prompt was shown.
    pub fn prompts(&self) -> usize {
        self.prompts
    }

    /// Scripted steps never consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self, _prompt: &str) -> io::Result<Input> {
        if let Some(kind) = self.prompt_error {
            return Err(io::Error::new(kind, "prompt write failed"));
        }
        self.prompts += 1;
        match self.script.pop_front() {
            Some(Step::Input(input)) => Ok(input),
            Some(Step::ReadError(message)) => Err(io::Error::new(io::ErrorKind::Other, message)),
            None => Ok(Input::Closed),
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if let Some(kind) = self.write_error {
            return Err(io::Error::new(kind, "write failed"));
        }
        self.output.push(line.to_string());
        Ok(())
    }

    async fn interrupted(&mut self) {
        if self.query_interrupts == 0 {
            std::future::pending::<()>().await;
        }
        self.query_interrupts -= 1;
    }
}

enum Reply {
    Text(String),
    Fail(String),
    Hang,
}

/// Provider returning queued replies (or errors) and recording every request.
/// Replies with "ok" once the queue is empty. Clones share state.
#[derive(Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Text(reply.to_string()));
    }

    pub fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.to_string()));
    }

    /// The next call never completes.
    pub fn push_hang(&self) {
        self.replies.lock().unwrap().push_back(Reply::Hang);
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        _model: Option<&str>,
        _max_tokens: u32,
        _temperature: f32,
    ) -> anyhow::Result<LlmResponse> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let next = self.replies.lock().unwrap().pop_front();
        match next.unwrap_or_else(|| Reply::Text("ok".to_string())) {
            Reply::Text(content) => Ok(LlmResponse {
                content,
                finish_reason: "stop".into(),
                usage: Usage::default(),
            }),
            Reply::Fail(message) => Err(anyhow::anyhow!(message)),
            Reply::Hang => std::future::pending().await,
        }
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
