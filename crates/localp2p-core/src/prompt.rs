//! Interactive disambiguation
//!
//! Commands fall back to a [`Prompter`] when the operator leaves out a
//! required input. The CLI drives a terminal implementation; tests drive
//! [`ScriptedPrompter`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Checks a free-text answer; `Err` carries the message shown before re-prompting
pub type Validator = fn(&str) -> std::result::Result<(), String>;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Cancelled by user")]
    Cancelled,

    #[error("Selection {0} is out of range")]
    InvalidSelection(usize),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// One entry of a single-choice list
#[derive(Debug, Clone, PartialEq)]
pub struct Choice<T> {
    pub label: String,
    pub value: T,
}

impl<T> Choice<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[async_trait]
pub trait Prompter: Send + Sync {
    /// Present `labels` and block until one is chosen; returns its index
    async fn select_one(&self, prompt: &str, labels: &[String]) -> Result<usize, PromptError>;

    /// Read free text, re-prompting until `validate` accepts it
    async fn get_text(&self, prompt: &str, validate: Validator) -> Result<String, PromptError>;

    /// Called before a daemon call starts
    fn begin_activity(&self, _message: &str) {}

    /// Called once the daemon call has finished
    fn end_activity(&self) {}
}

/// Present `choices` and return the chosen value
pub async fn select_choice<P, T>(
    prompter: &P,
    prompt: &str,
    choices: &[Choice<T>],
) -> Result<T, PromptError>
where
    P: Prompter + ?Sized,
    T: Clone,
{
    let labels: Vec<String> = choices.iter().map(|c| c.label.clone()).collect();
    let index = prompter.select_one(prompt, &labels).await?;
    choices
        .get(index)
        .map(|c| c.value.clone())
        .ok_or(PromptError::InvalidSelection(index))
}

/// Accepts any input that is not blank after trimming
pub fn non_empty(input: &str) -> Result<(), String> {
    if input.trim().is_empty() {
        Err("Message cannot be empty".to_string())
    } else {
        Ok(())
    }
}

/// Something a [`ScriptedPrompter`] was asked or rejected
#[derive(Debug, Clone, PartialEq)]
pub enum PromptRecord {
    Select { prompt: String, labels: Vec<String> },
    Text { prompt: String },
    Rejected { input: String, reason: String },
}

#[derive(Debug, Default)]
struct Script {
    selections: VecDeque<usize>,
    answers: VecDeque<String>,
    records: Vec<PromptRecord>,
}

/// Deterministic prompter fed from queued answers.
///
/// An exhausted queue behaves like the operator cancelling.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    script: Mutex<Script>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the index returned by the next `select_one`
    pub fn select(self, index: usize) -> Self {
        self.with_script(|s| s.selections.push_back(index))
    }

    /// Queue one line of text input
    pub fn answer(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_script(|s| s.answers.push_back(text))
    }

    pub fn records(&self) -> Vec<PromptRecord> {
        self.lock().records.clone()
    }

    /// Label lists of every `select_one` call, in order
    pub fn selections_shown(&self) -> Vec<Vec<String>> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                PromptRecord::Select { labels, .. } => Some(labels),
                _ => None,
            })
            .collect()
    }

    pub fn text_prompts(&self) -> usize {
        self.records()
            .iter()
            .filter(|r| matches!(r, PromptRecord::Text { .. }))
            .count()
    }

    pub fn rejections(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter_map(|r| match r {
                PromptRecord::Rejected { input, .. } => Some(input),
                _ => None,
            })
            .collect()
    }

    pub fn is_untouched(&self) -> bool {
        self.lock().records.is_empty()
    }

    fn with_script(self, f: impl FnOnce(&mut Script)) -> Self {
        f(&mut self.lock());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test thread must not hide the script from the others
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn select_one(&self, prompt: &str, labels: &[String]) -> Result<usize, PromptError> {
        let mut script = self.lock();
        script.records.push(PromptRecord::Select {
            prompt: prompt.to_string(),
            labels: labels.to_vec(),
        });
        script.selections.pop_front().ok_or(PromptError::Cancelled)
    }

    async fn get_text(&self, prompt: &str, validate: Validator) -> Result<String, PromptError> {
        let mut script = self.lock();
        script.records.push(PromptRecord::Text {
            prompt: prompt.to_string(),
        });
        while let Some(input) = script.answers.pop_front() {
            match validate(&input) {
                Ok(()) => return Ok(input),
                Err(reason) => script.records.push(PromptRecord::Rejected { input, reason }),
            }
        }
        Err(PromptError::Cancelled)
    }
}
