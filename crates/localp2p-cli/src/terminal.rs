//! Terminal-backed prompter
//!
//! Lists and text input go through dialoguer on a blocking thread; daemon
//! calls show an indicatif spinner.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use localp2p_core::prompt::{PromptError, Prompter, Validator};

#[derive(Default)]
pub struct TerminalPrompter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn select_one(&self, prompt: &str, labels: &[String]) -> Result<usize, PromptError> {
        let prompt = prompt.to_string();
        let labels = labels.to_vec();

        let selection = tokio::task::spawn_blocking(move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .items(&labels)
                .interact_opt()
        })
        .await
        .map_err(|e| PromptError::Io(std::io::Error::other(e)))?;

        match selection {
            Ok(Some(index)) => Ok(index),
            Ok(None) => Err(PromptError::Cancelled),
            Err(e) => Err(prompt_error(e)),
        }
    }

    async fn get_text(&self, prompt: &str, validate: Validator) -> Result<String, PromptError> {
        let prompt = prompt.to_string();

        let input = tokio::task::spawn_blocking(move || {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .validate_with(move |input: &String| validate(input))
                .interact_text()
        })
        .await
        .map_err(|e| PromptError::Io(std::io::Error::other(e)))?;

        input.map_err(prompt_error)
    }

    fn begin_activity(&self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));

        if let Some(previous) = self.lock().replace(spinner) {
            previous.finish_and_clear();
        }
    }

    fn end_activity(&self) {
        if let Some(spinner) = self.lock().take() {
            spinner.finish_and_clear();
        }
    }
}

impl TerminalPrompter {
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn prompt_error(err: dialoguer::Error) -> PromptError {
    match err {
        dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
            PromptError::Cancelled
        }
        dialoguer::Error::IO(e) => PromptError::Io(e),
    }
}
