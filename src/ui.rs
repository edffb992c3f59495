// UI layer: every prompt and every line printed by the review loop goes
// through the `Console` trait. `TerminalConsole` is the interactive
// implementation built on `dialoguer`, with `indicatif` spinners while the
// API is busy and the `open` crate for external links.

use dialoguer::{Input, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Check applied to free-text input; `Err` carries the message to show
/// before asking again.
pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), String>;

#[derive(Error, Debug)]
pub enum PromptError {
    /// The user interrupted (Ctrl-C) or input ran out. Ends the session.
    #[error("input aborted")]
    Aborted,

    #[error("terminal error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for PromptError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof => PromptError::Aborted,
            _ => PromptError::Io(err),
        }
    }
}

/// Spinner handle; clears itself when dropped.
pub struct Busy(Option<ProgressBar>);

impl Busy {
    pub fn idle() -> Self {
        Busy(None)
    }
}

impl Drop for Busy {
    fn drop(&mut self) {
        if let Some(pb) = self.0.take() {
            pb.finish_and_clear();
        }
    }
}

pub trait Console {
    fn say(&mut self, line: &str);

    fn text(
        &mut self,
        prompt: &str,
        initial: &str,
        validate: Option<Validator<'_>>,
    ) -> Result<String, PromptError>;

    /// Pick one item. `Ok(None)` means the user backed out (Esc).
    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, PromptError>;

    /// Pick any number of items. `Ok(None)` means the user backed out.
    fn multi_select(
        &mut self,
        prompt: &str,
        items: &[String],
        checked: &[bool],
    ) -> Result<Option<Vec<usize>>, PromptError>;

    fn open_link(&mut self, url: &str) -> io::Result<()>;

    fn busy(&mut self, _message: &str) -> Busy {
        Busy::idle()
    }
}

fn accept_any(_: &str) -> Result<(), String> {
    Ok(())
}

/// Interactive console on the real terminal.
#[derive(Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        TerminalConsole
    }
}

impl Console for TerminalConsole {
    fn say(&mut self, line: &str) {
        println!("{line}");
    }

    fn text(
        &mut self,
        prompt: &str,
        initial: &str,
        validate: Option<Validator<'_>>,
    ) -> Result<String, PromptError> {
        let check = validate.unwrap_or(&accept_any);
        let value = Input::<String>::new()
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .validate_with(|input: &String| check(input.as_str()))
            .interact_text()?;
        Ok(value)
    }

    fn select(
        &mut self,
        prompt: &str,
        items: &[String],
        default: usize,
    ) -> Result<Option<usize>, PromptError> {
        if items.is_empty() {
            return Ok(None);
        }
        let picked = Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default.min(items.len() - 1))
            .interact_opt()?;
        Ok(picked)
    }

    fn multi_select(
        &mut self,
        prompt: &str,
        items: &[String],
        checked: &[bool],
    ) -> Result<Option<Vec<usize>>, PromptError> {
        if items.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let picked = MultiSelect::new()
            .with_prompt(prompt)
            .items(items)
            .defaults(checked)
            .interact_opt()?;
        Ok(picked)
    }

    fn open_link(&mut self, url: &str) -> io::Result<()> {
        open::that(url)
    }

    fn busy(&mut self, message: &str) -> Busy {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Busy(Some(spinner))
    }
}
