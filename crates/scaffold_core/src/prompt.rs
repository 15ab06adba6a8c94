//! Interactive questions.
//!
//! Every question returns `Ok(None)` when the user cancels (Esc, `q`, Ctrl-C)
//! so callers can tell an abort apart from an empty answer and from a failure.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use log::debug;
use std::io;

/// Result of a workflow that the user may abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

pub trait Prompt {
    fn ask_text(&mut self, message: &str, default: &str) -> Result<Option<String>>;

    /// Index into `choices` of the selected item.
    fn ask_select(&mut self, message: &str, choices: &[String]) -> Result<Option<usize>>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<Option<bool>>;
}

/// Terminal prompts.
#[derive(Debug, Default)]
pub struct DialoguerPrompt;

impl Prompt for DialoguerPrompt {
    fn ask_text(&mut self, message: &str, default: &str) -> Result<Option<String>> {
        let mut input = Input::<String>::new().with_prompt(message).allow_empty(true);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        cancelled_on_interrupt(input.interact_text())
    }

    fn ask_select(&mut self, message: &str, choices: &[String]) -> Result<Option<usize>> {
        let selection = Select::new().with_prompt(message).items(choices).default(0).interact_opt();
        Ok(cancelled_on_interrupt(selection)?.flatten())
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<Option<bool>> {
        let answer = Confirm::new().with_prompt(message).default(default).interact_opt();
        Ok(cancelled_on_interrupt(answer)?.flatten())
    }
}

fn cancelled_on_interrupt<T>(res: std::result::Result<T, dialoguer::Error>) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted => {
            debug!("Prompt interrupted");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
