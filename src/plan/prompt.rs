//! Operator prompt for plan steps.

use colored::Colorize;
use dialoguer::Input;

use crate::error::CouError;

/// Operator decision for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Continue,
    Abort,
    Skip,
}

impl Choice {
    /// Parse an operator answer; case-insensitive, surrounding whitespace ignored.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "c" => Some(Choice::Continue),
            "a" => Some(Choice::Abort),
            "s" => Some(Choice::Skip),
            _ => None,
        }
    }
}

/// Render the eye-catching prompt for a step.
pub fn prompt_text(description: &str) -> String {
    format!(
        "{}{}{}{}{}{}{}",
        format!("{} (", description).red(),
        "c".red().bold(),
        ")ontinue/(".red(),
        "a".red().bold(),
        ")bort/(".red(),
        "s".red().bold(),
        ")kip".red(),
    )
}

/// Source of operator decisions.
pub trait Prompter {
    /// Show a prompt that was answered automatically.
    fn announce(&mut self, prompt: &str);

    /// Show a prompt and block until the operator answers with one line.
    fn ask(&mut self, prompt: &str) -> Result<String, CouError>;
}

/// Prompter reading answers from the terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn announce(&mut self, prompt: &str) {
        println!("{}: c", prompt);
    }

    fn ask(&mut self, prompt: &str) -> Result<String, CouError> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CouError::Prompt(e.to_string()))
    }
}
