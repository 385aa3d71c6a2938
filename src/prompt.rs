//! Operator interaction: prompts, confirmations and notifications.
//!
//! Workflow code only talks to the [`Prompter`] trait. `None` from `prompt`
//! or `confirm` means the operator cancelled.

use std::cell::RefCell;
use std::io::{self, BufRead, BufReader, Write};

/// A free-text question for the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSpec {
    pub message: String,
    /// Value used when the operator submits a blank answer.
    pub default: Option<String>,
    /// Example shown when there is no default.
    pub placeholder: Option<String>,
}

impl PromptSpec {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

pub trait Prompter {
    /// Ask for a value; `None` when cancelled or left blank without a default.
    fn prompt(&self, spec: &PromptSpec) -> Option<String>;

    /// Offer `options`; returns the chosen one, or `None` when declined.
    fn confirm(&self, message: &str, options: &[&str]) -> Option<String>;

    /// Report an outcome.
    fn notify(&self, message: &str);

    /// Best-effort progress line.
    fn progress(&self, message: &str);
}

/// Interactive prompter on stdin/stderr.
///
/// With `assume_yes`, confirmations pick the first option and prompts take
/// their defaults without reading input.
pub struct TerminalPrompter {
    assume_yes: bool,
    input: RefCell<Box<dyn BufRead>>,
    output: RefCell<Box<dyn Write>>,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self::with_io(
            assume_yes,
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stderr()),
        )
    }

    pub fn with_io(assume_yes: bool, input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self {
            assume_yes,
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    /// Print `question` and read one trimmed line; `None` on EOF or read error.
    fn ask(&self, question: &str) -> Option<String> {
        {
            let mut output = self.output.borrow_mut();
            let _ = write!(output, "{}", question);
            let _ = output.flush();
        }

        let mut line = String::new();
        match self.input.borrow_mut().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn prompt(&self, spec: &PromptSpec) -> Option<String> {
        if self.assume_yes {
            return spec.default.clone();
        }

        let hint = match (&spec.default, &spec.placeholder) {
            (Some(default), _) => format!(" [{}]", default),
            (None, Some(placeholder)) => format!(" (e.g. {})", placeholder),
            (None, None) => String::new(),
        };
        let answer = self.ask(&format!("{}{}: ", spec.message, hint))?;
        if answer.is_empty() {
            spec.default.clone()
        } else {
            Some(answer)
        }
    }

    fn confirm(&self, message: &str, options: &[&str]) -> Option<String> {
        let first = options.first()?;
        if self.assume_yes {
            return Some(first.to_string());
        }

        let mut question = format!("{}\n", message);
        for (i, option) in options.iter().enumerate() {
            question.push_str(&format!("  {}) {}\n", i + 1, option));
        }
        question.push_str(&format!(
            "Choose [1-{}], or press enter to cancel: ",
            options.len()
        ));

        let answer = self.ask(&question)?;
        if options.len() == 1 && matches!(answer.to_lowercase().as_str(), "y" | "yes") {
            return Some(first.to_string());
        }
        answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
            .map(|option| option.to_string())
    }

    fn notify(&self, message: &str) {
        println!("{}", message);
    }

    fn progress(&self, message: &str) {
        let mut output = self.output.borrow_mut();
        let _ = writeln!(output, "{}...", message);
    }
}
