//! Terminal implementation of the dashboard prompter.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use station_client::Prompter;

/// Alerts go to stderr; confirmations read a `y`/`n` answer from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompter {
    assume_yes: bool,
    alerted: AtomicBool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            alerted: AtomicBool::new(false),
        }
    }

    /// Whether any alert has been shown.
    pub fn alerted(&self) -> bool {
        self.alerted.load(Ordering::SeqCst)
    }
}

impl Prompter for TerminalPrompter {
    fn alert(&self, message: &str) {
        self.alerted.store(true, Ordering::SeqCst);
        eprintln!("{}", message);
    }

    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let mut stderr = io::stderr();
        let _ = write!(stderr, "{} [y/N] ", question);
        let _ = stderr.flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn test_assume_yes_skips_stdin() {
        let prompter = TerminalPrompter::new(true);
        assert!(prompter.confirm("Close this FIR?"));
        assert!(!prompter.alerted());
        prompter.alert("Escalation submitted.");
        assert!(prompter.alerted());
    }
}
