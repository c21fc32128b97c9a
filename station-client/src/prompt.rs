//! Alert and confirmation seam between view models and the front end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Blocking user interaction used by the dashboards
pub trait Prompter: Send + Sync {
    /// Show a message the user has to acknowledge.
    fn alert(&self, message: &str);

    /// Ask a yes/no question.
    fn confirm(&self, question: &str) -> bool;
}

/// Prompter that records alerts and answers every confirmation the same way.
///
/// Used by tests and by non-interactive front ends.
#[derive(Debug)]
pub struct ScriptedPrompter {
    answer: AtomicBool,
    alerts: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self {
            answer: AtomicBool::new(true),
            alerts: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Set the answer given to every confirmation.
    pub fn with_answer(self, answer: bool) -> Self {
        self.answer.store(answer, Ordering::SeqCst);
        self
    }

    /// Alerts shown so far, oldest first.
    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    /// Confirmation questions asked so far.
    pub fn questions(&self) -> Vec<String> {
        self.questions
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl Default for ScriptedPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for ScriptedPrompter {
    fn alert(&self, message: &str) {
        tracing::debug!("alert: {}", message);
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(message.to_string());
        }
    }

    fn confirm(&self, question: &str) -> bool {
        if let Ok(mut questions) = self.questions.lock() {
            questions.push(question.to_string());
        }
        self.answer.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_prompter_records() {
        let prompter = ScriptedPrompter::new().with_answer(false);
        prompter.alert("Age must be a number.");
        assert!(!prompter.confirm("Close this FIR?"));
        assert_eq!(prompter.alerts(), vec!["Age must be a number."]);
        assert_eq!(prompter.questions(), vec!["Close this FIR?"]);
    }
}
