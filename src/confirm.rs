use std::io::{self, BufRead, Write};

use tool_gateway::ConfirmationGate;

/// Interactive gate backed by stdin. Anything other than an explicit yes is
/// a denial.
#[derive(Debug, Default)]
pub struct StdinGate;

impl ConfirmationGate for StdinGate {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }

        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}
