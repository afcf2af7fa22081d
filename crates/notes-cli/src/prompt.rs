use std::io::{self, Write};
use std::sync::Arc;

use async_trait::async_trait;
use notes_sync::Confirm;
use tokio::sync::{mpsc, Mutex};

use crate::config::RestorePolicy;

/// Lines typed by the user, shared by the command loop and prompts.
pub type InputLines = Arc<Mutex<mpsc::Receiver<String>>>;

/// Answers draft-restore questions according to the configured policy,
/// asking on the terminal when the policy is [`RestorePolicy::Ask`].
pub struct TerminalConfirm {
    policy: RestorePolicy,
    input: InputLines,
}

impl TerminalConfirm {
    pub fn new(policy: RestorePolicy, input: InputLines) -> Self {
        Self { policy, input }
    }
}

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, message: &str) -> bool {
        match self.policy {
            RestorePolicy::Always => true,
            RestorePolicy::Never => false,
            RestorePolicy::Ask => {
                print!("{} [y/N] ", message);
                let _ = io::stdout().flush();

                let answer = self.input.lock().await.recv().await;
                answer.as_deref().map(is_yes).unwrap_or(false)
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
