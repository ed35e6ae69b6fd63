//! Simulated email notifications
//!
//! Sending is detached from the request: the handler schedules a task and
//! returns immediately. Delivery is simulated with a delay and a log line.

use std::time::Duration;
use tokio::task::JoinHandle;

/// Default simulated delivery delay
pub const DEFAULT_NOTIFICATION_DELAY: Duration = Duration::from_secs(2);

/// Schedules notification tasks on the tokio runtime
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    delay: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_DELAY)
    }
}

impl Notifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Tell `email` that a todo titled `title` was created
    pub fn todo_created(&self, email: String, title: String) -> JoinHandle<()> {
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!("Email sent to {}: new todo created - '{}'", email, title);
        })
    }
}
