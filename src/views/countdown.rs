//! One-second countdown used to throttle verification code requests

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Seconds to wait before another code may be requested
pub const CODE_RESEND_SECONDS: u32 = 60;

/// Ticking countdown published through a `watch` channel.
///
/// Restarting replaces the running countdown. Dropping the value stops the
/// background task.
pub struct Countdown {
    remaining: watch::Sender<u32>,
    task: Option<JoinHandle<()>>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub fn new() -> Self {
        let (remaining, _) = watch::channel(0);
        Self { remaining, task: None }
    }

    /// Start from `seconds`, cancelling any countdown in progress.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, seconds: u32) {
        self.cancel();
        self.remaining.send_replace(seconds);
        if seconds == 0 {
            return;
        }

        let remaining = self.remaining.clone();
        self.task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let mut left = 0;
                remaining.send_modify(|n| {
                    *n = n.saturating_sub(1);
                    left = *n;
                });
                if left == 0 {
                    break;
                }
            }
        }));
    }

    /// Cancel and reset to zero
    pub fn stop(&mut self) {
        self.cancel();
        self.remaining.send_replace(0);
    }

    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.remaining() > 0
    }

    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.subscribe()
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
