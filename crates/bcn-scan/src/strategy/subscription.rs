use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ScanEvent;

/// One attached listener: a task forwarding a native stream onto the
/// controller queue. Removed on [`Subscription::remove`] or drop.
#[derive(Debug)]
pub struct Subscription {
    event: &'static str,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn forward<T, F>(
        event: &'static str,
        mut rx: broadcast::Receiver<T>,
        queue: mpsc::UnboundedSender<ScanEvent>,
        wrap: F,
    ) -> Self
    where
        T: Clone + Send + 'static,
        F: Fn(T) -> ScanEvent + Send + 'static,
    {
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(msg) => {
                        if queue.send(wrap(msg)).is_err() {
                            break;
                        }
                    }
                    // Snapshots are complete; skipping stale ones loses nothing.
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(event, skipped, "listener lagged; stale snapshots skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!(event, "listener finished");
        });

        Self {
            event,
            task: Some(task),
        }
    }

    pub fn event(&self) -> &'static str {
        self.event
    }

    pub fn is_attached(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    pub fn remove(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(event = self.event, "listener removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}
