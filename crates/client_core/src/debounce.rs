use std::{future::Future, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle, time};

/// Single-slot cancellable timer enforcing single-flight debounce:
/// scheduling aborts and replaces any not-yet-fired timer, so at most one
/// delayed task is pending at a time. A task that has already started
/// running is not interrupted.
#[derive(Default)]
pub struct DebounceSlot {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebounceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.pending.lock().await;
        if let Some(prev) = slot.take() {
            prev.abort();
        }
        *slot = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            task.await;
        }));
    }

    pub async fn cancel(&self) {
        if let Some(prev) = self.pending.lock().await.take() {
            prev.abort();
        }
    }
}
