//! Transient toast messages

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// How long a toast stays visible
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// What the toast area shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toast {
    pub visible: bool,
    pub text: String,
}

struct Inner {
    toast: watch::Sender<Toast>,
    /// Bumped by every show/close; a timer only closes its own toast
    generation: AtomicU64,
}

/// Toast store; clones share state
#[derive(Clone)]
pub struct MessageStore {
    inner: Arc<Inner>,
}

impl MessageStore {
    pub fn new() -> Self {
        let (toast, _) = watch::channel(Toast::default());
        Self {
            inner: Arc::new(Inner {
                toast,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Show `text` and close it after [`TOAST_DURATION`]
    ///
    /// Empty text is ignored. Must be called inside a tokio runtime.
    pub fn show(&self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(text = %text, "Showing toast");
        self.inner.toast.send_replace(Toast {
            visible: true,
            text,
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(TOAST_DURATION).await;
            if inner.generation.load(Ordering::SeqCst) == generation {
                Self::hide(&inner);
            }
        });
    }

    pub fn close(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        Self::hide(&self.inner);
    }

    pub fn current(&self) -> Toast {
        self.inner.toast.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.toast.borrow().visible
    }

    pub fn watch(&self) -> watch::Receiver<Toast> {
        self.inner.toast.subscribe()
    }

    fn hide(inner: &Inner) {
        inner.toast.send_replace(Toast::default());
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn toast_closes_after_timeout() {
        let messages = MessageStore::new();
        messages.show("Saved");
        assert_eq!(messages.current().text, "Saved");
        assert!(messages.is_visible());

        tokio::time::sleep(TOAST_DURATION - Duration::from_millis(1)).await;
        assert!(messages.is_visible());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(messages.current(), Toast::default());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_toast_outlives_older_timer() {
        let messages = MessageStore::new();
        messages.show("first");
        tokio::time::sleep(Duration::from_secs(2)).await;
        messages.show("second");

        // First timer fires here but no longer owns the toast
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(messages.current().text, "second");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!messages.is_visible());
    }

    #[tokio::test]
    async fn empty_text_is_ignored() {
        let messages = MessageStore::new();
        messages.show("");
        assert!(!messages.is_visible());
    }

    #[tokio::test]
    async fn close_hides_immediately() {
        let messages = MessageStore::new();
        messages.show("bye");
        messages.close();
        assert_eq!(messages.current(), Toast::default());
    }
}
