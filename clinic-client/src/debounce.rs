//! Search debounce

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lets only the last of a burst of calls through.
///
/// Each [`Debouncer::settle`] waits for the delay and reports whether no
/// newer call arrived in the meantime.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn settle(&self) -> bool {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.generation.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_only_last_call_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(50));
        let first = {
            let d = debouncer.clone();
            tokio::spawn(async move { d.settle().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = {
            let d = debouncer.clone();
            tokio::spawn(async move { d.settle().await })
        };
        assert!(!first.await.unwrap());
        assert!(second.await.unwrap());
    }

    #[tokio::test]
    async fn test_spaced_calls_all_settle() {
        let debouncer = Debouncer::new(Duration::from_millis(5));
        assert!(debouncer.settle().await);
        assert!(debouncer.settle().await);
    }
}
