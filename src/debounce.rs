//! Trailing-edge debounce for deferred actions (e.g. search-as-you-type)

use std::time::Duration;

use tokio::task::JoinHandle;

/// Default wait for search input
pub const DEFAULT_WAIT: Duration = Duration::from_millis(300);

/// Runs the most recent action once the caller has been quiet for `wait`.
/// Every new call replaces the pending one.
#[derive(Debug)]
pub struct Debouncer {
    wait: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self { wait, pending: None }
    }

    /// Schedule `action`, cancelling whatever was pending.
    /// Must be called from within a tokio runtime.
    pub fn call<F>(&mut self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let wait = self.wait;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            action();
        }));
    }

    /// Drop the pending action, if any. Returns true if one was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }

    #[allow(dead_code)]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const WAIT: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_only_last_call_runs() {
        let mut debouncer = Debouncer::new(WAIT);
        let seen = Arc::new(Mutex::new(Vec::new()));

        for query in ["f", "fo", "foo"] {
            let seen = Arc::clone(&seen);
            debouncer.call(move || seen.lock().unwrap().push(query));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert!(seen.lock().unwrap().is_empty());
        assert!(debouncer.is_pending());

        tokio::time::sleep(WAIT).await;

        assert_eq!(*seen.lock().unwrap(), vec!["foo"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_action() {
        let mut debouncer = Debouncer::new(WAIT);
        let seen = Arc::new(Mutex::new(0));
        let s = Arc::clone(&seen);

        debouncer.call(move || *s.lock().unwrap() += 1);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(WAIT * 2).await;
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_action() {
        let seen = Arc::new(Mutex::new(0));
        {
            let mut debouncer = Debouncer::new(WAIT);
            let s = Arc::clone(&seen);
            debouncer.call(move || *s.lock().unwrap() += 1);
        }

        tokio::time::sleep(WAIT * 2).await;
        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
