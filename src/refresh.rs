//! Periodic refresh dispatcher
//!
//! Runs a list of registered callbacks once per interval on a tokio task.
//! Each callback is isolated: an error or a panic is logged and the rest of
//! the tick (and all later ticks) still run.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default refresh interval used by the app
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("refresh interval must be greater than zero")]
    ZeroInterval,
}

/// A callback invoked on every tick
pub type RefreshCallback = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

/// Identifies a registered callback so it can be removed again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    callbacks: Vec<(CallbackHandle, RefreshCallback)>,
}

impl Registry {
    fn lock(registry: &Mutex<Registry>) -> std::sync::MutexGuard<'_, Registry> {
        // Callbacks run under catch_unwind, so poisoning only happens if the
        // registry code itself panicked; the data is still consistent.
        registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct AutoRefresh {
    interval: Duration,
    registry: Arc<Mutex<Registry>>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for AutoRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoRefresh")
            .field("interval", &self.interval)
            .field("callbacks", &self.callback_count())
            .field("running", &self.is_running())
            .finish()
    }
}

impl AutoRefresh {
    /// Create a stopped dispatcher with a fixed interval
    pub fn new(interval: Duration) -> Result<Self, RefreshError> {
        if interval.is_zero() {
            return Err(RefreshError::ZeroInterval);
        }

        Ok(Self {
            interval,
            registry: Arc::new(Mutex::new(Registry::default())),
            task: None,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Register a callback. Callbacks run in registration order.
    pub fn on_refresh<F>(&self, callback: F) -> CallbackHandle
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let mut registry = Registry::lock(&self.registry);
        let handle = CallbackHandle(registry.next_id);
        registry.next_id += 1;
        registry.callbacks.push((handle, Box::new(callback)));
        handle
    }

    /// Remove a previously registered callback
    #[allow(dead_code)]
    pub fn unregister(&self, handle: CallbackHandle) -> bool {
        let mut registry = Registry::lock(&self.registry);
        let before = registry.callbacks.len();
        registry.callbacks.retain(|(h, _)| *h != handle);
        registry.callbacks.len() != before
    }

    pub fn callback_count(&self) -> usize {
        Registry::lock(&self.registry).callbacks.len()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start ticking. Must be called from within a tokio runtime.
    /// Calling this while already running does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            tracing::debug!("Auto-refresh already running");
            return;
        }

        let period = self.interval;
        let first_tick = Instant::now() + period;
        let registry = Arc::clone(&self.registry);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let failures = dispatch(&registry);
                if failures > 0 {
                    tracing::warn!("Refresh tick finished with {} failed callback(s)", failures);
                }
            }
        }));

        tracing::info!("Auto-refresh started (every {:?})", period);
    }

    /// Stop ticking. A tick already running is allowed to finish.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("Auto-refresh stopped");
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run every callback once. Returns the number of callbacks that failed.
fn dispatch(registry: &Mutex<Registry>) -> usize {
    let mut registry = Registry::lock(registry);
    let mut failures = 0;

    for (handle, callback) in registry.callbacks.iter_mut() {
        match panic::catch_unwind(AssertUnwindSafe(|| callback())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                failures += 1;
                tracing::warn!("Refresh callback {:?} failed: {:#}", handle, e);
            }
            Err(_) => {
                failures += 1;
                tracing::error!("Refresh callback {:?} panicked", handle);
            }
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PERIOD: Duration = Duration::from_millis(100);

    fn counter(refresh: &AutoRefresh) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        refresh.on_refresh(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        count
    }

    async fn wait_ticks(ticks: u32) {
        tokio::time::sleep(PERIOD * ticks + Duration::from_millis(1)).await;
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert_eq!(
            AutoRefresh::new(Duration::ZERO).unwrap_err(),
            RefreshError::ZeroInterval
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_callbacks_run_in_registration_order_each_tick() {
        let mut refresh = AutoRefresh::new(PERIOD).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            refresh.on_refresh(move || {
                log.lock().unwrap().push(name);
                Ok(())
            });
        }

        refresh.start();
        wait_ticks(3).await;

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 9);
        for tick in log.chunks(3) {
            assert_eq!(tick, ["first", "second", "third"]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_tick_before_first_interval() {
        let mut refresh = AutoRefresh::new(PERIOD).unwrap();
        let count = counter(&refresh);

        refresh.start();
        tokio::time::sleep(PERIOD / 2).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_does_not_double_tick() {
        let mut refresh = AutoRefresh::new(PERIOD).unwrap();
        let count = counter(&refresh);

        refresh.start();
        refresh.start();
        wait_ticks(1).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_ticks() {
        let mut refresh = AutoRefresh::new(PERIOD).unwrap();
        let count = counter(&refresh);

        refresh.start();
        wait_ticks(2).await;
        refresh.stop();
        assert!(!refresh.is_running());
        wait_ticks(5).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);

        // Stopping twice is harmless
        refresh.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let mut refresh = AutoRefresh::new(PERIOD).unwrap();
        let count = counter(&refresh);

        refresh.start();
        wait_ticks(1).await;
        refresh.stop();
        refresh.start();
        assert!(refresh.is_running());
        wait_ticks(2).await;

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_callbacks_are_isolated() {
        let mut refresh = AutoRefresh::new(PERIOD).unwrap();
        refresh.on_refresh(|| anyhow::bail!("source unavailable"));
        refresh.on_refresh(|| panic!("callback bug"));
        let count = counter(&refresh);

        refresh.start();
        wait_ticks(2).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(refresh.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unregister_removes_callback() {
        let mut refresh = AutoRefresh::new(PERIOD).unwrap();
        let kept = counter(&refresh);

        let removed = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&removed);
        let handle = refresh.on_refresh(move || {
            r.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(refresh.unregister(handle));
        assert!(!refresh.unregister(handle));
        assert_eq!(refresh.callback_count(), 1);

        refresh.start();
        wait_ticks(2).await;

        assert_eq!(kept.load(Ordering::SeqCst), 2);
        assert_eq!(removed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let count = {
            let mut refresh = AutoRefresh::new(PERIOD).unwrap();
            let count = counter(&refresh);
            refresh.start();
            count
        };

        wait_ticks(3).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispatch_counts_failures() {
        let registry = Mutex::new(Registry::default());
        let ran = Arc::new(AtomicUsize::new(0));
        {
            let mut r = registry.lock().unwrap();
            let failing: RefreshCallback = Box::new(|| -> anyhow::Result<()> { anyhow::bail!("nope") });
            let panicking: RefreshCallback = Box::new(|| -> anyhow::Result<()> { panic!("boom") });
            let counter = Arc::clone(&ran);
            let ok: RefreshCallback = Box::new(move || -> anyhow::Result<()> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            r.callbacks.push((CallbackHandle(0), failing));
            r.callbacks.push((CallbackHandle(1), panicking));
            r.callbacks.push((CallbackHandle(2), ok));
        }

        assert_eq!(dispatch(&registry), 2);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(dispatch(&registry), 2);
        assert_eq!(ran.load(Ordering::SeqCst), 2);
    }
}
