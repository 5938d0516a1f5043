use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Times one question and calls back periodically with the elapsed time.
///
/// The ticker task is aborted when the clock is stopped or dropped.
pub struct SessionClock {
    started: Instant,
    ticker: JoinHandle<()>,
}

impl SessionClock {
    pub fn start<F, Fut>(tick: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(Duration) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let started = Instant::now();
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                on_tick(started.elapsed()).await;
            }
        });
        Self { started, ticker }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stops ticking and returns the time since the clock started.
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

/// At most one running clock per key (per chat).
pub struct ClockRegistry<K> {
    clocks: Mutex<HashMap<K, SessionClock>>,
}

impl<K: Eq + Hash> Default for ClockRegistry<K> {
    fn default() -> Self {
        Self {
            clocks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash> ClockRegistry<K> {
    /// Stops the clock running for `key`, if any, then starts a new one.
    pub fn restart(&self, key: K, start: impl FnOnce() -> SessionClock) {
        let mut clocks = self.clocks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = clocks.remove(&key) {
            previous.stop();
        }
        clocks.insert(key, start());
    }

    /// Stops the clock for `key` and returns its elapsed time.
    pub fn stop(&self, key: &K) -> Option<Duration> {
        let mut clocks = self.clocks.lock().unwrap_or_else(PoisonError::into_inner);
        clocks.remove(key).map(SessionClock::stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_clock(tick: Duration, ticks: Arc<AtomicUsize>) -> SessionClock {
        SessionClock::start(tick, move |_| {
            ticks.fetch_add(1, Ordering::SeqCst);
            async {}
        })
    }

    #[tokio::test]
    async fn ticks_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let clock = counting_clock(Duration::from_millis(5), ticks.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let elapsed = clock.stop();
        let after_stop = ticks.load(Ordering::SeqCst);
        assert!(after_stop >= 3, "expected several ticks, got {after_stop}");
        assert!(elapsed >= Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn callback_receives_growing_elapsed_time() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let clock = SessionClock::start(Duration::from_millis(5), move |elapsed| {
            sink.lock().unwrap().push(elapsed);
            async {}
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        clock.stop();
        let seen = seen.lock().unwrap();
        assert!(seen.len() >= 2);
        assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[tokio::test]
    async fn restart_stops_the_previous_clock() {
        let registry = ClockRegistry::default();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let ticks = first.clone();
        registry.restart(1, || counting_clock(Duration::from_millis(5), ticks));
        tokio::time::sleep(Duration::from_millis(30)).await;

        let ticks = second.clone();
        registry.restart(1, || counting_clock(Duration::from_millis(5), ticks));
        let first_after_restart = first.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(first.load(Ordering::SeqCst), first_after_restart);
        assert!(second.load(Ordering::SeqCst) > 0);
        assert!(registry.stop(&1).is_some());
    }

    #[tokio::test]
    async fn stop_removes_the_clock() {
        let registry = ClockRegistry::default();
        registry.restart("chat", || counting_clock(Duration::from_secs(1), Arc::default()));

        assert!(registry.stop(&"chat").is_some());
        assert_eq!(registry.stop(&"chat"), None);
    }
}
