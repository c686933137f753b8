use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Holds the latest of a stream of values until it has been quiet for
/// `delay`.
///
/// ```ignore
/// let mut search = Debounced::new(Duration::from_millis(1000));
/// search.push("ro".to_string());
/// search.push("ross".to_string());
/// assert_eq!(search.settled().await, "ross");
/// ```
#[derive(Debug)]
pub struct Debounced<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounced<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Resolve with the pending value once its quiet period has elapsed.
    ///
    /// Never resolves while nothing is pending. Cancel-safe: dropping the
    /// future keeps the value queued.
    pub async fn settled(&mut self) -> T {
        if let Some((_, deadline)) = &self.pending {
            sleep_until(*deadline).await;
        }
        match self.pending.take() {
            Some((value, _)) => value,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_value_survives() {
        let mut debounced = Debounced::new(Duration::from_millis(1000));
        debounced.push("r");
        tokio::time::advance(Duration::from_millis(400)).await;
        debounced.push("ross");

        let started = Instant::now();
        assert_eq!(debounced.settled().await, "ross");
        assert_eq!(started.elapsed(), Duration::from_millis(1000));
        assert!(!debounced.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_pending_never_resolves() {
        let mut debounced: Debounced<u32> = Debounced::new(Duration::from_millis(10));
        let waited = tokio::time::timeout(Duration::from_secs(5), debounced.settled()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_value() {
        let mut debounced = Debounced::new(Duration::from_millis(10));
        debounced.push(1);
        debounced.cancel();
        let waited = tokio::time::timeout(Duration::from_secs(1), debounced.settled()).await;
        assert!(waited.is_err());
    }
}
