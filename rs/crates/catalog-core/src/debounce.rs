use std::time::Duration;

/// Holds at most one pending value and releases it once `delay` has passed
/// without a newer push. Times are offsets from the host's clock origin.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Duration)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    /// Replace any pending value and restart the wait. Returns the new deadline.
    pub fn push(&mut self, value: T, now: Duration) -> Duration {
        let due = now + self.delay;
        self.pending = Some((value, due));
        due
    }

    /// Take the pending value if its deadline has been reached.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.pending.as_ref().map(|(_, due)| *due)
    }
}
