//! Single-shot debounce for the global search box
//!
//! Each keystroke replaces the pending value and pushes the deadline out;
//! only the last value survives to be applied. Time is passed in by the
//! caller so the driver can back it with `tokio::time` and tests can use
//! fixed instants.

use std::time::{Duration, Instant};

/// Coalescing timer for free-text input
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record new input, cancelling any pending value
    pub fn push(&mut self, value: &str, now: Instant) {
        self.pending = Some((value.to_string(), now + self.delay));
    }

    /// Drop any pending value without applying it
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, at)) if now >= *at => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(120));
        d.push("gam", start);

        assert!(d.poll(start + Duration::from_millis(119)).is_none());
        assert_eq!(d.poll(start + Duration::from_millis(120)).as_deref(), Some("gam"));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_new_keystroke_reschedules() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(120));
        d.push("g", start);
        d.push("ga", start + Duration::from_millis(100));

        // The first deadline passes without firing
        assert!(d.poll(start + Duration::from_millis(150)).is_none());
        assert_eq!(
            d.deadline(),
            Some(start + Duration::from_millis(220))
        );
        assert_eq!(d.poll(start + Duration::from_millis(220)).as_deref(), Some("ga"));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(120));
        d.push("x", start);
        d.cancel();
        assert!(d.poll(start + Duration::from_secs(1)).is_none());
    }
}
