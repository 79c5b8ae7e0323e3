use std::time::{Duration, Instant};

/// Tracks the pacing state of a domain
///
/// Owned by the rate limiter; one per domain key. Updated by every fetch
/// attempt to the domain immediately after its pacing delay has been applied,
/// and never removed.
#[derive(Debug, Clone, Default)]
pub struct DomainPacingState {
    /// Start time of the last request to this domain
    pub last_request_time: Option<Instant>,

    /// Number of requests started against this domain
    pub request_count: u64,
}

impl DomainPacingState {
    /// Creates a new DomainPacingState with no recorded requests
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether a request may start now
    ///
    /// # Arguments
    ///
    /// * `min_delay` - Minimum gap between request starts
    /// * `now` - The current time instant
    pub fn can_request(&self, min_delay: Duration, now: Instant) -> bool {
        self.time_until_next_request(min_delay, now).is_none()
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now (always the case for the
    /// first request to a domain), or the duration to wait otherwise.
    pub fn time_until_next_request(&self, min_delay: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < min_delay {
            Some(min_delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a request to this domain started at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }
}
