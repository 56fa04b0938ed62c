//! Invocation deadline shared by every network call.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::{timeout_at, Instant};

/// Point in time after which no further network call may complete.
///
/// A single deadline is created per invocation and handed to every component;
/// each call is raced against it with [`Deadline::run`].
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// Deadline `duration` from now.
    pub fn after(duration: Duration) -> Self {
        Self {
            at: Instant::now() + duration,
        }
    }

    /// Deadline at a wall-clock time expressed in milliseconds since the Unix epoch.
    ///
    /// Lambda hands the invocation deadline over in this form. A deadline that is
    /// already in the past expires immediately.
    pub fn from_epoch_millis(epoch_millis: u64) -> Self {
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self::after(Duration::from_millis(epoch_millis.saturating_sub(now_millis)))
    }

    /// The earlier of the two deadlines.
    pub fn min(self, other: Deadline) -> Self {
        if other.at < self.at {
            other
        } else {
            self
        }
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Run `future` unless the deadline passes first.
    ///
    /// A deadline that has already passed fails without polling `future`.
    ///
    /// # Arguments
    ///
    /// * `future` - The fallible operation to race against the deadline
    /// * `on_expiry` - Builds the error returned when the deadline wins
    pub async fn run<F, T, E>(&self, future: F, on_expiry: impl FnOnce() -> E) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        if self.is_expired() {
            return Err(on_expiry());
        }
        match timeout_at(self.at, future).await {
            Ok(result) => result,
            Err(_) => Err(on_expiry()),
        }
    }
}
