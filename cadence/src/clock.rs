use std::cell::Cell;
use std::rc::Rc;

pub use web_time::{Duration, Instant};
use web_time::{SystemTime, UNIX_EPOCH};

/// Injected source of time for sessions and submitters.
///
/// Sessions measure elapsed time against monotonic instants so wall-clock
/// adjustments never skew a live WPM reading; submissions additionally need a
/// wall-clock epoch reference for the server's timing checks. Injecting both
/// behind one trait keeps every time-dependent calculation deterministic
/// under test.
pub trait Clock {
    /// The current monotonic instant.
    fn now(&self) -> Instant;

    /// Milliseconds since the Unix epoch, from the wall clock.
    fn epoch_millis(&self) -> i64;
}

/// The real clock: monotonic instants from [`web_time::Instant`], epoch
/// milliseconds from the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or_default()
    }
}

/// A manually advanced clock for deterministic tests.
///
/// Clones share the same offset, so a handle kept by the test can advance a
/// clock already handed to a session.
///
/// ```rust
/// use cadence::{Clock, Duration, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// let start = clock.now();
/// handle.advance(Duration::from_secs(30));
/// assert_eq!(clock.now() - start, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    base_epoch_millis: i64,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// A manual clock whose wall time starts at the given epoch millisecond.
    pub fn starting_at(epoch_millis: i64) -> Self {
        Self {
            base: Instant::now(),
            base_epoch_millis: epoch_millis,
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }

    fn epoch_millis(&self) -> i64 {
        self.base_epoch_millis + self.offset.get().as_millis() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::starting_at(1_000);
        let start = clock.now();

        clock.advance(Duration::from_millis(1_500));
        assert_eq!(clock.now().duration_since(start).as_millis(), 1_500);
        assert_eq!(clock.epoch_millis(), 2_500);

        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.epoch_millis(), 3_000);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
