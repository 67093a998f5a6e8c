//! Monotonic millisecond clocks consumed by the reassembly reaper.
//!
//! The transport only needs "milliseconds since some fixed origin". Hosts
//! running on `std` use [`SystemClock`]; tests and simulations drive a
//! [`ManualClock`] explicitly so eviction is deterministic.

use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

use derive_more::{Display, From, Into};

/// Milliseconds elapsed since a clock's origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}ms")]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from a millisecond count.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self { Self(millis) }

    /// Return the millisecond count.
    #[must_use]
    pub const fn as_millis(self) -> u64 { self.0 }

    /// Time elapsed since `earlier`, saturating at zero if `earlier` is later.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use rf24_transport::clock::Timestamp;
    /// let head = Timestamp::from_millis(1_000);
    /// assert_eq!(
    ///     Timestamp::from_millis(6_001).saturating_duration_since(head),
    ///     Duration::from_millis(5_001)
    /// );
    /// assert_eq!(head.saturating_duration_since(Timestamp::from_millis(2_000)), Duration::ZERO);
    /// ```
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Timestamp `duration` after this one, saturating at `u64::MAX`.
    #[must_use]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}

/// Source of monotonic time.
pub trait Clock {
    /// Current time. Successive calls must never go backwards.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp { (**self).now() }
}

/// Clock backed by [`Instant`], counting from its construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self { Self::new() }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = self.origin.elapsed().as_millis();
        Timestamp(u64::try_from(millis).unwrap_or(u64::MAX))
    }
}

/// Manually advanced clock.
///
/// Clones share the same time source, so a test can hand one clone to a
/// transport and keep another to move time forward.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use rf24_transport::clock::{Clock, ManualClock, Timestamp};
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(Duration::from_millis(250));
/// assert_eq!(clock.now(), Timestamp::from_millis(250));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    millis: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Create a clock reading zero.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create a clock reading `start`.
    #[must_use]
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            millis: Rc::new(Cell::new(start.as_millis())),
        }
    }

    /// Move time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let next = Timestamp(self.millis.get()).saturating_add(duration);
        self.millis.set(next.as_millis());
    }

    /// Jump to `timestamp`; ignored if it lies in the past.
    pub fn set(&self, timestamp: Timestamp) {
        if timestamp.as_millis() > self.millis.get() {
            self.millis.set(timestamp.as_millis());
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp { Timestamp(self.millis.get()) }
}
