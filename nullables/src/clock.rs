//! Time sources.

use revshare_types::Timestamp;
use std::cell::Cell;
use std::rc::Rc;

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A deterministic clock.
///
/// Clones share the same time, so a test can keep a handle while the host
/// owns another.
#[derive(Clone, Debug, Default)]
pub struct NullClock {
    current: Rc<Cell<u64>>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Rc::new(Cell::new(initial_secs)),
        }
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().saturating_add(secs));
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let clock = NullClock::new(10);
        let handle = clock.clone();
        handle.advance(5);
        assert_eq!(clock.now(), Timestamp::new(15));
        handle.set(100);
        assert_eq!(clock.now(), Timestamp::new(100));
    }
}
