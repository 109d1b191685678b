use std::cell::Cell;
use std::rc::Rc;

use crate::constants::TICKS_PER_MS;
use crate::sched::Clock;
use crate::types::Abstime;

/// Manually advanced tick clock. The monotonic and wall clocks move
/// together, like real clocks between loop iterations.
pub struct ManualClock {
    monotonic: Cell<Abstime>,
    wall: Cell<Abstime>,
}

impl ManualClock {
    /// Starts at a plausible mid-life point: the monotonic clock a minute
    /// in, the wall clock well past the epoch.
    pub fn new() -> Self {
        Self {
            monotonic: Cell::new(60_000 * TICKS_PER_MS),
            wall: Cell::new(1_700_000_000_000 * TICKS_PER_MS),
        }
    }

    pub fn advance_ms(
        &self,
        ms: i64,
    ) {
        self.monotonic.set(self.monotonic.get() + ms * TICKS_PER_MS);
        self.wall.set(self.wall.get() + ms * TICKS_PER_MS);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn monotonic(&self) -> Abstime {
        self.monotonic.get()
    }

    fn wall(&self) -> Abstime {
        self.wall.get()
    }
}

impl Clock for Rc<ManualClock> {
    fn monotonic(&self) -> Abstime {
        self.as_ref().monotonic()
    }

    fn wall(&self) -> Abstime {
        self.as_ref().wall()
    }
}
