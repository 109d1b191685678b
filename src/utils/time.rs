use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::constants::TICKS_PER_MS;
use crate::sched::Clock;
use crate::types::Abstime;
use crate::types::Timeout;

/// Convert a stored signed absolute time into a timeout the timeout service
/// accepts: positive absolute wall time passes through, a negated monotonic
/// deadline becomes a relative (zero-or-negative) timeout against now.
pub fn abstime_to_timeout(
    when: Abstime,
    clock: &dyn Clock,
) -> Timeout {
    if when > 0 {
        when
    } else {
        // -remaining; clamps to "fire immediately" once the deadline passed
        (when + clock.monotonic()).min(0)
    }
}

/// Milliseconds as a tick count.
pub fn ms_to_ticks(ms: u32) -> i64 {
    ms as i64 * TICKS_PER_MS
}

/// Relative timeout expiring `ms` milliseconds from now.
pub fn relative_timeout_ms(ms: u32) -> Timeout {
    -ms_to_ticks(ms)
}

/// Tick clock backed by the OS clocks.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Abstime {
        (self.start.elapsed().as_nanos() / 100) as i64
    }

    fn wall(&self) -> Abstime {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards");
        (since_epoch.as_nanos() / 100) as i64
    }
}
