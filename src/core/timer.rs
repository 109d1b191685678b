use tracing::debug;
use tracing::trace;

use super::CoreContext;
use crate::constants::GENERIC_ALL;
use crate::constants::GENERIC_EXECUTE;
use crate::constants::GENERIC_READ;
use crate::constants::GENERIC_WRITE;
use crate::constants::STANDARD_RIGHTS_EXECUTE;
use crate::constants::STANDARD_RIGHTS_READ;
use crate::constants::STANDARD_RIGHTS_WRITE;
use crate::constants::SYNCHRONIZE;
use crate::constants::TICKS_PER_MS;
use crate::constants::TIMEOUT_INFINITE;
use crate::constants::TIMER_ALL_ACCESS;
use crate::constants::TIMER_MODIFY_STATE;
use crate::constants::TIMER_QUERY_STATE;
use crate::ApcData;
use crate::FastKind;
use crate::FastSlot;
use crate::FastSync;
use crate::sched::ThreadRef;
use crate::sched::TimeoutId;
use crate::types::Abstime;
use crate::types::ObjectId;
use crate::types::Timeout;
use crate::utils::time::abstime_to_timeout;
use crate::WaitEntry;
use crate::Waitable;
use crate::WaitQueue;

/// One-shot or periodic absolute-time signal, with optional APC delivery
/// into the thread that armed it.
///
/// `timeout` is present iff the timer is armed; `thread` is present iff a
/// callback was requested and has not been canceled or dropped.
#[derive(Debug)]
pub struct Timer {
    id: ObjectId,
    manual_reset: bool,
    signaled: bool,
    /// Timer period in ms; 0 = one-shot
    period_ms: u32,
    /// Next expiration, signed abstime representation
    when: Abstime,
    timeout: Option<TimeoutId>,
    /// Thread that armed the callback; owned exclusively until the next
    /// cancel/re-set/destroy
    thread: Option<ThreadRef>,
    callback: u64,
    arg: u64,
    fast_slot: Option<FastSlot>,
}

impl Timer {
    pub(crate) fn new(
        id: ObjectId,
        manual_reset: bool,
        fast: &mut dyn FastSync,
    ) -> crate::Result<Self> {
        let kind = if manual_reset {
            FastKind::ManualServer
        } else {
            FastKind::AutoServer
        };
        let fast_slot = fast.alloc(kind, false)?;
        Ok(Self {
            id,
            manual_reset,
            signaled: false,
            period_ms: 0,
            when: 0,
            timeout: None,
            thread: None,
            callback: 0,
            arg: 0,
            fast_slot,
        })
    }

    pub fn manual_reset(&self) -> bool {
        self.manual_reset
    }

    /// Stored due time, in the signed abstime representation.
    pub fn due_time(&self) -> Abstime {
        self.when
    }

    pub(crate) fn current_signaled(
        &self,
        fast: &dyn FastSync,
    ) -> bool {
        match self.fast_slot {
            Some(slot) => fast.signaled(slot),
            None => self.signaled,
        }
    }

    /// Arm (or re-arm) the timer. Returns the previous signaled state.
    ///
    /// Any existing arming and callback registration is canceled first. For
    /// manual-reset timers the period is forced to 0 and the signal cleared
    /// immediately.
    pub fn set(
        &mut self,
        expire: Timeout,
        period_ms: u32,
        callback: u64,
        arg: u64,
        caller: &ThreadRef,
        ctx: &mut CoreContext,
    ) -> bool {
        let signaled = self.cancel(ctx);

        let mut period_ms = period_ms;
        if self.manual_reset {
            period_ms = 0; // period doesn't make any sense for a manual timer
            self.signaled = false;
            if let Some(slot) = self.fast_slot {
                ctx.fast.clear(slot);
            }
        }

        // Non-positive expire is relative: anchor it to the monotonic clock.
        // A positive expire may not land before the current wall time.
        self.when = if expire <= 0 {
            expire - ctx.clock.monotonic()
        } else {
            expire.max(ctx.clock.wall())
        };
        self.period_ms = period_ms;
        self.callback = callback;
        self.arg = arg;
        if callback != 0 {
            self.thread = Some(caller.clone());
        }
        if expire != TIMEOUT_INFINITE {
            self.timeout = Some(ctx.timeouts.add_timeout_user(expire, self.id));
        }

        debug!(
            object = self.id.0,
            expire,
            period_ms,
            has_callback = callback != 0,
            "timer armed"
        );
        signaled
    }

    /// Disarm the timer and retract any in-flight APC. Returns the previous
    /// signaled state. Idempotent: canceling an unarmed timer is a no-op.
    pub fn cancel(
        &mut self,
        ctx: &mut CoreContext,
    ) -> bool {
        let signaled = self.signaled;

        if let Some(timeout) = self.timeout.take() {
            ctx.timeouts.remove_timeout_user(timeout);
        }
        if let Some(thread) = self.thread.take() {
            ctx.apcs.cancel_timer_apc(&thread, self.id);
            // dropping the reference releases it
        }
        signaled
    }

    /// Invoked by the timeout service when the due time is reached.
    pub(crate) fn on_expired(
        &mut self,
        ctx: &mut CoreContext,
    ) {
        // the firing consumed the registration
        self.timeout = None;

        if let Some(thread) = &self.thread {
            let data = if self.callback != 0 {
                ApcData::Timer {
                    func: self.callback,
                    when: self.when,
                    arg: self.arg,
                }
            } else {
                ApcData::None // wake up only
            };

            if !ctx.apcs.queue_timer_apc(thread, self.id, data) {
                trace!(object = self.id.0, "callback thread is gone");
                self.thread = None;
            }
        }

        if self.period_ms != 0 {
            // schedule the next expiration; drift stays anchored to the
            // original due time, not to "now"
            if self.when > 0 {
                self.when = -ctx.clock.monotonic();
            }
            self.when -= self.period_ms as i64 * TICKS_PER_MS;
            let next = abstime_to_timeout(self.when, &*ctx.clock);
            self.timeout = Some(ctx.timeouts.add_timeout_user(next, self.id));
        }

        // wake up waiters; timers wake everyone regardless of reset type
        self.signaled = true;
        if let Some(slot) = self.fast_slot {
            ctx.fast.set(slot);
        }
        ctx.wait.wake_up(self, true, &mut *ctx.fast);
    }

    pub(crate) fn finalize(
        &mut self,
        ctx: &mut CoreContext,
    ) {
        if let Some(timeout) = self.timeout.take() {
            ctx.timeouts.remove_timeout_user(timeout);
        }
        if let Some(thread) = self.thread.take() {
            ctx.apcs.cancel_timer_apc(&thread, self.id);
        }
        if let Some(slot) = self.fast_slot.take() {
            ctx.fast.release(slot);
        }
    }
}

impl Waitable for Timer {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn signaled(
        &mut self,
        _entry: &WaitEntry,
        _wait: &mut dyn WaitQueue,
        fast: &mut dyn FastSync,
    ) -> bool {
        match self.fast_slot {
            Some(slot) => fast.signaled(slot),
            None => self.signaled,
        }
    }

    fn satisfied(
        &mut self,
        _entry: &WaitEntry,
        fast: &mut dyn FastSync,
    ) {
        if self.manual_reset {
            return;
        }
        self.signaled = false;
        if let Some(slot) = self.fast_slot {
            fast.clear(slot);
        }
    }

    fn map_access(
        &self,
        access: u32,
    ) -> u32 {
        let mut access = access;
        if access & GENERIC_READ != 0 {
            access |= STANDARD_RIGHTS_READ | SYNCHRONIZE | TIMER_QUERY_STATE;
        }
        if access & GENERIC_WRITE != 0 {
            access |= STANDARD_RIGHTS_WRITE | TIMER_MODIFY_STATE;
        }
        if access & GENERIC_EXECUTE != 0 {
            access |= STANDARD_RIGHTS_EXECUTE;
        }
        if access & GENERIC_ALL != 0 {
            access |= TIMER_ALL_ACCESS;
        }
        access & !(GENERIC_READ | GENERIC_WRITE | GENERIC_EXECUTE | GENERIC_ALL)
    }

    fn fast_slot(&self) -> Option<(FastSlot, FastKind)> {
        let kind = if self.manual_reset {
            FastKind::ManualServer
        } else {
            FastKind::AutoServer
        };
        self.fast_slot.map(|slot| (slot, kind))
    }
}
