//! Scheduling collaborator ports: timeout service, APC delivery, clock, and
//! the refcounted thread reference a timer holds while a callback is armed.

use std::sync::Arc;

use crate::types::Abstime;
use crate::types::ObjectId;
use crate::types::ThreadId;
use crate::types::Timeout;

#[cfg(test)]
use mockall::automock;

/// Opaque registration handle from the timeout service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutId(pub u64);

/// Port to the external timeout/timer-wheel service.
///
/// The service runs on the same serialized dispatch loop; when a
/// registration comes due it calls `SyncEngine::timer_expired` with the
/// object it was registered for.
#[cfg_attr(test, automock)]
pub trait TimeoutService {
    fn add_timeout_user(
        &mut self,
        when: Timeout,
        object: ObjectId,
    ) -> TimeoutId;

    fn remove_timeout_user(
        &mut self,
        id: TimeoutId,
    );
}

/// APC payload delivered into a client thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApcData {
    /// Wake the thread without running anything
    None,
    /// Run the registered timer callback
    Timer { func: u64, when: Abstime, arg: u64 },
}

/// Port to the APC delivery mechanism.
#[cfg_attr(test, automock)]
pub trait ApcQueue {
    /// Enqueue an APC into `thread`. Returns false if the thread no longer
    /// exists.
    fn queue_timer_apc(
        &mut self,
        thread: &ThreadRef,
        object: ObjectId,
        data: ApcData,
    ) -> bool;

    /// Retract a pending timer APC queued by `object` into `thread`.
    fn cancel_timer_apc(
        &mut self,
        thread: &ThreadRef,
        object: ObjectId,
    );
}

/// Tick clock. Both values are in 100ns ticks.
#[cfg_attr(test, automock)]
pub trait Clock {
    /// Monotonic ticks since process start; always positive.
    fn monotonic(&self) -> Abstime;

    /// Wall-clock ticks since the epoch.
    fn wall(&self) -> Abstime;
}

/// Refcounted reference to a client thread.
///
/// A timer that has a callback armed owns one of these exclusively between
/// Set and the next Cancel/re-Set/destroy. Dropping the reference releases
/// it, on every exit path.
#[derive(Debug, Clone)]
pub struct ThreadRef(Arc<ThreadId>);

impl ThreadRef {
    pub fn new(id: ThreadId) -> Self {
        Self(Arc::new(id))
    }

    pub fn id(&self) -> ThreadId {
        *self.0
    }

    /// Number of live references, for hosts that track release.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl PartialEq for ThreadRef {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ThreadRef {}
