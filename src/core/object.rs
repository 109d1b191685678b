use super::CoreContext;
use super::Event;
use super::KeyedEvent;
use super::Timer;
use crate::FastKind;
use crate::FastSlot;
use crate::FastSync;
use crate::ObjectError;
use crate::Result;
use crate::types::ObjectId;
use crate::WaitEntry;
use crate::Waitable;
use crate::WaitQueue;

/// The closed set of synchronization-object kinds this core manages.
///
/// Every kind implements the waitable contract; dispatch is an exhaustive
/// match rather than a per-kind vtable.
#[derive(Debug)]
pub enum SyncObject {
    Event(Event),
    KeyedEvent(KeyedEvent),
    Timer(Timer),
}

impl SyncObject {
    pub fn type_name(&self) -> &'static str {
        match self {
            SyncObject::Event(_) => "Event",
            SyncObject::KeyedEvent(_) => "KeyedEvent",
            SyncObject::Timer(_) => "Timer",
        }
    }

    pub(crate) fn as_event_mut(&mut self) -> Result<&mut Event> {
        match self {
            SyncObject::Event(event) => Ok(event),
            other => Err(ObjectError::TypeMismatch {
                expected: "Event",
                found: other.type_name(),
            }
            .into()),
        }
    }

    pub(crate) fn as_timer_mut(&mut self) -> Result<&mut Timer> {
        match self {
            SyncObject::Timer(timer) => Ok(timer),
            other => Err(ObjectError::TypeMismatch {
                expected: "Timer",
                found: other.type_name(),
            }
            .into()),
        }
    }

    /// Generic signal-object path. Only events support it.
    pub(crate) fn signal(
        &mut self,
        access: u32,
        ctx: &mut CoreContext,
    ) -> Result<()> {
        match self {
            SyncObject::Event(event) => event.signal(access, ctx),
            other => Err(ObjectError::NotSignalable(other.type_name()).into()),
        }
    }

    /// Release every external resource the object holds. Runs exactly once,
    /// when the last reference is dropped.
    pub(crate) fn finalize(
        &mut self,
        ctx: &mut CoreContext,
    ) {
        match self {
            SyncObject::Event(event) => event.finalize(&mut *ctx.fast),
            SyncObject::KeyedEvent(_) => {}
            SyncObject::Timer(timer) => timer.finalize(ctx),
        }
    }
}

impl Waitable for SyncObject {
    fn id(&self) -> ObjectId {
        match self {
            SyncObject::Event(event) => event.id(),
            SyncObject::KeyedEvent(keyed) => keyed.id(),
            SyncObject::Timer(timer) => timer.id(),
        }
    }

    fn signaled(
        &mut self,
        entry: &WaitEntry,
        wait: &mut dyn WaitQueue,
        fast: &mut dyn FastSync,
    ) -> bool {
        match self {
            SyncObject::Event(event) => event.signaled(entry, wait, fast),
            SyncObject::KeyedEvent(keyed) => keyed.signaled(entry, wait, fast),
            SyncObject::Timer(timer) => timer.signaled(entry, wait, fast),
        }
    }

    fn satisfied(
        &mut self,
        entry: &WaitEntry,
        fast: &mut dyn FastSync,
    ) {
        match self {
            SyncObject::Event(event) => event.satisfied(entry, fast),
            SyncObject::KeyedEvent(keyed) => keyed.satisfied(entry, fast),
            SyncObject::Timer(timer) => timer.satisfied(entry, fast),
        }
    }

    fn map_access(
        &self,
        access: u32,
    ) -> u32 {
        match self {
            SyncObject::Event(event) => event.map_access(access),
            SyncObject::KeyedEvent(keyed) => keyed.map_access(access),
            SyncObject::Timer(timer) => timer.map_access(access),
        }
    }

    fn fast_slot(&self) -> Option<(FastSlot, FastKind)> {
        match self {
            SyncObject::Event(event) => event.fast_slot(),
            SyncObject::KeyedEvent(keyed) => keyed.fast_slot(),
            SyncObject::Timer(timer) => timer.fast_slot(),
        }
    }
}
