use tracing::trace;

use crate::constants::GENERIC_ALL;
use crate::constants::GENERIC_EXECUTE;
use crate::constants::GENERIC_READ;
use crate::constants::GENERIC_WRITE;
use crate::constants::KEYEDEVENT_ALL_ACCESS;
use crate::constants::KEYEDEVENT_WAIT;
use crate::constants::KEYEDEVENT_WAKE;
use crate::constants::STANDARD_RIGHTS_EXECUTE;
use crate::constants::STANDARD_RIGHTS_READ;
use crate::constants::STANDARD_RIGHTS_WRITE;
use crate::FastKind;
use crate::FastSlot;
use crate::FastSync;
use crate::types::ObjectId;
use crate::WaitEntry;
use crate::Waitable;
use crate::WaitQueue;

/// Rendezvous primitive pairing a "wait on key K" with a "release key K"
/// from the same client process.
///
/// Carries no state of its own: all matching happens against the transient
/// wait queue, inside `signaled`.
#[derive(Debug)]
pub struct KeyedEvent {
    id: ObjectId,
}

impl KeyedEvent {
    pub(crate) fn new(id: ObjectId) -> Self {
        Self { id }
    }
}

impl Waitable for KeyedEvent {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn signaled(
        &mut self,
        entry: &WaitEntry,
        wait: &mut dyn WaitQueue,
        _fast: &mut dyn FastSync,
    ) -> bool {
        // Non-keyed operations treat the object as always ready.
        let Some(partner_op) = entry.select_op.keyed_partner() else {
            return true;
        };

        for other in wait.entries(self.id) {
            if other.thread == entry.thread {
                continue;
            }
            if other.process != entry.process {
                continue;
            }
            if other.select_op != partner_op {
                continue;
            }
            if other.key != entry.key {
                continue;
            }
            if wait.wake_entry(self.id, other.thread) {
                trace!(
                    object = self.id.0,
                    key = entry.key,
                    waiter = entry.thread,
                    partner = other.thread,
                    "keyed-event pair matched"
                );
                return true;
            }
        }
        false
    }

    fn satisfied(
        &mut self,
        _entry: &WaitEntry,
        _fast: &mut dyn FastSync,
    ) {
        // nothing to consume; matching already happened in signaled
    }

    fn map_access(
        &self,
        access: u32,
    ) -> u32 {
        let mut access = access;
        if access & GENERIC_READ != 0 {
            access |= STANDARD_RIGHTS_READ | KEYEDEVENT_WAIT;
        }
        if access & GENERIC_WRITE != 0 {
            access |= STANDARD_RIGHTS_WRITE | KEYEDEVENT_WAKE;
        }
        if access & GENERIC_EXECUTE != 0 {
            access |= STANDARD_RIGHTS_EXECUTE;
        }
        if access & GENERIC_ALL != 0 {
            access |= KEYEDEVENT_ALL_ACCESS;
        }
        access & !(GENERIC_READ | GENERIC_WRITE | GENERIC_EXECUTE | GENERIC_ALL)
    }

    fn fast_slot(&self) -> Option<(FastSlot, FastKind)> {
        None
    }
}
