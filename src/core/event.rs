use tracing::debug;
use tracing::trace;

use super::CoreContext;
use crate::constants::EVENT_ALL_ACCESS;
use crate::constants::EVENT_MODIFY_STATE;
use crate::constants::EVENT_QUERY_STATE;
use crate::constants::GENERIC_ALL;
use crate::constants::GENERIC_EXECUTE;
use crate::constants::GENERIC_READ;
use crate::constants::GENERIC_WRITE;
use crate::constants::STANDARD_RIGHTS_EXECUTE;
use crate::constants::STANDARD_RIGHTS_READ;
use crate::constants::STANDARD_RIGHTS_WRITE;
use crate::constants::SYNCHRONIZE;
use crate::FastKind;
use crate::FastSlot;
use crate::FastSync;
use crate::ObjectError;
use crate::Result;
use crate::types::ObjectId;
use crate::WaitEntry;
use crate::Waitable;
use crate::WaitQueue;

/// Manual- or auto-reset boolean signal.
///
/// `manual_reset` is fixed at creation. When a fast backend owns the object
/// the backend state is authoritative and `signaled` is advisory only.
#[derive(Debug)]
pub struct Event {
    id: ObjectId,
    manual_reset: bool,
    signaled: bool,
    fast_slot: Option<FastSlot>,
    /// Kernel object cross-references: process-local representations other
    /// components expose for this same OS object
    kernel_objects: Vec<u64>,
}

impl Event {
    pub(crate) fn new(
        id: ObjectId,
        manual_reset: bool,
        initial_state: bool,
        fast: &mut dyn FastSync,
    ) -> Result<Self> {
        let kind = if manual_reset {
            FastKind::ManualServer
        } else {
            FastKind::AutoServer
        };
        let fast_slot = fast.alloc(kind, initial_state)?;
        Ok(Self {
            id,
            manual_reset,
            signaled: initial_state,
            fast_slot,
            kernel_objects: Vec::new(),
        })
    }

    pub fn manual_reset(&self) -> bool {
        self.manual_reset
    }

    /// Signal state as a client would observe it: the backend's view when a
    /// fast backend owns the object, the in-core flag otherwise.
    pub(crate) fn current_signaled(
        &self,
        fast: &dyn FastSync,
    ) -> bool {
        match self.fast_slot {
            Some(slot) => fast.signaled(slot),
            None => self.signaled,
        }
    }

    /// Set: wake all waiters if manual reset, a single one otherwise.
    pub fn set(
        &mut self,
        ctx: &mut CoreContext,
    ) {
        if let Some(slot) = self.fast_slot {
            // The backend is authoritative: forward and leave the in-core
            // flag alone. Fast-path waiters never come through the server.
            ctx.fast.set(slot);
            return;
        }

        trace!(object = self.id.0, "set event");
        self.signaled = true;
        let wake_all = self.manual_reset;
        ctx.wait.wake_up(self, wake_all, &mut *ctx.fast);
    }

    pub fn reset(
        &mut self,
        ctx: &mut CoreContext,
    ) {
        if let Some(slot) = self.fast_slot {
            ctx.fast.reset(slot);
            return;
        }

        trace!(object = self.id.0, "reset event");
        self.signaled = false;
    }

    /// Pulse: momentarily signal, wake as Set would, then clear again
    /// unconditionally. A pulse that finds no waiters is simply lost.
    pub fn pulse(
        &mut self,
        ctx: &mut CoreContext,
    ) {
        trace!(object = self.id.0, "pulse event");
        self.signaled = true;
        // wake up all waiters if manual reset, a single one otherwise;
        // the wake runs to completion before the trailing clear
        let wake_all = self.manual_reset;
        ctx.wait.wake_up(self, wake_all, &mut *ctx.fast);
        self.signaled = false;

        if let Some(slot) = self.fast_slot {
            ctx.fast.clear(slot);
        }
    }

    /// Generic signal-object path; requires modify-state access.
    pub(crate) fn signal(
        &mut self,
        access: u32,
        ctx: &mut CoreContext,
    ) -> Result<()> {
        if access & EVENT_MODIFY_STATE == 0 {
            debug!(object = self.id.0, access, "signal denied on event handle");
            return Err(ObjectError::AccessDenied {
                required: EVENT_MODIFY_STATE,
                granted: access,
            }
            .into());
        }
        self.set(ctx);
        Ok(())
    }

    /// Cross-references to other process-local representations of this
    /// object.
    pub fn kernel_objects_mut(&mut self) -> &mut Vec<u64> {
        &mut self.kernel_objects
    }

    pub(crate) fn finalize(
        &mut self,
        fast: &mut dyn FastSync,
    ) {
        // take() keeps release single-shot however many in-core references
        // existed
        if let Some(slot) = self.fast_slot.take() {
            fast.release(slot);
        }
    }
}

impl Waitable for Event {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn signaled(
        &mut self,
        _entry: &WaitEntry,
        _wait: &mut dyn WaitQueue,
        fast: &mut dyn FastSync,
    ) -> bool {
        // The backend is authoritative when it owns the object, with one
        // exception: a pulse raises only the in-core flag (the backend sees
        // just the trailing clear), so the poll must consider both views
        // instead of delegating entirely. Outside a pulse the in-core flag
        // stays false while a backend is active, so this reads as pure
        // delegation.
        match self.fast_slot {
            Some(slot) => fast.signaled(slot) || self.signaled,
            None => self.signaled,
        }
    }

    fn satisfied(
        &mut self,
        _entry: &WaitEntry,
        fast: &mut dyn FastSync,
    ) {
        // Reset if it's an auto-reset event
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
            access |= STANDARD_RIGHTS_READ | EVENT_QUERY_STATE;
        }
        if access & GENERIC_WRITE != 0 {
            access |= STANDARD_RIGHTS_WRITE | EVENT_MODIFY_STATE;
        }
        if access & GENERIC_EXECUTE != 0 {
            access |= STANDARD_RIGHTS_EXECUTE | SYNCHRONIZE;
        }
        if access & GENERIC_ALL != 0 {
            access |= EVENT_ALL_ACCESS;
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
