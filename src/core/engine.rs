use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::CoreContext;
use super::Event;
use super::KeyedEvent;
use super::ObjectRegistry;
use super::SyncObject;
use super::Timer;
use crate::constants::EVENT_MODIFY_STATE;
use crate::constants::EVENT_QUERY_STATE;
use crate::constants::PULSE_EVENT;
use crate::constants::RESET_EVENT;
use crate::constants::SET_EVENT;
use crate::constants::TIMER_MODIFY_STATE;
use crate::constants::TIMER_QUERY_STATE;
use crate::select_backend;
use crate::ApcQueue;
use crate::Clock;
use crate::FastSync;
use crate::ObjectError;
use crate::Result;
use crate::sched::ThreadRef;
use crate::Settings;
use crate::TimeoutService;
use crate::types::Abstime;
use crate::types::Handle;
use crate::types::ObjectId;
use crate::types::ProcessId;
use crate::types::Timeout;
use crate::WaitEntry;
use crate::Waitable;
use crate::WaitQueue;

/// Object attributes decoded from a create/open request.
///
/// The namespace is flat; directory roots and security descriptors belong to
/// the outer object manager.
#[derive(Debug, Clone, Default)]
pub struct ObjectAttrs {
    pub name: Option<String>,
}

impl ObjectAttrs {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Reply to a create-or-open request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CreatedHandle {
    pub handle: Handle,
    /// False when the name already existed and the caller's creation
    /// arguments were ignored
    pub created: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EventInfo {
    pub manual_reset: bool,
    pub signaled: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TimerInfo {
    /// Stored due time in the signed abstime representation
    pub when: Abstime,
    pub signaled: bool,
}

/// The synchronization-object core.
///
/// Owns the object registry and the collaborator ports; every method is a
/// non-blocking state transition invoked from the serialized dispatch loop.
pub struct SyncEngine {
    registry: ObjectRegistry,
    ctx: CoreContext,
}

impl SyncEngine {
    pub fn new(ctx: CoreContext) -> Self {
        Self {
            registry: ObjectRegistry::new(),
            ctx,
        }
    }

    /// Build an engine from validated settings, wiring the configured fast
    /// backend (or the null backend when none is configured).
    pub fn from_settings(
        settings: &Settings,
        wait: Box<dyn WaitQueue>,
        timeouts: Box<dyn TimeoutService>,
        apcs: Box<dyn ApcQueue>,
        clock: Box<dyn Clock>,
        fast: Option<Box<dyn FastSync>>,
    ) -> Result<Self> {
        settings.validate()?;
        let fast = select_backend(&settings.backend, fast)?;
        Ok(Self::new(CoreContext::new(wait, timeouts, apcs, clock, fast)))
    }

    // -
    // Event requests

    /// Create an event, or open the existing one registered under the same
    /// name. On the already-exists path the caller's reset type and initial
    /// state are silently ignored; the original object is returned as-is.
    pub fn create_event(
        &mut self,
        process: ProcessId,
        attrs: ObjectAttrs,
        access: u32,
        manual_reset: bool,
        initial_state: bool,
    ) -> Result<CreatedHandle> {
        let existing = match &attrs.name {
            Some(name) => self.registry.find_named(name, "Event")?,
            None => None,
        };

        let (id, created) = match existing {
            Some(id) => {
                debug!(name = attrs.name.as_deref(), "event name already exists");
                (id, false)
            }
            None => {
                let id = self.registry.next_object_id();
                let event = Event::new(id, manual_reset, initial_state, &mut *self.ctx.fast)?;
                self.registry.insert(SyncObject::Event(event), attrs.name);
                (id, true)
            }
        };

        let handle = self.registry.alloc_handle(process, id, access)?;
        Ok(CreatedHandle { handle, created })
    }

    pub fn open_event(
        &mut self,
        process: ProcessId,
        access: u32,
        name: &str,
    ) -> Result<Handle> {
        self.open_named(process, access, name, "Event")
    }

    /// Pulse, set, or reset an event. Returns the signaled state the event
    /// had before the operation.
    pub fn event_op(
        &mut self,
        process: ProcessId,
        handle: Handle,
        op: u32,
    ) -> Result<bool> {
        let id = self
            .registry
            .get_handle_obj(process, handle, EVENT_MODIFY_STATE)?;
        let event = self.registry.object_mut(id)?.as_event_mut()?;
        let previous = event.current_signaled(&*self.ctx.fast);

        match op {
            PULSE_EVENT => event.pulse(&mut self.ctx),
            SET_EVENT => event.set(&mut self.ctx),
            RESET_EVENT => event.reset(&mut self.ctx),
            other => {
                warn!(op = other, "unrecognized event operation");
                return Err(ObjectError::InvalidParameter(format!(
                    "unknown event operation {other}"
                ))
                .into());
            }
        }
        Ok(previous)
    }

    pub fn query_event(
        &mut self,
        process: ProcessId,
        handle: Handle,
    ) -> Result<EventInfo> {
        let id = self
            .registry
            .get_handle_obj(process, handle, EVENT_QUERY_STATE)?;
        let event = self.registry.object_mut(id)?.as_event_mut()?;
        Ok(EventInfo {
            manual_reset: event.manual_reset(),
            signaled: event.current_signaled(&*self.ctx.fast),
        })
    }

    // -
    // Keyed-event requests

    pub fn create_keyed_event(
        &mut self,
        process: ProcessId,
        attrs: ObjectAttrs,
        access: u32,
    ) -> Result<CreatedHandle> {
        let existing = match &attrs.name {
            Some(name) => self.registry.find_named(name, "KeyedEvent")?,
            None => None,
        };

        let (id, created) = match existing {
            Some(id) => (id, false),
            None => {
                let id = self.registry.next_object_id();
                self.registry
                    .insert(SyncObject::KeyedEvent(KeyedEvent::new(id)), attrs.name);
                (id, true)
            }
        };

        let handle = self.registry.alloc_handle(process, id, access)?;
        Ok(CreatedHandle { handle, created })
    }

    pub fn open_keyed_event(
        &mut self,
        process: ProcessId,
        access: u32,
        name: &str,
    ) -> Result<Handle> {
        self.open_named(process, access, name, "KeyedEvent")
    }

    // -
    // Timer requests

    pub fn create_timer(
        &mut self,
        process: ProcessId,
        attrs: ObjectAttrs,
        access: u32,
        manual_reset: bool,
    ) -> Result<CreatedHandle> {
        let existing = match &attrs.name {
            Some(name) => self.registry.find_named(name, "Timer")?,
            None => None,
        };

        let (id, created) = match existing {
            Some(id) => {
                debug!(name = attrs.name.as_deref(), "timer name already exists");
                (id, false)
            }
            None => {
                let id = self.registry.next_object_id();
                let timer = Timer::new(id, manual_reset, &mut *self.ctx.fast)?;
                self.registry.insert(SyncObject::Timer(timer), attrs.name);
                (id, true)
            }
        };

        let handle = self.registry.alloc_handle(process, id, access)?;
        Ok(CreatedHandle { handle, created })
    }

    pub fn open_timer(
        &mut self,
        process: ProcessId,
        access: u32,
        name: &str,
    ) -> Result<Handle> {
        self.open_named(process, access, name, "Timer")
    }

    /// Arm a timer. Returns the previous signaled state.
    pub fn set_timer(
        &mut self,
        process: ProcessId,
        handle: Handle,
        expire: Timeout,
        period_ms: u32,
        callback: u64,
        arg: u64,
        caller: &ThreadRef,
    ) -> Result<bool> {
        let id = self
            .registry
            .get_handle_obj(process, handle, TIMER_MODIFY_STATE)?;
        let timer = self.registry.object_mut(id)?.as_timer_mut()?;
        Ok(timer.set(expire, period_ms, callback, arg, caller, &mut self.ctx))
    }

    /// Disarm a timer. Returns the previous signaled state.
    pub fn cancel_timer(
        &mut self,
        process: ProcessId,
        handle: Handle,
    ) -> Result<bool> {
        let id = self
            .registry
            .get_handle_obj(process, handle, TIMER_MODIFY_STATE)?;
        let timer = self.registry.object_mut(id)?.as_timer_mut()?;
        Ok(timer.cancel(&mut self.ctx))
    }

    pub fn get_timer_info(
        &mut self,
        process: ProcessId,
        handle: Handle,
    ) -> Result<TimerInfo> {
        let id = self
            .registry
            .get_handle_obj(process, handle, TIMER_QUERY_STATE)?;
        let timer = self.registry.object_mut(id)?.as_timer_mut()?;
        Ok(TimerInfo {
            when: timer.due_time(),
            signaled: timer.current_signaled(&*self.ctx.fast),
        })
    }

    /// Entry point for the external timeout service: the registration armed
    /// for `object` came due.
    pub fn timer_expired(
        &mut self,
        object: ObjectId,
    ) -> Result<()> {
        let timer = self.registry.object_mut(object)?.as_timer_mut()?;
        timer.on_expired(&mut self.ctx);
        Ok(())
    }

    // -
    // Generic object requests

    /// Signal an object through a handle, as the tail end of a
    /// signal-and-wait. Only events support this; the handle must carry
    /// modify-state access.
    pub fn signal_object(
        &mut self,
        process: ProcessId,
        handle: Handle,
    ) -> Result<()> {
        let entry = self.registry.handle_entry(process, handle)?;
        let object = self.registry.object_mut(entry.object)?;
        object.signal(entry.access, &mut self.ctx)
    }

    /// Resolve a handle to its object identity, without an access check.
    /// The wait-queue engine parks entries by object id, not by handle.
    pub fn object_id(
        &self,
        process: ProcessId,
        handle: Handle,
    ) -> Result<ObjectId> {
        Ok(self.registry.handle_entry(process, handle)?.object)
    }

    /// Poll one parked waiter against an object, on behalf of the wait-queue
    /// engine. For keyed events this is where rendezvous matching happens.
    pub fn check_signaled(
        &mut self,
        object: ObjectId,
        entry: &WaitEntry,
    ) -> Result<bool> {
        let object = self.registry.object_mut(object)?;
        Ok(object.signaled(entry, &mut *self.ctx.wait, &mut *self.ctx.fast))
    }

    /// Commit the release of a waiter that observed `object` signaled;
    /// auto-reset objects consume their signal here.
    pub fn commit_satisfied(
        &mut self,
        object: ObjectId,
        entry: &WaitEntry,
    ) -> Result<()> {
        let object = self.registry.object_mut(object)?;
        object.satisfied(entry, &mut *self.ctx.fast);
        Ok(())
    }

    /// Close a handle; the last close destroys the object and releases its
    /// backend resources.
    pub fn close_handle(
        &mut self,
        process: ProcessId,
        handle: Handle,
    ) -> Result<()> {
        if let Some(mut object) = self.registry.close_handle(process, handle)? {
            debug!(kind = object.type_name(), "destroying object");
            object.finalize(&mut self.ctx);
        }
        Ok(())
    }

    fn open_named(
        &mut self,
        process: ProcessId,
        access: u32,
        name: &str,
        expected: &'static str,
    ) -> Result<Handle> {
        let id = self
            .registry
            .find_named(name, expected)?
            .ok_or_else(|| ObjectError::NameNotFound(name.to_string()))?;
        self.registry.alloc_handle(process, id, access)
    }
}
