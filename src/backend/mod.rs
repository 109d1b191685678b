//! Fast-path signal backends.
//!
//! A fast backend gives every event and timer an OS-level signal that client
//! threads can wait on directly, without a round trip to the central server:
//! either an event-style file descriptor, or an atomic state word in a
//! process-shared memory region woken with a futex-style primitive. When a
//! backend owns an object, the backend's state is authoritative and the
//! in-core `signaled` flag is advisory only.
//!
//! The backend implementations themselves live outside this crate; this
//! module defines the port they plug into and the null implementation used
//! when no fast path is configured.

use tracing::debug;

use crate::BackendConfig;
use crate::BackendKind;
use crate::Result;

#[cfg(test)]
use mockall::automock;

/// Per-object binding to one fast backend.
///
/// An object holds at most one of these, never one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastSlot {
    /// OS event-style descriptor owned by the object
    Fd(i32),
    /// Index of the object's state word in the shared signal region
    SharedMemory(u32),
}

/// Reset behavior fast-path waiters must apply when they consume a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastKind {
    /// One waiter consumes the signal and clears it
    AutoServer,
    /// The signal stays up until an explicit reset
    ManualServer,
}

/// Port to the active fast-path backend.
///
/// Exactly one implementation is injected per engine, selected by
/// [`BackendConfig`]; `set`/`reset`/`clear` mirror the state transitions the
/// core applies to its in-core `signaled` flag.
#[cfg_attr(test, automock)]
pub trait FastSync {
    /// Allocate the backend resource for a new object.
    ///
    /// Returns `None` when no fast path is active, in which case the object
    /// runs fully server-mediated. Allocation failure fails the whole create
    /// operation; no partially constructed object may remain.
    fn alloc(
        &mut self,
        kind: FastKind,
        signaled: bool,
    ) -> Result<Option<FastSlot>>;

    /// Raise the signal and wake fast-path waiters.
    fn set(
        &mut self,
        slot: FastSlot,
    );

    /// Lower the signal.
    fn reset(
        &mut self,
        slot: FastSlot,
    );

    /// Drop any latched signal without waking anyone.
    fn clear(
        &mut self,
        slot: FastSlot,
    );

    /// Current signal state as fast-path waiters observe it.
    fn signaled(
        &self,
        slot: FastSlot,
    ) -> bool;

    /// Release the backend resource. Called exactly once per slot, when the
    /// owning object is destroyed.
    fn release(
        &mut self,
        slot: FastSlot,
    );
}

/// Null backend: objects carry no fast slot and every wait is
/// server-mediated.
#[derive(Debug, Default)]
pub struct NoFastPath;

impl FastSync for NoFastPath {
    fn alloc(
        &mut self,
        _kind: FastKind,
        _signaled: bool,
    ) -> Result<Option<FastSlot>> {
        Ok(None)
    }

    fn set(
        &mut self,
        _slot: FastSlot,
    ) {
    }

    fn reset(
        &mut self,
        _slot: FastSlot,
    ) {
    }

    fn clear(
        &mut self,
        _slot: FastSlot,
    ) {
    }

    fn signaled(
        &self,
        _slot: FastSlot,
    ) -> bool {
        false
    }

    fn release(
        &mut self,
        _slot: FastSlot,
    ) {
    }
}

/// Resolve the configured backend against the implementation the host
/// injected. `BackendKind::None` ignores any injected implementation.
pub fn select_backend(
    config: &BackendConfig,
    injected: Option<Box<dyn FastSync>>,
) -> Result<Box<dyn FastSync>> {
    config.validate()?;
    match config.kind {
        BackendKind::None => {
            debug!("fast path disabled; waits are server-mediated");
            Ok(Box::new(NoFastPath))
        }
        kind => injected.ok_or_else(|| {
            config::ConfigError::Message(format!(
                "backend kind {kind:?} configured but no backend implementation was injected"
            ))
            .into()
        }),
    }
}
