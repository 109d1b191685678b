//! Wait-queue engine port and the waitable-object contract.
//!
//! The engine that actually parks and wakes client threads lives outside
//! this crate; the core only mutates object state and asks the engine to
//! release waiters through [`WaitQueue`]. Objects expose their side of the
//! bargain through [`Waitable`].

use crate::FastKind;
use crate::FastSlot;
use crate::FastSync;
use crate::types::ObjectId;
use crate::types::ProcessId;
use crate::types::ThreadId;

#[cfg(test)]
use mockall::automock;

/// Select operation a waiter was parked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOp {
    WaitAny,
    WaitAll,
    SignalAndWait,
    KeyedEventWait,
    KeyedEventRelease,
}

impl SelectOp {
    /// The complementary keyed-event tag, if this is one of the two.
    /// A wait only ever pairs with a release and vice versa.
    pub fn keyed_partner(self) -> Option<SelectOp> {
        match self {
            SelectOp::KeyedEventWait => Some(SelectOp::KeyedEventRelease),
            SelectOp::KeyedEventRelease => Some(SelectOp::KeyedEventWait),
            _ => None,
        }
    }
}

/// One parked waiter as this core sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitEntry {
    pub thread: ThreadId,
    pub process: ProcessId,
    pub select_op: SelectOp,
    /// Rendezvous key; only meaningful for the keyed-event tags
    pub key: u64,
}

/// Contract every synchronization object exposes to the wait-queue engine.
pub trait Waitable {
    fn id(&self) -> ObjectId;

    /// Whether `entry` would be released right now.
    ///
    /// Must be safe to call speculatively, any number of times, before the
    /// waiter is actually satisfied.
    fn signaled(
        &mut self,
        entry: &WaitEntry,
        wait: &mut dyn WaitQueue,
        fast: &mut dyn FastSync,
    ) -> bool;

    /// Invoked when `entry` is released because this object was observed
    /// signaled. Auto-reset objects consume the signal here; at most one
    /// waiter wins that race.
    fn satisfied(
        &mut self,
        entry: &WaitEntry,
        fast: &mut dyn FastSync,
    );

    /// Expand generic access bits into object-kind specific rights.
    fn map_access(
        &self,
        access: u32,
    ) -> u32;

    /// Fast-path binding allocated at creation, if any.
    fn fast_slot(&self) -> Option<(FastSlot, FastKind)>;
}

/// Port to the external wait-queue engine.
#[cfg_attr(test, automock)]
pub trait WaitQueue {
    /// Park `entry` on `object`'s wait queue.
    fn add_queue(
        &mut self,
        object: ObjectId,
        entry: WaitEntry,
    );

    /// Remove `thread`'s entry from `object`'s wait queue.
    fn remove_queue(
        &mut self,
        object: ObjectId,
        thread: ThreadId,
    );

    /// Snapshot of the entries currently parked on `object`.
    fn entries(
        &self,
        object: ObjectId,
    ) -> Vec<WaitEntry>;

    /// Wake one specific parked entry. Returns false if it is gone.
    fn wake_entry(
        &mut self,
        object: ObjectId,
        thread: ThreadId,
    ) -> bool;

    /// Release parked waiters after `object` became signaled: every entry
    /// currently parked when `wake_all`, otherwise the first entry that
    /// still observes the object signaled. `satisfied` runs once per
    /// released entry. Returns the number woken.
    fn wake_up(
        &mut self,
        object: &mut dyn Waitable,
        wake_all: bool,
        fast: &mut dyn FastSync,
    ) -> usize;
}
