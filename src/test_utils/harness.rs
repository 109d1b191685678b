use std::cell::RefCell;
use std::rc::Rc;

use super::ApcLog;
use super::LoopWaitQueue;
use super::ManualClock;
use super::MemoryFastSync;
use super::RecordingApcs;
use super::RecordingTimeouts;
use super::SharedFastSync;
use super::SharedWaitQueue;
use super::TimeoutLog;
use crate::BackendKind;
use crate::CoreContext;
use crate::SelectOp;
use crate::SyncEngine;
use crate::types::ProcessId;
use crate::types::ThreadId;
use crate::WaitEntry;

/// Inspection handles for everything a [`CoreContext`] under test owns.
pub struct Harness {
    pub wait: Rc<RefCell<LoopWaitQueue>>,
    pub timeouts: Rc<RefCell<TimeoutLog>>,
    pub apcs: Rc<RefCell<ApcLog>>,
    pub clock: Rc<ManualClock>,
    pub fast: Rc<RefCell<MemoryFastSync>>,
}

impl Harness {
    pub fn context(kind: BackendKind) -> (CoreContext, Harness) {
        let (wait, wait_handle) = SharedWaitQueue::new();
        let (timeouts, timeout_handle) = RecordingTimeouts::new();
        let (apcs, apc_handle) = RecordingApcs::new();
        let clock = Rc::new(ManualClock::new());
        let (fast, fast_handle) = SharedFastSync::new(kind);

        let ctx = CoreContext::new(
            Box::new(wait),
            Box::new(timeouts),
            Box::new(apcs),
            Box::new(clock.clone()),
            Box::new(fast),
        );
        let harness = Harness {
            wait: wait_handle,
            timeouts: timeout_handle,
            apcs: apc_handle,
            clock,
            fast: fast_handle,
        };
        (ctx, harness)
    }

    pub fn engine(kind: BackendKind) -> (SyncEngine, Harness) {
        let (ctx, harness) = Self::context(kind);
        (SyncEngine::new(ctx), harness)
    }
}

/// A plain wait entry for tests that don't care about keyed matching.
pub fn wait_entry(
    thread: ThreadId,
    process: ProcessId,
) -> WaitEntry {
    WaitEntry {
        thread,
        process,
        select_op: SelectOp::WaitAny,
        key: 0,
    }
}

/// A keyed-event wait entry.
pub fn keyed_entry(
    thread: ThreadId,
    process: ProcessId,
    select_op: SelectOp,
    key: u64,
) -> WaitEntry {
    WaitEntry {
        thread,
        process,
        select_op,
        key,
    }
}
