//! Collaborator ports wired up for end-to-end engine scenarios: a
//! functional wait queue, a hand-cranked clock, and recording timeout/APC
//! services, all inspectable from the outside.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use sync_engine::types::Abstime;
use sync_engine::types::ObjectId;
use sync_engine::types::ProcessId;
use sync_engine::types::ThreadId;
use sync_engine::types::Timeout;
use sync_engine::ApcData;
use sync_engine::ApcQueue;
use sync_engine::Clock;
use sync_engine::CoreContext;
use sync_engine::FastSync;
use sync_engine::NoFastPath;
use sync_engine::SelectOp;
use sync_engine::SyncEngine;
use sync_engine::ThreadRef;
use sync_engine::TimeoutId;
use sync_engine::TimeoutService;
use sync_engine::WaitEntry;
use sync_engine::WaitQueue;
use sync_engine::Waitable;

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

#[derive(Default)]
pub struct QueueState {
    queues: HashMap<ObjectId, Vec<WaitEntry>>,
    pub woken: Vec<(ObjectId, ThreadId)>,
}

impl QueueState {
    /// Park an entry directly, standing in for a client thread that went
    /// to sleep on the object.
    pub fn park(
        &mut self,
        object: ObjectId,
        entry: WaitEntry,
    ) {
        self.queues.entry(object).or_default().push(entry);
    }

    pub fn woken_on(
        &self,
        object: ObjectId,
    ) -> Vec<ThreadId> {
        self.woken
            .iter()
            .filter(|(id, _)| *id == object)
            .map(|(_, thread)| *thread)
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct TestWaitQueue(pub Rc<RefCell<QueueState>>);

impl WaitQueue for TestWaitQueue {
    fn add_queue(
        &mut self,
        object: ObjectId,
        entry: WaitEntry,
    ) {
        self.0.borrow_mut().queues.entry(object).or_default().push(entry);
    }

    fn remove_queue(
        &mut self,
        object: ObjectId,
        thread: ThreadId,
    ) {
        if let Some(queue) = self.0.borrow_mut().queues.get_mut(&object) {
            queue.retain(|entry| entry.thread != thread);
        }
    }

    fn entries(
        &self,
        object: ObjectId,
    ) -> Vec<WaitEntry> {
        self.0.borrow().queues.get(&object).cloned().unwrap_or_default()
    }

    fn wake_entry(
        &mut self,
        object: ObjectId,
        thread: ThreadId,
    ) -> bool {
        let mut state = self.0.borrow_mut();
        let Some(queue) = state.queues.get_mut(&object) else {
            return false;
        };
        let Some(position) = queue.iter().position(|entry| entry.thread == thread) else {
            return false;
        };
        queue.remove(position);
        state.woken.push((object, thread));
        true
    }

    fn wake_up(
        &mut self,
        object: &mut dyn Waitable,
        wake_all: bool,
        fast: &mut dyn FastSync,
    ) -> usize {
        let mut count = 0;
        if wake_all {
            for entry in self.entries(object.id()) {
                object.satisfied(&entry, fast);
                if self.wake_entry(object.id(), entry.thread) {
                    count += 1;
                }
            }
        } else {
            for entry in self.entries(object.id()) {
                if object.signaled(&entry, self, fast) {
                    object.satisfied(&entry, fast);
                    self.wake_entry(object.id(), entry.thread);
                    count = 1;
                    break;
                }
            }
        }
        count
    }
}

#[derive(Default)]
pub struct TimeoutState {
    pub registrations: Vec<(TimeoutId, Timeout, ObjectId)>,
    pub removed: Vec<TimeoutId>,
    next: u64,
}

impl TimeoutState {
    /// Registrations still pending, oldest first.
    pub fn pending(&self) -> Vec<(TimeoutId, Timeout, ObjectId)> {
        self.registrations
            .iter()
            .filter(|(id, _, _)| !self.removed.contains(id))
            .copied()
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct TestTimeouts(pub Rc<RefCell<TimeoutState>>);

impl TimeoutService for TestTimeouts {
    fn add_timeout_user(
        &mut self,
        when: Timeout,
        object: ObjectId,
    ) -> TimeoutId {
        let mut state = self.0.borrow_mut();
        state.next += 1;
        let id = TimeoutId(state.next);
        state.registrations.push((id, when, object));
        id
    }

    fn remove_timeout_user(
        &mut self,
        id: TimeoutId,
    ) {
        self.0.borrow_mut().removed.push(id);
    }
}

#[derive(Clone, Default)]
pub struct TestApcs(pub Rc<RefCell<Vec<(ThreadId, ObjectId, ApcData)>>>);

impl ApcQueue for TestApcs {
    fn queue_timer_apc(
        &mut self,
        thread: &ThreadRef,
        object: ObjectId,
        data: ApcData,
    ) -> bool {
        self.0.borrow_mut().push((thread.id(), object, data));
        true
    }

    fn cancel_timer_apc(
        &mut self,
        thread: &ThreadRef,
        object: ObjectId,
    ) {
        self.0
            .borrow_mut()
            .retain(|(queued_thread, queued_object, _)| {
                (*queued_thread, *queued_object) != (thread.id(), object)
            });
    }
}

#[derive(Clone)]
pub struct TestClock(pub Rc<Cell<Abstime>>);

impl TestClock {
    pub fn advance_ticks(
        &self,
        ticks: i64,
    ) {
        self.0.set(self.0.get() + ticks);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        // a minute of uptime, so negated deadlines stay clearly negative
        Self(Rc::new(Cell::new(600_000_000)))
    }
}

impl Clock for TestClock {
    fn monotonic(&self) -> Abstime {
        self.0.get()
    }

    fn wall(&self) -> Abstime {
        // epoch offset only matters for absolute due times
        self.0.get() + 17_000_000_000_000_000
    }
}

/// Everything a scenario needs: the engine plus handles into its ports.
pub struct Cluster {
    pub engine: SyncEngine,
    pub wait: Rc<RefCell<QueueState>>,
    pub timeouts: Rc<RefCell<TimeoutState>>,
    pub apcs: Rc<RefCell<Vec<(ThreadId, ObjectId, ApcData)>>>,
    pub clock: TestClock,
}

pub fn start_engine() -> Cluster {
    let wait = TestWaitQueue::default();
    let timeouts = TestTimeouts::default();
    let apcs = TestApcs::default();
    let clock = TestClock::default();

    let ctx = CoreContext::new(
        Box::new(wait.clone()),
        Box::new(timeouts.clone()),
        Box::new(apcs.clone()),
        Box::new(clock.clone()),
        Box::new(NoFastPath),
    );

    Cluster {
        engine: SyncEngine::new(ctx),
        wait: wait.0,
        timeouts: timeouts.0,
        apcs: apcs.0,
        clock,
    }
}
