use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::FastSync;
use crate::types::ObjectId;
use crate::types::ThreadId;
use crate::WaitEntry;
use crate::Waitable;
use crate::WaitQueue;

/// Functional wait-queue engine: parks entries per object and releases them
/// with the poll-satisfy-wake loop the real engine runs.
#[derive(Default)]
pub struct LoopWaitQueue {
    queues: HashMap<ObjectId, Vec<WaitEntry>>,
    /// Every wake that happened, in order
    pub woken: Vec<(ObjectId, ThreadId)>,
}

impl LoopWaitQueue {
    pub fn new() -> Self {
        Self::default()
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

    pub fn queued(
        &self,
        object: ObjectId,
    ) -> usize {
        self.queues.get(&object).map_or(0, |queue| queue.len())
    }
}

impl WaitQueue for LoopWaitQueue {
    fn add_queue(
        &mut self,
        object: ObjectId,
        entry: WaitEntry,
    ) {
        self.queues.entry(object).or_default().push(entry);
    }

    fn remove_queue(
        &mut self,
        object: ObjectId,
        thread: ThreadId,
    ) {
        if let Some(queue) = self.queues.get_mut(&object) {
            queue.retain(|entry| entry.thread != thread);
        }
    }

    fn entries(
        &self,
        object: ObjectId,
    ) -> Vec<WaitEntry> {
        self.queues.get(&object).cloned().unwrap_or_default()
    }

    fn wake_entry(
        &mut self,
        object: ObjectId,
        thread: ThreadId,
    ) -> bool {
        let Some(queue) = self.queues.get_mut(&object) else {
            return false;
        };
        let Some(position) = queue.iter().position(|entry| entry.thread == thread) else {
            return false;
        };
        queue.remove(position);
        self.woken.push((object, thread));
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

/// Handle that lets a test keep inspecting the queue after the engine took
/// ownership of the port.
#[derive(Clone)]
pub struct SharedWaitQueue(pub Rc<RefCell<LoopWaitQueue>>);

impl SharedWaitQueue {
    pub fn new() -> (Self, Rc<RefCell<LoopWaitQueue>>) {
        let inner = Rc::new(RefCell::new(LoopWaitQueue::new()));
        (Self(inner.clone()), inner)
    }
}

impl WaitQueue for SharedWaitQueue {
    fn add_queue(
        &mut self,
        object: ObjectId,
        entry: WaitEntry,
    ) {
        self.0.borrow_mut().add_queue(object, entry);
    }

    fn remove_queue(
        &mut self,
        object: ObjectId,
        thread: ThreadId,
    ) {
        self.0.borrow_mut().remove_queue(object, thread);
    }

    fn entries(
        &self,
        object: ObjectId,
    ) -> Vec<WaitEntry> {
        self.0.borrow().entries(object)
    }

    fn wake_entry(
        &mut self,
        object: ObjectId,
        thread: ThreadId,
    ) -> bool {
        self.0.borrow_mut().wake_entry(object, thread)
    }

    fn wake_up(
        &mut self,
        object: &mut dyn Waitable,
        wake_all: bool,
        fast: &mut dyn FastSync,
    ) -> usize {
        self.0.borrow_mut().wake_up(object, wake_all, fast)
    }
}
