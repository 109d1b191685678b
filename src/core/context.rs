use crate::ApcQueue;
use crate::Clock;
use crate::FastSync;
use crate::TimeoutService;
use crate::WaitQueue;

/// Collaborator ports handed to every object operation.
///
/// Everything in here runs on the same serialized dispatch loop as the core;
/// none of these calls block or re-enter the core.
pub struct CoreContext {
    pub wait: Box<dyn WaitQueue>,
    pub timeouts: Box<dyn TimeoutService>,
    pub apcs: Box<dyn ApcQueue>,
    pub clock: Box<dyn Clock>,
    pub fast: Box<dyn FastSync>,
}

impl CoreContext {
    pub fn new(
        wait: Box<dyn WaitQueue>,
        timeouts: Box<dyn TimeoutService>,
        apcs: Box<dyn ApcQueue>,
        clock: Box<dyn Clock>,
        fast: Box<dyn FastSync>,
    ) -> Self {
        Self {
            wait,
            timeouts,
            apcs,
            clock,
            fast,
        }
    }
}
