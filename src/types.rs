use serde::Deserialize;
use serde::Serialize;

/// Process-local handle value handed back to clients.
///
/// Handles are allocated per process by the registry; the same object can be
/// reachable through many handles with different granted access masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(pub u32);

/// Server-side identity of a synchronization object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

pub type ProcessId = u32;
pub type ThreadId = u32;

/// Signed absolute time in 100ns ticks.
///
/// Positive values are wall-clock ticks since the epoch; negative values are
/// a negated monotonic deadline. The sign distinguishes "absolute wall clock"
/// from "anchored to the monotonic clock" without a second field.
pub type Abstime = i64;

/// Timeout in 100ns ticks: positive is an absolute wall-clock time, zero or
/// negative is relative to now.
pub type Timeout = i64;
