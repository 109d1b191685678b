// -
// Time units

/// 100ns ticks per millisecond
pub(crate) const TICKS_PER_MS: i64 = 10_000;

/// Sentinel expire value: never fires, no timeout is scheduled
pub const TIMEOUT_INFINITE: i64 = i64::MAX;

// -
// Event operation opcodes (wire values)

pub const PULSE_EVENT: u32 = 0;
pub const SET_EVENT: u32 = 1;
pub const RESET_EVENT: u32 = 2;

// -
// Generic access rights

pub const GENERIC_READ: u32 = 0x8000_0000;
pub const GENERIC_WRITE: u32 = 0x4000_0000;
pub const GENERIC_EXECUTE: u32 = 0x2000_0000;
pub const GENERIC_ALL: u32 = 0x1000_0000;

// -
// Standard rights

pub const STANDARD_RIGHTS_READ: u32 = 0x0002_0000;
pub const STANDARD_RIGHTS_WRITE: u32 = 0x0002_0000;
pub const STANDARD_RIGHTS_EXECUTE: u32 = 0x0002_0000;
pub const STANDARD_RIGHTS_REQUIRED: u32 = 0x000F_0000;
pub const STANDARD_RIGHTS_ALL: u32 = 0x001F_0000;
pub const SYNCHRONIZE: u32 = 0x0010_0000;

// -
// Event rights

pub const EVENT_QUERY_STATE: u32 = 0x0001;
pub const EVENT_MODIFY_STATE: u32 = 0x0002;
pub const EVENT_ALL_ACCESS: u32 = STANDARD_RIGHTS_REQUIRED | SYNCHRONIZE | 0x3;

// -
// Keyed-event rights

pub const KEYEDEVENT_WAIT: u32 = 0x0001;
pub const KEYEDEVENT_WAKE: u32 = 0x0002;
pub const KEYEDEVENT_ALL_ACCESS: u32 = STANDARD_RIGHTS_REQUIRED | KEYEDEVENT_WAIT | KEYEDEVENT_WAKE;

// -
// Timer rights

pub const TIMER_QUERY_STATE: u32 = 0x0001;
pub const TIMER_MODIFY_STATE: u32 = 0x0002;
pub const TIMER_ALL_ACCESS: u32 = STANDARD_RIGHTS_REQUIRED | SYNCHRONIZE | 0x3;
