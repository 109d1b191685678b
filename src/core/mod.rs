mod context;
mod engine;
mod event;
mod keyed_event;
mod object;
mod registry;
mod timer;

pub use context::*;
pub use engine::*;
pub use event::*;
pub use keyed_event::*;
pub use object::*;
pub(crate) use registry::*;
pub use timer::*;
