mod backend;
mod config;
mod core;
mod errors;
mod sched;
mod wait;
pub mod constants;
pub mod types;
pub mod utils;

pub use crate::core::*;

pub use backend::*;
pub use config::*;
pub use errors::*;
pub use sched::*;
pub use wait::*;

//-----------------------------------------------------------
// Test utils
