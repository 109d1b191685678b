use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Which fast-path backend newly created objects bind to.
///
/// This replaces the process-wide mutable toggles of older designs: the
/// choice is made once, at engine construction, and threaded through to
/// every object creation. The two backends are mutually exclusive.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// No fast path; all waits go through the central server
    #[default]
    None,
    /// One OS event-style descriptor per object
    Fd,
    /// One atomic state word per object in a process-shared region
    SharedMemory,
}

/// Fast-path backend configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Capacity of the shared signal region, in slots
    /// Only meaningful when `kind` is `shared-memory`
    #[serde(default = "default_shm_slot_capacity")]
    pub shm_slot_capacity: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            shm_slot_capacity: default_shm_slot_capacity(),
        }
    }
}

impl BackendConfig {
    /// Validates backend configuration
    pub fn validate(&self) -> Result<()> {
        if self.kind == BackendKind::SharedMemory && self.shm_slot_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "shm_slot_capacity must be greater than 0 for the shared-memory backend".into(),
            )));
        }
        Ok(())
    }
}

fn default_shm_slot_capacity() -> u32 {
    4096
}
