//! Configuration for the synchronization core.
//!
//! Provides layered configuration loading with priority:
//! 1. Default values (hardcoded)
//! 2. Config file
//! 3. Environment variables (highest priority)

mod backend;
pub use backend::*;


//---
use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    /// Fast-path backend selection and sizing
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Settings {
    /// Load configuration from an optional file plus `SYNC__`-prefixed
    /// environment variables (e.g. `SYNC__BACKEND__KIND=fd`).
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = Config::builder();

        if let Some(path) = path {
            config = config.add_source(File::with_name(path).required(true));
        }

        config = config.add_source(
            Environment::with_prefix("SYNC")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = config.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates all subsystem configurations
    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        Ok(())
    }
}
