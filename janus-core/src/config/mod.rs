//! Configuration types
//!
//! Deployment-tuned timing and thresholds are compiled in as
//! [`DoorConfig`] defaults. Only the operating mode is persisted, as a
//! small postcard record.

pub mod settings;
pub mod types;

pub use settings::{SettingsError, StoredSettings, SETTINGS_VERSION, STORED_SETTINGS_SIZE};
pub use types::*;
