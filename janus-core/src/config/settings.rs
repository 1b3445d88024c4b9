//! Persisted settings record
//!
//! The operating mode survives a restart. It is stored as a two-byte
//! postcard record: a format version followed by the mode byte.

#[cfg(feature = "defmt")]
use defmt::Format;
use serde::{Deserialize, Serialize};

use super::types::OperatingMode;

/// Current settings record version
pub const SETTINGS_VERSION: u8 = 1;

/// Encoded size of [`StoredSettings`]
pub const STORED_SETTINGS_SIZE: usize = 2;

/// Errors decoding a settings record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum SettingsError {
    /// Record written by an unknown firmware version
    VersionMismatch(u8),
    /// Record could not be deserialized
    Deserialize,
    /// Mode byte out of range
    InvalidMode(u8),
    /// Encoding buffer too small
    Serialize,
}

/// On-flash settings record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct StoredSettings {
    pub version: u8,
    pub mode: u8,
}

impl StoredSettings {
    /// Record for the given mode at the current version
    pub fn new(mode: OperatingMode) -> Self {
        Self {
            version: SETTINGS_VERSION,
            mode: mode.as_u8(),
        }
    }

    /// Serialize into `buffer`, returning the used prefix
    pub fn encode<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], SettingsError> {
        postcard::to_slice(self, buffer).map_err(|_| SettingsError::Serialize)
    }

    /// Deserialize and validate a record
    pub fn decode(data: &[u8]) -> Result<Self, SettingsError> {
        let settings: StoredSettings =
            postcard::from_bytes(data).map_err(|_| SettingsError::Deserialize)?;

        if settings.version != SETTINGS_VERSION {
            return Err(SettingsError::VersionMismatch(settings.version));
        }

        settings.operating_mode()?;
        Ok(settings)
    }

    /// Stored mode
    pub fn operating_mode(&self) -> Result<OperatingMode, SettingsError> {
        OperatingMode::from_u8(self.mode).ok_or(SettingsError::InvalidMode(self.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut buffer = [0u8; 8];
        let encoded = StoredSettings::new(OperatingMode::Manual)
            .encode(&mut buffer)
            .unwrap();
        assert_eq!(encoded, &[1, 2]);
        assert_eq!(encoded.len(), STORED_SETTINGS_SIZE);

        let decoded = StoredSettings::decode(encoded).unwrap();
        assert_eq!(decoded.operating_mode(), Ok(OperatingMode::Manual));
    }

    #[test]
    fn test_version_rejected() {
        assert_eq!(
            StoredSettings::decode(&[2, 3]),
            Err(SettingsError::VersionMismatch(2))
        );
    }

    #[test]
    fn test_truncated_rejected() {
        assert_eq!(StoredSettings::decode(&[1]), Err(SettingsError::Deserialize));
        assert_eq!(StoredSettings::decode(&[]), Err(SettingsError::Deserialize));
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert_eq!(
            StoredSettings::decode(&[1, 7]),
            Err(SettingsError::InvalidMode(7))
        );
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buffer = [0u8; 1];
        assert_eq!(
            StoredSettings::new(OperatingMode::Automatic).encode(&mut buffer),
            Err(SettingsError::Serialize)
        );
    }
}
