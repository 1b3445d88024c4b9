//! Operating mode persistence
//!
//! The mode is read once at boot. Afterwards the control loop signals
//! [`SAVE_MODE`] whenever it changes and this task writes it to flash.

use defmt::*;

use janus_core::config::{OperatingMode, StoredSettings, STORED_SETTINGS_SIZE};
use janus_hal::{FlashError, FlashStorage, StorageKey};
use janus_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::SAVE_MODE;

/// Load the persisted operating mode, falling back to the default
pub async fn load_mode(storage: &mut Rp2040FlashStorage<'static>) -> OperatingMode {
    let mut buf = [0u8; STORED_SETTINGS_SIZE];

    let len = match storage.read(StorageKey::DoorSettings, &mut buf).await {
        Ok(len) => len,
        Err(FlashError::NotFound) => {
            info!("No stored settings, using default mode");
            return OperatingMode::default();
        }
        Err(e) => {
            warn!("Settings read failed: {:?}", e);
            return OperatingMode::default();
        }
    };

    match StoredSettings::decode(&buf[..len]).and_then(|s| s.operating_mode()) {
        Ok(mode) => {
            info!("Loaded mode from flash: {}", mode);
            mode
        }
        Err(e) => {
            warn!("Stored settings rejected: {:?}", e);
            OperatingMode::default()
        }
    }
}

#[embassy_executor::task]
pub async fn storage_task(mut storage: Rp2040FlashStorage<'static>) {
    info!("Storage task started");

    let mut buf = [0u8; STORED_SETTINGS_SIZE];

    loop {
        let mode = SAVE_MODE.wait().await;

        let encoded = match StoredSettings::new(mode).encode(&mut buf) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Settings encode failed: {:?}", e);
                continue;
            }
        };

        match storage.write(StorageKey::DoorSettings, encoded).await {
            Ok(()) => info!("Mode {} saved", mode),
            Err(e) => warn!("Settings write failed: {:?}", e),
        }
    }
}
