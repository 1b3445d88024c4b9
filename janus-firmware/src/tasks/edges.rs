//! Presence sensor edge tasks
//!
//! One task per sensor input. Each edge only stores the new level; the
//! control loop reconciles the cells once per cycle.

use defmt::*;
use embassy_rp::gpio::Input;

use janus_core::sensors::SensorCell;

/// One presence sensor input
pub struct EdgeSensor {
    pub name: &'static str,
    pub input: Input<'static>,
    /// Cell the level is stored into
    pub cell: &'static SensorCell,
    /// The sensor pulls its line low when it detects presence
    pub active_low: bool,
}

impl EdgeSensor {
    fn is_active(&self) -> bool {
        self.input.is_high() != self.active_low
    }
}

#[embassy_executor::task(pool_size = 4)]
pub async fn edge_task(mut sensor: EdgeSensor) {
    info!("Edge task started: {}", sensor.name);

    sensor.cell.store(sensor.is_active());

    loop {
        sensor.input.wait_for_any_edge().await;
        let active = sensor.is_active();
        sensor.cell.store(active);
        trace!("{}: {}", sensor.name, active);
    }
}
