//! Sensor inputs
//!
//! Digital presence sensors arrive as edges and are debounced into a stable
//! per-cycle snapshot. Analog inputs (door position, operator power, operator
//! test signal) are turned into discrete states with threshold hysteresis.

pub mod debounce;
pub mod position;
pub mod threshold;

pub use debounce::{EdgeInputs, PresenceDebouncer, PresenceSnapshot, SensorCell};
pub use position::{DoorPosition, PositionTracker};
pub use threshold::{Hysteresis, HysteresisSwitch, Polarity};
