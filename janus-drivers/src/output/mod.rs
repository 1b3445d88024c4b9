//! Signal output implementations

pub mod gpio;

pub use gpio::{ActiveLevel, GpioSignal};
