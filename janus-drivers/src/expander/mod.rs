//! Port expander drivers

pub mod shared;
pub mod tca9555;

pub use shared::SharedBus;
pub use tca9555::Tca9555;
