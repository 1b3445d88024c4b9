//! GPIO port expander trait

#[cfg(feature = "defmt")]
use defmt::Format;

/// One 8-bit port of a 16-bit expander
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum ExpanderPort {
    A,
    B,
}

/// 16-bit I/O expander with two 8-bit output ports
///
/// Used for diagnostic mirroring only. A missing expander is a supported
/// configuration, so callers check [`PortExpander::is_connected`] first.
pub trait PortExpander {
    /// Error type for bus operations
    type Error;

    /// Check that the device answers on the bus
    fn is_connected(&mut self) -> bool;

    /// Configure all pins of both ports as outputs
    fn init_outputs(&mut self) -> Result<(), Self::Error>;

    /// Write a port's output register
    fn write_port(&mut self, port: ExpanderPort, value: u8) -> Result<(), Self::Error>;
}
