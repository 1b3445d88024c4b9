//! Digital signal output trait

/// A digital output to the door operator or sensors
///
/// The implementation owns the electrical active level, so callers only
/// ever speak in terms of "active".
pub trait SignalOutput {
    /// Assert or release the signal
    fn set_active(&mut self, active: bool);

    /// Check if the signal is currently asserted
    fn is_active(&self) -> bool;
}
