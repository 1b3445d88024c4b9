//! Inter-task communication
//!
//! Static primitives shared between the Embassy tasks. The control loop is
//! the only consumer of everything here except [`SAVE_MODE`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::pipe::Pipe;
use embassy_sync::signal::Signal;

use janus_core::config::OperatingMode;
use janus_core::door::SwitchSide;
use janus_core::sensors::EdgeInputs;
use janus_hal_rp2040::uart::RxPipe;

/// Capacity of the raw receive pipe from the door operator UART
pub const RX_PIPE_SIZE: usize = 256;

/// Channel capacity for collaborator requests
const REQUEST_CHANNEL_SIZE: usize = 8;

/// Requests from collaborators (building bus, service interface)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlRequest {
    /// Change the operating mode
    SetMode(OperatingMode),
    /// Set or clear the lock request
    Lock(bool),
    /// Manual switch press
    Switch(SwitchSide),
    /// Select an outbound operator command by token
    Command(&'static str),
}

/// Presence sensor levels, written by the edge tasks
pub static EDGE_INPUTS: EdgeInputs = EdgeInputs::new();

/// Raw bytes received from the door operator
pub static RX_PIPE: RxPipe<RX_PIPE_SIZE> = Pipe::new();

/// Collaborator requests for the control loop
pub static CONTROL_REQUESTS: Channel<CriticalSectionRawMutex, ControlRequest, REQUEST_CHANNEL_SIZE> =
    Channel::new();

/// Operating mode to persist (latest value wins)
pub static SAVE_MODE: Signal<CriticalSectionRawMutex, OperatingMode> = Signal::new();
