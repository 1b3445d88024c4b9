//! Door controller
//!
//! One [`DoorController::cycle`] call is one pass of the control loop:
//! sensors are sampled, the state machine runs, the outbound command stream
//! advances and inbound frames are drained. The controller never touches a
//! pin; the caller applies the returned [`DoorOutputs`].

#[cfg(feature = "defmt")]
use defmt::Format;

use janus_hal::Uart;
use janus_protocol::{CommandError, CommandId};

use crate::config::{DoorConfig, OperatingMode};
use crate::diagnostics::DiagnosticPorts;
use crate::door::{ControlState, DoorCommand, DoorInputs, DoorStateMachine, SwitchSide};
use crate::safety::EdgeProtection;
use crate::sensors::{
    DoorPosition, EdgeInputs, HysteresisSwitch, Polarity, PositionTracker, PresenceDebouncer,
};
use crate::sequencer::CommandSequencer;
use crate::transport::{DoorTransport, TransportStatus};

/// Raw ADC readings sampled for one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct AnalogReadings {
    /// Open end-stop sensor
    pub door_open: u16,
    /// Closed end-stop sensor
    pub door_closed: u16,
    /// Door operator power sense
    pub operator_power: u16,
    /// Door operator test request
    pub operator_test: u16,
}

/// Output levels and events produced by one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct DoorOutputs {
    /// Release relay to the operator
    pub release: bool,
    /// Lock relay to the operator
    pub lock_pulse: bool,
    /// Held door lock output
    pub lock_engaged: bool,
    /// Main closing-edge safety output (HSK)
    pub main_edge: bool,
    /// Secondary closing-edge safety output (NSK)
    pub secondary_edge: bool,
    /// Presence sensor test output
    pub sensor_test: bool,
    pub state: ControlState,
    pub position: DoorPosition,
    /// Door command issued this cycle
    pub command: Option<DoorCommand>,
    /// Diagnostic port image
    pub ports: DiagnosticPorts,
}

/// Snapshot for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct ControllerStatus {
    pub mode: OperatingMode,
    pub state: ControlState,
    pub position: DoorPosition,
    pub lock_requested: bool,
    pub lock_active: bool,
    pub operator_power: bool,
    pub command: Option<&'static str>,
    pub transport: TransportStatus,
}

/// Swing-door controller
pub struct DoorController<P: Uart> {
    config: DoorConfig,
    mode: OperatingMode,
    lock_requested: bool,
    debouncer: PresenceDebouncer,
    operator_test: HysteresisSwitch,
    operator_power: HysteresisSwitch,
    position: PositionTracker,
    protection: EdgeProtection,
    machine: DoorStateMachine,
    sequencer: CommandSequencer,
    transport: DoorTransport<P>,
}

impl<P: Uart> DoorController<P> {
    /// Create a controller owning the operator serial port
    ///
    /// The operator is initialised with the `init1` command until the
    /// door first moves.
    pub fn new(config: DoorConfig, mode: OperatingMode, port: P) -> Self {
        let mut sequencer = CommandSequencer::new(config.command_interval_ms, config.debug_output);
        sequencer.select(CommandId::Init1.definition());

        info!("door controller: mode {}", mode);

        Self {
            mode,
            lock_requested: false,
            debouncer: PresenceDebouncer::new(),
            operator_test: HysteresisSwitch::new(config.test_signal, Polarity::ActiveBelow),
            operator_power: HysteresisSwitch::new(config.power, Polarity::ActiveAbove),
            position: PositionTracker::new(config.position),
            protection: EdgeProtection::new(config.main_edge_source, config.secondary_edge_source),
            machine: DoorStateMachine::new(&config),
            sequencer,
            transport: DoorTransport::new(port, config.debug_output),
            config,
        }
    }

    pub fn config(&self) -> &DoorConfig {
        &self.config
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Change the operating mode
    ///
    /// Returns true when the mode changed and should be persisted.
    pub fn set_mode(&mut self, mode: OperatingMode) -> bool {
        if mode == self.mode {
            return false;
        }
        info!("mode: {} -> {}", self.mode, mode);
        self.mode = mode;
        true
    }

    /// Set or clear the external lock request
    pub fn request_lock(&mut self, requested: bool) {
        if requested != self.lock_requested {
            info!("lock requested: {}", requested);
        }
        self.lock_requested = requested;
    }

    /// Manual switch press
    ///
    /// Only latched in manual mode. Returns true when latched.
    pub fn trigger_switch(&mut self, side: SwitchSide) -> bool {
        if self.mode != OperatingMode::Manual {
            debug!("switch {} ignored outside manual mode", side);
            return false;
        }
        self.machine.latch_switch(side);
        true
    }

    /// Select an outbound command by token
    pub fn select_command(&mut self, token: &str) -> Result<CommandId, CommandError> {
        self.sequencer.select_token(token)
    }

    /// Serial transport, for inbound messages and the message callback
    pub fn transport_mut(&mut self) -> &mut DoorTransport<P> {
        &mut self.transport
    }

    /// Run one control cycle
    pub fn cycle(&mut self, now_ms: u32, edges: &EdgeInputs, analog: AnalogReadings) -> DoorOutputs {
        let presence = self.debouncer.reconcile(edges);

        if let Some(active) = self.operator_test.update(analog.operator_test) {
            debug!("operator test: {}", active);
        }

        self.protection.update(&presence);

        if let Some(present) = self.operator_power.update(analog.operator_power) {
            info!("operator power: {}", present);
        }

        self.position.update(analog.door_open, analog.door_closed);
        let position = self.position.position();

        let inputs = DoorInputs {
            position,
            mode: self.mode,
            lock_requested: self.lock_requested,
            presence,
        };
        let command = self.machine.update(now_ms, &inputs);

        match command {
            Some(DoorCommand::Open) => self.sequencer.select(CommandId::Open.definition()),
            Some(DoorCommand::Close) => self.sequencer.select(CommandId::Close.definition()),
            None => {}
        }

        if self.sequencer.tick(now_ms, &mut self.transport).is_err() {
            warn!("door link: command write failed");
        }

        if self.transport.poll().is_err() {
            warn!("door link: read failed");
        }

        let sensor_test = self.operator_test.is_active();

        let mut ports = DiagnosticPorts::new();
        ports.set_switch_latched(self.machine.switch_latched());
        ports.set_position(position);
        ports.set_mode(self.mode);
        ports.set_presence(&presence);
        ports.set_lock_pulse(self.machine.lock_pulse_active());
        ports.set_operator_test(sensor_test);
        ports.set_edges(self.protection.main_active(), self.protection.secondary_active());
        ports.set_release(self.machine.release_active());
        ports.set_operator_power(self.operator_power.is_active());
        ports.set_sensor_test(sensor_test);
        ports.set_lock(self.machine.lock_active(), self.lock_requested);

        DoorOutputs {
            release: self.machine.release_active(),
            lock_pulse: self.machine.lock_pulse_active(),
            lock_engaged: self.machine.lock_active(),
            main_edge: self.protection.main_active(),
            secondary_edge: self.protection.secondary_active(),
            sensor_test,
            state: self.machine.state(),
            position,
            command,
            ports,
        }
    }

    /// Status for external reporting
    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            mode: self.mode,
            state: self.machine.state(),
            position: self.position.position(),
            lock_requested: self.lock_requested,
            lock_active: self.machine.lock_active(),
            operator_power: self.operator_power.is_active(),
            command: self.sequencer.current().map(|d| d.name),
            transport: self.transport.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockUart;
    use heapless::Vec;
    use janus_protocol::{encode_to_vec, FrameDecoder, Payload};

    const LOW: u16 = 100;
    const HIGH: u16 = 900;

    const CLOSED: AnalogReadings = AnalogReadings {
        door_open: HIGH,
        door_closed: LOW,
        operator_power: HIGH,
        operator_test: HIGH,
    };

    const OPEN: AnalogReadings = AnalogReadings {
        door_open: LOW,
        door_closed: HIGH,
        operator_power: HIGH,
        operator_test: HIGH,
    };

    fn controller(mode: OperatingMode) -> DoorController<MockUart> {
        DoorController::new(DoorConfig::default(), mode, MockUart::default())
    }

    fn sent_payloads(controller: &mut DoorController<MockUart>) -> Vec<Payload, 64> {
        let mut decoder = FrameDecoder::new();
        let mut out = Vec::new();
        for &byte in controller.transport_mut().port_mut().tx.iter() {
            if let Ok(Some(payload)) = decoder.feed(byte) {
                out.push(payload).unwrap();
            }
        }
        out
    }

    #[test]
    fn test_boot_sends_init() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);
        ctl.cycle(0, &edges, CLOSED);

        let sent = sent_payloads(&mut ctl);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].as_slice(), &CommandId::Init1.definition().payload);
        assert_eq!(ctl.status().command, Some("init1"));
    }

    #[test]
    fn test_radar_opens_door() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);

        let out = ctl.cycle(0, &edges, CLOSED);
        assert_eq!(out.state, ControlState::Closed);
        assert_eq!(out.position, DoorPosition::Closed);
        assert!(!out.release);

        edges.outside_radar.store(true);
        let out = ctl.cycle(10, &edges, CLOSED);
        assert_eq!(out.command, Some(DoorCommand::Open));
        assert!(out.release);
        assert_eq!(out.state, ControlState::Transition);
        assert_eq!(ctl.status().command, Some("open"));

        // Prefixes go out first, one per interval
        ctl.cycle(110, &edges, CLOSED);
        ctl.cycle(210, &edges, CLOSED);
        let open = CommandId::Open.definition();
        let sent = sent_payloads(&mut ctl);
        assert_eq!(sent[1].as_slice(), &open.prefixes[0]);
        assert_eq!(sent[2].as_slice(), &open.prefixes[1]);
        assert_eq!(sent[3].as_slice(), &open.payload);
    }

    #[test]
    fn test_open_door_closes_after_hold() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);

        ctl.cycle(0, &edges, OPEN);
        let out = ctl.cycle(10, &edges, OPEN);
        assert_eq!(out.state, ControlState::Open);

        let out = ctl.cycle(2000, &edges, OPEN);
        assert_eq!(out.command, None);

        let out = ctl.cycle(3010, &edges, OPEN);
        assert_eq!(out.command, Some(DoorCommand::Close));
        assert_eq!(ctl.status().command, Some("close"));
    }

    #[test]
    fn test_lock_request_when_closed() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);
        ctl.cycle(0, &edges, CLOSED);

        ctl.request_lock(true);
        let out = ctl.cycle(10, &edges, CLOSED);
        assert!(out.lock_pulse);
        assert!(out.lock_engaged);
        assert_eq!(out.state, ControlState::ClosedLocked);

        let out = ctl.cycle(110, &edges, CLOSED);
        assert!(!out.lock_pulse);
        assert!(out.lock_engaged);
        assert!(ctl.status().lock_active);
    }

    #[test]
    fn test_set_mode_reports_change() {
        let mut ctl = controller(OperatingMode::Automatic);
        assert!(!ctl.set_mode(OperatingMode::Automatic));
        assert!(ctl.set_mode(OperatingMode::Manual));
        assert_eq!(ctl.mode(), OperatingMode::Manual);
    }

    #[test]
    fn test_switch_only_in_manual() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);
        ctl.cycle(0, &edges, CLOSED);

        assert!(!ctl.trigger_switch(SwitchSide::Inside));
        assert_eq!(ctl.cycle(10, &edges, CLOSED).command, None);

        ctl.set_mode(OperatingMode::Manual);
        assert!(ctl.trigger_switch(SwitchSide::Inside));
        assert_eq!(ctl.cycle(20, &edges, CLOSED).command, Some(DoorCommand::Open));
    }

    #[test]
    fn test_select_command_token() {
        let mut ctl = controller(OperatingMode::Automatic);
        assert_eq!(ctl.select_command("closed"), Ok(CommandId::Closed));
        assert_eq!(ctl.select_command("nope"), Err(CommandError::UnknownToken));
        assert_eq!(ctl.status().command, Some("closed"));
    }

    #[test]
    fn test_safety_edges_follow_air_sensors() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);

        edges.inside_air.store(true);
        let out = ctl.cycle(0, &edges, CLOSED);
        assert!(out.main_edge);
        assert!(out.secondary_edge);

        edges.inside_air.store(false);
        let out = ctl.cycle(10, &edges, CLOSED);
        assert!(!out.main_edge);
        assert!(!out.secondary_edge);
    }

    #[test]
    fn test_sensor_test_follows_operator() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);

        let testing = AnalogReadings {
            operator_test: LOW,
            ..CLOSED
        };
        let out = ctl.cycle(0, &edges, testing);
        assert!(out.sensor_test);
        assert_ne!(out.ports.ext2_a, 0);

        let out = ctl.cycle(10, &edges, CLOSED);
        assert!(!out.sensor_test);
    }

    #[test]
    fn test_operator_power_status() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);

        ctl.cycle(0, &edges, CLOSED);
        assert!(ctl.status().operator_power);

        let unpowered = AnalogReadings {
            operator_power: LOW,
            ..CLOSED
        };
        ctl.cycle(10, &edges, unpowered);
        assert!(!ctl.status().operator_power);
    }

    #[test]
    fn test_inbound_frames_queued_during_cycle() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);

        let status = encode_to_vec(&[0x30, 0x01]).unwrap();
        ctl.transport_mut().port_mut().inject(&status);
        ctl.cycle(0, &edges, CLOSED);

        assert_eq!(ctl.status().transport.queue_depth, 1);
        let message = ctl.transport_mut().pop_message().unwrap();
        assert_eq!(message.as_slice(), &[0x30, 0x01]);
    }

    #[test]
    fn test_write_failure_not_fatal() {
        let edges = EdgeInputs::new();
        let mut ctl = controller(OperatingMode::Automatic);
        ctl.transport_mut().port_mut().fail_tx = true;

        let out = ctl.cycle(0, &edges, CLOSED);
        assert_eq!(out.state, ControlState::Closed);

        ctl.transport_mut().port_mut().fail_tx = false;
        ctl.cycle(10, &edges, CLOSED);
        assert_eq!(sent_payloads(&mut ctl).len(), 1);
    }
}
