//! Door/lock state machine
//!
//! Runs once per control cycle. The machine never drives hardware itself;
//! it exposes the state of its two relay pulses (release and lock) and the
//! held lock output, and returns the door command to send when it decides
//! to move the door.
//!
//! Release pulses tell the operator to cycle the door. The lock relay is
//! pulsed once per honoured lock request and only while the door is closed;
//! while the door is elsewhere a release reminder is repeated so the
//! operator brings the door home.

#[cfg(feature = "defmt")]
use defmt::Format;

use super::pulse::Pulse;
use crate::config::{DoorConfig, OperatingMode};
use crate::sensors::{DoorPosition, PresenceSnapshot};
use crate::time::has_elapsed;

/// Control states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum ControlState {
    /// Position unknown or inconsistent with the last state
    Undefined,
    /// Door just reached the open stop; hold timer starts next
    OpenStart,
    /// Door open, waiting for the close condition
    Open,
    /// Door closed and unlocked, waiting for the open condition
    Closed,
    /// Door closed and locked
    ClosedLocked,
    /// Release sent, waiting for the door to move
    Transition,
}

/// Command for the door operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum DoorCommand {
    Open,
    Close,
}

/// Manual switch location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum SwitchSide {
    Inside,
    Outside,
}

/// Inputs for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct DoorInputs {
    pub position: DoorPosition,
    pub mode: OperatingMode,
    pub lock_requested: bool,
    pub presence: PresenceSnapshot,
}

/// Door/lock state machine
#[derive(Debug, Clone)]
pub struct DoorStateMachine {
    min_open_ms: u32,
    transition_timeout_ms: u32,
    lock_reminder_interval_ms: u32,

    state: ControlState,
    last_position: DoorPosition,
    position_changed: bool,
    position_changed_at: u32,
    door_open_since: u32,

    release: Pulse,
    lock_pulse: Pulse,
    lock_active: bool,
    last_reminder_at: Option<u32>,

    switch_inside: bool,
    switch_outside: bool,
}

impl DoorStateMachine {
    pub fn new(config: &DoorConfig) -> Self {
        Self {
            min_open_ms: config.min_open_ms,
            transition_timeout_ms: config.transition_timeout_ms,
            lock_reminder_interval_ms: config.lock_reminder_interval_ms,
            state: ControlState::Undefined,
            last_position: DoorPosition::Undefined,
            position_changed: false,
            position_changed_at: 0,
            door_open_since: 0,
            release: Pulse::new(config.signal_pulse_ms),
            lock_pulse: Pulse::new(config.signal_pulse_ms),
            lock_active: false,
            last_reminder_at: None,
            switch_inside: false,
            switch_outside: false,
        }
    }

    /// Current control state
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Release relay energised
    pub fn release_active(&self) -> bool {
        self.release.is_active()
    }

    /// Operator lock relay energised
    pub fn lock_pulse_active(&self) -> bool {
        self.lock_pulse.is_active()
    }

    /// Lock engaged (held output)
    pub fn lock_active(&self) -> bool {
        self.lock_active
    }

    /// Whether either manual switch latch is set
    pub fn switch_latched(&self) -> bool {
        self.switch_inside || self.switch_outside
    }

    /// Latch a manual switch press until the machine consumes it
    pub fn latch_switch(&mut self, side: SwitchSide) {
        match side {
            SwitchSide::Inside => self.switch_inside = true,
            SwitchSide::Outside => self.switch_outside = true,
        }
        debug!("switch latched: {}", side);
    }

    /// Run one cycle
    ///
    /// Returns the door command issued this cycle, if any.
    pub fn update(&mut self, now_ms: u32, inputs: &DoorInputs) -> Option<DoorCommand> {
        self.track_position(now_ms, inputs.position);

        // Arbitration waits for a running release pulse, including the
        // cycle in which it ends
        let release_was_active = self.release.is_active();
        self.expire_pulses(now_ms);

        if inputs.mode != OperatingMode::Manual {
            self.switch_inside = false;
            self.switch_outside = false;
        }

        if !inputs.mode.is_active() {
            return None;
        }

        if !release_was_active && inputs.lock_requested != self.lock_active {
            self.arbitrate_lock(now_ms, inputs.lock_requested);
        }

        let previous = self.state;
        let command = self.step(now_ms, inputs);

        if self.state != previous {
            info!("door control: {} -> {}", previous, self.state);
        }

        command
    }

    fn track_position(&mut self, now_ms: u32, position: DoorPosition) {
        if position != self.last_position {
            self.last_position = position;
            self.position_changed = true;
            self.position_changed_at = now_ms;
        }
    }

    fn expire_pulses(&mut self, now_ms: u32) {
        if self.lock_pulse.expire(now_ms) {
            debug!("lock pulse: off");
        }

        if self.release.expire(now_ms) {
            self.restart_transition_timer(now_ms);
            debug!("release pulse: off");
        }
    }

    fn arbitrate_lock(&mut self, now_ms: u32, requested: bool) {
        match self.state {
            ControlState::Closed | ControlState::ClosedLocked => self.lock(now_ms, requested),
            _ => {
                let due = match self.last_reminder_at {
                    Some(at) => has_elapsed(now_ms, at, self.lock_reminder_interval_ms),
                    None => true,
                };
                if due {
                    info!("lock waiting for closed door, sending release reminder");
                    self.start_release(now_ms);
                    self.last_reminder_at = Some(now_ms);
                }
            }
        }
    }

    fn lock(&mut self, now_ms: u32, engage: bool) {
        if !self.lock_pulse.is_active() {
            self.lock_pulse.start(now_ms);
            debug!("lock pulse: on");
        }

        self.lock_active = engage;
        info!("lock engaged: {}", engage);
    }

    fn start_release(&mut self, now_ms: u32) {
        self.release.start(now_ms);
        self.restart_transition_timer(now_ms);
        debug!("release pulse: on");
    }

    fn restart_transition_timer(&mut self, now_ms: u32) {
        self.position_changed = false;
        self.position_changed_at = now_ms;
    }

    fn release_door(&mut self, now_ms: u32, command: DoorCommand) -> Option<DoorCommand> {
        self.start_release(now_ms);
        self.switch_inside = false;
        self.switch_outside = false;
        self.state = ControlState::Transition;
        Some(command)
    }

    fn step(&mut self, now_ms: u32, inputs: &DoorInputs) -> Option<DoorCommand> {
        let presence = &inputs.presence;

        match self.state {
            ControlState::Undefined => {
                match inputs.position {
                    DoorPosition::Open => self.state = ControlState::OpenStart,
                    DoorPosition::Closed => self.state = ControlState::Closed,
                    _ => {}
                }
                None
            }

            ControlState::OpenStart => {
                self.door_open_since = now_ms;
                self.state = ControlState::Open;
                None
            }

            ControlState::Open => {
                if inputs.position != DoorPosition::Open {
                    self.state = ControlState::Undefined;
                    return None;
                }

                let close = match inputs.mode {
                    OperatingMode::Automatic => {
                        presence.all_clear()
                            && has_elapsed(now_ms, self.door_open_since, self.min_open_ms)
                    }
                    _ => !presence.any_air() && self.switch_latched(),
                };

                if close {
                    self.release_door(now_ms, DoorCommand::Close)
                } else {
                    None
                }
            }

            ControlState::Closed => {
                if inputs.position != DoorPosition::Closed {
                    self.state = ControlState::Undefined;
                    return None;
                }

                if self.lock_active {
                    self.state = ControlState::ClosedLocked;
                    return None;
                }

                let open = match inputs.mode {
                    OperatingMode::Automatic => presence.any_radar(),
                    _ => self.switch_latched(),
                };

                if open {
                    self.release_door(now_ms, DoorCommand::Open)
                } else {
                    None
                }
            }

            ControlState::ClosedLocked => {
                if inputs.position != DoorPosition::Closed {
                    self.state = ControlState::Undefined;
                } else if !self.lock_active {
                    self.state = ControlState::Closed;
                }
                None
            }

            ControlState::Transition => {
                let settled = self.position_changed
                    || has_elapsed(now_ms, self.position_changed_at, self.transition_timeout_ms);

                if settled {
                    match inputs.position {
                        DoorPosition::Open => self.state = ControlState::OpenStart,
                        DoorPosition::Closed => self.state = ControlState::Closed,
                        _ => {}
                    }
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives a machine with a fixed cycle time
    struct Harness {
        machine: DoorStateMachine,
        now: u32,
        inputs: DoorInputs,
    }

    impl Harness {
        fn new(mode: OperatingMode, position: DoorPosition) -> Self {
            Self {
                machine: DoorStateMachine::new(&DoorConfig::default()),
                now: 10_000,
                inputs: DoorInputs {
                    position,
                    mode,
                    lock_requested: false,
                    presence: PresenceSnapshot::default(),
                },
            }
        }

        fn cycle(&mut self) -> Option<DoorCommand> {
            self.now = self.now.wrapping_add(10);
            self.machine.update(self.now, &self.inputs)
        }

        /// Run cycles for `ms` milliseconds, collecting commands
        fn run(&mut self, ms: u32) -> Option<DoorCommand> {
            let mut command = None;
            for _ in 0..ms / 10 {
                command = command.or(self.cycle());
            }
            command
        }

        fn state(&self) -> ControlState {
            self.machine.state()
        }
    }

    #[test]
    fn test_settles_from_undefined() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Undefined);
        h.cycle();
        assert_eq!(h.state(), ControlState::Undefined);

        h.inputs.position = DoorPosition::Closed;
        h.cycle();
        assert_eq!(h.state(), ControlState::Closed);

        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Open);
        h.cycle();
        assert_eq!(h.state(), ControlState::OpenStart);
        h.cycle();
        assert_eq!(h.state(), ControlState::Open);
    }

    #[test]
    fn test_automatic_open_on_radar() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Closed);
        h.cycle();
        assert_eq!(h.state(), ControlState::Closed);

        h.inputs.presence.outside_radar = true;
        assert_eq!(h.cycle(), Some(DoorCommand::Open));
        assert_eq!(h.state(), ControlState::Transition);
        assert!(h.machine.release_active());

        // Exactly one pulse of the configured length
        h.run(90);
        assert!(h.machine.release_active());
        h.cycle();
        assert!(!h.machine.release_active());

        h.inputs.position = DoorPosition::Opening;
        h.cycle();
        assert_eq!(h.state(), ControlState::Transition);

        h.inputs.position = DoorPosition::Open;
        h.cycle();
        assert_eq!(h.state(), ControlState::OpenStart);
    }

    #[test]
    fn test_automatic_close_after_hold() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Open);
        h.run(20);
        assert_eq!(h.state(), ControlState::Open);
        let open_since = h.now;

        // Presence keeps the door open past the hold time
        h.inputs.presence.inside_air = true;
        assert_eq!(h.run(5000), None);
        assert_eq!(h.state(), ControlState::Open);

        h.inputs.presence.inside_air = false;
        assert_eq!(h.cycle(), Some(DoorCommand::Close));
        assert!(h.now.wrapping_sub(open_since) >= 3000);
        assert_eq!(h.state(), ControlState::Transition);
    }

    #[test]
    fn test_automatic_close_waits_for_min_open() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Open);
        h.run(20);
        let open_since = h.now;

        assert_eq!(h.run(2990), None);
        assert_eq!(h.state(), ControlState::Open);

        assert_eq!(h.cycle(), Some(DoorCommand::Close));
        assert_eq!(h.now.wrapping_sub(open_since), 3000);
    }

    #[test]
    fn test_lock_when_closed() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Closed);
        h.cycle();

        h.inputs.lock_requested = true;
        h.cycle();
        assert!(h.machine.lock_active());
        assert!(h.machine.lock_pulse_active());
        assert!(!h.machine.release_active());
        assert_eq!(h.state(), ControlState::ClosedLocked);

        // The relay is pulsed, never held
        h.run(100);
        assert!(!h.machine.lock_pulse_active());
        assert!(h.machine.lock_active());

        // Radar is ignored while locked
        h.inputs.presence.inside_radar = true;
        assert_eq!(h.run(500), None);
        assert_eq!(h.state(), ControlState::ClosedLocked);

        h.inputs.presence.inside_radar = false;
        h.inputs.lock_requested = false;
        h.cycle();
        assert!(!h.machine.lock_active());
        assert!(h.machine.lock_pulse_active());
        assert_eq!(h.state(), ControlState::Closed);
    }

    #[test]
    fn test_lock_reminder_then_lock_after_closing() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Open);
        h.run(20);
        assert_eq!(h.state(), ControlState::Open);

        // Someone in the door keeps it from closing on its own
        h.inputs.presence.inside_radar = true;
        h.inputs.lock_requested = true;
        h.cycle();
        assert!(h.machine.release_active());
        assert!(!h.machine.lock_active());
        assert!(!h.machine.lock_pulse_active());
        assert_eq!(h.state(), ControlState::Open);

        // No second reminder before the interval
        h.run(100);
        assert!(!h.machine.release_active());
        h.run(2800);
        assert!(!h.machine.release_active());

        let mut reminded = false;
        for _ in 0..20 {
            h.cycle();
            reminded |= h.machine.release_active();
        }
        assert!(reminded);
        h.run(200);

        // Door swings shut
        h.inputs.presence.inside_radar = false;
        h.inputs.position = DoorPosition::Closing;
        h.cycle();
        assert_eq!(h.state(), ControlState::Undefined);
        h.inputs.position = DoorPosition::Closed;
        h.cycle();
        assert_eq!(h.state(), ControlState::Closed);

        h.cycle();
        assert!(h.machine.lock_active());
        assert!(h.machine.lock_pulse_active());
        assert_eq!(h.state(), ControlState::ClosedLocked);
    }

    #[test]
    fn test_transition_timeout_fallback() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Closed);
        h.cycle();

        h.inputs.presence.inside_radar = true;
        assert_eq!(h.cycle(), Some(DoorCommand::Open));
        h.inputs.presence.inside_radar = false;

        // Door never moves; the timer restarts when the pulse ends at +100
        h.run(3080);
        assert_eq!(h.state(), ControlState::Transition);

        h.run(20);
        assert_eq!(h.state(), ControlState::Closed);
    }

    #[test]
    fn test_transition_stays_while_moving() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Closed);
        h.cycle();
        h.inputs.presence.inside_radar = true;
        h.cycle();
        h.inputs.presence.inside_radar = false;

        h.inputs.position = DoorPosition::Opening;
        h.run(10_000);
        assert_eq!(h.state(), ControlState::Transition);
    }

    #[test]
    fn test_inconsistent_position_forces_undefined() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Closed);
        h.cycle();
        h.inputs.position = DoorPosition::Opening;
        h.cycle();
        assert_eq!(h.state(), ControlState::Undefined);

        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Closed);
        h.cycle();
        h.inputs.lock_requested = true;
        h.cycle();
        assert_eq!(h.state(), ControlState::ClosedLocked);
        h.inputs.position = DoorPosition::Open;
        h.cycle();
        assert_eq!(h.state(), ControlState::Undefined);
    }

    #[test]
    fn test_manual_switch_opens_and_clears_latch() {
        let mut h = Harness::new(OperatingMode::Manual, DoorPosition::Closed);
        h.cycle();

        // Radar alone does nothing in manual mode
        h.inputs.presence.inside_radar = true;
        assert_eq!(h.run(100), None);

        h.machine.latch_switch(SwitchSide::Inside);
        assert_eq!(h.cycle(), Some(DoorCommand::Open));
        assert!(!h.machine.switch_latched());
    }

    #[test]
    fn test_manual_close_blocked_by_air() {
        let mut h = Harness::new(OperatingMode::Manual, DoorPosition::Open);
        h.run(20);

        h.inputs.presence.outside_air = true;
        h.machine.latch_switch(SwitchSide::Outside);
        assert_eq!(h.run(500), None);
        assert!(h.machine.switch_latched());

        h.inputs.presence.outside_air = false;
        assert_eq!(h.cycle(), Some(DoorCommand::Close));
        assert!(!h.machine.switch_latched());
    }

    #[test]
    fn test_inactive_mode_is_inert() {
        for mode in [OperatingMode::AlwaysOpen, OperatingMode::AlwaysClosed] {
            let mut h = Harness::new(mode, DoorPosition::Closed);
            h.inputs.presence.inside_radar = true;
            h.inputs.lock_requested = true;
            assert_eq!(h.run(1000), None);
            assert_eq!(h.state(), ControlState::Undefined);
            assert!(!h.machine.lock_active());
            assert!(!h.machine.release_active());
        }
    }

    #[test]
    fn test_pulse_ends_after_mode_change() {
        let mut h = Harness::new(OperatingMode::Automatic, DoorPosition::Closed);
        h.cycle();
        h.inputs.presence.inside_radar = true;
        h.cycle();
        assert!(h.machine.release_active());

        h.inputs.mode = OperatingMode::AlwaysClosed;
        h.run(100);
        assert!(!h.machine.release_active());
    }

    #[test]
    fn test_latch_cleared_outside_manual() {
        let mut h = Harness::new(OperatingMode::Manual, DoorPosition::Undefined);
        h.machine.latch_switch(SwitchSide::Inside);
        h.inputs.mode = OperatingMode::Automatic;
        h.cycle();
        assert!(!h.machine.switch_latched());
    }
}
