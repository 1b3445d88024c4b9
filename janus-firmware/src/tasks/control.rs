//! Door control loop task
//!
//! The single cooperative loop of the controller. Every tick it drains
//! collaborator requests, samples the analog inputs, runs one controller
//! cycle and applies the outputs, then mirrors the diagnostic image to the
//! port expanders.

use core::cell::RefCell;

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Instant, Ticker};

use janus_core::diagnostics::DiagnosticMirror;
use janus_core::traits::{PortExpander, SignalOutput};
use janus_core::{AnalogReadings, DoorController, DoorOutputs};
use janus_drivers::expander::{tca9555, SharedBus, Tca9555};
use janus_drivers::output::GpioSignal;
use janus_hal_rp2040::i2c::Rp2040I2c;
use janus_hal_rp2040::uart::DoorUart;

use crate::channels::{ControlRequest, CONTROL_REQUESTS, EDGE_INPUTS, RX_PIPE_SIZE, SAVE_MODE};

/// Control loop period
const CYCLE_MS: u64 = 10;

/// Cycles between expander presence probes while they are missing
const PROBE_CYCLES: u32 = 100;

/// Cycles between status reports
const STATUS_CYCLES: u32 = 1000;

/// The controller as wired on the board
pub type BoardController = DoorController<DoorUart<'static, RX_PIPE_SIZE>>;

type OutputSignal = GpioSignal<Output<'static>>;

/// Peripherals owned by the control loop
pub struct ControlPeripherals {
    pub adc: Adc<'static, Async>,
    pub door_open: Channel<'static>,
    pub door_closed: Channel<'static>,
    pub operator_power: Channel<'static>,
    pub operator_test: Channel<'static>,
    pub release: OutputSignal,
    pub lock_pulse: OutputSignal,
    pub lock_engaged: OutputSignal,
    pub main_edge: OutputSignal,
    pub secondary_edge: OutputSignal,
    pub sensor_test: OutputSignal,
    /// Supply to the presence sensors, held on
    pub sensor_power: Output<'static>,
}

impl ControlPeripherals {
    /// Sample all analog inputs, keeping the previous value on a failed read
    async fn sample(&mut self, previous: AnalogReadings) -> AnalogReadings {
        AnalogReadings {
            door_open: self.adc.read(&mut self.door_open).await.unwrap_or(previous.door_open),
            door_closed: self
                .adc
                .read(&mut self.door_closed)
                .await
                .unwrap_or(previous.door_closed),
            operator_power: self
                .adc
                .read(&mut self.operator_power)
                .await
                .unwrap_or(previous.operator_power),
            operator_test: self
                .adc
                .read(&mut self.operator_test)
                .await
                .unwrap_or(previous.operator_test),
        }
    }

    fn apply(&mut self, outputs: &DoorOutputs) {
        self.release.set_active(outputs.release);
        self.lock_pulse.set_active(outputs.lock_pulse);
        self.lock_engaged.set_active(outputs.lock_engaged);
        self.main_edge.set_active(outputs.main_edge);
        self.secondary_edge.set_active(outputs.secondary_edge);
        self.sensor_test.set_active(outputs.sensor_test);
    }
}

/// Handle a collaborator request
fn handle_request(controller: &mut BoardController, request: ControlRequest) {
    debug!("Request: {}", request);
    match request {
        ControlRequest::SetMode(mode) => {
            if controller.set_mode(mode) {
                SAVE_MODE.signal(mode);
            }
        }
        ControlRequest::Lock(requested) => controller.request_lock(requested),
        ControlRequest::Switch(side) => {
            controller.trigger_switch(side);
        }
        ControlRequest::Command(token) => {
            if controller.select_command(token).is_err() {
                warn!("Unknown operator command: {}", token);
            }
        }
    }
}

#[embassy_executor::task]
pub async fn control_task(
    mut controller: BoardController,
    mut p: ControlPeripherals,
    i2c: Rp2040I2c<'static, I2C0>,
) {
    info!("Control task started");

    p.sensor_power.set_high();

    let bus = RefCell::new(i2c);
    let mut ext1 = Tca9555::new(SharedBus::new(&bus), tca9555::BASE_ADDRESS);
    let mut ext2 = Tca9555::new(SharedBus::new(&bus), tca9555::BASE_ADDRESS + 1);
    let mut mirror = DiagnosticMirror::new();
    let mut expanders_ready = false;

    let mut analog = AnalogReadings::default();
    let mut cycles: u32 = 0;
    let mut ticker = Ticker::every(Duration::from_millis(CYCLE_MS));

    loop {
        while let Ok(request) = CONTROL_REQUESTS.try_receive() {
            handle_request(&mut controller, request);
        }

        analog = p.sample(analog).await;
        let now_ms = Instant::now().as_millis() as u32;
        let outputs = controller.cycle(now_ms, &EDGE_INPUTS, analog);
        p.apply(&outputs);

        if let Some(command) = outputs.command {
            info!("Door command: {}", command);
        }

        while let Some(message) = controller.transport_mut().pop_message() {
            debug!("Operator message: {=[u8]:x}", message.as_slice());
        }

        let probe = !expanders_ready && cycles % PROBE_CYCLES == 0;
        if probe && ext1.is_connected() && ext2.is_connected() {
            match ext1.init_outputs().and_then(|()| ext2.init_outputs()) {
                Ok(()) => {
                    info!("Diagnostic expanders ready");
                    mirror.invalidate();
                    expanders_ready = true;
                }
                Err(e) => warn!("Expander init failed: {:?}", e),
            }
        }

        if expanders_ready {
            match mirror.mirror(&outputs.ports, &mut ext1, &mut ext2) {
                Ok(Some(_)) => {}
                Ok(None) => {
                    warn!("Diagnostic expanders lost");
                    expanders_ready = false;
                }
                Err(e) => warn!("Diagnostic write failed: {:?}", e),
            }
        }

        if cycles % STATUS_CYCLES == 0 {
            debug!("Status: {}", controller.status());
        }

        cycles = cycles.wrapping_add(1);
        ticker.next().await;
    }
}
