//! Janus - Swing Door Controller Firmware
//!
//! Main firmware binary for RP2040-based swing-door controllers. Drives a
//! serial door operator from presence sensors and end-stop sensors, and
//! arbitrates an electric lock.
//!
//! Named after the Roman god of doorways, who looks both ways at once.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use janus_core::config::DoorConfig;
use janus_core::DoorController;
use janus_drivers::output::GpioSignal;
use janus_hal::i2c::I2cConfig;
use janus_hal::uart::UartConfig;
use janus_hal_rp2040::flash::Rp2040FlashStorage;
use janus_hal_rp2040::i2c::Rp2040I2c;
use janus_hal_rp2040::uart::{rp_config, DoorUart};

use crate::channels::{EDGE_INPUTS, RX_PIPE};
use crate::tasks::{ControlPeripherals, EdgeSensor};

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Janus firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Persisted operating mode
    let mut storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let mode = tasks::load_mode(&mut storage).await;

    // Door operator link on UART0 (GPIO0 TX, GPIO1 RX)
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, rp_config(UartConfig::DOOR_OPERATOR));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    let port = DoorUart::new(tx, &RX_PIPE);

    info!("UART initialized for door operator");

    // Analog inputs: end stops, operator power sense and test request
    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let peripherals = ControlPeripherals {
        adc,
        door_open: Channel::new_pin(p.PIN_29, Pull::None),
        door_closed: Channel::new_pin(p.PIN_28, Pull::None),
        operator_power: Channel::new_pin(p.PIN_26, Pull::None),
        operator_test: Channel::new_pin(p.PIN_27, Pull::None),
        release: GpioSignal::new_active_high(Output::new(p.PIN_18, Level::Low)),
        lock_pulse: GpioSignal::new_active_high(Output::new(p.PIN_16, Level::Low)),
        lock_engaged: GpioSignal::new_active_high(Output::new(p.PIN_25, Level::Low)),
        main_edge: GpioSignal::new_active_low(Output::new(p.PIN_17, Level::High)),
        secondary_edge: GpioSignal::new_active_low(Output::new(p.PIN_19, Level::High)),
        sensor_test: GpioSignal::new_active_high(Output::new(p.PIN_24, Level::Low)),
        sensor_power: Output::new(p.PIN_23, Level::Low),
    };

    // Diagnostic expanders (GPIO20 SDA, GPIO21 SCL)
    let i2c = Rp2040I2c::new(p.I2C0, p.PIN_21, p.PIN_20, I2cConfig::STANDARD);

    info!("ADC, outputs and I2C initialized");

    // Presence sensors: radars pull low, air curtains drive high
    let sensors = [
        EdgeSensor {
            name: "inside radar",
            input: Input::new(p.PIN_5, Pull::Up),
            cell: &EDGE_INPUTS.inside_radar,
            active_low: true,
        },
        EdgeSensor {
            name: "inside air",
            input: Input::new(p.PIN_6, Pull::Up),
            cell: &EDGE_INPUTS.inside_air,
            active_low: false,
        },
        EdgeSensor {
            name: "outside radar",
            input: Input::new(p.PIN_7, Pull::Up),
            cell: &EDGE_INPUTS.outside_radar,
            active_low: true,
        },
        EdgeSensor {
            name: "outside air",
            input: Input::new(p.PIN_8, Pull::Up),
            cell: &EDGE_INPUTS.outside_air,
            active_low: false,
        },
    ];

    let controller = DoorController::new(DoorConfig::default(), mode, port);

    // Spawn tasks
    for sensor in sensors {
        spawner.spawn(tasks::edge_task(sensor)).unwrap();
    }
    spawner.spawn(tasks::door_rx_task(rx)).unwrap();
    spawner.spawn(tasks::storage_task(storage)).unwrap();
    spawner
        .spawn(tasks::control_task(controller, peripherals, i2c))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
