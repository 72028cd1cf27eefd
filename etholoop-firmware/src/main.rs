//! etholoop - behavioral task firmware
//!
//! Runs a lever-press task on an RP2040 rig. Pin assignments and task
//! timings come from rig.toml at build time. Everything runs in one polling
//! loop: inputs are debounced, timed outputs fall back on their own, and the
//! host talks to the task over a line-based UART link.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Level;
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use heapless::Vec;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use etholoop_core::config::{ConfigError, PinError, RigConfig};
use etholoop_core::input::{DigitalInputs, MAX_INPUTS};
use etholoop_core::output::{
    AnalogActuator, AnalogOutput, PulseBank, ToneActuator, ToneChannel, MAX_BANK_OUTPUTS,
};
use etholoop_drivers::{PauseGate, SerialLink, StrobeEmitter};
use etholoop_hal_rp2040::{
    IoSerial, PinBank, PinBankPeripherals, PwmDuty, PwmTone, RemainingPeripherals, RpClock,
    RpInput, RpOutput, RpPort,
};

use crate::task::{HostLink, LeverTask, Rig};

mod rig;
mod task;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// UART buffers must live forever
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("etholoop firmware starting...");

    let p = embassy_rp::init(Default::default());
    let (bank_peripherals, rest) = PinBankPeripherals::from_peripherals(p);
    let mut pins = PinBank::new(bank_peripherals);

    let (config, registry) = match rig::load() {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Invalid rig configuration: {}", e);
            halt().await
        }
    };
    info!("Rig configuration loaded, {} pins claimed", registry.claimed_count());

    let rig = match build_rig(&mut pins, &config, rest) {
        Ok(rig) => rig,
        Err(e) => {
            error!("Rig setup failed: {}", e);
            halt().await
        }
    };

    let report_interval_ms = config
        .monitor
        .enabled
        .then_some(config.monitor.report_interval_ms);
    let mut task = LeverTask::new(rig, rig::TASK, report_interval_ms, config.monitor.warn_gap_ms);

    info!("Rig ready, send S to start");

    loop {
        task.poll();
        embassy_futures::yield_now().await;
    }
}

/// Park the firmware after a fatal setup error
async fn halt() -> ! {
    loop {
        embassy_time::Timer::after_secs(60).await;
    }
}

fn pin_error(pin: u8) -> impl Fn(PinError) -> ConfigError {
    move |err| ConfigError::from_pin(pin, err)
}

/// Take every configured pin from the bank and build the task hardware
fn build_rig(
    pins: &mut PinBank,
    config: &RigConfig,
    rest: RemainingPeripherals,
) -> Result<Rig, ConfigError> {
    // Inputs, each optionally mirrored to a relay output
    let mut channels: Vec<(RpInput, Option<RpOutput>), MAX_INPUTS> = Vec::new();
    for (i, &pin) in config.inputs.pins.iter().enumerate() {
        let input = RpInput(pins.input(pin).map_err(pin_error(pin))?);
        let relay = match config.inputs.relays.get(i) {
            Some(&relay_pin) => Some(RpOutput(
                pins.output(relay_pin, Level::Low)
                    .map_err(pin_error(relay_pin))?,
            )),
            None => None,
        };
        let _ = channels.push((input, relay));
    }
    let inputs = DigitalInputs::from_channels(RpClock, channels, config.inputs.debounce_ms);

    let mut outputs: Vec<RpOutput, MAX_BANK_OUTPUTS> = Vec::new();
    for &pin in config.outputs.pins.iter() {
        let _ = outputs.push(RpOutput(
            pins.output(pin, Level::Low).map_err(pin_error(pin))?,
        ));
    }
    let bank = PulseBank::new(RpClock, outputs);

    let mut port = RpPort::new();
    let mut markers = Vec::new();
    for &pin in rig::MARKER_PINS {
        port.attach(pin, pins.output(pin, Level::Low).map_err(pin_error(pin))?);
        let _ = markers.push(pin);
    }

    let cue = config.tone_pin.map(|_| {
        let pwm = Pwm::new_output_a(rest.pwm_slice7, rest.tone_pin, PwmConfig::default());
        ToneChannel::new(RpClock, ToneActuator::new(PwmTone::new(pwm)))
    });

    let dimmer = rig::DIMMER_PIN.map(|_| {
        let pwm = Pwm::new_output_a(rest.pwm_slice6, rest.dimmer_pin, PwmConfig::default());
        AnalogOutput::new(RpClock, AnalogActuator::new(PwmDuty::new(pwm)))
    });

    let strobe = match config.strobe {
        Some(strobe) => {
            let mut take = |pin: u8| {
                pins.output(pin, Level::Low)
                    .map(RpOutput)
                    .map_err(pin_error(pin))
            };
            let first = strobe.first_pin;
            let data = [
                take(first)?,
                take(first + 1)?,
                take(first + 2)?,
                take(first + 3)?,
                take(first + 4)?,
                take(first + 5)?,
                take(first + 6)?,
                take(first + 7)?,
            ];
            let strobe_line = take(first + 8)?;
            Some(StrobeEmitter::new(
                data,
                strobe_line,
                Delay,
                RpClock,
                strobe.width_us,
                strobe.terminator,
            ))
        }
        None => None,
    };

    let pause = match config.pause {
        Some(pause) => Some(PauseGate::new(
            RpInput(pins.input(pause.pin).map_err(pin_error(pause.pin))?),
            Delay,
            RpClock,
            pause.pause_when_active,
            pause.cycle_ms,
        )),
        None => None,
    };

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = config.serial.baudrate;
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(rest.uart0, rest.uart_tx, rest.uart_rx, uart_config)
        .into_buffered(Irqs, tx_buf, rx_buf);
    let link: HostLink = SerialLink::new(
        IoSerial::new(uart),
        config.serial.eol,
        config.serial.separator,
    );
    info!("Host UART at {} baud", config.serial.baudrate);

    Ok(Rig {
        inputs,
        bank,
        cue,
        dimmer,
        port,
        markers,
        marker_ms: rig::MARKER_PULSE_MS,
        link,
        strobe,
        pause,
    })
}
