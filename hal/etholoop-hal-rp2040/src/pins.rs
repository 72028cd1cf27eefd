//! Dynamic pin allocation for config-driven rig setup
//!
//! Pin numbers come from the rig configuration, so pins are handed out by
//! number at runtime instead of by peripheral name. A few pins stay outside
//! the bank because their peripheral needs the typed pin: GPIO0/1 carry the
//! host UART, GPIO12 and GPIO14 are the PWM dimmer and tone outputs.

use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::peripherals;
use embassy_rp::{Peri, Peripherals};

use etholoop_core::config::{PinError, BOARD_PIN_COUNT};

/// GPIO numbers used by the host UART (TX, RX)
pub const UART_PINS: [u8; 2] = [0, 1];

/// PWM slice 6 channel A
pub const DIMMER_PIN: u8 = 12;

/// PWM slice 7 channel A
pub const TONE_PIN: u8 = 14;

const PIN_SLOTS: usize = BOARD_PIN_COUNT as usize;

/// Holds every free GPIO and hands them out by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; PIN_SLOTS],
}

impl PinBank {
    pub fn new(p: PinBankPeripherals) -> Self {
        let PinBankPeripherals { pins } = p;
        Self { pins }
    }

    /// Take a pin by number
    ///
    /// Fails if the number is out of range, the pin is already taken, or
    /// it is one of the pins kept outside the bank.
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(pin_num as usize)
            .ok_or(PinError::InvalidPin)?
            .take()
            .ok_or(PinError::AlreadyTaken)
    }

    /// Take a pin as a push-pull output at `level`
    pub fn output(&mut self, pin_num: u8, level: Level) -> Result<Output<'static>, PinError> {
        Ok(Output::new(self.take(pin_num)?, level))
    }

    /// Take a pin as a pulled-up input
    pub fn input(&mut self, pin_num: u8) -> Result<Input<'static>, PinError> {
        Ok(Input::new(self.take(pin_num)?, Pull::Up))
    }
}

/// GPIOs destined for the [`PinBank`]
pub struct PinBankPeripherals {
    pins: [Option<Peri<'static, AnyPin>>; PIN_SLOTS],
}

/// Peripherals that stay outside the pin bank
pub struct RemainingPeripherals {
    pub uart0: Peri<'static, peripherals::UART0>,
    pub uart_tx: Peri<'static, peripherals::PIN_0>,
    pub uart_rx: Peri<'static, peripherals::PIN_1>,
    pub pwm_slice6: Peri<'static, peripherals::PWM_SLICE6>,
    pub dimmer_pin: Peri<'static, peripherals::PIN_12>,
    pub pwm_slice7: Peri<'static, peripherals::PWM_SLICE7>,
    pub tone_pin: Peri<'static, peripherals::PIN_14>,
}

impl PinBankPeripherals {
    /// Split embassy peripherals into the bank and everything else
    pub fn from_peripherals(p: Peripherals) -> (Self, RemainingPeripherals) {
        let bank = Self {
            pins: [
                None,
                None,
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                None,
                Some(p.PIN_13.into()),
                None,
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };
        let remaining = RemainingPeripherals {
            uart0: p.UART0,
            uart_tx: p.PIN_0,
            uart_rx: p.PIN_1,
            pwm_slice6: p.PWM_SLICE6,
            dimmer_pin: p.PIN_12,
            pwm_slice7: p.PWM_SLICE7,
            tone_pin: p.PIN_14,
        };
        (bank, remaining)
    }
}
