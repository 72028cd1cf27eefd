//! Actuator kinds
//!
//! The output kind is fixed when the channel is built. Each kind knows how
//! to assert a level and how to return to its inactive state, so the
//! channel's timing logic never branches on the kind.

use etholoop_hal::{OutputPin, PwmOutput, ToneOutput};

/// An output that can be asserted at some level and later deasserted
pub trait Actuator {
    /// Value applied when the actuator is asserted
    type Level: Copy;

    /// Drive the actuator at `level`
    fn assert(&mut self, level: Self::Level);

    /// Return the actuator to its inactive state
    fn deassert(&mut self);

    /// Whether the actuator is currently driven
    fn is_asserted(&self) -> bool;
}

/// Digital level on an owned GPIO pin (light, relay, valve)
///
/// The pin can be configured as active-high (default) or active-low.
#[derive(Debug)]
pub struct DigitalActuator<P> {
    pin: P,
    /// If true, asserted = pin LOW
    inverted: bool,
    on: bool,
}

impl<P: OutputPin> DigitalActuator<P> {
    /// Wrap `pin`; the pin is driven inactive immediately
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut actuator = Self {
            pin,
            inverted,
            on: false,
        };
        actuator.deassert();
        actuator
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    fn drive(&mut self, on: bool) {
        self.on = on;
        // Normal: on=true, inverted=false → high
        // Inverted: on=true, inverted=true → low
        self.pin.set_state(on != self.inverted);
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}

impl<P: OutputPin> Actuator for DigitalActuator<P> {
    type Level = bool;

    fn assert(&mut self, level: bool) {
        self.drive(level);
    }

    fn deassert(&mut self) {
        self.drive(false);
    }

    fn is_asserted(&self) -> bool {
        self.on
    }
}

/// PWM duty on an owned analog-capable pin
#[derive(Debug)]
pub struct AnalogActuator<P> {
    pwm: P,
}

impl<P: PwmOutput> AnalogActuator<P> {
    /// Wrap `pwm`; the duty is set to zero immediately
    pub fn new(mut pwm: P) -> Self {
        pwm.set_duty(0);
        Self { pwm }
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}

impl<P: PwmOutput> Actuator for AnalogActuator<P> {
    type Level = u8;

    fn assert(&mut self, duty: u8) {
        self.pwm.set_duty(duty);
    }

    fn deassert(&mut self) {
        self.pwm.set_duty(0);
    }

    fn is_asserted(&self) -> bool {
        self.pwm.duty() > 0
    }
}

/// Square-wave tone on a piezo buzzer
#[derive(Debug)]
pub struct ToneActuator<T> {
    tone: T,
}

/// Frequency used when a caller has no preference, in Hz
pub const DEFAULT_TONE_HZ: u16 = 440;

impl<T: ToneOutput> ToneActuator<T> {
    /// Wrap `tone`; the output is silenced immediately
    pub fn new(mut tone: T) -> Self {
        tone.stop_tone();
        Self { tone }
    }

    pub fn tone(&self) -> &T {
        &self.tone
    }
}

impl<T: ToneOutput> Actuator for ToneActuator<T> {
    type Level = u16;

    fn assert(&mut self, freq_hz: u16) {
        self.tone.start_tone(freq_hz);
    }

    fn deassert(&mut self) {
        self.tone.stop_tone();
    }

    fn is_asserted(&self) -> bool {
        self.tone.sounding().is_some()
    }
}

/// Cue output whose kind is chosen at construction
///
/// Both kinds share the same timing; the level is a tone frequency that the
/// steady variant ignores.
#[derive(Debug)]
pub enum Cue<P, T> {
    /// Steady digital level (e.g. cue light)
    Steady(DigitalActuator<P>),
    /// Oscillating tone (e.g. buzzer)
    Tone(ToneActuator<T>),
}

impl<P: OutputPin, T: ToneOutput> Cue<P, T> {
    pub fn steady(pin: P) -> Self {
        Self::Steady(DigitalActuator::new_active_high(pin))
    }

    pub fn tone(tone: T) -> Self {
        Self::Tone(ToneActuator::new(tone))
    }
}

impl<P: OutputPin, T: ToneOutput> Actuator for Cue<P, T> {
    type Level = u16;

    fn assert(&mut self, freq_hz: u16) {
        match self {
            Self::Steady(digital) => digital.assert(true),
            Self::Tone(tone) => tone.assert(freq_hz),
        }
    }

    fn deassert(&mut self) {
        match self {
            Self::Steady(digital) => digital.deassert(),
            Self::Tone(tone) => tone.deassert(),
        }
    }

    fn is_asserted(&self) -> bool {
        match self {
            Self::Steady(digital) => digital.is_asserted(),
            Self::Tone(tone) => tone.is_asserted(),
        }
    }
}
