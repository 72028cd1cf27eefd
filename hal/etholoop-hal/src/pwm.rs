//! PWM-based actuators
//!
//! Analog outputs on the target boards are PWM slices. The same hardware is
//! used for square-wave tones driving a piezo buzzer.

/// PWM duty output (0 = off, 255 = always on)
pub trait PwmOutput {
    /// Set the duty cycle
    fn set_duty(&mut self, duty: u8);

    /// Currently applied duty cycle
    fn duty(&self) -> u8;
}

/// Square-wave tone output
pub trait ToneOutput {
    /// Start a 50% duty square wave at `freq_hz`
    fn start_tone(&mut self, freq_hz: u16);

    /// Silence the output and leave the pin low
    fn stop_tone(&mut self);

    /// Frequency currently sounding, if any
    fn sounding(&self) -> Option<u16>;
}
