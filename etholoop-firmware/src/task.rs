//! Lever-press task
//!
//! One trial: inter-trial interval, tone cue, response window. A press
//! during the response window opens the reward valve; a press during the cue
//! aborts the trial. Every trial ends with one tab-separated record to the
//! host and the trial number on the strobe bus.
//!
//! Host commands:
//! - `S` start, `E` end, `R` manual reward
//! - `1:<ms>` reward length, `2:<ms>` response window
//! - `3:<0|1>` virtual lever (release/press)

use core::fmt::Write;

use defmt::*;
use embassy_rp::uart::BufferedUart;
use embassy_time::Delay;
use heapless::{String, Vec};

use etholoop_core::diagnostics::LoopMonitor;
use etholoop_core::input::{BoolTracker, DigitalInputs};
use etholoop_core::output::{AnalogOutput, DigitalTimer, PulseBank, ToneChannel};
use etholoop_core::timing::{Deadline, Stopwatch, TrialPeriod};
use etholoop_core::MonotonicClock;
use etholoop_drivers::{LinkError, PauseGate, SerialLink, StrobeEmitter};
use etholoop_hal::{DigitalPort, UartTx};
use etholoop_hal_rp2040::{IoSerial, PwmDuty, PwmTone, RpClock, RpInput, RpOutput, RpPort};
use etholoop_protocol::parse_leading_int;

use crate::rig::TaskTiming;

/// Pulse bank slot of the reward valve
const REWARD: usize = 0;
/// Pulse bank slot of the house light, when wired
const HOUSE_LIGHT: usize = 1;

/// Input index of the lever
const LEVER: usize = 0;
/// Input index of the lick sensor, when wired
const LICK: usize = 1;

const TRIAL_MARKER: usize = 0;
const REWARD_MARKER: usize = 1;

pub type HostLink = SerialLink<IoSerial<BufferedUart>>;

/// Everything the task drives, built by `main` from the rig configuration
pub struct Rig {
    pub inputs: DigitalInputs<RpClock, RpInput, RpOutput>,
    pub bank: PulseBank<RpClock, RpOutput>,
    pub cue: Option<ToneChannel<RpClock, PwmTone>>,
    pub dimmer: Option<AnalogOutput<RpClock, PwmDuty>>,
    pub port: RpPort,
    pub markers: Vec<u8, 4>,
    pub marker_ms: u32,
    pub link: HostLink,
    pub strobe: Option<StrobeEmitter<RpOutput, RpOutput, Delay, RpClock>>,
    pub pause: Option<PauseGate<RpInput, Delay, RpClock>>,
}

/// How a trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
enum Outcome {
    Hit,
    Miss,
    Early,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Early => "early",
        }
    }
}

pub struct LeverTask {
    rig: Rig,
    timing: TaskTiming,
    period: TrialPeriod<RpClock>,
    /// Reaction time from cue onset
    reaction: Stopwatch<RpClock>,
    marker_timer: DigitalTimer<RpClock>,
    virtual_lever: BoolTracker<RpClock>,
    virtual_pressed: bool,
    monitor: LoopMonitor<RpClock>,
    report: Deadline,
    report_interval_ms: Option<u32>,
    warn_gap_ms: u32,
    trial: u32,
    licks: u32,
}

impl LeverTask {
    pub fn new(
        rig: Rig,
        timing: TaskTiming,
        report_interval_ms: Option<u32>,
        warn_gap_ms: u32,
    ) -> Self {
        let clock = RpClock;
        let debounce_ms = rig.inputs.debounce_ms();
        let mut period = TrialPeriod::new(clock);
        period.set("idle", 0);

        let mut report = Deadline::idle();
        if let Some(interval) = report_interval_ms {
            report.arm(clock.now_ms(), interval);
        }

        Self {
            rig,
            timing,
            period,
            reaction: Stopwatch::new(clock),
            marker_timer: DigitalTimer::new(clock),
            virtual_lever: BoolTracker::new(clock, false, debounce_ms),
            virtual_pressed: false,
            monitor: LoopMonitor::new(clock),
            report,
            report_interval_ms,
            warn_gap_ms,
            trial: 0,
            licks: 0,
        }
    }

    /// One pass of the polling loop
    pub fn poll(&mut self) {
        self.rig.inputs.poll();
        self.handle_host();
        self.virtual_lever.poll(self.virtual_pressed);

        self.poll_outputs();
        self.run_period();
        self.poll_monitor();
    }

    fn handle_host(&mut self) {
        if self.rig.link.poll().is_err() {
            return;
        }
        let code = self.rig.link.code();
        let value = parse_leading_int(self.rig.link.payload());

        if code != 0 {
            debug!("Host command {} '{}'", code, self.rig.link.payload());
        }

        match code {
            0 => {}
            1 => {
                self.timing.reward_ms = value.max(0) as u32;
                info!("Reward set to {} ms", self.timing.reward_ms);
            }
            2 => {
                self.timing.response_ms = value.max(0) as u32;
                info!("Response window set to {} ms", self.timing.response_ms);
            }
            3 => self.virtual_pressed = value != 0,
            c if c == 'S' as i32 => self.start(),
            c if c == 'E' as i32 => self.end(),
            c if c == 'R' as i32 => {
                info!("Manual reward");
                self.rig.bank.fire(REWARD, self.timing.reward_ms);
            }
            other => warn!("Unknown host command {}", other),
        }
    }

    fn poll_outputs(&mut self) {
        let mut worst = None;
        for expiry in self.rig.bank.poll() {
            trace!("Output {} off, {} ms late", expiry.index, expiry.overshoot_ms);
            worst = worst.max(Some(expiry.overshoot_ms));
        }
        if let Some(cue) = self.rig.cue.as_mut() {
            worst = worst.max(cue.poll());
        }
        if let Some(dimmer) = self.rig.dimmer.as_mut() {
            worst = worst.max(dimmer.poll());
        }
        worst = worst.max(self.marker_timer.poll(&mut self.rig.port));

        if let Some(late_ms) = worst.filter(|&ms| ms > self.warn_gap_ms) {
            warn!("Output deasserted {} ms late", late_ms);
        }
    }

    fn run_period(&mut self) {
        let pressed = self.rig.inputs.turned_on(LEVER) || self.virtual_lever.turned_on();
        if self.rig.inputs.len() > LICK && self.rig.inputs.turned_on(LICK) {
            self.licks = self.licks.saturating_add(1);
        }

        if self.period.is("iti") {
            if self.period.expired() {
                self.begin_trial();
            }
        } else if self.period.is("cue") {
            if pressed {
                self.end_trial(Outcome::Early, None);
            } else if self.period.expired() {
                self.period.set("response", self.timing.response_ms);
            }
        } else if self.period.is("response") {
            if pressed {
                let reaction_ms = self.reaction.elapsed();
                self.rig.bank.fire(REWARD, self.timing.reward_ms);
                self.mark(REWARD_MARKER);
                self.end_trial(Outcome::Hit, Some(reaction_ms));
            } else if self.period.expired() {
                self.end_trial(Outcome::Miss, None);
            }
        }
    }

    fn poll_monitor(&mut self) {
        self.monitor.poll();
        let Some(interval) = self.report_interval_ms else {
            return;
        };
        let now = RpClock.now_ms();
        if self.report.expire(now).is_none() {
            return;
        }
        self.report.arm(now, interval);

        let max = self.monitor.max().unwrap_or(0);
        info!(
            "Loop: mean {} ms, max {} ms, min {} ms over {} passes",
            self.monitor.mean(),
            max,
            self.monitor.min().unwrap_or(0),
            self.monitor.count()
        );
        if max > self.warn_gap_ms {
            warn!("Loop gap of {} ms exceeds {} ms", max, self.warn_gap_ms);
        }
        self.monitor.start();
    }

    fn start(&mut self) {
        if !self.period.is("idle") {
            return;
        }
        info!("Task started");
        self.trial = 0;
        self.monitor.start();
        self.begin_iti();
    }

    fn end(&mut self) {
        info!("Task ended after {} trials", self.trial);
        self.period.set("idle", 0);
        for index in 0..self.rig.bank.len() {
            self.rig.bank.stop(index);
        }
        if let Some(cue) = self.rig.cue.as_mut() {
            cue.stop();
        }
        if let Some(dimmer) = self.rig.dimmer.as_mut() {
            dimmer.stop();
        }
        if self.rig.link.send(&["end"]).is_err() {
            warn!("Host link write failed");
        }
    }

    fn begin_iti(&mut self) {
        self.period.set("iti", self.timing.iti_ms);
        if self.rig.bank.len() > HOUSE_LIGHT {
            self.rig.bank.fire(HOUSE_LIGHT, self.timing.iti_ms);
        }
        if let Some(dimmer) = self.rig.dimmer.as_mut() {
            dimmer.fire(self.timing.iti_ms, self.timing.iti_dim);
        }
    }

    fn begin_trial(&mut self) {
        self.trial = self.trial.saturating_add(1);
        self.licks = 0;
        debug!("Trial {} cue", self.trial);

        self.period.set("cue", self.timing.cue_ms);
        if let Some(cue) = self.rig.cue.as_mut() {
            cue.fire(self.timing.cue_ms, self.timing.cue_hz);
        }
        self.mark(TRIAL_MARKER);
        self.reaction.restart();
    }

    fn end_trial(&mut self, outcome: Outcome, reaction_ms: Option<u32>) {
        info!("Trial {}: {}", self.trial, outcome);
        if let Some(cue) = self.rig.cue.as_mut() {
            cue.stop();
        }

        if send_trial(
            &mut self.rig.link,
            self.trial,
            outcome.as_str(),
            reaction_ms,
            self.licks,
        )
        .is_err()
        {
            self.rig.link.clear();
            warn!("Host link write failed");
        }

        if let Some(strobe) = self.rig.strobe.as_mut() {
            let mut digits: String<10> = String::new();
            let _ = write!(digits, "{}", self.trial);
            strobe.emit(digits.as_bytes());
        }
        if let Some(pause) = self.rig.pause.as_mut() {
            let paused_ms = pause.check();
            if paused_ms > 0 {
                info!("Paused {} ms after trial {}", paused_ms, self.trial);
            }
        }

        self.begin_iti();
    }

    /// Raise an event marker now and schedule it low again
    ///
    /// The markers share one timer, so a marker still high is lowered first.
    fn mark(&mut self, marker: usize) {
        if let Some(&pin) = self.rig.markers.get(marker) {
            if let Some(previous) = self.marker_timer.scheduled_pin() {
                self.rig.port.write_level(previous, false);
            }
            self.rig.port.write_level(pin, true);
            self.marker_timer.set(pin, self.rig.marker_ms, false);
        }
    }
}

/// One record per trial: number, outcome, reaction time, licks
fn send_trial<U: UartTx>(
    link: &mut SerialLink<U>,
    trial: u32,
    outcome: &str,
    reaction_ms: Option<u32>,
    licks: u32,
) -> Result<(), LinkError<U::Error>> {
    link.append_value(&trial)?;
    link.append(outcome)?;
    match reaction_ms {
        Some(ms) => link.append_value(&ms)?,
        None => link.append("-")?,
    }
    link.append_value(&licks)?;
    link.flush()
}
