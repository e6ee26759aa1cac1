use log::debug;

use super::envelope::Envelope;
use super::length::LengthCounter;
use super::registers::{CONTROL_READ_MASK, LENGTH_ENABLE, OPEN_BUS, TRIGGER};
use super::{Channel, FrequencyTimer};

/// Duty cycle waveforms, indexed by NRx1 bits 7-6 then by phase.
/// Shared by both pulse channels.
pub const DUTY_TABLE: [[u8; 8]; 4] = [
    [0, 0, 0, 0, 0, 0, 0, 1], // 12.5%
    [1, 0, 0, 0, 0, 0, 0, 1], // 25%
    [1, 0, 0, 0, 0, 1, 1, 1], // 50%
    [0, 1, 1, 1, 1, 1, 1, 0], // 75%
];

/// Highest value the 11-bit period register can hold
pub const MAX_FREQUENCY: u16 = 2047;

/// Outcome of one sweep tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Nothing to apply this tick
    Hold,
    /// Computed frequency exceeded 2047; the channel must stop
    Overflow,
    /// New frequency to write back into the period register
    Update(u16),
}

/// Frequency sweep unit (NR10), present on pulse A only
///
/// Register layout: `-ppp nsss`
/// - p: sweep period in 128 Hz ticks
/// - n: negate (1 = frequency decreases)
/// - s: shift
#[derive(Debug, Clone, Default)]
pub struct Sweep {
    period: u8,
    negate: bool,
    shift: u8,

    timer: u8,
    shadow_frequency: u16,
    enabled: bool,
}

impl Sweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write NR10
    pub fn write(&mut self, value: u8) {
        self.period = (value >> 4) & 0x07;
        self.negate = (value & 0x08) != 0;
        self.shift = value & 0x07;
    }

    /// Read NR10 (bit 7 reads as 1)
    pub fn read(&self) -> u8 {
        0x80 | (self.period << 4) | ((self.negate as u8) << 3) | self.shift
    }

    fn reload_timer(&mut self) {
        self.timer = if self.period == 0 { 8 } else { self.period };
    }

    /// Latch the channel's frequency and arm the sweep timer
    pub fn trigger(&mut self, frequency: u16) {
        self.shadow_frequency = frequency;
        self.reload_timer();
        self.enabled = self.period > 0 || self.shift > 0;
    }

    /// Frequency the next sweep calculation would produce
    pub fn next_frequency(&self) -> i32 {
        let shadow = self.shadow_frequency as i32;
        let delta = shadow >> self.shift;
        if self.negate { shadow - delta } else { shadow + delta }
    }

    /// Clock the sweep unit (128 Hz)
    pub fn step(&mut self) -> SweepOutcome {
        if !self.enabled || self.timer == 0 {
            return SweepOutcome::Hold;
        }

        self.timer -= 1;
        if self.timer != 0 {
            return SweepOutcome::Hold;
        }

        self.reload_timer();
        if self.period == 0 {
            return SweepOutcome::Hold;
        }

        let frequency = self.next_frequency();
        if frequency > MAX_FREQUENCY as i32 {
            SweepOutcome::Overflow
        } else if frequency >= 0 {
            self.shadow_frequency = frequency as u16;
            SweepOutcome::Update(self.shadow_frequency)
        } else {
            SweepOutcome::Hold
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn shadow_frequency(&self) -> u16 {
        self.shadow_frequency
    }

    pub fn timer(&self) -> u8 {
        self.timer
    }
}

/// Pulse (square wave) channel
///
/// Register offsets relative to the channel base:
/// - 0: sweep (pulse A only)
/// - 1: duty / length load
/// - 2: envelope
/// - 3: frequency low
/// - 4: trigger / length enable / frequency high
#[derive(Debug, Clone)]
pub struct Pulse {
    enabled: bool,

    duty: u8,
    phase: u8,
    frequency: u16,
    timer: FrequencyTimer,

    length: LengthCounter,
    envelope: Envelope,
    sweep: Option<Sweep>,
}

impl Default for Pulse {
    fn default() -> Self {
        Self::new()
    }
}

impl Pulse {
    /// Create a pulse channel without a sweep unit (pulse B)
    pub fn new() -> Self {
        Self {
            enabled: false,
            duty: 0,
            phase: 0,
            frequency: 0,
            timer: FrequencyTimer::new(),
            length: LengthCounter::new(64),
            envelope: Envelope::new(),
            sweep: None,
        }
    }

    /// Create a pulse channel with a sweep unit (pulse A)
    pub fn with_sweep() -> Self {
        Self {
            sweep: Some(Sweep::new()),
            ..Self::new()
        }
    }

    /// Write a channel register by offset (0-4)
    pub fn write(&mut self, register: u8, value: u8) {
        match register {
            0 => {
                if let Some(sweep) = self.sweep.as_mut() {
                    sweep.write(value);
                }
            }
            1 => {
                self.duty = (value >> 6) & 0x03;
                self.length.load(value & 0x3F);
            }
            2 => self.envelope.write(value),
            3 => self.frequency = (self.frequency & 0x0700) | value as u16,
            4 => {
                self.frequency = (self.frequency & 0x00FF) | (((value & 0x07) as u16) << 8);
                self.length.set_enabled(value & LENGTH_ENABLE != 0);
                if value & TRIGGER != 0 {
                    self.trigger();
                }
            }
            _ => {}
        }
    }

    /// Read a channel register by offset (0-4), with unused bits set
    pub fn read(&self, register: u8) -> u8 {
        match register {
            0 => self.sweep.as_ref().map_or(OPEN_BUS, Sweep::read),
            1 => (self.duty << 6) | 0x3F,
            2 => self.envelope.read(),
            4 => ((self.length.is_enabled() as u8) << 6) | CONTROL_READ_MASK,
            _ => OPEN_BUS,
        }
    }

    /// Get the timer period in master cycles
    fn period(&self) -> u32 {
        (2048 - self.frequency as u32) * 4
    }

    /// Restart the channel
    pub fn trigger(&mut self) {
        self.enabled = true;
        self.length.trigger();
        self.timer.reload(self.period());
        self.envelope.trigger();
        if let Some(sweep) = self.sweep.as_mut() {
            sweep.trigger(self.frequency);
        }
        debug!(
            "Pulse triggered: duty={}, frequency={}, volume={}",
            self.duty,
            self.frequency,
            self.envelope.volume()
        );
    }

    /// Clock the envelope (64 Hz)
    pub fn step_envelope(&mut self) {
        self.envelope.step();
    }

    /// Clock the sweep unit (128 Hz). No-op on pulse B.
    pub fn step_sweep(&mut self) {
        let Some(sweep) = self.sweep.as_mut() else {
            return;
        };
        match sweep.step() {
            SweepOutcome::Hold => {}
            SweepOutcome::Overflow => {
                debug!("Pulse sweep overflow, channel disabled");
                self.enabled = false;
            }
            SweepOutcome::Update(frequency) => self.frequency = frequency,
        }
    }

    /// Get the 11-bit period register value
    pub fn frequency(&self) -> u16 {
        self.frequency
    }

    /// Get the waveform phase (0-7)
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Get the duty pattern bit at the current phase
    pub fn duty_output(&self) -> u8 {
        DUTY_TABLE[self.duty as usize][self.phase as usize]
    }

    pub fn volume(&self) -> u8 {
        self.envelope.volume()
    }

    pub fn length_counter(&self) -> u16 {
        self.length.counter()
    }

    pub fn sweep(&self) -> Option<&Sweep> {
        self.sweep.as_ref()
    }
}

impl Channel for Pulse {
    fn step_timer(&mut self, cycles: u32) {
        let expiries = self.timer.clock(cycles, self.period());
        self.phase = ((self.phase as u32 + expiries) % 8) as u8;
    }

    fn step_length(&mut self) {
        if self.length.step() {
            self.enabled = false;
        }
    }

    fn output(&self) -> u8 {
        if !self.enabled {
            return 0;
        }
        self.duty_output() * self.envelope.volume()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}
