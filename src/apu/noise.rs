use log::debug;

use super::envelope::Envelope;
use super::length::LengthCounter;
use super::registers::{CONTROL_READ_MASK, LENGTH_ENABLE, OPEN_BUS, TRIGGER};
use super::{Channel, FrequencyTimer};

/// LFSR seed loaded on trigger. Never zero: an all-zero register never changes.
pub const LFSR_SEED: u16 = 0x7FFF;

/// Noise channel
///
/// Generates pseudo-random noise using a 15-bit Linear Feedback Shift Register (LFSR).
/// The noise channel includes:
/// - 15-bit LFSR, with an optional 7-bit "narrow" mode
/// - Divisor-based timer configured by NR43
/// - Envelope generator for volume control
/// - Length counter
#[derive(Debug, Clone)]
pub struct Noise {
    enabled: bool,

    // Linear Feedback Shift Register (15-bit)
    shift_register: u16,

    // NR43 fields
    clock_shift: u8,
    narrow: bool,
    divisor_code: u8,

    timer: FrequencyTimer,
    length: LengthCounter,
    envelope: Envelope,
}

impl Default for Noise {
    fn default() -> Self {
        Self::new()
    }
}

impl Noise {
    pub fn new() -> Self {
        Noise {
            enabled: false,
            shift_register: LFSR_SEED,
            clock_shift: 0,
            narrow: false,
            divisor_code: 0,
            timer: FrequencyTimer::new(),
            length: LengthCounter::new(64),
            envelope: Envelope::new(),
        }
    }

    /// Write a channel register by offset (0-3, relative to 0xFF20)
    pub fn write(&mut self, register: u8, value: u8) {
        match register {
            0 => self.length.load(value & 0x3F),
            1 => self.envelope.write(value),
            2 => self.write_polynomial(value),
            3 => {
                self.length.set_enabled(value & LENGTH_ENABLE != 0);
                if value & TRIGGER != 0 {
                    self.trigger();
                }
            }
            _ => {}
        }
    }

    /// Read a channel register by offset (0-3), with unused bits set
    pub fn read(&self, register: u8) -> u8 {
        match register {
            1 => self.envelope.read(),
            2 => (self.clock_shift << 4) | ((self.narrow as u8) << 3) | self.divisor_code,
            3 => ((self.length.is_enabled() as u8) << 6) | CONTROL_READ_MASK,
            _ => OPEN_BUS,
        }
    }

    /// Write NR43
    /// Format: ssss wrrr
    /// s = clock shift
    /// w = LFSR width (1 = 7-bit)
    /// r = divisor code
    fn write_polynomial(&mut self, value: u8) {
        self.clock_shift = (value >> 4) & 0x0F;
        self.narrow = (value & 0x08) != 0;
        self.divisor_code = value & 0x07;
    }

    /// Timer period in master cycles: base divisor shifted by the clock shift
    pub fn period(&self) -> u32 {
        let base_divisor: u32 = if self.divisor_code == 0 {
            8
        } else {
            16 * self.divisor_code as u32
        };
        base_divisor << self.clock_shift
    }

    /// Restart the channel and reseed the LFSR
    pub fn trigger(&mut self) {
        self.enabled = true;
        self.shift_register = LFSR_SEED;
        self.length.trigger();
        self.envelope.trigger();
        self.timer.reload(self.period());
        debug!(
            "Noise triggered: period={}, narrow={}, volume={}",
            self.period(),
            self.narrow,
            self.envelope.volume()
        );
    }

    /// Clock the shift register to generate the next pseudo-random bit
    fn clock_shift_register(&mut self) {
        let previous = self.shift_register;

        // 1. Feedback is XOR of bits 0 and 1
        let feedback = (self.shift_register ^ (self.shift_register >> 1)) & 1;

        // 2. Shift right, feedback into bit 14
        self.shift_register = (self.shift_register >> 1) | (feedback << 14);

        // 3. Narrow mode also mirrors feedback into bit 6
        if self.narrow {
            self.shift_register = (self.shift_register & !(1 << 6)) | (feedback << 6);
        }

        // Wide mode never clears a nonzero register; narrow mode can from 0x0080
        debug_assert!(self.narrow || previous == 0 || self.shift_register != 0);
    }

    /// Clock the envelope (64 Hz)
    pub fn step_envelope(&mut self) {
        self.envelope.step();
    }

    pub fn shift_register(&self) -> u16 {
        self.shift_register
    }

    pub fn volume(&self) -> u8 {
        self.envelope.volume()
    }

    pub fn length_counter(&self) -> u16 {
        self.length.counter()
    }
}

impl Channel for Noise {
    fn step_timer(&mut self, cycles: u32) {
        let expiries = self.timer.clock(cycles, self.period());
        for _ in 0..expiries {
            self.clock_shift_register();
        }
    }

    fn step_length(&mut self) {
        if self.length.step() {
            self.enabled = false;
        }
    }

    /// Envelope volume while LFSR bit 0 is clear, otherwise silent
    fn output(&self) -> u8 {
        if !self.enabled || self.shift_register & 1 != 0 {
            return 0;
        }
        self.envelope.volume()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}
