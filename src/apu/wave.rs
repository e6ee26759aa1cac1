use log::debug;

use super::length::LengthCounter;
use super::registers::{CONTROL_READ_MASK, LENGTH_ENABLE, OPEN_BUS, TRIGGER};
use super::{Channel, FrequencyTimer};

/// Bytes of wave sample RAM (two 4-bit samples each)
pub const WAVE_RAM_SIZE: usize = 16;
const SAMPLE_COUNT: u8 = (WAVE_RAM_SIZE * 2) as u8;

/// Right-shift applied to each sample for NR32 output level codes 0-3
const VOLUME_SHIFT: [u8; 4] = [4, 0, 1, 2];

/// Wave channel: plays 32 4-bit samples from wave RAM
///
/// Register offsets relative to 0xFF1A:
/// - 0: DAC enable (bit 7)
/// - 1: length load
/// - 2: output level (bits 6-5)
/// - 3: frequency low
/// - 4: trigger / length enable / frequency high
#[derive(Debug, Clone)]
pub struct Wave {
    enabled: bool,
    dac_enabled: bool,

    volume_code: u8,
    frequency: u16,
    timer: FrequencyTimer,
    position: u8,

    length: LengthCounter,
    ram: [u8; WAVE_RAM_SIZE],
}

impl Default for Wave {
    fn default() -> Self {
        Self::new()
    }
}

impl Wave {
    pub fn new() -> Self {
        Self {
            enabled: false,
            dac_enabled: false,
            volume_code: 0,
            frequency: 0,
            timer: FrequencyTimer::new(),
            position: 0,
            length: LengthCounter::new(256),
            ram: [0; WAVE_RAM_SIZE],
        }
    }

    /// Write a channel register by offset (0-4)
    pub fn write(&mut self, register: u8, value: u8) {
        match register {
            0 => {
                self.dac_enabled = (value & 0x80) != 0;
                if !self.dac_enabled {
                    self.enabled = false;
                }
            }
            1 => self.length.load(value),
            2 => self.volume_code = (value >> 5) & 0x03,
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
            0 => ((self.dac_enabled as u8) << 7) | 0x7F,
            2 => (self.volume_code << 5) | 0x9F,
            4 => ((self.length.is_enabled() as u8) << 6) | CONTROL_READ_MASK,
            _ => OPEN_BUS,
        }
    }

    /// Read a byte of wave RAM; `index` wraps modulo 16
    pub fn read_wave_ram(&self, index: usize) -> u8 {
        self.ram[index % WAVE_RAM_SIZE]
    }

    /// Write a byte of wave RAM; `index` wraps modulo 16
    pub fn write_wave_ram(&mut self, index: usize, value: u8) {
        self.ram[index % WAVE_RAM_SIZE] = value;
    }

    fn period(&self) -> u32 {
        (2048 - self.frequency as u32) * 2
    }

    /// Restart playback from the first sample. Only starts the channel if the DAC is on.
    pub fn trigger(&mut self) {
        if self.dac_enabled {
            self.enabled = true;
        }
        self.length.trigger();
        self.position = 0;
        self.timer.reload(self.period());
        debug!(
            "Wave triggered: frequency={}, volume_code={}, playing={}",
            self.frequency, self.volume_code, self.enabled
        );
    }

    /// Get the current sample index (0-31)
    pub fn position(&self) -> u8 {
        self.position
    }

    /// Get the raw 4-bit sample at the current position, high nibble first
    pub fn current_sample(&self) -> u8 {
        let byte = self.ram[(self.position / 2) as usize];
        if self.position % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        }
    }

    pub fn is_dac_enabled(&self) -> bool {
        self.dac_enabled
    }

    pub fn length_counter(&self) -> u16 {
        self.length.counter()
    }
}

impl Channel for Wave {
    fn step_timer(&mut self, cycles: u32) {
        let expiries = self.timer.clock(cycles, self.period());
        self.position = ((self.position as u32 + expiries) % SAMPLE_COUNT as u32) as u8;
    }

    fn step_length(&mut self) {
        if self.length.step() {
            self.enabled = false;
        }
    }

    fn output(&self) -> u8 {
        if !self.enabled || !self.dac_enabled {
            return 0;
        }
        self.current_sample() >> VOLUME_SHIFT[self.volume_code as usize]
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}
