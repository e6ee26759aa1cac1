#[allow(clippy::module_inception)]
pub mod apu;
pub mod envelope;
pub mod frame_sequencer;
pub mod length;
pub mod noise;
pub mod pulse;
pub mod registers;
pub mod wave;

pub use apu::Apu;

/// Behaviour shared by all four sound channels, driven uniformly by the mixer
pub trait Channel {
    /// Advance the frequency timer by `cycles` master clocks
    fn step_timer(&mut self, cycles: u32);

    /// Clock the length counter (256 Hz)
    fn step_length(&mut self);

    /// Current 4-bit output level (0-15)
    fn output(&self) -> u8;

    /// Whether the channel is currently playing
    fn is_enabled(&self) -> bool;

    /// Silence the channel until the next trigger
    fn disable(&mut self);
}

/// Down-counter that clocks a channel's waveform phase
///
/// After any clock with a nonzero period the counter is strictly positive.
/// Overshoot past zero is carried into the next period so one long clock and
/// many short clocks land on the same phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrequencyTimer {
    counter: u32,
}

impl FrequencyTimer {
    /// Create a timer that expires on the first clock
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    /// Reload the counter with a full period
    pub fn reload(&mut self, period: u32) {
        self.counter = period;
    }

    /// Get the remaining cycles until expiry
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Count down by `cycles`, reloading with `period` on every expiry.
    /// Returns the number of expiries.
    pub fn clock(&mut self, cycles: u32, period: u32) -> u32 {
        debug_assert!(period > 0, "frequency timer period must be positive");
        if cycles < self.counter {
            self.counter -= cycles;
            return 0;
        }

        // First expiry uses up the current counter, the rest are whole periods
        let rest = cycles - self.counter;
        self.counter = period - rest % period;
        1 + rest / period
    }
}
