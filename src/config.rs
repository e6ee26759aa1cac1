use log::warn;

/// Master clock of the console in Hz
pub const MASTER_CLOCK_HZ: u32 = 4_194_304;

/// Output configuration for the audio render path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    sample_rate: u32,
    clock_hz: u32,
}

impl AudioConfig {
    pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
    const MIN_SAMPLE_RATE: u32 = 8_000;
    const MAX_SAMPLE_RATE: u32 = 192_000;

    /// Creates a configuration for the given output sample rate.
    ///
    /// The sample rate is clamped to [8000, 192000] Hz. If a value outside
    /// this range is provided, it is clamped and a warning is logged.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: Self::clamp_sample_rate(sample_rate),
            clock_hz: MASTER_CLOCK_HZ,
        }
    }

    /// Overrides the master clock (e.g. for double-speed or slowed playback)
    pub fn with_clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz.max(1);
        self
    }

    fn clamp_sample_rate(sample_rate: u32) -> u32 {
        if sample_rate < Self::MIN_SAMPLE_RATE {
            warn!(
                "Sample rate {} is below minimum {}. Clamping to {}.",
                sample_rate,
                Self::MIN_SAMPLE_RATE,
                Self::MIN_SAMPLE_RATE
            );
            Self::MIN_SAMPLE_RATE
        } else if sample_rate > Self::MAX_SAMPLE_RATE {
            warn!(
                "Sample rate {} is above maximum {}. Clamping to {}.",
                sample_rate,
                Self::MAX_SAMPLE_RATE,
                Self::MAX_SAMPLE_RATE
            );
            Self::MAX_SAMPLE_RATE
        } else {
            sample_rate
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Average master cycles per output sample (fractional)
    pub fn cycles_per_sample(&self) -> f64 {
        self.clock_hz as f64 / self.sample_rate as f64
    }

    /// Create a sample clock for this configuration
    pub fn sample_clock(&self) -> SampleClock {
        SampleClock::new(self.clock_hz, self.sample_rate)
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SAMPLE_RATE)
    }
}

/// Converts output samples into whole master-cycle counts.
///
/// The fractional part of `clock_hz / sample_rate` accumulates and is paid out
/// as an extra cycle when it rolls over, so after `sample_rate` samples exactly
/// `clock_hz` cycles have been emitted.
#[derive(Debug, Clone)]
pub struct SampleClock {
    clock_hz: u32,
    sample_rate: u32,
    remainder: u32,
}

impl SampleClock {
    pub fn new(clock_hz: u32, sample_rate: u32) -> Self {
        Self {
            clock_hz,
            sample_rate: sample_rate.max(1),
            remainder: 0,
        }
    }

    /// Master cycles to run before the next sample
    pub fn next_cycles(&mut self) -> u32 {
        let total = self.remainder as u64 + self.clock_hz as u64;
        self.remainder = (total % self.sample_rate as u64) as u32;
        (total / self.sample_rate as u64) as u32
    }
}
