/// Frame Sequencer for the APU
/// Divides the master clock down to 512 Hz and sequences length, sweep and
/// envelope clocks over an 8-step cycle:
///
/// | step | length | sweep | envelope |
/// |------|--------|-------|----------|
/// | 0    | x      |       |          |
/// | 2    | x      | x     |          |
/// | 4    | x      |       |          |
/// | 6    | x      | x     |          |
/// | 7    |        |       | x        |
pub struct FrameSequencer {
    step: u8,
    cycle_counter: u32,
}

/// Master cycles per sequencer step (4194304 Hz / 512 Hz)
pub const CYCLES_PER_STEP: u32 = 8192;

/// Sub-unit clocks produced by one sequencer step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStep {
    pub length: bool,
    pub sweep: bool,
    pub envelope: bool,
}

impl Default for FrameSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSequencer {
    /// Create a new frame sequencer
    pub fn new() -> Self {
        Self {
            step: 0,
            cycle_counter: 0,
        }
    }

    /// Return to step 0 with an empty cycle accumulator (power-on)
    pub fn reset(&mut self) {
        self.step = 0;
        self.cycle_counter = 0;
    }

    /// Get the current step (0-7)
    pub fn get_step(&self) -> u8 {
        self.step
    }

    /// Get the cycles accumulated towards the next step
    pub fn get_cycle_counter(&self) -> u32 {
        self.cycle_counter
    }

    /// Accumulate master cycles.
    /// Returns the number of steps now due; the remainder carries forward.
    pub fn clock(&mut self, cycles: u32) -> u32 {
        let total = self.cycle_counter as u64 + cycles as u64;
        self.cycle_counter = (total % CYCLES_PER_STEP as u64) as u32;
        (total / CYCLES_PER_STEP as u64) as u32
    }

    /// Advance to the next step and report which sub-units it clocks
    pub fn step(&mut self) -> FrameStep {
        self.step = (self.step + 1) & 7;
        Self::actions(self.step)
    }

    /// Sub-unit clocks for a given step
    pub fn actions(step: u8) -> FrameStep {
        match step & 7 {
            0 | 4 => FrameStep {
                length: true,
                ..FrameStep::default()
            },
            2 | 6 => FrameStep {
                length: true,
                sweep: true,
                ..FrameStep::default()
            },
            7 => FrameStep {
                envelope: true,
                ..FrameStep::default()
            },
            _ => FrameStep::default(),
        }
    }
}
