/// Volume envelope (NR12 / NR22 / NR42)
///
/// Register layout: `vvvv dppp`
/// - v: initial volume
/// - d: direction (1 = increase)
/// - p: period in 64 Hz ticks (0 = envelope stopped)
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    // Register fields
    initial_volume: u8,
    increase: bool,
    period: u8,

    // Runtime state
    timer: u8,
    volume: u8,
}

pub const MAX_VOLUME: u8 = 15;

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the envelope register
    pub fn write(&mut self, value: u8) {
        self.initial_volume = (value >> 4) & 0x0F;
        self.increase = (value & 0x08) != 0;
        self.period = value & 0x07;
    }

    /// Read the envelope register back (fully readable)
    pub fn read(&self) -> u8 {
        (self.initial_volume << 4) | ((self.increase as u8) << 3) | self.period
    }

    /// Load the runtime state from the register fields
    pub fn trigger(&mut self) {
        self.timer = self.period;
        self.volume = self.initial_volume;
    }

    /// Clock the envelope (64 Hz)
    pub fn step(&mut self) {
        if self.timer == 0 {
            return;
        }

        self.timer -= 1;
        if self.timer == 0 {
            self.timer = self.period;
            if self.timer != 0 {
                if self.increase && self.volume < MAX_VOLUME {
                    self.volume += 1;
                } else if !self.increase && self.volume > 0 {
                    self.volume -= 1;
                }
            }
        }
        debug_assert!(self.volume <= MAX_VOLUME);
    }

    /// Get the current volume (0-15)
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Get the configured period
    pub fn period(&self) -> u8 {
        self.period
    }

    /// Get the countdown to the next volume change
    pub fn timer(&self) -> u8 {
        self.timer
    }
}
