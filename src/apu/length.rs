/// Length counter: silences a channel after a programmed number of 256 Hz ticks
#[derive(Debug, Clone)]
pub struct LengthCounter {
    max: u16,
    counter: u16,
    enabled: bool,
}

impl LengthCounter {
    /// Create a length counter with the given maximum (64, or 256 for the wave channel)
    pub fn new(max: u16) -> Self {
        Self {
            max,
            counter: 0,
            enabled: false,
        }
    }

    /// Load the counter from a register value: counts `max - value` ticks
    pub fn load(&mut self, value: u8) {
        let value = (value as u16) & (self.max - 1);
        self.counter = self.max - value;
    }

    /// Set the length-enable flag (bit 6 of NRx4)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Get the length-enable flag
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// On trigger an expired counter restarts at its maximum
    pub fn trigger(&mut self) {
        if self.counter == 0 {
            self.counter = self.max;
        }
    }

    /// Clock the length counter.
    /// Returns true when this tick brought the counter to zero.
    pub fn step(&mut self) -> bool {
        if self.enabled && self.counter > 0 {
            self.counter -= 1;
            return self.counter == 0;
        }
        false
    }

    /// Get the current counter value
    pub fn counter(&self) -> u16 {
        self.counter
    }
}
