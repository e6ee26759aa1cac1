/// Memory-mapped register addresses and the fixed read-back masks
///
/// Also holds the flag types decoded from NR50, NR51 and NR52.

use bitflags::bitflags;

// Pulse A
pub const NR10: u16 = 0xFF10;
pub const NR11: u16 = 0xFF11;
pub const NR12: u16 = 0xFF12;
pub const NR13: u16 = 0xFF13;
pub const NR14: u16 = 0xFF14;

// Pulse B
pub const NR21: u16 = 0xFF16;
pub const NR22: u16 = 0xFF17;
pub const NR23: u16 = 0xFF18;
pub const NR24: u16 = 0xFF19;

// Wave
pub const NR30: u16 = 0xFF1A;
pub const NR31: u16 = 0xFF1B;
pub const NR32: u16 = 0xFF1C;
pub const NR33: u16 = 0xFF1D;
pub const NR34: u16 = 0xFF1E;

// Noise
pub const NR41: u16 = 0xFF20;
pub const NR42: u16 = 0xFF21;
pub const NR43: u16 = 0xFF22;
pub const NR44: u16 = 0xFF23;

// Control
pub const NR50: u16 = 0xFF24;
pub const NR51: u16 = 0xFF25;
pub const NR52: u16 = 0xFF26;

pub const WAVE_RAM_START: u16 = 0xFF30;
pub const WAVE_RAM_END: u16 = 0xFF3F;

/// Value returned for unmapped addresses and write-only registers
pub const OPEN_BUS: u8 = 0xFF;

/// Bits of NRx4 that always read back as 1 (only length-enable is visible)
pub const CONTROL_READ_MASK: u8 = 0xBF;

/// Bits of NR52 that always read back as 1
pub const STATUS_READ_MASK: u8 = 0x70;

/// Trigger bit of NRx4
pub const TRIGGER: u8 = 0x80;
/// Length-enable bit of NRx4
pub const LENGTH_ENABLE: u8 = 0x40;

bitflags! {
    /// NR51: per-channel stereo routing
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Panning: u8 {
        const CH4_LEFT  = 0b1000_0000;
        const CH3_LEFT  = 0b0100_0000;
        const CH2_LEFT  = 0b0010_0000;
        const CH1_LEFT  = 0b0001_0000;
        const CH4_RIGHT = 0b0000_1000;
        const CH3_RIGHT = 0b0000_0100;
        const CH2_RIGHT = 0b0000_0010;
        const CH1_RIGHT = 0b0000_0001;
    }
}

impl Panning {
    /// Left-side routing bit for channel `index` (0..4)
    pub fn left(index: usize) -> Self {
        Self::from_bits_retain(0x10 << index)
    }

    /// Right-side routing bit for channel `index` (0..4)
    pub fn right(index: usize) -> Self {
        Self::from_bits_retain(0x01 << index)
    }
}

bitflags! {
    /// NR50: master volume and VIN routing
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MasterVolume: u8 {
        const VIN_LEFT  = 0b1000_0000;
        const VOL_LEFT  = 0b0111_0000;
        const VIN_RIGHT = 0b0000_1000;
        const VOL_RIGHT = 0b0000_0111;
    }
}

impl MasterVolume {
    /// Left gain multiplier, 1..=8
    pub fn left_gain(self) -> u8 {
        ((self & Self::VOL_LEFT).bits() >> 4) + 1
    }

    /// Right gain multiplier, 1..=8
    pub fn right_gain(self) -> u8 {
        (self & Self::VOL_RIGHT).bits() + 1
    }
}

bitflags! {
    /// NR52 read-back layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SoundStatus: u8 {
        const POWER = 0b1000_0000;
        const CH4   = 0b0000_1000;
        const CH3   = 0b0000_0100;
        const CH2   = 0b0000_0010;
        const CH1   = 0b0000_0001;
    }
}
