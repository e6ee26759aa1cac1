use log::{info, trace};

use super::frame_sequencer::{FrameSequencer, FrameStep};
use super::noise::Noise;
use super::pulse::Pulse;
use super::registers::*;
use super::wave::Wave;
use super::Channel;

/// Largest bus value before normalization: 4 channels x volume 15 x gain 8
const HEADROOM: f32 = 4.0 * 15.0 * 8.0;

/// Main APU module: owns the four channels, the frame sequencer, and the
/// control registers (NR50-NR52), and mixes everything to stereo
pub struct Apu {
    powered: bool,
    master_volume: MasterVolume,
    panning: Panning,
    frame_sequencer: FrameSequencer,
    pulse_a: Pulse,
    pulse_b: Pulse,
    wave: Wave,
    noise: Noise,
}

impl Apu {
    /// Create a new APU (powered off)
    pub fn new() -> Self {
        Self {
            powered: false,
            master_volume: MasterVolume::empty(),
            panning: Panning::empty(),
            frame_sequencer: FrameSequencer::new(),
            pulse_a: Pulse::with_sweep(),
            pulse_b: Pulse::new(),
            wave: Wave::new(),
            noise: Noise::new(),
        }
    }

    /// Get reference to pulse channel A (with sweep)
    pub fn pulse_a(&self) -> &Pulse {
        &self.pulse_a
    }

    /// Get reference to pulse channel B
    pub fn pulse_b(&self) -> &Pulse {
        &self.pulse_b
    }

    /// Get reference to wave channel
    pub fn wave(&self) -> &Wave {
        &self.wave
    }

    /// Get reference to noise channel
    pub fn noise(&self) -> &Noise {
        &self.noise
    }

    /// Get reference to frame sequencer
    pub fn frame_sequencer(&self) -> &FrameSequencer {
        &self.frame_sequencer
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// All four channels, in NR51/NR52 bit order
    fn channels(&self) -> [&dyn Channel; 4] {
        [&self.pulse_a, &self.pulse_b, &self.wave, &self.noise]
    }

    fn channels_mut(&mut self) -> [&mut dyn Channel; 4] {
        [
            &mut self.pulse_a,
            &mut self.pulse_b,
            &mut self.wave,
            &mut self.noise,
        ]
    }

    /// Run the APU for `cycles` master clocks.
    /// This advances the frame sequencer and every channel's frequency timer.
    pub fn advance(&mut self, cycles: u32) {
        if !self.powered {
            return;
        }

        for _ in 0..self.frame_sequencer.clock(cycles) {
            let step = self.frame_sequencer.step();
            self.dispatch(step);
        }

        for channel in self.channels_mut() {
            channel.step_timer(cycles);
        }
    }

    fn dispatch(&mut self, step: FrameStep) {
        // Length: 256 Hz
        if step.length {
            for channel in self.channels_mut() {
                channel.step_length();
            }
        }

        // Sweep: 128 Hz
        if step.sweep {
            self.pulse_a.step_sweep();
        }

        // Envelope: 64 Hz
        if step.envelope {
            self.pulse_a.step_envelope();
            self.pulse_b.step_envelope();
            self.noise.step_envelope();
        }
    }

    /// Mix the current channel outputs into a stereo frame.
    /// Pure with respect to APU state: calling it twice yields the same frame.
    pub fn sample(&self) -> (f32, f32) {
        if !self.powered {
            return (0.0, 0.0);
        }

        let mut left = 0u32;
        let mut right = 0u32;
        for (index, channel) in self.channels().iter().enumerate() {
            let output = channel.output() as u32;
            if self.panning.contains(Panning::left(index)) {
                left += output;
            }
            if self.panning.contains(Panning::right(index)) {
                right += output;
            }
        }

        left *= self.master_volume.left_gain() as u32;
        right *= self.master_volume.right_gain() as u32;

        (left as f32 / HEADROOM, right as f32 / HEADROOM)
    }

    /// Read an APU register or wave RAM byte
    pub fn read(&self, address: u16) -> u8 {
        match address {
            NR10..=NR14 => self.pulse_a.read((address - NR10) as u8),
            NR21..=NR24 => self.pulse_b.read((address - NR21 + 1) as u8),
            NR30..=NR34 => self.wave.read((address - NR30) as u8),
            NR41..=NR44 => self.noise.read((address - NR41) as u8),
            NR50 => self.master_volume.bits(),
            NR51 => self.panning.bits(),
            NR52 => self.read_status(),
            WAVE_RAM_START..=WAVE_RAM_END => {
                self.wave.read_wave_ram((address - WAVE_RAM_START) as usize)
            }
            _ => OPEN_BUS,
        }
    }

    /// Read NR52: power bit, live channel enable flags, unused bits high
    fn read_status(&self) -> u8 {
        let mut status = SoundStatus::empty();
        status.set(SoundStatus::POWER, self.powered);
        status.set(SoundStatus::CH1, self.pulse_a.is_enabled());
        status.set(SoundStatus::CH2, self.pulse_b.is_enabled());
        status.set(SoundStatus::CH3, self.wave.is_enabled());
        status.set(SoundStatus::CH4, self.noise.is_enabled());
        status.bits() | STATUS_READ_MASK
    }

    /// Write an APU register or wave RAM byte.
    /// While powered off only NR52 accepts writes.
    pub fn write(&mut self, address: u16, value: u8) {
        if !self.powered && address != NR52 {
            trace!(
                "Ignoring write {:02X} to {:04X} while powered off",
                value, address
            );
            return;
        }

        match address {
            NR10..=NR14 => self.pulse_a.write((address - NR10) as u8, value),
            NR21..=NR24 => self.pulse_b.write((address - NR21 + 1) as u8, value),
            NR30..=NR34 => self.wave.write((address - NR30) as u8, value),
            NR41..=NR44 => self.noise.write((address - NR41) as u8, value),
            NR50 => self.master_volume = MasterVolume::from_bits_retain(value),
            NR51 => self.panning = Panning::from_bits_retain(value),
            NR52 => self.write_power(value & 0x80 != 0),
            WAVE_RAM_START..=WAVE_RAM_END => self
                .wave
                .write_wave_ram((address - WAVE_RAM_START) as usize, value),
            _ => trace!("Ignoring write {:02X} to unmapped {:04X}", value, address),
        }
    }

    fn write_power(&mut self, on: bool) {
        if on && !self.powered {
            info!("APU powered on");
            self.frame_sequencer.reset();
        } else if !on && self.powered {
            info!("APU powered off");
            self.power_off();
        }
        self.powered = on;
    }

    fn power_off(&mut self) {
        self.master_volume = MasterVolume::empty();
        self.panning = Panning::empty();
        for channel in self.channels_mut() {
            channel.disable();
        }
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn powered_apu() -> Apu {
        let mut apu = Apu::new();
        apu.write(NR52, 0x80);
        apu
    }

    /// Pulse A: 50% duty, period value 1650, volume 10, no sweep
    fn write_pulse_a_note(apu: &mut Apu, duty: u8) {
        apu.write(NR10, 0x00);
        apu.write(NR11, duty);
        apu.write(NR12, 0xA2);
        apu.write(NR13, 0x72);
        apu.write(NR14, 0x86);
    }

    #[test]
    fn test_apu_new() {
        let apu = Apu::new();
        assert!(!apu.is_powered());
        assert_eq!(apu.frame_sequencer().get_step(), 0);
        assert_eq!(apu.pulse_a().output(), 0);
        assert_eq!(apu.pulse_b().output(), 0);
        assert_eq!(apu.wave().output(), 0);
        assert_eq!(apu.noise().output(), 0);
        assert_eq!(apu.sample(), (0.0, 0.0));
    }

    #[test]
    fn test_writes_ignored_while_powered_off() {
        let mut apu = Apu::new();
        apu.write(NR12, 0xF0);
        apu.write(NR14, 0x80);
        apu.write(NR51, 0xFF);
        apu.write(0xFF30, 0x12);

        assert!(!apu.pulse_a().is_enabled());
        assert_eq!(apu.read(NR12), 0x00);
        assert_eq!(apu.read(NR51), 0x00);
        assert_eq!(apu.read(0xFF30), 0x00);
    }

    #[test]
    fn test_advance_is_noop_while_powered_off() {
        let mut apu = Apu::new();
        apu.advance(8192 * 4);
        assert_eq!(apu.frame_sequencer().get_step(), 0);
        assert_eq!(apu.frame_sequencer().get_cycle_counter(), 0);
    }

    #[test]
    fn test_power_register_read() {
        let mut apu = Apu::new();
        assert_eq!(apu.read(NR52), 0x70);

        apu.write(NR52, 0x80);
        assert_eq!(apu.read(NR52), 0xF0);
    }

    #[test]
    fn test_status_reflects_live_enable_flags() {
        let mut apu = powered_apu();
        apu.write(NR14, 0x80);
        assert_eq!(apu.read(NR52), 0xF1);

        apu.write(NR24, 0x80);
        apu.write(NR44, 0x80);
        assert_eq!(apu.read(NR52), 0xFB);

        // Wave needs its DAC on
        apu.write(NR34, 0x80);
        assert_eq!(apu.read(NR52), 0xFB);
        apu.write(NR30, 0x80);
        apu.write(NR34, 0x80);
        assert_eq!(apu.read(NR52), 0xFF);

        // Register bytes are unchanged when a channel stops
        apu.write(NR30, 0x00);
        assert_eq!(apu.read(NR52), 0xFB);
    }

    #[test]
    fn test_power_cycle_resets_state() {
        let mut apu = powered_apu();
        apu.write(NR50, 0x77);
        apu.write(NR51, 0xFF);
        apu.write(NR12, 0xF0);
        apu.write(NR14, 0x80);
        apu.write(NR24, 0x80);
        apu.advance(8192 * 3 + 17);
        assert_eq!(apu.frame_sequencer().get_step(), 3);

        apu.write(NR52, 0x00);
        assert_eq!(apu.read(NR50), 0x00);
        assert_eq!(apu.read(NR51), 0x00);
        assert!(!apu.pulse_a().is_enabled());
        assert!(!apu.pulse_b().is_enabled());
        assert!(!apu.wave().is_enabled());
        assert!(!apu.noise().is_enabled());

        apu.write(NR52, 0x80);
        assert_eq!(apu.frame_sequencer().get_step(), 0);
        assert_eq!(apu.frame_sequencer().get_cycle_counter(), 0);
        assert_eq!(apu.read(NR50), 0x00);
        assert_eq!(apu.read(NR51), 0x00);
        assert_eq!(apu.read(NR52), 0xF0);
    }

    #[test]
    fn test_power_off_keeps_channel_register_bytes() {
        let mut apu = powered_apu();
        apu.write(NR12, 0xA2);
        apu.write(NR52, 0x00);
        apu.write(NR52, 0x80);
        assert_eq!(apu.read(NR12), 0xA2);
    }

    #[test]
    fn test_repeated_power_on_keeps_sequencer() {
        let mut apu = powered_apu();
        apu.advance(8192 * 2);
        apu.write(NR52, 0x80);
        assert_eq!(apu.frame_sequencer().get_step(), 2);
    }

    #[test]
    fn test_register_read_masks() {
        let apu = powered_apu();
        let expected = [
            (NR10, 0x80),
            (NR11, 0x3F),
            (NR12, 0x00),
            (NR13, 0xFF),
            (NR14, 0xBF),
            (0xFF15, 0xFF),
            (NR21, 0x3F),
            (NR22, 0x00),
            (NR23, 0xFF),
            (NR24, 0xBF),
            (NR30, 0x7F),
            (NR31, 0xFF),
            (NR32, 0x9F),
            (NR33, 0xFF),
            (NR34, 0xBF),
            (0xFF1F, 0xFF),
            (NR41, 0xFF),
            (NR42, 0x00),
            (NR43, 0x00),
            (NR44, 0xBF),
            (NR50, 0x00),
            (NR51, 0x00),
            (NR52, 0xF0),
        ];
        for (address, value) in expected {
            assert_eq!(apu.read(address), value, "register {:04X}", address);
        }
    }

    #[test]
    fn test_unmapped_addresses_read_open_bus() {
        let apu = powered_apu();
        for address in [0x0000, 0xFF0F, 0xFF27, 0xFF2F, 0xFF40, 0xFFFF] {
            assert_eq!(apu.read(address), 0xFF);
        }
    }

    #[test]
    fn test_unmapped_write_ignored() {
        let mut apu = powered_apu();
        apu.write(0xFF27, 0x12);
        apu.write(0xFF15, 0x34);
        assert_eq!(apu.read(0xFF27), 0xFF);
        assert_eq!(apu.read(0xFF15), 0xFF);
    }

    #[test]
    fn test_wave_ram_mapping() {
        let mut apu = powered_apu();
        for (i, address) in (WAVE_RAM_START..=WAVE_RAM_END).enumerate() {
            apu.write(address, i as u8 * 0x11);
        }
        assert_eq!(apu.read(0xFF30), 0x00);
        assert_eq!(apu.read(0xFF35), 0x55);
        assert_eq!(apu.read(0xFF3F), 0xFF);
        assert_eq!(apu.wave().read_wave_ram(10), 0xAA);
    }

    #[test]
    fn test_control_registers_read_back() {
        let mut apu = powered_apu();
        apu.write(NR50, 0xAB);
        apu.write(NR51, 0x5C);
        assert_eq!(apu.read(NR50), 0xAB);
        assert_eq!(apu.read(NR51), 0x5C);
    }

    #[test]
    fn test_silent_envelope_trigger() {
        let mut apu = powered_apu();
        apu.write(NR12, 0x00);
        apu.write(NR14, 0x80);

        assert!(apu.pulse_a().is_enabled());
        for _ in 0..8 {
            apu.advance(1024);
            assert_eq!(apu.pulse_a().output(), 0);
        }
    }

    #[test]
    fn test_half_duty_waveform() {
        let mut apu = powered_apu();
        write_pulse_a_note(&mut apu, 0x80);
        assert_eq!(apu.pulse_a().frequency(), 1650);

        let period = (2048 - 1650) * 4;
        let mut bits = Vec::new();
        for _ in 0..16 {
            bits.push(apu.pulse_a().output() / 10);
            apu.advance(period);
        }
        assert_eq!(bits, [1, 0, 0, 0, 0, 1, 1, 1].repeat(2));
    }

    #[test]
    fn test_three_quarter_duty_waveform() {
        let mut apu = powered_apu();
        write_pulse_a_note(&mut apu, 0xC0);

        let period = (2048 - 1650) * 4;
        let mut bits = Vec::new();
        for _ in 0..16 {
            bits.push(apu.pulse_a().output() / 10);
            apu.advance(period);
        }
        assert_eq!(bits, [0, 1, 1, 1, 1, 1, 1, 0].repeat(2));
    }

    #[test]
    fn test_one_long_advance_matches_many_short() {
        let mut long = powered_apu();
        let mut short = powered_apu();
        for apu in [&mut long, &mut short] {
            write_pulse_a_note(apu, 0x40);
            apu.write(NR42, 0xF0);
            apu.write(NR43, 0x11);
            apu.write(NR44, 0x80);
        }

        long.advance(95 * 500);
        for _ in 0..500 {
            short.advance(95);
        }

        assert_eq!(long.pulse_a().phase(), short.pulse_a().phase());
        assert_eq!(long.noise().shift_register(), short.noise().shift_register());
        assert_eq!(long.frame_sequencer().get_step(), short.frame_sequencer().get_step());
        assert_eq!(long.sample(), short.sample());
    }

    #[test]
    fn test_frame_sequencer_cycle_clocks_units() {
        let mut apu = powered_apu();
        apu.write(NR10, 0x11); // sweep period 1, add, shift 1
        apu.write(NR11, 0x00); // length 64
        apu.write(NR12, 0x81); // volume 8, decrease, period 1
        apu.write(NR13, 0x10);
        apu.write(NR14, 0xC0); // trigger, length enable, frequency 0x010

        apu.advance(8192 * 8);

        // 4 length clocks, 2 sweep clocks, 1 envelope clock
        assert_eq!(apu.pulse_a().length_counter(), 60);
        assert_eq!(apu.pulse_a().frequency(), 0x010 + 0x008 + 0x00C);
        assert_eq!(apu.pulse_a().volume(), 7);
        assert_eq!(apu.frame_sequencer().get_step(), 0);
    }

    #[test]
    fn test_length_expiry_reported_in_status() {
        let mut apu = powered_apu();
        apu.write(NR21, 0x3F); // 1 tick
        apu.write(NR24, 0xC0);
        assert_eq!(apu.read(NR52) & 0x02, 0x02);

        // First length clock lands on step 2
        apu.advance(8192 * 2);
        assert_eq!(apu.read(NR52) & 0x02, 0x00);
    }

    #[test]
    fn test_sample_is_idempotent() {
        let mut apu = powered_apu();
        apu.write(NR50, 0x77);
        apu.write(NR51, 0xFF);
        write_pulse_a_note(&mut apu, 0xC0);
        apu.advance(2000);

        let first = apu.sample();
        let second = apu.sample();
        assert_eq!(first, second);
    }

    #[test]
    fn test_panning_routes_channels() {
        let mut apu = powered_apu();
        apu.write(NR50, 0x00); // gain 1 both sides
        apu.write(NR12, 0xF0);
        apu.write(NR11, 0xC0);
        apu.write(NR14, 0x80);
        apu.advance(8192); // frequency 0: one phase step, pattern bit high
        assert_eq!(apu.pulse_a().output(), 15);

        apu.write(NR51, 0x10); // left only
        assert_eq!(apu.sample(), (15.0 / HEADROOM, 0.0));

        apu.write(NR51, 0x01); // right only
        assert_eq!(apu.sample(), (0.0, 15.0 / HEADROOM));

        apu.write(NR51, 0x22); // pulse B only: silent
        assert_eq!(apu.sample(), (0.0, 0.0));
    }

    #[test]
    fn test_master_volume_gain() {
        let mut apu = powered_apu();
        apu.write(NR51, 0x11);
        apu.write(NR12, 0xF0);
        apu.write(NR11, 0xC0);
        apu.write(NR14, 0x80);
        apu.advance(8192);

        apu.write(NR50, 0x70); // left gain 8, right gain 1
        let (left, right) = apu.sample();
        assert_eq!(left, 15.0 * 8.0 / HEADROOM);
        assert_eq!(right, 15.0 / HEADROOM);
    }

    #[test]
    fn test_full_mix_normalization() {
        let mut apu = powered_apu();
        apu.write(NR50, 0x77);
        apu.write(NR51, 0xFF);

        // Pulse A and B at volume 15 on a high duty bit
        for (duty, envelope, control) in [(NR11, NR12, NR14), (NR21, NR22, NR24)] {
            apu.write(duty, 0xC0);
            apu.write(envelope, 0xF0);
            apu.write(control, 0x80);
        }

        // Wave at full volume, every sample 15
        for address in WAVE_RAM_START..=WAVE_RAM_END {
            apu.write(address, 0xFF);
        }
        apu.write(NR30, 0x80);
        apu.write(NR32, 0x20);
        apu.write(NR34, 0x80);

        apu.advance(8192);
        let (left, right) = apu.sample();
        assert_eq!(left, 45.0 * 8.0 / HEADROOM);
        assert_eq!(right, left);
        assert!(left <= 1.0);
    }

    #[test]
    fn test_sample_silent_after_power_off() {
        let mut apu = powered_apu();
        apu.write(NR50, 0x77);
        apu.write(NR51, 0xFF);
        apu.write(NR12, 0xF0);
        apu.write(NR11, 0xC0);
        apu.write(NR14, 0x80);
        apu.advance(8192);
        assert_ne!(apu.sample(), (0.0, 0.0));

        apu.write(NR52, 0x00);
        assert_eq!(apu.sample(), (0.0, 0.0));
    }
}
