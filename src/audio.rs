/// Audio output module for the APU
///
/// This module handles SDL2 audio initialization and manages the audio callback
/// that pulls stereo frames from a [`SharedApu`].
use log::info;
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

use crate::config::{AudioConfig, SampleClock};
use crate::shared::SharedApu;

/// Audio output handler that renders samples from the APU on SDL2's audio thread
pub struct ApuAudio {
    device: AudioDevice<ApuCallback>,
    sample_rate: u32,
}

impl ApuAudio {
    /// Create a new audio output handler
    ///
    /// Opens a stereo `f32` playback device at the configured sample rate. If
    /// the device grants a different rate, the cycle clock follows the rate
    /// actually obtained, even outside the range `AudioConfig` accepts.
    ///
    /// # Arguments
    /// * `sdl_context` - The SDL2 context for audio initialization
    /// * `apu` - Handle shared with the CPU side that writes registers
    /// * `config` - Requested sample rate and master clock
    ///
    /// # Errors
    /// Returns an error if SDL2 audio initialization fails
    pub fn new(sdl_context: &sdl2::Sdl, apu: SharedApu, config: AudioConfig) -> Result<Self, String> {
        let audio_subsystem = sdl_context.audio()?;

        let desired_spec = AudioSpecDesired {
            freq: Some(config.sample_rate() as i32),
            channels: Some(2), // Interleaved stereo
            samples: None,     // Use SDL2 default buffer size
        };

        let device = audio_subsystem.open_playback(None, &desired_spec, |spec| {
            info!(
                "Audio device opened: {} Hz, {} channels, {} sample buffer",
                spec.freq, spec.channels, spec.samples
            );
            ApuCallback {
                apu,
                clock: SampleClock::new(config.clock_hz(), spec.freq.max(1) as u32),
            }
        })?;
        let sample_rate = device.spec().freq.max(1) as u32;

        Ok(Self {
            device,
            sample_rate,
        })
    }

    /// Sample rate granted by the device
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start audio playback
    pub fn resume(&self) {
        self.device.resume();
    }

    /// Pause audio playback
    pub fn pause(&self) {
        self.device.pause();
    }
}

/// SDL2 audio callback implementation
struct ApuCallback {
    apu: SharedApu,
    clock: SampleClock,
}

impl AudioCallback for ApuCallback {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        self.apu.render(&mut self.clock, out);
    }
}
