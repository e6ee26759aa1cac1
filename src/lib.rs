// Game Boy sound unit: four channels, frame sequencer and stereo mixer
// behind the 0xFF10-0xFF3F register surface.

pub mod apu;
#[cfg(feature = "sdl")]
pub mod audio;
pub mod config;
pub mod shared;

pub use apu::Apu;
pub use config::{AudioConfig, SampleClock};
pub use shared::SharedApu;
