use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::apu::Apu;
use crate::config::SampleClock;

/// Thread-shareable APU handle
///
/// The CPU driver writes registers at instruction cadence while the host audio
/// callback advances and samples at output-sample cadence. Both go through one
/// mutex around the whole [`Apu`]: every register access and every
/// `advance()`+`sample()` pair is a single critical section.
#[derive(Clone, Default)]
pub struct SharedApu {
    inner: Arc<Mutex<Apu>>,
}

impl SharedApu {
    pub fn new(apu: Apu) -> Self {
        Self {
            inner: Arc::new(Mutex::new(apu)),
        }
    }

    /// APU state is plain data, so a panic on another thread leaves it usable
    fn lock(&self) -> MutexGuard<'_, Apu> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a register from the CPU side
    pub fn write(&self, address: u16, value: u8) {
        self.lock().write(address, value);
    }

    /// Read a register from the CPU side
    pub fn read(&self, address: u16) -> u8 {
        self.lock().read(address)
    }

    /// Advance by `cycles` and sample, atomically
    pub fn next_frame(&self, cycles: u32) -> (f32, f32) {
        let mut apu = self.lock();
        apu.advance(cycles);
        apu.sample()
    }

    /// Fill an interleaved stereo buffer (`L R L R ...`), one frame per pair
    pub fn render(&self, clock: &mut SampleClock, out: &mut [f32]) {
        for frame in out.chunks_exact_mut(2) {
            let (left, right) = self.next_frame(clock.next_cycles());
            frame[0] = left;
            frame[1] = right;
        }
    }

    /// Run `f` with exclusive access to the APU
    pub fn with<R>(&self, f: impl FnOnce(&mut Apu) -> R) -> R {
        f(&mut self.lock())
    }
}
