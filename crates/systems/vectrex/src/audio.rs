//! PSG output to host audio.
//!
//! The AY-3-8912 model produces unsigned 8-bit samples at the host rate. Each
//! frame the pump pulls exactly one frame's worth, recentres them to signed
//! 16-bit and duplicates them into interleaved stereo.

use emu_core::types::AudioSample;

use crate::machine::{MachineCore, FRAME_RATE};

/// Host output rate in Hz
pub const SAMPLE_RATE: u32 = 44_100;
/// Mono samples produced per emulated frame
pub const SAMPLES_PER_FRAME: usize = (SAMPLE_RATE / FRAME_RATE) as usize;
/// DC offset removed after widening a PSG sample
pub const AUDIO_BIAS: i32 = 0x7FF;

/// Widen one PSG sample. Truncates to 16 bits the same way the C core does,
/// so 0xFF lands just below the i16 range and wraps.
#[inline]
pub fn convert_sample(raw: u8) -> AudioSample {
    (((raw as i32) << 8) - AUDIO_BIAS) as AudioSample
}

/// Reusable per-frame audio buffers.
pub struct AudioPump {
    raw: [u8; SAMPLES_PER_FRAME],
    stereo: [AudioSample; SAMPLES_PER_FRAME * 2],
}

impl AudioPump {
    pub fn new() -> Self {
        Self {
            raw: [0; SAMPLES_PER_FRAME],
            stereo: [0; SAMPLES_PER_FRAME * 2],
        }
    }

    /// Pull one frame of samples from `machine` and return them as
    /// interleaved left/right pairs, in production order. Bytes the core leaves
    /// unwritten come out as silence.
    pub fn pump<M: MachineCore>(&mut self, machine: &mut M) -> &[AudioSample] {
        // A core may write less than a full block.
        self.raw.fill(0);
        machine.fill_audio(&mut self.raw);
        for (frame, &raw) in self.stereo.chunks_exact_mut(2).zip(self.raw.iter()) {
            let sample = convert_sample(raw);
            frame[0] = sample;
            frame[1] = sample;
        }
        &self.stereo
    }

    /// The last pumped frame.
    pub fn samples(&self) -> &[AudioSample] {
        &self.stereo
    }
}

impl Default for AudioPump {
    fn default() -> Self {
        Self::new()
    }
}
