//! What the frame driver needs from its host: input, presentation, options.
//!
//! A frontend (libretro shim, SDL window, headless test) implements [`Host`]
//! and hands it to [`crate::VectrexSystem`] at construction.

use emu_core::types::AudioSample;
use serde::Serialize;

use crate::config::CoreOption;

/// Retro-pad buttons the Vectrex controller maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JoypadButton {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
}

/// Left analog stick axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnalogAxis {
    X,
    Y,
}

/// Broadcast standard the host should pace at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Region {
    Ntsc,
    Pal,
}

/// Memory areas a host may inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryRegion {
    SystemRam,
}

/// Static identification of the core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInfo {
    pub library_name: &'static str,
    pub library_version: &'static str,
    pub valid_extensions: &'static [&'static str],
    pub need_fullpath: bool,
}

/// Timing and geometry the host needs to size its output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AvInfo {
    pub fps: f64,
    pub sample_rate: f64,
    pub base_width: u32,
    pub base_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub aspect_ratio: f32,
}

/// Human-readable label for a mapped button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputDescriptor {
    pub port: usize,
    pub button: JoypadButton,
    pub description: &'static str,
}

/// Host services injected into the frame driver.
pub trait Host {
    /// Latch host input devices for this frame.
    fn poll_input(&mut self);

    fn joypad_pressed(&self, port: usize, button: JoypadButton) -> bool;

    /// Raw stick position, -32768..=32767, 0 when centered or absent.
    fn analog_axis(&self, port: usize, axis: AnalogAxis) -> i16;

    /// Present a frame of packed RGB1555 pixels; `pitch` is the row stride in bytes.
    fn upload_video(&mut self, pixels: &[u16], width: u32, height: u32, pitch: usize);

    /// Queue interleaved left/right samples.
    fn upload_audio(&mut self, samples: &[AudioSample]);

    /// Current value of a core option, if the host knows it.
    fn variable(&self, key: &str) -> Option<String>;

    /// Whether any option changed since the last call.
    fn variables_updated(&mut self) -> bool {
        false
    }

    fn set_geometry(&mut self, _info: &AvInfo) {}

    fn set_input_descriptors(&mut self, _descriptors: &[InputDescriptor]) {}

    fn set_core_options(&mut self, _options: &[CoreOption]) {}

    fn set_performance_level(&mut self, _level: u32) {}
}
