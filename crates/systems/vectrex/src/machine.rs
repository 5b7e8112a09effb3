//! The emulation core as seen from the bridge.
//!
//! CPU, VIA and PSG emulation live behind [`MachineCore`]; the bridge only
//! advances it, reads its beam and audio output, and shuttles its state.

use serde::{Deserialize, Serialize};

/// Full-scale horizontal deflection of the analog beam
pub const ALG_MAX_X: i32 = 33000;
/// Full-scale vertical deflection of the analog beam
pub const ALG_MAX_Y: i32 = 41000;

/// 6809 clock rate
pub const CPU_CLOCK_HZ: u32 = 1_500_000;
/// Display refresh rate
pub const FRAME_RATE: u32 = 50;
/// CPU cycles emulated per rendered frame (1.5 MHz / 50 Hz)
pub const TICKS_PER_FRAME: u32 = CPU_CLOCK_HZ / FRAME_RATE;

/// Upper bound on strokes the core emits in one frame
pub const MAX_BEAM_SEGMENTS: usize = 50_000;

/// Size of the cartridge address window
pub const CART_CAPACITY: usize = 0x10000;

/// Size of the console's work RAM
pub const SYSTEM_RAM_SIZE: usize = 1024;

/// Intensity value meaning the beam is switched off
pub const BEAM_OFF: u8 = 128;

/// One stroke of the vector beam in machine coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeamSegment {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    /// 0..=127 brightness, [`BEAM_OFF`] for a blanked move
    pub intensity: u8,
}

impl BeamSegment {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32, intensity: u8) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            intensity,
        }
    }

    /// A zero-length stroke (a dot)
    pub fn point(x: i32, y: i32, intensity: u8) -> Self {
        Self::new(x, y, x, y, intensity)
    }

    pub fn is_blanked(&self) -> bool {
        self.intensity == BEAM_OFF
    }
}

/// Controller lines as the core samples them.
///
/// `buttons` is the PSG port A register shared by both pads: port 0 owns bits
/// 0-3, port 1 bits 4-7, and a cleared bit means the button is held.
/// `analog[port][axis]` is 0x00 (min) ..= 0x80 (center) ..= 0xff (max), axis 0
/// being X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub buttons: u8,
    pub analog: [[u8; 2]; 2],
}

impl ControllerState {
    pub const ANALOG_CENTER: u8 = 0x80;
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            buttons: 0xFF,
            analog: [[Self::ANALOG_CENTER; 2]; 2],
        }
    }
}

/// The emulated Vectrex: CPU, VIA, PSG and analog vector generator.
pub trait MachineCore {
    /// Run the machine for `ticks` CPU cycles. Refreshes the beam segment
    /// list and the PSG output buffer as a side effect.
    fn advance(&mut self, ticks: u32);

    /// Strokes drawn since the last `advance`, in beam order.
    fn beam_segments(&self) -> &[BeamSegment];

    /// Fill `out` with unsigned 8-bit PSG samples at the host rate.
    fn fill_audio(&mut self, out: &mut [u8]);

    /// Serialized snapshot size. Must not change while the process runs.
    fn state_size(&self) -> usize;

    /// Write a snapshot into `buf` (exactly `state_size()` bytes).
    fn save_state(&self, buf: &mut [u8]) -> bool;

    /// Replace the machine state with a snapshot. Returns false, leaving the
    /// machine untouched, if the snapshot is not acceptable.
    fn restore_state(&mut self, buf: &[u8]) -> bool;

    /// Write one byte of the cartridge window.
    fn poke_cart(&mut self, addr: u16, value: u8);

    /// Install a cartridge image starting at address 0.
    fn load_image(&mut self, image: &[u8]) {
        for (addr, &value) in image.iter().take(CART_CAPACITY).enumerate() {
            self.poke_cart(addr as u16, value);
        }
    }

    /// Power-on reset of CPU and peripherals.
    fn reset(&mut self);

    /// Reinitialize the sound generator.
    fn reset_audio(&mut self);

    /// Controller lines read by the core on its next `advance`.
    fn controller_mut(&mut self) -> &mut ControllerState;

    /// Work RAM, for hosts that inspect memory.
    fn system_ram(&mut self) -> Option<&mut [u8]> {
        None
    }
}
