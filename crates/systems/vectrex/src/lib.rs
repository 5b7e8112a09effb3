//! Vectrex presentation and I/O bridge
//!
//! Sits between an emulated Vectrex ([`MachineCore`]: 6809, VIA, AY-3-8912
//! and the analog vector generator) and a frontend ([`Host`]). Each frame it
//! samples the pads, advances the machine 30 000 cycles, converts the beam
//! strokes into a raster image, and forwards the image and the PSG samples to
//! the host.
//!
//! ```text
//! Host <-> VectrexSystem -+-> input      (pads -> controller lines)
//!                         +-> rasterizer (beam strokes -> RGB1555)
//!                         +-> audio      (PSG bytes -> stereo i16)
//!                         +-> state      (opaque snapshots)
//!                         +-> cartridge  (64K program slot)
//! ```

pub mod audio;
pub mod cartridge;
pub mod config;
pub mod host;
pub mod input;
pub mod machine;
pub mod rasterizer;
pub mod state;
pub mod system;

pub use cartridge::{Cartridge, CartridgeError};
pub use config::{ConfigError, GeometryConfig, ResolutionPreset, CORE_OPTIONS};
pub use host::{AnalogAxis, AvInfo, Host, InputDescriptor, JoypadButton, MemoryRegion, Region};
pub use machine::{BeamSegment, ControllerState, MachineCore};
pub use rasterizer::{SoftwareVectorRenderer, VectorRenderer};
pub use state::StateError;
pub use system::{Lifecycle, VectrexSystem};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectrexError {
    #[error("Cartridge error: {0}")]
    Cartridge(#[from] CartridgeError),
    #[error("State error: {0}")]
    State(#[from] StateError),
    #[error("No program loaded")]
    NotLoaded,
    #[error("Invalid mount point: {0}")]
    InvalidMountPoint(String),
}
