//! Core emulator primitives and traits.

pub mod graphics;
pub mod logging;
pub mod renderer;

pub mod types {
    use serde::{Deserialize, Serialize};

    /// Packed RGB1555 framebuffer.
    ///
    /// `pixels.len()` is always `width * height`. Storage reserved through
    /// [`Frame::with_capacity`] is reused by [`Frame::resize`], so switching
    /// between resolutions that fit the reservation never reallocates.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Frame {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u16>,
    }

    impl Frame {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0; (width * height) as usize],
            }
        }

        /// Create a `width` x `height` frame backed by storage large enough
        /// for `max_width` x `max_height`.
        pub fn with_capacity(width: u32, height: u32, max_width: u32, max_height: u32) -> Self {
            let mut pixels = Vec::with_capacity((max_width * max_height) as usize);
            pixels.resize((width * height) as usize, 0);
            Self {
                width,
                height,
                pixels,
            }
        }

        /// Change the frame dimensions. Contents are zeroed.
        pub fn resize(&mut self, width: u32, height: u32) {
            self.width = width;
            self.height = height;
            self.pixels.clear();
            self.pixels.resize((width * height) as usize, 0);
        }

        /// Row stride in bytes.
        pub fn pitch(&self) -> usize {
            self.width as usize * std::mem::size_of::<u16>()
        }

        /// Read a pixel, `None` when outside the frame.
        pub fn pixel(&self, x: i32, y: i32) -> Option<u16> {
            if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
                return None;
            }
            self.pixels
                .get(y as usize * self.width as usize + x as usize)
                .copied()
        }
    }

    /// One signed 16-bit PCM sample as handed to the host
    pub type AudioSample = i16;
}

/// Description of a mount point (media slot) that a system supports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPointInfo {
    /// Unique identifier for this mount point (e.g., "Cartridge")
    pub id: String,
    /// User-friendly name for display (e.g., "Cartridge Slot")
    pub name: String,
    /// File extensions accepted by this mount point (e.g., ["bin", "vec"])
    pub extensions: Vec<String>,
    /// Whether this mount point is required for the system to function
    pub required: bool,
}

/// A high-level System trait tying components together.
pub trait System {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reset to initial power-on state
    fn reset(&mut self);

    /// Emulate one frame and return the rendered framebuffer.
    fn step_frame(&mut self) -> Result<&types::Frame, Self::Error>;

    /// Size in bytes of a serialized machine snapshot.
    fn state_size(&self) -> usize;

    /// Serialize the machine into `buf`, which must be exactly `state_size()` bytes.
    /// Save states never include cartridge data.
    fn save_state(&self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Restore a snapshot produced by `save_state`.
    /// A rejected snapshot leaves the machine untouched.
    fn load_state(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Check if this system supports save/load state functionality
    fn supports_save_states(&self) -> bool {
        false // Default: no save state support
    }

    /// Get the list of mount points this system supports
    fn mount_points(&self) -> Vec<MountPointInfo>;

    /// Load media into a specific mount point
    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Unload media from a specific mount point
    fn unmount(&mut self, mount_point_id: &str) -> Result<(), Self::Error>;

    /// Check if a mount point has media loaded
    fn is_mounted(&self, mount_point_id: &str) -> bool;
}
