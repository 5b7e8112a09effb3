//! Common renderer trait for all systems
//!
//! Every system with a display keeps its machine state separate from the code
//! that turns that state into pixels:
//!
//! ```text
//! System (state management) -> Renderer trait -> system-specific extension trait
//! ```
//!
//! The extension trait adds whatever drawing input the system produces
//! (scanlines, tiles, beam strokes) while hosts only ever need [`Renderer`]
//! to fetch the finished frame.
//!
//! ```rust,ignore
//! use emu_core::renderer::Renderer;
//! use emu_core::types::Frame;
//!
//! struct BlankRenderer {
//!     frame: Frame,
//! }
//!
//! impl Renderer for BlankRenderer {
//!     fn get_frame(&self) -> &Frame {
//!         &self.frame
//!     }
//!
//!     fn clear(&mut self, color: u16) {
//!         self.frame.pixels.fill(color);
//!     }
//!
//!     fn reset(&mut self) {
//!         self.clear(0);
//!     }
//!
//!     fn resize(&mut self, width: u32, height: u32) {
//!         self.frame.resize(width, height);
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Blank Renderer"
//!     }
//! }
//! ```

use crate::types::Frame;

/// Common renderer trait for all emulated graphics systems
pub trait Renderer: Send {
    /// Get the current framebuffer (read-only)
    fn get_frame(&self) -> &Frame;

    /// Clear the framebuffer with a solid color
    ///
    /// # Arguments
    /// * `color` - RGB1555 color value
    fn clear(&mut self, color: u16);

    /// Reset the renderer to its initial state
    fn reset(&mut self);

    /// Get the name of this renderer (for debugging/UI)
    fn name(&self) -> &str;

    /// Check if this renderer uses hardware acceleration
    fn is_hardware_accelerated(&self) -> bool {
        false
    }

    /// Resize the renderer to new dimensions
    ///
    /// Called when the output resolution changes.
    fn resize(&mut self, width: u32, height: u32);
}
