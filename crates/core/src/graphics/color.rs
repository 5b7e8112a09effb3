//! Color operation utilities for graphics rendering
//!
//! Colors are packed RGB1555 words: bit 15 unused, then 5 bits each of red,
//! green and blue (0b0RRRRRGGGGGBBBBB).

/// Color operation utilities
pub struct ColorOps;

impl ColorOps {
    /// Largest value of a single 5-bit channel
    pub const CHANNEL_MAX: u8 = 0x1F;

    /// Construct an RGB1555 color from 5-bit components
    ///
    /// Components wider than 5 bits are masked.
    ///
    /// ```
    /// use emu_core::graphics::ColorOps;
    ///
    /// assert_eq!(ColorOps::from_rgb555(31, 0, 0), 0x7C00);
    /// ```
    #[inline]
    pub fn from_rgb555(r: u8, g: u8, b: u8) -> u16 {
        let r = (r & Self::CHANNEL_MAX) as u16;
        let g = (g & Self::CHANNEL_MAX) as u16;
        let b = (b & Self::CHANNEL_MAX) as u16;
        (r << 10) | (g << 5) | b
    }

    /// Grey level with the same 5-bit value in every channel
    #[inline]
    pub fn grey555(level: u8) -> u16 {
        Self::from_rgb555(level, level, level)
    }
}
