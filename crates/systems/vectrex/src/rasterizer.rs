//! Vector rasterizer: beam strokes to an RGB1555 framebuffer.
//!
//! Follows the common `emu_core::renderer::Renderer` pattern:
//!
//! ```text
//! VectrexSystem (beam list) -> VectorRenderer trait -> SoftwareVectorRenderer
//! ```
//!
//! Every frame is drawn from scratch. Each stroke is mapped from analog
//! deflection space to pixels, then walked with Bresenham's algorithm; every
//! step stamps the same point footprint so lines keep a constant thickness.
//! Writes falling outside the buffer are dropped one pixel at a time, which
//! lets strokes hang off the edge at large scale or shift settings.

use emu_core::graphics::ColorOps;
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::renderer::Renderer;
use emu_core::types::Frame;

use crate::config::{GeometryConfig, ResolutionPreset};
use crate::machine::{BeamSegment, ALG_MAX_X, ALG_MAX_Y, MAX_BEAM_SEGMENTS};

/// Mapped coordinates are limited to this magnitude before conversion, so a
/// wild stroke costs a bounded number of Bresenham steps.
pub const COORD_LIMIT: i32 = 1 << 16;

/// Single pixel.
const FOOTPRINT_PIXEL: &[(i32, i32)] = &[(0, 0)];

/// ```text
/// .X.
/// XXX
/// .X.
/// ```
const FOOTPRINT_DIAMOND: &[(i32, i32)] = &[(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

/// ```text
/// .XX.
/// XXXX
/// XXXX
/// .XX.
/// ```
/// Anchored on the second row/column.
const FOOTPRINT_DISC: &[(i32, i32)] = &[
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (2, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (2, 1),
    (0, 2),
    (1, 2),
];

/// Stamp offsets for a point radius.
pub fn footprint(radius: u8) -> &'static [(i32, i32)] {
    match radius {
        0 => FOOTPRINT_PIXEL,
        1 => FOOTPRINT_DIAMOND,
        _ => FOOTPRINT_DISC,
    }
}

/// Beam intensity to a grey RGB1555 pixel.
///
/// Only the low 7 bits carry brightness; the bottom two are dropped to fit
/// the 5-bit channels.
#[inline]
pub fn pack_color(intensity: u8) -> u16 {
    ColorOps::grey555((intensity & 0x7F) >> 2)
}

#[inline]
fn map_axis(coord: i32, range: i32, scale: f32, shift: f32, dimension: u32) -> i32 {
    let pixel = (coord as f32 / range as f32 * scale + shift) * dimension as f32;
    pixel.clamp(-(COORD_LIMIT as f32), COORD_LIMIT as f32) as i32
}

/// Renderer that consumes beam strokes.
pub trait VectorRenderer: Renderer {
    /// Clear the frame and draw `segments` under `geometry`.
    ///
    /// Returns the number of strokes drawn (blanked strokes are not counted).
    fn render_segments(&mut self, segments: &[BeamSegment], geometry: &GeometryConfig) -> usize;
}

/// CPU rasterizer with storage reserved for the largest preset.
pub struct SoftwareVectorRenderer {
    framebuffer: Frame,
    stamp: &'static [(i32, i32)],
}

impl SoftwareVectorRenderer {
    pub fn new(preset: ResolutionPreset) -> Self {
        let (width, height) = preset.dimensions();
        let (max_width, max_height) = ResolutionPreset::MAX.dimensions();
        Self {
            framebuffer: Frame::with_capacity(width, height, max_width, max_height),
            stamp: footprint(preset.point_radius()),
        }
    }

    /// Switch output size and stamp for `geometry`, if it differs.
    pub fn apply_geometry(&mut self, geometry: &GeometryConfig) {
        let (width, height) = geometry.dimensions();
        if (width, height) != (self.framebuffer.width, self.framebuffer.height) {
            log(LogCategory::Video, LogLevel::Debug, || {
                format!(
                    "framebuffer {}x{} -> {}x{}",
                    self.framebuffer.width, self.framebuffer.height, width, height
                )
            });
            self.resize(width, height);
        }
        self.stamp = footprint(geometry.point_radius());
    }

    #[inline]
    fn plot(&mut self, x: i32, y: i32, color: u16) {
        let width = self.framebuffer.width as i32;
        let height = self.framebuffer.height as i32;
        if x < 0 || y < 0 || x >= width || y >= height {
            return;
        }
        self.framebuffer.pixels[(y * width + x) as usize] = color;
    }

    /// Stamp the active footprint centered on (x, y).
    pub(crate) fn stamp(&mut self, x: i32, y: i32, color: u16) {
        for &(dx, dy) in self.stamp {
            self.plot(x + dx, y + dy, color);
        }
    }

    /// Symmetric Bresenham walk from (x0, y0) to (x1, y1), inclusive.
    pub(crate) fn draw_line(&mut self, mut x0: i32, mut y0: i32, x1: i32, y1: i32, color: u16) {
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = (y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = (if dx > dy { dx } else { -dy }) / 2;

        loop {
            self.stamp(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = err;
            if e2 > -dx {
                err -= dy;
                x0 += sx;
            }
            if e2 < dy {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// True when the stroke, widened by the stamp, cannot touch the frame.
    fn off_screen(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
        const MARGIN: i32 = 2;
        let width = self.framebuffer.width as i32;
        let height = self.framebuffer.height as i32;
        x0.max(x1) < -MARGIN
            || y0.max(y1) < -MARGIN
            || x0.min(x1) >= width + MARGIN
            || y0.min(y1) >= height + MARGIN
    }
}

impl Default for SoftwareVectorRenderer {
    fn default() -> Self {
        Self::new(ResolutionPreset::default())
    }
}

impl Renderer for SoftwareVectorRenderer {
    fn get_frame(&self) -> &Frame {
        &self.framebuffer
    }

    fn clear(&mut self, color: u16) {
        self.framebuffer.pixels.fill(color);
    }

    fn reset(&mut self) {
        self.clear(0);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer.resize(width, height);
    }

    fn name(&self) -> &str {
        "Vectrex Software Renderer"
    }
}

impl VectorRenderer for SoftwareVectorRenderer {
    fn render_segments(&mut self, segments: &[BeamSegment], geometry: &GeometryConfig) -> usize {
        self.apply_geometry(geometry);
        self.clear(0);

        let width = self.framebuffer.width;
        let height = self.framebuffer.height;
        let mut drawn = 0;

        for seg in segments.iter().take(MAX_BEAM_SEGMENTS) {
            if seg.is_blanked() {
                continue;
            }

            let x0 = map_axis(seg.x0, ALG_MAX_X, geometry.scale_x, geometry.shift_x, width);
            let x1 = map_axis(seg.x1, ALG_MAX_X, geometry.scale_x, geometry.shift_x, width);
            let y0 = map_axis(seg.y0, ALG_MAX_Y, geometry.scale_y, geometry.shift_y, height);
            let y1 = map_axis(seg.y1, ALG_MAX_Y, geometry.scale_y, geometry.shift_y, height);

            drawn += 1;
            if self.off_screen(x0, y0, x1, y1) {
                continue;
            }

            let color = pack_color(seg.intensity);
            if x0 == x1 && y0 == y1 {
                self.stamp(x0, y0, color);
            } else {
                self.draw_line(x0, y0, x1, y1, color);
            }
        }

        drawn
    }
}
