// fontloom/font/src/slot.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The glyph slot: a face's reusable workspace for loaded glyphs.

use fontloom_content::{GlyphLoader, Outline};
use fontloom_error::{Error, FontResult};
use fontloom_geometry::fixed::{F16Dot16, F26Dot6};
use fontloom_geometry::transform::Matrix;
use fontloom_geometry::vector::{vec26, Vector};
use fontloom_raster::{render_gray, render_mono, Bitmap, RenderMode, DEFAULT_POOL_SIZE};
use smallvec::SmallVec;

/// What the slot currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphFormat {
    /// Nothing loaded yet.
    None,
    /// A scalable outline.
    Outline,
    /// A rendered or embedded bitmap.
    Bitmap,
    /// An unexpanded composite skeleton (`NO_RECURSE` loads).
    Composite,
}

impl Default for GlyphFormat {
    fn default() -> GlyphFormat {
        GlyphFormat::None
    }
}

/// Scaled glyph metrics, in 26.6 (font units under `NO_SCALE`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub horiz_bearing_x: F26Dot6,
    pub horiz_bearing_y: F26Dot6,
    pub vert_bearing_x: F26Dot6,
    pub vert_bearing_y: F26Dot6,
    pub width: F26Dot6,
    pub height: F26Dot6,
    pub horiz_advance: F26Dot6,
    pub vert_advance: F26Dot6,
}

bitflags! {
    /// Flags on one component of a composite glyph, matching the `glyf`
    /// wire values.
    pub struct SubGlyphFlags: u16 {
        const ARGS_ARE_WORDS = 0x0001;
        const ARGS_ARE_XY_VALUES = 0x0002;
        const ROUND_XY_TO_GRID = 0x0004;
        const WE_HAVE_A_SCALE = 0x0008;
        const MORE_COMPONENTS = 0x0020;
        const WE_HAVE_AN_XY_SCALE = 0x0040;
        const WE_HAVE_A_2X2 = 0x0080;
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        const USE_MY_METRICS = 0x0200;
        const OVERLAP_COMPOUND = 0x0400;
    }
}

/// One component reference of a composite glyph.
#[derive(Clone, Copy, Debug)]
pub struct SubGlyph {
    pub index: u32,
    pub flags: SubGlyphFlags,
    pub arg1: i32,
    pub arg2: i32,
    pub transform: Matrix,
}

/// A face's mutable glyph workspace, reused across loads. The loader's
/// arrays grow monotonically so steady-state loads stop allocating.
#[derive(Default)]
pub struct GlyphSlot {
    pub format: GlyphFormat,
    pub outline: Outline,
    pub bitmap: Bitmap,
    /// Left edge of the bitmap relative to the pen, in pixels.
    pub bitmap_left: i32,
    /// Top edge of the bitmap above the baseline, in pixels.
    pub bitmap_top: i32,
    pub metrics: GlyphMetrics,
    /// Unscaled, unhinted advances in 16.16 pixels.
    pub linear_h_advance: F16Dot16,
    pub linear_v_advance: F16Dot16,
    /// Composite components, for `NO_RECURSE` loads.
    pub subglyphs: SmallVec<[SubGlyph; 4]>,
    /// Grid-fitting deltas of the side bearings, for kerning correction.
    pub lsb_delta: F26Dot6,
    pub rsb_delta: F26Dot6,
    pub(crate) loader: GlyphLoader,
}

impl GlyphSlot {
    pub fn new() -> GlyphSlot {
        GlyphSlot::default()
    }

    /// Clears per-load state. Keeps allocations.
    pub fn reset(&mut self) {
        self.format = GlyphFormat::None;
        self.outline.clear();
        self.bitmap = Bitmap::new();
        self.bitmap_left = 0;
        self.bitmap_top = 0;
        self.metrics = GlyphMetrics::default();
        self.linear_h_advance = F16Dot16::ZERO;
        self.linear_v_advance = F16Dot16::ZERO;
        self.subglyphs.clear();
        self.lsb_delta = F26Dot6::ZERO;
        self.rsb_delta = F26Dot6::ZERO;
        self.loader.rewind();
    }

    /// Converts the slot's outline into a bitmap in place, replacing any
    /// previously owned buffer. The outline is left untouched on failure.
    pub fn render(&mut self, mode: RenderMode, pool_size: usize) -> FontResult<()> {
        if self.format != GlyphFormat::Outline {
            return Err(Error::InvalidGlyphFormat);
        }
        if !mode.is_supported() {
            return Err(Error::UnimplementedFeature);
        }

        let cbox = self.outline.get_cbox();
        // Snap outward to the pixel grid.
        let x_min = cbox.x_min.0 & !63;
        let y_min = cbox.y_min.0 & !63;
        let x_max = (cbox.x_max.0 + 63) & !63;
        let y_max = (cbox.y_max.0 + 63) & !63;
        let width = ((x_max - x_min) >> 6) as u32;
        let rows = ((y_max - y_min) >> 6) as u32;

        let mut shifted = self.outline.clone();
        shifted.translate(vec26(-x_min, -y_min));

        let mut bitmap = match mode {
            RenderMode::Mono => Bitmap::new_mono(width, rows)?,
            _ => Bitmap::new_gray(width, rows)?,
        };

        if width > 0 && rows > 0 {
            match mode {
                RenderMode::Mono => render_mono(&shifted, &mut bitmap, pool_size)?,
                _ => render_gray(&shifted, &mut bitmap)?,
            }
        }

        self.bitmap = bitmap;
        self.bitmap_left = x_min >> 6;
        self.bitmap_top = y_max >> 6;
        self.format = GlyphFormat::Bitmap;
        Ok(())
    }

    /// Renders with the default pool, growing it once on overflow.
    pub fn render_with_retry(&mut self, mode: RenderMode) -> FontResult<()> {
        match self.render(mode, DEFAULT_POOL_SIZE) {
            Err(Error::RasterOverflow) => {
                debug!("raster pool overflow; retrying with a larger pool");
                self.render(mode, DEFAULT_POOL_SIZE * 16)
            }
            other => other,
        }
    }

    /// Makes the outline artificially bold. `strength` is the full extra
    /// width in 26.6 units; metrics widen to match.
    pub fn embolden(&mut self, strength: F26Dot6) -> FontResult<()> {
        if self.format != GlyphFormat::Outline {
            return Err(Error::InvalidGlyphFormat);
        }
        self.outline.embolden(strength)?;
        self.metrics.width += strength;
        self.metrics.height += strength;
        self.metrics.horiz_advance += strength;
        self.metrics.vert_advance += strength;
        Ok(())
    }

    /// Slants the outline for synthetic italics (about 12 degrees).
    pub fn oblique(&mut self) -> FontResult<()> {
        if self.format != GlyphFormat::Outline {
            return Err(Error::InvalidGlyphFormat);
        }
        let shear = Matrix::row_major(
            F16Dot16(0x10000),
            F16Dot16(0x0366A),
            F16Dot16(0),
            F16Dot16(0x10000),
        );
        self.outline.transform(&shear);
        Ok(())
    }

    /// The slot's outline translated so its origin matches `pen`, used by
    /// callers that assemble text runs themselves.
    pub fn outline_at(&self, pen: Vector) -> Outline {
        let mut outline = self.outline.clone();
        outline.translate(pen);
        outline
    }
}

#[cfg(test)]
mod test {
    use crate::slot::{GlyphFormat, GlyphSlot};
    use fontloom_content::PointTags;
    use fontloom_error::Error;
    use fontloom_geometry::vector::vec26;
    use fontloom_raster::{PixelMode, RenderMode};

    fn slot_with_square() -> GlyphSlot {
        let mut slot = GlyphSlot::new();
        for &(x, y) in &[(64, 64), (192, 64), (192, 192), (64, 192)] {
            slot.outline
                .push_point(vec26(x, y), PointTags::ON_CURVE)
                .unwrap();
        }
        slot.outline.end_contour().unwrap();
        slot.format = GlyphFormat::Outline;
        slot
    }

    #[test]
    fn render_produces_a_positioned_bitmap() {
        let mut slot = slot_with_square();
        slot.render(RenderMode::Normal, 1024).unwrap();
        assert_eq!(slot.format, GlyphFormat::Bitmap);
        assert_eq!(slot.bitmap.pixel_mode, Some(PixelMode::Gray));
        assert_eq!(slot.bitmap.width, 2);
        assert_eq!(slot.bitmap.rows, 2);
        assert_eq!(slot.bitmap_left, 1);
        assert_eq!(slot.bitmap_top, 3);
        assert_eq!(slot.bitmap.gray_at(0, 0), 255);
    }

    #[test]
    fn render_mono_mode_sets_mono_bitmap() {
        let mut slot = slot_with_square();
        slot.render(RenderMode::Mono, 1024).unwrap();
        assert_eq!(slot.bitmap.pixel_mode, Some(PixelMode::Mono));
        assert_eq!(slot.bitmap.num_grays, 2);
        assert!(slot.bitmap.rows > 0);
    }

    #[test]
    fn lcd_modes_are_interface_points_only() {
        let mut slot = slot_with_square();
        assert_eq!(
            slot.render(RenderMode::Lcd, 1024),
            Err(Error::UnimplementedFeature)
        );
        assert_eq!(slot.format, GlyphFormat::Outline);
    }

    #[test]
    fn rendering_an_empty_slot_is_a_format_error() {
        let mut slot = GlyphSlot::new();
        assert_eq!(
            slot.render(RenderMode::Normal, 1024),
            Err(Error::InvalidGlyphFormat)
        );
    }

    #[test]
    fn empty_outline_renders_to_empty_bitmap() {
        let mut slot = GlyphSlot::new();
        slot.format = GlyphFormat::Outline;
        slot.render(RenderMode::Normal, 1024).unwrap();
        assert_eq!(slot.bitmap.width, 0);
        assert_eq!(slot.bitmap.rows, 0);
        assert_eq!(slot.format, GlyphFormat::Bitmap);
    }
}
