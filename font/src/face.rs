// fontloom/font/src/face.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The face object: one parsed font, its size instance and glyph slot.

use crate::charmap::{CharmapBacking, CharmapDesc, Encoding, Platform};
use crate::incremental::IncrementalInterface;
use crate::slot::{GlyphFormat, GlyphSlot};
use crate::{cid, sfnt, type1};
use fontloom_error::{Error, FontResult};
use fontloom_geometry::fixed::{div_fix, mul_div, mul_fix, F16Dot16, F26Dot6};
use fontloom_geometry::transform::{Matrix, Transform};
use fontloom_geometry::vector::{vec26, Vector};
use fontloom_geometry::BBox;
use fontloom_raster::RenderMode;
use std::sync::Arc;

bitflags! {
    /// Properties of a face, discovered at open time.
    pub struct FaceFlags: u32 {
        const SCALABLE = 0x0001;
        const FIXED_SIZES = 0x0002;
        const FIXED_WIDTH = 0x0004;
        const SFNT = 0x0008;
        const HORIZONTAL = 0x0010;
        const VERTICAL = 0x0020;
        const KERNING = 0x0040;
        const MULTIPLE_MASTERS = 0x0100;
        const GLYPH_NAMES = 0x0200;
        const HINTER = 0x0800;
        const COLOR = 0x4000;
        const VARIATION = 0x8000;
        const SVG = 0x1_0000;
    }
}

bitflags! {
    /// Style bits claimed by the font itself.
    pub struct StyleFlags: u32 {
        const ITALIC = 0x01;
        const BOLD = 0x02;
    }
}

bitflags! {
    /// Flags controlling `load_glyph`.
    pub struct LoadFlags: u32 {
        /// Keep font units: no scale, no hinting, linear advances only.
        const NO_SCALE = 0x0001;
        /// Scale, but skip the hinter.
        const NO_HINTING = 0x0002;
        /// Rasterize immediately after loading.
        const RENDER = 0x0004;
        /// Skip embedded bitmap strikes.
        const NO_BITMAP = 0x0008;
        /// Use vertical metrics for the advance.
        const VERTICAL_LAYOUT = 0x0010;
        /// Prefer the auto-hinter collaborator over the format hinter.
        const FORCE_AUTOHINT = 0x0020;
        /// Return composite skeletons instead of recursing.
        const NO_RECURSE = 0x0400;
        /// Ignore the face's pending transform.
        const IGNORE_TRANSFORM = 0x0800;
        // Bits 16..19 encode the render target; use `with_target`.
        const TARGET_BIT_0 = 0x1_0000;
        const TARGET_BIT_1 = 0x2_0000;
        const TARGET_BIT_2 = 0x4_0000;
    }
}

impl LoadFlags {
    const TARGET_SHIFT: u32 = 16;
    const TARGET_MASK: u32 = 0x7_0000;

    /// Encodes a render target into the flags: the mode lives in the
    /// dedicated target bits.
    pub fn with_target(self, mode: RenderMode) -> LoadFlags {
        let value = match mode {
            RenderMode::Normal => 0,
            RenderMode::Light => 1,
            RenderMode::Mono => 2,
            RenderMode::Lcd => 3,
            RenderMode::LcdV => 4,
        };
        LoadFlags::from_bits_truncate(
            (self.bits() & !LoadFlags::TARGET_MASK) | (value << LoadFlags::TARGET_SHIFT),
        )
    }

    /// The render target encoded in the flags; `Normal` by default.
    pub fn target(self) -> RenderMode {
        match (self.bits() & LoadFlags::TARGET_MASK) >> LoadFlags::TARGET_SHIFT {
            1 => RenderMode::Light,
            2 => RenderMode::Mono,
            3 => RenderMode::Lcd,
            4 => RenderMode::LcdV,
            _ => RenderMode::Normal,
        }
    }
}

/// How `get_kerning` scales its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KerningMode {
    /// Scaled and rounded to the pixel grid.
    Default,
    /// Scaled, full 26.6 precision.
    Unfitted,
    /// Raw font units.
    Unscaled,
}

/// An auxiliary `open_face` parameter. Unknown tags are ignored upstream.
#[derive(Clone)]
pub enum OpenParameter {
    /// `('incr', ...)`: incremental glyph loading interface.
    Incremental(Arc<dyn IncrementalInterface>),
    /// `('rseed', ...)`: seed for the CFF `random` operator.
    RandomSeed(i32),
}

/// An embedded bitmap strike advertised by the font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapSize {
    pub height: i16,
    pub width: i16,
    /// Nominal size in 26.6 points.
    pub size: F26Dot6,
    pub x_ppem: F26Dot6,
    pub y_ppem: F26Dot6,
}

/// The metrics of the currently selected size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SizeMetrics {
    pub x_ppem: u16,
    pub y_ppem: u16,
    /// Font units to 26.6 pixels.
    pub x_scale: F16Dot16,
    pub y_scale: F16Dot16,
    pub ascender: F26Dot6,
    pub descender: F26Dot6,
    pub height: F26Dot6,
    pub max_advance: F26Dot6,
}

/// Face metadata assembled by a driver's `init_face`.
pub struct FaceInfo {
    pub num_faces: i32,
    pub face_index: i32,
    pub flags: FaceFlags,
    pub style_flags: StyleFlags,
    pub num_glyphs: u32,
    pub family_name: Option<String>,
    pub style_name: Option<String>,
    pub available_sizes: Vec<BitmapSize>,
    pub charmaps: Vec<CharmapDesc>,
    /// Font-unit bounding box of all glyphs.
    pub bbox: BBox,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub height: i16,
    pub max_advance_width: i16,
    pub max_advance_height: i16,
    pub underline_position: i16,
    pub underline_thickness: i16,
}

impl FaceInfo {
    /// A counting-only face: `face_index < 0` opens resolve to this.
    pub fn counting(num_faces: i32) -> FaceInfo {
        FaceInfo {
            num_faces,
            face_index: -1,
            flags: FaceFlags::empty(),
            style_flags: StyleFlags::empty(),
            num_glyphs: 0,
            family_name: None,
            style_name: None,
            available_sizes: vec![],
            charmaps: vec![],
            bbox: BBox::zero(),
            units_per_em: 0,
            ascender: 0,
            descender: 0,
            height: 0,
            max_advance_width: 0,
            max_advance_height: 0,
            underline_position: 0,
            underline_thickness: 0,
        }
    }
}

/// Driver-private face state.
pub(crate) enum FacePayload {
    /// Counting-only face, no font behind it.
    None,
    Sfnt(Box<sfnt::SfntFont>),
    Type1(Box<type1::Type1Font>),
    Cid(Box<cid::CidFont>),
    Custom(Box<dyn CustomFace>),
}

/// The capability surface an external driver's face must provide.
pub trait CustomFace {
    /// Loads glyph `glyph_index` into the slot in font units, returning
    /// the unscaled `(advance, left_side_bearing)`.
    fn load_glyph(
        &mut self,
        slot: &mut GlyphSlot,
        ctx: &LoadContext,
        glyph_index: u32,
    ) -> FontResult<(i32, i32)>;

    /// Maps a character code through the given charmap backing.
    fn char_index(&mut self, charmap: usize, char_code: u32) -> u32 {
        let _ = (charmap, char_code);
        0
    }
}

/// Everything a driver needs to know about the load in progress.
pub struct LoadContext {
    pub flags: LoadFlags,
    pub no_scale: bool,
    pub x_scale: F16Dot16,
    pub y_scale: F16Dot16,
    pub x_ppem: u16,
    pub y_ppem: u16,
}

/// One parsed font. Faces own their size instance and glyph slot; all
/// mutation is externally serialized by the caller.
pub struct Face {
    pub(crate) driver_name: &'static str,
    info: FaceInfo,
    size: Option<SizeMetrics>,
    active_charmap: Option<usize>,
    transform: Option<Transform>,
    /// The reusable glyph workspace.
    pub glyph: GlyphSlot,
    pub(crate) payload: FacePayload,
}

impl Face {
    pub(crate) fn from_parts(
        driver_name: &'static str,
        info: FaceInfo,
        payload: FacePayload,
    ) -> Face {
        let active_charmap = default_charmap(&info.charmaps);
        Face {
            driver_name,
            info,
            size: None,
            active_charmap,
            transform: None,
            glyph: GlyphSlot::new(),
            payload,
        }
    }

    /// Builds a face for an external driver.
    pub fn new_custom(
        driver_name: &'static str,
        info: FaceInfo,
        payload: Box<dyn CustomFace>,
    ) -> Face {
        Face::from_parts(driver_name, info, FacePayload::Custom(payload))
    }

    // Metadata accessors.

    #[inline]
    pub fn num_faces(&self) -> i32 {
        self.info.num_faces
    }

    #[inline]
    pub fn face_index(&self) -> i32 {
        self.info.face_index
    }

    #[inline]
    pub fn flags(&self) -> FaceFlags {
        self.info.flags
    }

    #[inline]
    pub fn style_flags(&self) -> StyleFlags {
        self.info.style_flags
    }

    #[inline]
    pub fn num_glyphs(&self) -> u32 {
        self.info.num_glyphs
    }

    #[inline]
    pub fn family_name(&self) -> Option<&str> {
        self.info.family_name.as_deref()
    }

    #[inline]
    pub fn style_name(&self) -> Option<&str> {
        self.info.style_name.as_deref()
    }

    #[inline]
    pub fn available_sizes(&self) -> &[BitmapSize] {
        &self.info.available_sizes
    }

    #[inline]
    pub fn charmaps(&self) -> &[CharmapDesc] {
        &self.info.charmaps
    }

    #[inline]
    pub fn active_charmap(&self) -> Option<&CharmapDesc> {
        self.active_charmap.map(|i| &self.info.charmaps[i])
    }

    /// Font-unit bounding box over all glyphs.
    #[inline]
    pub fn bbox(&self) -> BBox {
        self.info.bbox
    }

    #[inline]
    pub fn units_per_em(&self) -> u16 {
        self.info.units_per_em
    }

    #[inline]
    pub fn ascender(&self) -> i16 {
        self.info.ascender
    }

    #[inline]
    pub fn descender(&self) -> i16 {
        self.info.descender
    }

    #[inline]
    pub fn height(&self) -> i16 {
        self.info.height
    }

    #[inline]
    pub fn max_advance_width(&self) -> i16 {
        self.info.max_advance_width
    }

    #[inline]
    pub fn size(&self) -> Option<&SizeMetrics> {
        self.size.as_ref()
    }

    /// Installs a pending transform applied to every subsequent load
    /// unless `IGNORE_TRANSFORM` is passed.
    pub fn set_transform(&mut self, matrix: Option<Matrix>, delta: Option<Vector>) {
        if matrix.is_none() && delta.is_none() {
            self.transform = None;
        } else {
            self.transform = Some(Transform::new(
                matrix.unwrap_or(Matrix::IDENTITY),
                delta.unwrap_or(Vector::ZERO),
            ));
        }
    }

    // Sizing.

    /// Selects a character size in 26.6 points at the given resolution.
    /// A zero dimension borrows the other; zero dpi defaults to 72.
    pub fn set_char_size(
        &mut self,
        char_width: F26Dot6,
        char_height: F26Dot6,
        horiz_dpi: u32,
        vert_dpi: u32,
    ) -> FontResult<()> {
        let mut width = char_width.0;
        let mut height = char_height.0;
        if width == 0 {
            width = height;
        }
        if height == 0 {
            height = width;
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidPixelSize);
        }
        let hdpi = if horiz_dpi == 0 { 72 } else { horiz_dpi };
        let vdpi = if vert_dpi == 0 { 72 } else { vert_dpi };

        let x_ppem_frac = mul_div(width, hdpi as i32, 72)?;
        let y_ppem_frac = mul_div(height, vdpi as i32, 72)?;
        self.request_size(x_ppem_frac, y_ppem_frac)
    }

    /// Selects a size directly in integer pixels. A zero dimension
    /// borrows the other; both zero is an error.
    pub fn set_pixel_sizes(&mut self, pixel_width: u32, pixel_height: u32) -> FontResult<()> {
        let mut width = pixel_width;
        let mut height = pixel_height;
        if width == 0 {
            width = height;
        }
        if height == 0 {
            height = width;
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidPixelSize);
        }
        self.request_size((width as i32) << 6, (height as i32) << 6)
    }

    fn request_size(&mut self, x_ppem_frac: i32, y_ppem_frac: i32) -> FontResult<()> {
        if !self.info.flags.contains(FaceFlags::SCALABLE) {
            return Err(Error::InvalidPixelSize);
        }
        let upem = self.info.units_per_em as i32;
        if upem == 0 {
            return Err(Error::InvalidFaceHandle);
        }
        let x_scale = F16Dot16(div_fix(x_ppem_frac, upem)?);
        let y_scale = F16Dot16(div_fix(y_ppem_frac, upem)?);

        let round_pixels = |units: i16, scale: F16Dot16| -> F26Dot6 {
            F26Dot6((mul_fix(units as i32, scale.0) + 32) & !63)
        };

        self.size = Some(SizeMetrics {
            x_ppem: ((x_ppem_frac + 32) >> 6) as u16,
            y_ppem: ((y_ppem_frac + 32) >> 6) as u16,
            x_scale,
            y_scale,
            ascender: round_pixels(self.info.ascender, y_scale),
            descender: round_pixels(self.info.descender, y_scale),
            height: round_pixels(self.info.height, y_scale),
            max_advance: round_pixels(self.info.max_advance_width, x_scale),
        });
        Ok(())
    }

    // Charmaps.

    /// Activates the first charmap matching `(platform, encoding)`.
    pub fn select_charmap(&mut self, platform: Platform, encoding: Encoding) -> FontResult<()> {
        match self
            .info
            .charmaps
            .iter()
            .position(|cm| cm.platform == platform && cm.encoding == encoding)
        {
            Some(index) => {
                self.active_charmap = Some(index);
                Ok(())
            }
            None => Err(Error::InvalidCharMapHandle),
        }
    }

    /// Activates a charmap by index.
    pub fn set_charmap(&mut self, index: usize) -> FontResult<()> {
        if index >= self.info.charmaps.len() {
            return Err(Error::InvalidCharMapHandle);
        }
        self.active_charmap = Some(index);
        Ok(())
    }

    /// Maps a character code through the active charmap; 0 when missing.
    pub fn get_char_index(&mut self, char_code: u32) -> u32 {
        let index = match self.active_charmap {
            Some(index) => index,
            None => return 0,
        };
        let backing = self.info.charmaps[index].backing.clone();
        let gid = match (&mut self.payload, &backing) {
            (FacePayload::Sfnt(font), CharmapBacking::SfntSubtable { offset, format }) => {
                sfnt::char_index(font, *offset, *format, char_code)
            }
            (FacePayload::Type1(font), CharmapBacking::Type1Encoding) => {
                type1::char_index(font, char_code)
            }
            (FacePayload::Cid(_), CharmapBacking::CidIdentity) => {
                if char_code < self.info.num_glyphs {
                    char_code
                } else {
                    0
                }
            }
            (FacePayload::Custom(face), _) => face.char_index(index, char_code),
            _ => 0,
        };
        if gid >= self.info.num_glyphs {
            0
        } else {
            gid
        }
    }

    // Glyph loading.

    /// Loads glyph `glyph_index` into the face's slot.
    pub fn load_glyph(&mut self, glyph_index: u32, flags: LoadFlags) -> FontResult<()> {
        if matches!(self.payload, FacePayload::None) {
            return Err(Error::InvalidFaceHandle);
        }
        if glyph_index >= self.info.num_glyphs {
            return Err(Error::InvalidGlyphIndex);
        }

        let no_scale =
            flags.contains(LoadFlags::NO_SCALE) || flags.contains(LoadFlags::NO_RECURSE);
        let size = if no_scale {
            SizeMetrics {
                x_scale: F16Dot16::ONE,
                y_scale: F16Dot16::ONE,
                ..SizeMetrics::default()
            }
        } else {
            self.size.ok_or(Error::InvalidSizeHandle)?
        };

        let ctx = LoadContext {
            flags,
            no_scale,
            x_scale: size.x_scale,
            y_scale: size.y_scale,
            x_ppem: size.x_ppem,
            y_ppem: size.y_ppem,
        };

        self.glyph.reset();
        let (advance, lsb) = match &mut self.payload {
            FacePayload::Sfnt(font) => sfnt::load_glyph(font, &mut self.glyph, &ctx, glyph_index)?,
            FacePayload::Type1(font) => {
                type1::load_glyph(font, &mut self.glyph, &ctx, glyph_index)?
            }
            FacePayload::Cid(font) => cid::load_glyph(font, &mut self.glyph, &ctx, glyph_index)?,
            FacePayload::Custom(face) => face.load_glyph(&mut self.glyph, &ctx, glyph_index)?,
            FacePayload::None => unreachable!(),
        };

        self.finalize_load(&ctx, advance, lsb)?;

        if flags.contains(LoadFlags::RENDER) && self.glyph.format == GlyphFormat::Outline {
            self.glyph.render_with_retry(flags.target())?;
        }
        Ok(())
    }

    /// Loads the glyph for `char_code` through the active charmap.
    pub fn load_char(&mut self, char_code: u32, flags: LoadFlags) -> FontResult<()> {
        let glyph_index = self.get_char_index(char_code);
        if glyph_index == 0 && self.active_charmap.is_some() {
            // Code not mapped; glyph 0 is still loadable as .notdef.
            trace!("char {:#x} maps to .notdef", char_code);
        }
        self.load_glyph(glyph_index, flags)
    }

    /// Scales the font-unit slot into device space and derives metrics.
    fn finalize_load(&mut self, ctx: &LoadContext, advance: i32, lsb: i32) -> FontResult<()> {
        let slot = &mut self.glyph;

        // Linear advances are always unhinted: font units under NO_SCALE,
        // 16.16 pixels otherwise.
        let upem = self.info.units_per_em as i32;
        slot.linear_h_advance = if ctx.no_scale || upem == 0 {
            F16Dot16::from_i32(advance)
        } else {
            F16Dot16(mul_div(advance, (ctx.x_ppem as i32) << 16, upem)?)
        };
        let vert_advance_units = (self.info.ascender as i32) - (self.info.descender as i32);
        slot.linear_v_advance = if ctx.no_scale || upem == 0 {
            F16Dot16::from_i32(vert_advance_units)
        } else {
            F16Dot16(mul_div(vert_advance_units, (ctx.y_ppem as i32) << 16, upem)?)
        };

        if slot.format != GlyphFormat::Outline {
            return Ok(());
        }

        let x_scale = ctx.x_scale;
        let y_scale = ctx.y_scale;
        if !ctx.no_scale {
            for point in slot.outline.points_mut() {
                *point = vec26(
                    mul_fix(point.x.0, x_scale.0),
                    mul_fix(point.y.0, y_scale.0),
                );
            }
        }

        if !ctx.flags.contains(LoadFlags::IGNORE_TRANSFORM) {
            if let Some(transform) = self.transform {
                slot.outline.apply(&transform);
            }
        }

        let cbox = slot.outline.get_cbox();
        let scaled_advance = if ctx.no_scale {
            F26Dot6(advance)
        } else {
            F26Dot6(mul_fix(advance, x_scale.0))
        };
        let scaled_lsb = if ctx.no_scale {
            F26Dot6(lsb)
        } else {
            F26Dot6(mul_fix(lsb, x_scale.0))
        };
        let vert_advance = if ctx.no_scale {
            F26Dot6(vert_advance_units)
        } else {
            F26Dot6(mul_fix(vert_advance_units, y_scale.0))
        };

        let width = cbox.width();
        let height = cbox.height();
        slot.metrics = crate::slot::GlyphMetrics {
            horiz_bearing_x: if slot.outline.is_empty() {
                scaled_lsb
            } else {
                cbox.x_min
            },
            horiz_bearing_y: cbox.y_max,
            vert_bearing_x: F26Dot6(-width.0 / 2),
            vert_bearing_y: F26Dot6((vert_advance.0 - height.0) / 2),
            width,
            height,
            horiz_advance: scaled_advance,
            vert_advance,
        };
        Ok(())
    }

    // Kerning and names.

    /// The kerning between two glyphs, positive moving them apart.
    pub fn get_kerning(
        &mut self,
        left_glyph: u32,
        right_glyph: u32,
        mode: KerningMode,
    ) -> FontResult<Vector> {
        if !self.info.flags.contains(FaceFlags::KERNING) {
            return Ok(Vector::ZERO);
        }
        let raw = match &mut self.payload {
            FacePayload::Sfnt(font) => sfnt::kerning(font, left_glyph, right_glyph),
            _ => 0,
        };
        if mode == KerningMode::Unscaled {
            return Ok(vec26(raw, 0));
        }
        let size = self.size.ok_or(Error::InvalidSizeHandle)?;
        let mut x = mul_fix(raw, size.x_scale.0);
        if mode == KerningMode::Default {
            x = (x + 32) & !63;
        }
        Ok(vec26(x, 0))
    }

    /// The PostScript name of a glyph. Requires `GLYPH_NAMES`.
    pub fn get_glyph_name(&mut self, glyph_index: u32) -> FontResult<String> {
        if !self.info.flags.contains(FaceFlags::GLYPH_NAMES) {
            return Err(Error::InvalidArgument);
        }
        if glyph_index >= self.info.num_glyphs {
            return Err(Error::InvalidGlyphIndex);
        }
        match &mut self.payload {
            FacePayload::Sfnt(font) => sfnt::glyph_name(font, glyph_index),
            FacePayload::Type1(font) => type1::glyph_name(font, glyph_index),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// The glyph index for a PostScript glyph name, 0 when absent.
    pub fn get_name_index(&mut self, glyph_name: &str) -> u32 {
        if !self.info.flags.contains(FaceFlags::GLYPH_NAMES) {
            return 0;
        }
        match &mut self.payload {
            FacePayload::Sfnt(font) => sfnt::name_index(font, glyph_name),
            FacePayload::Type1(font) => type1::name_index(font, glyph_name),
            _ => 0,
        }
    }

    /// The PostScript font name, when the format records one.
    pub fn postscript_name(&self) -> Option<&str> {
        match &self.payload {
            FacePayload::Sfnt(font) => font.postscript_name.as_deref(),
            FacePayload::Type1(font) => Some(&font.font_name),
            FacePayload::Cid(font) => Some(&font.font_name),
            _ => None,
        }
    }
}

/// Prefers a Unicode-capable charmap, the way every toolkit expects.
fn default_charmap(charmaps: &[CharmapDesc]) -> Option<usize> {
    let preferences: [(Platform, Encoding); 4] = [
        (Platform::MICROSOFT, Encoding::MS_UNICODE_FULL),
        (Platform::MICROSOFT, Encoding::MS_UNICODE_BMP),
        (Platform::UNICODE, Encoding(3)),
        (Platform::UNICODE, Encoding(4)),
    ];
    for (platform, encoding) in preferences.iter() {
        if let Some(index) = charmaps
            .iter()
            .position(|cm| cm.platform == *platform && cm.encoding == *encoding)
        {
            return Some(index);
        }
    }
    if let Some(index) = charmaps
        .iter()
        .position(|cm| cm.platform == Platform::UNICODE)
    {
        return Some(index);
    }
    if charmaps.is_empty() {
        None
    } else {
        Some(0)
    }
}

#[cfg(test)]
mod test {
    use crate::face::LoadFlags;
    use fontloom_raster::RenderMode;

    #[test]
    fn target_bits_round_trip() {
        let flags = LoadFlags::RENDER.with_target(RenderMode::Mono);
        assert_eq!(flags.target(), RenderMode::Mono);
        assert!(flags.contains(LoadFlags::RENDER));
        assert_eq!(LoadFlags::NO_HINTING.target(), RenderMode::Normal);
    }
}
