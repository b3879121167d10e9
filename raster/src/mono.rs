// fontloom/raster/src/mono.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The monochrome scan converter.
//!
//! Classic profile-stack scan conversion: each flattened edge contributes
//! its crossings with every scanline it spans, Y-major, into one bounded
//! working pool. Per scanline, the crossings are sorted by X and paired
//! under the fill rule; a pixel is set when its center falls inside a
//! span. Features thinner than a pixel fall back to dropout control.

use crate::bitmap::Bitmap;
use crate::flatten::flatten_outline;
use fontloom_content::{Outline, OutlineFlags};
use fontloom_error::{Error, FontResult};

/// Default crossing-pool capacity. A render that overflows it reports
/// `RasterOverflow`; the caller may retry with a larger pool.
pub const DEFAULT_POOL_SIZE: usize = 8 * 1024;

// Curves bend at most 1/64 pixel away from their flattened chords.
const FLATTEN_TOLERANCE: i32 = 1;

/// One scanline crossing of one edge.
#[derive(Clone, Copy, Debug)]
struct Crossing {
    /// Scanline index (pixel row, counted up from the bitmap bottom).
    y: i32,
    /// Crossing abscissa in 26.6.
    x: i32,
    /// +1 for upward edges, -1 for downward; drives non-zero winding.
    dir: i8,
}

/// Renders `outline` into a 1-bit monochrome bitmap.
///
/// The outline must already be translated into bitmap space: pixel (0, 0)
/// spans `[0, 64)` in both axes, y growing upward from the bitmap's bottom
/// row. `pool_size` bounds the crossing pool; an empty outline succeeds
/// and writes nothing.
pub fn render_mono(outline: &Outline, bitmap: &mut Bitmap, pool_size: usize) -> FontResult<()> {
    if bitmap.pixel_mode != Some(crate::bitmap::PixelMode::Mono) {
        return Err(Error::InvalidArgument);
    }
    if outline.is_empty() {
        return Ok(());
    }
    outline.check()?;

    let mut pool: Vec<Crossing> = Vec::with_capacity(pool_size.min(DEFAULT_POOL_SIZE));
    let rows = bitmap.rows as i32;

    let mut overflowed = false;
    flatten_outline(outline, FLATTEN_TOLERANCE, |from, to| {
        if overflowed {
            return Ok(());
        }
        let (x0, y0) = (from.x.0, from.y.0);
        let (x1, y1) = (to.x.0, to.y.0);
        if y0 == y1 {
            // Horizontal edges never cross a scanline center.
            return Ok(());
        }
        let dir: i8 = if y1 > y0 { 1 } else { -1 };
        let (y_lo, y_hi) = if y0 < y1 { (y0, y1) } else { (y1, y0) };

        // Scanline centers sit at y = row * 64 + 32. The half-open rule
        // [y_lo, y_hi) keeps shared vertices from double counting.
        let mut row = (y_lo - 32 + 63) >> 6;
        if row < 0 {
            row = 0;
        }
        loop {
            let center = row * 64 + 32;
            if center >= y_hi || row >= rows {
                break;
            }
            if center >= y_lo {
                let x = cross_at(x0, y0, x1, y1, center);
                if pool.len() == pool_size {
                    overflowed = true;
                    return Ok(());
                }
                pool.push(Crossing { y: row, x, dir });
            }
            row += 1;
        }
        Ok(())
    })?;

    if overflowed {
        trace!("mono raster pool overflow at {} crossings", pool_size);
        return Err(Error::RasterOverflow);
    }

    pool.sort_unstable_by(|a, b| (a.y, a.x, a.dir).cmp(&(b.y, b.x, b.dir)));

    let even_odd = outline.flags.contains(OutlineFlags::EVEN_ODD_FILL);
    let dropouts = !outline.flags.contains(OutlineFlags::IGNORE_DROPOUTS);

    let mut i = 0;
    while i < pool.len() {
        let y = pool[i].y;
        let row_end = pool[i..]
            .iter()
            .position(|c| c.y != y)
            .map(|p| i + p)
            .unwrap_or_else(|| pool.len());
        fill_scanline(bitmap, y, &pool[i..row_end], even_odd, dropouts);
        i = row_end;
    }

    Ok(())
}

/// Interpolates the X coordinate where the edge crosses `y = center`.
#[inline]
fn cross_at(x0: i32, y0: i32, x1: i32, y1: i32, center: i32) -> i32 {
    let num = (center - y0) as i64 * (x1 - x0) as i64;
    let den = (y1 - y0) as i64;
    x0 + (num / den) as i32
}

/// Pairs one scanline's sorted crossings and sets the covered pixels.
fn fill_scanline(bitmap: &mut Bitmap, y: i32, crossings: &[Crossing], even_odd: bool, dropouts: bool) {
    let mut spans: Vec<(i32, i32)> = Vec::with_capacity(crossings.len() / 2 + 1);

    if even_odd {
        for pair in crossings.chunks(2) {
            if pair.len() == 2 {
                spans.push((pair[0].x, pair[1].x));
            }
        }
    } else {
        let mut winding = 0i32;
        let mut span_start = 0i32;
        for crossing in crossings {
            let before = winding;
            winding += crossing.dir as i32;
            if before == 0 && winding != 0 {
                span_start = crossing.x;
            } else if before != 0 && winding == 0 {
                spans.push((span_start, crossing.x));
            }
        }
    }

    for &(x_left, x_right) in &spans {
        // Pixels whose centers (x*64 + 32) lie in [x_left, x_right).
        let first = (x_left + 31) >> 6;
        let last = ((x_right + 31) >> 6) - 1;
        if first <= last {
            for x in first.max(0)..=last.min(bitmap.width as i32 - 1) {
                set_pixel(bitmap, x, y);
            }
        } else if dropouts {
            // Thinner than a pixel: light the nearest pixel to the span
            // midpoint instead of dropping the feature.
            let mid = (x_left + x_right) / 2;
            let x = mid >> 6;
            if x >= 0 && x < bitmap.width as i32 {
                set_pixel(bitmap, x, y);
            }
        }
    }
}

#[inline]
fn set_pixel(bitmap: &mut Bitmap, x: i32, y: i32) {
    debug_assert!(x >= 0 && (x as u32) < bitmap.width);
    debug_assert!(y >= 0 && (y as u32) < bitmap.rows);
    let top_row = bitmap.rows - 1 - y as u32;
    let row = bitmap.row_mut(top_row);
    row[(x >> 3) as usize] |= 0x80 >> (x & 7);
}

#[cfg(test)]
mod test {
    use crate::bitmap::Bitmap;
    use crate::gray::render_gray;
    use crate::mono::render_mono;
    use fontloom_content::{Outline, OutlineFlags, PointTags};
    use fontloom_error::Error;
    use fontloom_geometry::vector::vec26;

    fn rect_outline(x0: i32, y0: i32, x1: i32, y1: i32) -> Outline {
        let mut outline = Outline::new();
        outline.push_point(vec26(x0, y0), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(x1, y0), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(x1, y1), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(x0, y1), PointTags::ON_CURVE).unwrap();
        outline.end_contour().unwrap();
        outline
    }

    #[test]
    fn empty_outline_renders_nothing() {
        let outline = Outline::new();
        let mut bitmap = Bitmap::new_mono(8, 8).unwrap();
        render_mono(&outline, &mut bitmap, 1024).unwrap();
        assert!(bitmap.buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn aligned_rectangle_sets_exact_pixels() {
        let outline = rect_outline(64, 64, 192, 192);
        let mut bitmap = Bitmap::new_mono(4, 4).unwrap();
        render_mono(&outline, &mut bitmap, 1024).unwrap();

        for y in 0..4u32 {
            for x in 0..4u32 {
                // gray_at works on visual rows; glyph row y is visual 3-y.
                let value = bitmap.gray_at(x, 3 - y);
                let inside = (1..3).contains(&x) && (1..3).contains(&y);
                assert_eq!(value != 0, inside, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn thin_feature_survives_via_dropout_control() {
        // An 8-unit (1/8 pixel) wide vertical bar: no pixel center is
        // covered, dropout control must keep it visible.
        let outline = rect_outline(60, 0, 68, 256);
        let mut bitmap = Bitmap::new_mono(4, 4).unwrap();
        render_mono(&outline, &mut bitmap, 1024).unwrap();
        for y in 0..4u32 {
            assert_eq!(bitmap.gray_at(1, y), 255, "row {}", y);
        }
    }

    #[test]
    fn ignore_dropouts_flag_drops_thin_features() {
        let mut outline = rect_outline(60, 0, 68, 256);
        outline.flags.insert(OutlineFlags::IGNORE_DROPOUTS);
        let mut bitmap = Bitmap::new_mono(4, 4).unwrap();
        render_mono(&outline, &mut bitmap, 1024).unwrap();
        assert!(bitmap.buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn pool_overflow_is_reported() {
        let outline = rect_outline(0, 0, 256, 256);
        let mut bitmap = Bitmap::new_mono(4, 4).unwrap();
        assert_eq!(
            render_mono(&outline, &mut bitmap, 2),
            Err(Error::RasterOverflow)
        );
    }

    #[test]
    fn mono_covers_gray_threshold() {
        // Mono pixels are a superset of the gray >= 128 pixels for a
        // well-behaved closed shape.
        let outline = rect_outline(32, 32, 230, 230);

        let mut mono = Bitmap::new_mono(4, 4).unwrap();
        render_mono(&outline, &mut mono, 1024).unwrap();
        let mut gray = Bitmap::new_gray(4, 4).unwrap();
        render_gray(&outline, &mut gray).unwrap();

        for y in 0..4u32 {
            for x in 0..4u32 {
                if gray.gray_at(x, y) >= 128 {
                    assert_ne!(mono.gray_at(x, y), 0, "pixel ({}, {})", x, y);
                }
            }
        }
    }
}
