// fontloom/raster/src/gray.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The anti-aliased scan converter.
//!
//! An exact-area accumulator: every edge walks the pixel cells it crosses,
//! adding its coverage delta (`cover`) and twice the signed area it sweeps
//! inside the cell (`area`). A final per-row sweep turns the accumulated
//! cells into 256-level spans in linear time. Coordinates are upscaled
//! from 26.6 to 24.8 so a pixel spans `1 << PIXEL_BITS` subpixel units.

use crate::bitmap::Bitmap;
use crate::flatten::flatten_outline;
use fontloom_content::{Outline, OutlineFlags};
use fontloom_error::{Error, FontResult};
use fontloom_geometry::vector::Vector;

const PIXEL_BITS: i32 = 8;
const ONE_PIXEL: i32 = 1 << PIXEL_BITS;
const PIXEL_MASK: i32 = ONE_PIXEL - 1;

// Flattening tolerance: a quarter pixel, in 26.6 units.
const FLATTEN_TOLERANCE: i32 = 16;

// Subdivision threshold for very long edges, matching the classic cell
// walkers: beyond this the fixed-point slope math could overflow.
const DX_LIMIT: i64 = (16384 << PIXEL_BITS) as i64;

/// One pixel cell's accumulated state.
#[derive(Clone, Copy, Debug)]
struct Cell {
    ex: i32,
    ey: i32,
    cover: i32,
    area: i32,
}

/// Renders `outline` into an 8-bit gray bitmap with 256 levels.
///
/// The outline must already be translated into bitmap space: pixel (0, 0)
/// spans `[0, 64)` in both axes, with y growing upward from the bitmap's
/// bottom row. An empty outline succeeds and writes nothing.
pub fn render_gray(outline: &Outline, bitmap: &mut Bitmap) -> FontResult<()> {
    if bitmap.pixel_mode != Some(crate::bitmap::PixelMode::Gray) {
        return Err(Error::InvalidArgument);
    }
    if outline.is_empty() {
        return Ok(());
    }
    outline.check()?;

    let mut walker = CellWalker::new();
    flatten_outline(outline, FLATTEN_TOLERANCE, |from, to| {
        walker.line(upscale(from), upscale(to));
        Ok(())
    })?;
    walker.flush();

    let even_odd = outline.flags.contains(OutlineFlags::EVEN_ODD_FILL);
    walker.sweep(bitmap, even_odd);
    Ok(())
}

/// 26.6 to 24.8.
#[inline]
fn upscale(v: Vector) -> (i32, i32) {
    (v.x.0 << (PIXEL_BITS - 6), v.y.0 << (PIXEL_BITS - 6))
}

struct CellWalker {
    cells: Vec<Cell>,
    cur: Cell,
    has_cur: bool,
}

impl CellWalker {
    fn new() -> CellWalker {
        CellWalker {
            cells: Vec::new(),
            cur: Cell {
                ex: i32::max_value(),
                ey: i32::max_value(),
                cover: 0,
                area: 0,
            },
            has_cur: false,
        }
    }

    /// Flushes the working cell into the pool if it carries anything.
    fn flush(&mut self) {
        if self.has_cur && (self.cur.area | self.cur.cover) != 0 {
            self.cells.push(self.cur);
        }
        self.has_cur = false;
        self.cur.ex = i32::max_value();
        self.cur.ey = i32::max_value();
        self.cur.cover = 0;
        self.cur.area = 0;
    }

    /// Moves the working cell, flushing the previous one when leaving it.
    fn set_cell(&mut self, ex: i32, ey: i32) {
        if self.cur.ex != ex || self.cur.ey != ey {
            if self.has_cur && (self.cur.area | self.cur.cover) != 0 {
                self.cells.push(self.cur);
            }
            self.cur = Cell {
                ex,
                ey,
                cover: 0,
                area: 0,
            };
        }
        self.has_cur = true;
    }

    /// Accumulates the part of an edge that stays on scanline row `ey`.
    /// `x1`, `x2` are 24.8; `y1`, `y2` are subpixel offsets within the row.
    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> PIXEL_BITS;
        let ex2 = x2 >> PIXEL_BITS;
        let fx1 = x1 & PIXEL_MASK;
        let fx2 = x2 & PIXEL_MASK;

        // Horizontal sub-edges sweep no area.
        if y1 == y2 {
            self.set_cell(ex2, ey);
            return;
        }

        if ex1 == ex2 {
            let delta = y2 - y1;
            self.cur.cover += delta;
            self.cur.area += (fx1 + fx2) * delta;
            return;
        }

        let (mut p, mut first, incr);
        let mut dx = x2 as i64 - x1 as i64;
        if dx >= 0 {
            p = (ONE_PIXEL - fx1) as i64 * (y2 - y1) as i64;
            first = ONE_PIXEL;
            incr = 1;
        } else {
            p = fx1 as i64 * (y2 - y1) as i64;
            first = 0;
            incr = -1;
            dx = -dx;
        }

        let mut delta = (p / dx) as i32;
        let mut modulo = (p % dx) as i64;
        if modulo < 0 {
            delta -= 1;
            modulo += dx;
        }

        self.cur.cover += delta;
        self.cur.area += (fx1 + first) * delta;

        let mut ex = ex1 + incr;
        self.set_cell(ex, ey);
        let mut y = y1 + delta;

        if ex != ex2 {
            p = ONE_PIXEL as i64 * (y2 - y + delta) as i64;
            let mut lift = (p / dx) as i32;
            let mut rem = (p % dx) as i64;
            if rem < 0 {
                lift -= 1;
                rem += dx;
            }
            modulo -= dx;

            while ex != ex2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dx;
                    delta += 1;
                }

                self.cur.cover += delta;
                self.cur.area += ONE_PIXEL * delta;
                y += delta;
                ex += incr;
                self.set_cell(ex, ey);
            }
        }

        delta = y2 - y;
        self.cur.cover += delta;
        self.cur.area += (fx2 + ONE_PIXEL - first) * delta;
    }

    /// Accumulates one edge in 24.8 coordinates.
    fn line(&mut self, from: (i32, i32), to: (i32, i32)) {
        let (x1, y1) = from;
        let (x2, y2) = to;

        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line((x1, y1), (cx, cy));
            self.line((cx, cy), (x2, y2));
            return;
        }

        let ey1 = y1 >> PIXEL_BITS;
        let ey2 = y2 >> PIXEL_BITS;
        let fy1 = y1 & PIXEL_MASK;
        let fy2 = y2 & PIXEL_MASK;

        self.set_cell(x1 >> PIXEL_BITS, ey1);

        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        // Vertical edges take the fast path: every crossed row gets the
        // same single-cell contribution.
        let dy = y2 as i64 - y1 as i64;
        let mut incr = 1;
        if dx == 0 {
            let ex = x1 >> PIXEL_BITS;
            let two_fx = (x1 & PIXEL_MASK) << 1;

            let mut first = ONE_PIXEL;
            if dy < 0 {
                first = 0;
                incr = -1;
            }

            let mut ey = ey1;
            let mut delta = first - fy1;
            self.cur.cover += delta;
            self.cur.area += two_fx * delta;
            ey += incr;
            self.set_cell(ex, ey);

            delta = first + first - ONE_PIXEL;
            let area = two_fx * delta;
            while ey != ey2 {
                self.cur.cover += delta;
                self.cur.area += area;
                ey += incr;
                self.set_cell(ex, ey);
            }

            delta = fy2 - ONE_PIXEL + first;
            self.cur.cover += delta;
            self.cur.area += two_fx * delta;
            return;
        }

        // The general case splits the edge at every row boundary.
        let (mut p, mut first);
        let mut dy_abs = dy;
        if dy >= 0 {
            p = (ONE_PIXEL - fy1) as i64 * dx;
            first = ONE_PIXEL;
        } else {
            p = fy1 as i64 * dx;
            first = 0;
            incr = -1;
            dy_abs = -dy;
        }

        let mut delta = (p / dy_abs) as i32;
        let mut modulo = p % dy_abs;
        if modulo < 0 {
            delta -= 1;
            modulo += dy_abs;
        }

        let mut x = x1 + delta;
        let mut ey = ey1;
        self.render_hline(ey, x1, fy1, x, first);

        ey += incr;
        self.set_cell(x >> PIXEL_BITS, ey);

        if ey != ey2 {
            p = ONE_PIXEL as i64 * dx;
            let mut lift = (p / dy_abs) as i32;
            let mut rem = p % dy_abs;
            if rem < 0 {
                lift -= 1;
                rem += dy_abs;
            }
            modulo -= dy_abs;

            while ey != ey2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dy_abs;
                    delta += 1;
                }

                let x_next = x + delta;
                self.render_hline(ey, x, ONE_PIXEL - first, x_next, first);
                x = x_next;

                ey += incr;
                self.set_cell(x >> PIXEL_BITS, ey);
            }
        }

        self.render_hline(ey, x, ONE_PIXEL - first, x2, fy2);
    }

    /// Sweeps the accumulated cells into bitmap spans.
    fn sweep(&mut self, bitmap: &mut Bitmap, even_odd: bool) {
        if self.cells.is_empty() {
            return;
        }
        self.cells
            .sort_unstable_by(|a, b| (a.ey, a.ex).cmp(&(b.ey, b.ex)));

        let width = bitmap.width as i32;
        let rows = bitmap.rows as i32;

        let mut i = 0;
        while i < self.cells.len() {
            let ey = self.cells[i].ey;
            let row_end = self.cells[i..]
                .iter()
                .position(|c| c.ey != ey)
                .map(|p| i + p)
                .unwrap_or_else(|| self.cells.len());

            if ey >= 0 && ey < rows {
                let mut cover = 0i32;
                let mut j = i;
                while j < row_end {
                    let x = self.cells[j].ex;
                    let mut area = self.cells[j].area;
                    cover += self.cells[j].cover;
                    j += 1;
                    while j < row_end && self.cells[j].ex == x {
                        area += self.cells[j].area;
                        cover += self.cells[j].cover;
                        j += 1;
                    }

                    // The partial cell at x, then the solid run to the
                    // next cell.
                    if area != 0 && x >= 0 && x < width {
                        let alpha = compute_alpha((cover << (PIXEL_BITS + 1)) - area, even_odd);
                        if alpha != 0 {
                            write_span(bitmap, ey, x, x + 1, alpha);
                        }
                    }
                    let run_start = x + 1;
                    if j < row_end {
                        let next_x = self.cells[j].ex;
                        if next_x > run_start {
                            let alpha = compute_alpha(cover << (PIXEL_BITS + 1), even_odd);
                            if alpha != 0 {
                                write_span(
                                    bitmap,
                                    ey,
                                    run_start.max(0),
                                    next_x.min(width),
                                    alpha,
                                );
                            }
                        }
                    }
                }
            }
            i = row_end;
        }
    }
}

/// Converts a doubled signed area into an 8-bit coverage value.
#[inline]
fn compute_alpha(area: i32, even_odd: bool) -> u8 {
    // area is in 2 * PIXEL_BITS + 1 fractional bits; reduce to 8.
    let mut coverage = area >> (PIXEL_BITS * 2 + 1 - 8);
    if coverage < 0 {
        coverage = -coverage;
    }
    if even_odd {
        coverage &= 511;
        if coverage > 256 {
            coverage = 512 - coverage;
        }
    }
    if coverage > 255 {
        coverage = 255;
    }
    coverage as u8
}

/// Writes a constant-alpha span. `y` counts up from the bitmap's bottom.
fn write_span(bitmap: &mut Bitmap, y: i32, x_start: i32, x_end: i32, alpha: u8) {
    if x_start >= x_end {
        return;
    }
    let top_row = bitmap.rows as i32 - 1 - y;
    debug_assert!(top_row >= 0);
    let row = bitmap.row_mut(top_row as u32);
    for value in &mut row[x_start as usize..x_end as usize] {
        // Saturate on self-overlapping outlines.
        *value = (*value).max(alpha);
    }
}

#[cfg(test)]
mod test {
    use crate::bitmap::Bitmap;
    use crate::gray::render_gray;
    use fontloom_content::{Outline, OutlineFlags, PointTags};
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
        let mut bitmap = Bitmap::new_gray(4, 4).unwrap();
        render_gray(&outline, &mut bitmap).unwrap();
        assert!(bitmap.buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn aligned_rectangle_is_fully_opaque() {
        // A 2x2 pixel rectangle aligned to the grid.
        let outline = rect_outline(64, 64, 192, 192);
        let mut bitmap = Bitmap::new_gray(4, 4).unwrap();
        render_gray(&outline, &mut bitmap).unwrap();

        for y in 0..4u32 {
            for x in 0..4u32 {
                let inside = (1..3).contains(&x) && (1..3).contains(&y);
                let value = bitmap.gray_at(x, y);
                if inside {
                    assert_eq!(value, 255, "pixel ({}, {})", x, y);
                } else {
                    assert_eq!(value, 0, "pixel ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn half_covered_pixels_are_half_gray() {
        // A rectangle covering the left half of a single pixel column.
        let outline = rect_outline(0, 0, 32, 64);
        let mut bitmap = Bitmap::new_gray(1, 1).unwrap();
        render_gray(&outline, &mut bitmap).unwrap();
        let value = bitmap.gray_at(0, 0);
        assert!(
            (126..=129).contains(&value),
            "expected ~50% coverage, got {}",
            value
        );
    }

    #[test]
    fn even_odd_cancels_overlap() {
        // Two nested same-direction squares: non-zero fills everything,
        // even-odd leaves the inner square empty.
        let mut outline = rect_outline(0, 0, 256, 256);
        let inner = rect_outline(64, 64, 192, 192);
        for (i, &p) in inner.points().iter().enumerate() {
            outline.push_point(p, inner.tags()[i]).unwrap();
        }
        outline.end_contour().unwrap();
        outline.flags.insert(OutlineFlags::EVEN_ODD_FILL);

        let mut bitmap = Bitmap::new_gray(4, 4).unwrap();
        render_gray(&outline, &mut bitmap).unwrap();
        assert_eq!(bitmap.gray_at(0, 0), 255);
        assert_eq!(bitmap.gray_at(2, 2), 0);
        assert_eq!(bitmap.gray_at(2, 0), 255);
    }

    #[test]
    fn triangle_edge_is_antialiased() {
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline
            .push_point(vec26(256, 0), PointTags::ON_CURVE)
            .unwrap();
        outline
            .push_point(vec26(0, 256), PointTags::ON_CURVE)
            .unwrap();
        outline.end_contour().unwrap();

        let mut bitmap = Bitmap::new_gray(4, 4).unwrap();
        render_gray(&outline, &mut bitmap).unwrap();

        // The hypotenuse bisects glyph pixel (2, 1), so it lands at half
        // coverage; glyph row 1 is bitmap row 2.
        let value = bitmap.gray_at(2, 2);
        assert!(
            (100..=160).contains(&value),
            "diagonal pixel should be partially covered, got {}",
            value
        );
        // Deep inside is opaque, outside is empty.
        assert_eq!(bitmap.gray_at(0, 3), 255);
        assert_eq!(bitmap.gray_at(3, 0), 0);
    }
}
