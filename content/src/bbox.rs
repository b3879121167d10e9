// fontloom/content/src/bbox.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The exact outline bounding box.
//!
//! Unlike the control box, off-curve points only contribute where the
//! curve actually reaches: conic extrema are solved in closed form, cubic
//! arcs are subdivided until their control boxes stop mattering. All
//! arithmetic is 64-bit fixed point; results err outward by at most one
//! 26.6 unit.

use crate::decompose::OutlineSink;
use crate::outline::Outline;
use arrayvec::ArrayVec;
use fontloom_error::FontResult;
use fontloom_geometry::fixed::F26Dot6;
use fontloom_geometry::vector::{vec26, Vector};
use fontloom_geometry::BBox;

const MAX_CUBIC_DEPTH: u8 = 12;

/// Computes the exact bounding box of `outline`.
pub fn outline_bbox(outline: &Outline) -> FontResult<BBox> {
    if outline.is_empty() {
        return Ok(BBox::zero());
    }
    let mut sink = BBoxSink {
        bbox: BBox::EMPTY,
        current: Vector::ZERO,
    };
    outline.decompose(&mut sink)?;
    Ok(sink.bbox)
}

struct BBoxSink {
    bbox: BBox,
    current: Vector,
}

impl OutlineSink for BBoxSink {
    fn move_to(&mut self, to: Vector) -> FontResult<()> {
        self.bbox.include(to);
        self.current = to;
        Ok(())
    }

    fn line_to(&mut self, to: Vector) -> FontResult<()> {
        self.bbox.include(to);
        self.current = to;
        Ok(())
    }

    fn conic_to(&mut self, control: Vector, to: Vector) -> FontResult<()> {
        self.bbox.include(to);
        let from = self.current;
        if let Some(x) = conic_axis_extremum(from.x.0, control.x.0, to.x.0) {
            self.bbox.x_min = self.bbox.x_min.min(F26Dot6(x));
            self.bbox.x_max = self.bbox.x_max.max(F26Dot6(x));
        }
        if let Some(y) = conic_axis_extremum(from.y.0, control.y.0, to.y.0) {
            self.bbox.y_min = self.bbox.y_min.min(F26Dot6(y));
            self.bbox.y_max = self.bbox.y_max.max(F26Dot6(y));
        }
        self.current = to;
        Ok(())
    }

    fn cubic_to(&mut self, control0: Vector, control1: Vector, to: Vector) -> FontResult<()> {
        self.bbox.include(to);
        let from = self.current;
        let needs_x = outside(control0.x.0, from.x.0, to.x.0)
            || outside(control1.x.0, from.x.0, to.x.0);
        let needs_y = outside(control0.y.0, from.y.0, to.y.0)
            || outside(control1.y.0, from.y.0, to.y.0);
        if needs_x || needs_y {
            subdivide_cubic(&mut self.bbox, from, control0, control1, to);
        }
        self.current = to;
        Ok(())
    }
}

#[inline]
fn outside(candidate: i32, a: i32, b: i32) -> bool {
    candidate < a.min(b) || candidate > a.max(b)
}

/// Division rounding away from zero, used to err outward.
#[inline]
fn ceil_div(num: i64, den: i64) -> i64 {
    debug_assert!(num >= 0 && den > 0);
    (num + den - 1) / den
}

/// Solves the single extremum of a conic axis, returning it when the
/// control point overshoots the endpoint interval.
fn conic_axis_extremum(p0: i32, c: i32, p1: i32) -> Option<i32> {
    if !outside(c, p0, p1) {
        return None;
    }
    // B(t) = (1-t)^2 p0 + 2t(1-t) c + t^2 p1 peaks at
    // t* = (p0-c)/(p0-2c+p1); B(t*) = p0 - (c-p0)^2/(p0-2c+p1).
    let num = (c as i64 - p0 as i64) * (c as i64 - p0 as i64);
    if c > p0.max(p1) {
        let den = 2 * c as i64 - p0 as i64 - p1 as i64;
        Some((p0 as i64 + ceil_div(num, den)) as i32)
    } else {
        let den = p0 as i64 + p1 as i64 - 2 * c as i64;
        Some((p0 as i64 - ceil_div(num, den)) as i32)
    }
}

/// 2^16-scaled coordinates so repeated halving keeps sub-unit precision.
#[derive(Clone, Copy)]
struct WideCubic {
    p0: (i64, i64),
    c0: (i64, i64),
    c1: (i64, i64),
    p1: (i64, i64),
}

impl WideCubic {
    fn hull_min_x(&self) -> i64 {
        self.p0.0.min(self.c0.0).min(self.c1.0).min(self.p1.0)
    }
    fn hull_max_x(&self) -> i64 {
        self.p0.0.max(self.c0.0).max(self.c1.0).max(self.p1.0)
    }
    fn hull_min_y(&self) -> i64 {
        self.p0.1.min(self.c0.1).min(self.c1.1).min(self.p1.1)
    }
    fn hull_max_y(&self) -> i64 {
        self.p0.1.max(self.c0.1).max(self.c1.1).max(self.p1.1)
    }

    fn split(&self) -> (WideCubic, WideCubic) {
        let mid =
            |a: (i64, i64), b: (i64, i64)| -> (i64, i64) { ((a.0 + b.0) / 2, (a.1 + b.1) / 2) };
        let ab = mid(self.p0, self.c0);
        let bc = mid(self.c0, self.c1);
        let cd = mid(self.c1, self.p1);
        let abbc = mid(ab, bc);
        let bccd = mid(bc, cd);
        let center = mid(abbc, bccd);
        (
            WideCubic {
                p0: self.p0,
                c0: ab,
                c1: abbc,
                p1: center,
            },
            WideCubic {
                p0: center,
                c0: bccd,
                c1: cd,
                p1: self.p1,
            },
        )
    }
}

fn subdivide_cubic(bbox: &mut BBox, p0: Vector, c0: Vector, c1: Vector, p1: Vector) {
    let widen = |v: Vector| -> (i64, i64) { ((v.x.0 as i64) << 16, (v.y.0 as i64) << 16) };
    let root = WideCubic {
        p0: widen(p0),
        c0: widen(c0),
        c1: widen(c1),
        p1: widen(p1),
    };

    let mut stack: ArrayVec<[(WideCubic, u8); 64]> = ArrayVec::new();
    stack.push((root, 0));

    while let Some((segment, depth)) = stack.pop() {
        // Round the hull outward back to 26.6.
        let hull_x_min = (segment.hull_min_x() >> 16) as i32;
        let hull_x_max = ((segment.hull_max_x() + 0xFFFF) >> 16) as i32;
        let hull_y_min = (segment.hull_min_y() >> 16) as i32;
        let hull_y_max = ((segment.hull_max_y() + 0xFFFF) >> 16) as i32;

        // Nothing new to learn from this arc.
        if hull_x_min >= bbox.x_min.0
            && hull_x_max <= bbox.x_max.0
            && hull_y_min >= bbox.y_min.0
            && hull_y_max <= bbox.y_max.0
        {
            continue;
        }

        if depth >= MAX_CUBIC_DEPTH {
            // The control box now over-reports by well under one unit.
            bbox.include(vec26(hull_x_min, hull_y_min));
            bbox.include(vec26(hull_x_max, hull_y_max));
            continue;
        }

        let (left, right) = segment.split();
        stack.push((left, depth + 1));
        stack.push((right, depth + 1));
    }
}

#[cfg(test)]
mod test {
    use crate::bbox::outline_bbox;
    use crate::outline::{Outline, PointTags};
    use fontloom_geometry::vector::vec26;

    #[test]
    fn lines_use_endpoints_only() {
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline
            .push_point(vec26(100, 200), PointTags::ON_CURVE)
            .unwrap();
        outline
            .push_point(vec26(-50, 100), PointTags::ON_CURVE)
            .unwrap();
        outline.end_contour().unwrap();
        let bbox = outline_bbox(&outline).unwrap();
        assert_eq!(bbox.x_min.0, -50);
        assert_eq!(bbox.x_max.0, 100);
        assert_eq!(bbox.y_min.0, 0);
        assert_eq!(bbox.y_max.0, 200);
    }

    #[test]
    fn conic_overshoot_is_tighter_than_cbox() {
        // Quadratic from (0,0) to (128,0) with control (64,128): the peak
        // is at y = 64, half the control height.
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline
            .push_point(vec26(64, 128), PointTags::empty())
            .unwrap();
        outline
            .push_point(vec26(128, 0), PointTags::ON_CURVE)
            .unwrap();
        outline.end_contour().unwrap();

        let cbox = outline.get_cbox();
        let bbox = outline_bbox(&outline).unwrap();
        assert_eq!(cbox.y_max.0, 128);
        assert!(bbox.y_max.0 >= 64 && bbox.y_max.0 <= 65);
    }

    #[test]
    fn cubic_overshoot_is_solved_by_subdivision() {
        // Cubic from (0,0) to (192,0) with controls well above: the peak is
        // 3/4 of the symmetric control height.
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(64, 128), PointTags::CUBIC).unwrap();
        outline
            .push_point(vec26(128, 128), PointTags::CUBIC)
            .unwrap();
        outline
            .push_point(vec26(192, 0), PointTags::ON_CURVE)
            .unwrap();
        outline.end_contour().unwrap();

        let bbox = outline_bbox(&outline).unwrap();
        assert!(bbox.y_max.0 >= 96 && bbox.y_max.0 <= 97);
    }

    #[test]
    fn empty_outline_has_zero_bbox() {
        let outline = Outline::new();
        let bbox = outline_bbox(&outline).unwrap();
        assert_eq!(bbox.x_min.0, 0);
        assert_eq!(bbox.x_max.0, 0);
    }
}
