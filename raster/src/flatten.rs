// fontloom/raster/src/flatten.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Adaptive flattening of outline curves into line segments.
//!
//! Both scan converters consume outlines as closed polylines. Curves are
//! split at their midpoints until the control points sit within the given
//! tolerance of the chord, which bounds the deviation of the replaced arc
//! by that tolerance.

use arrayvec::ArrayVec;
use fontloom_content::{Outline, OutlineSink};
use fontloom_error::FontResult;
use fontloom_geometry::vector::Vector;

const MAX_SPLIT_DEPTH: usize = 16;

/// Decomposes `outline`, flattening every curve with `tolerance` (in the
/// outline's own 26.6 units), and feeds each resulting closed-polyline
/// segment to `emit` as a `(from, to)` pair.
pub fn flatten_outline<F>(outline: &Outline, tolerance: i32, emit: F) -> FontResult<()>
where
    F: FnMut(Vector, Vector) -> FontResult<()>,
{
    let mut sink = Flattener {
        tolerance: tolerance.max(1),
        current: Vector::ZERO,
        emit,
    };
    outline.decompose(&mut sink)
}

struct Flattener<F> {
    tolerance: i32,
    current: Vector,
    emit: F,
}

impl<F> Flattener<F>
where
    F: FnMut(Vector, Vector) -> FontResult<()>,
{
    fn emit_line(&mut self, to: Vector) -> FontResult<()> {
        if to != self.current {
            (self.emit)(self.current, to)?;
        }
        self.current = to;
        Ok(())
    }

    #[inline]
    fn conic_is_flat(&self, from: Vector, control: Vector, to: Vector) -> bool {
        let hull = from.midpoint(to);
        (control.x.0 - hull.x.0).abs() <= self.tolerance
            && (control.y.0 - hull.y.0).abs() <= self.tolerance
    }

    #[inline]
    fn cubic_is_flat(&self, from: Vector, c0: Vector, c1: Vector, to: Vector) -> bool {
        // Test each control against its third-point along the chord; this
        // is conservative within a small constant factor.
        let dx = (to.x.0 - from.x.0) as i64;
        let dy = (to.y.0 - from.y.0) as i64;
        let near = |control: Vector, t_num: i64| -> bool {
            let px = from.x.0 as i64 + dx * t_num / 3;
            let py = from.y.0 as i64 + dy * t_num / 3;
            (control.x.0 as i64 - px).abs() <= self.tolerance as i64
                && (control.y.0 as i64 - py).abs() <= self.tolerance as i64
        };
        near(c0, 1) && near(c1, 2)
    }
}

impl<F> OutlineSink for Flattener<F>
where
    F: FnMut(Vector, Vector) -> FontResult<()>,
{
    fn move_to(&mut self, to: Vector) -> FontResult<()> {
        self.current = to;
        Ok(())
    }

    fn line_to(&mut self, to: Vector) -> FontResult<()> {
        self.emit_line(to)
    }

    fn conic_to(&mut self, control: Vector, to: Vector) -> FontResult<()> {
        let mut stack: ArrayVec<[(Vector, Vector, Vector); MAX_SPLIT_DEPTH + 1]> = ArrayVec::new();
        stack.push((self.current, control, to));
        while let Some((p0, c, p1)) = stack.pop() {
            if stack.len() >= MAX_SPLIT_DEPTH || self.conic_is_flat(p0, c, p1) {
                self.emit_line(p1)?;
                continue;
            }
            let ac = p0.midpoint(c);
            let cb = c.midpoint(p1);
            let mid = ac.midpoint(cb);
            stack.push((mid, cb, p1));
            stack.push((p0, ac, mid));
        }
        Ok(())
    }

    fn cubic_to(&mut self, control0: Vector, control1: Vector, to: Vector) -> FontResult<()> {
        let mut stack: ArrayVec<[(Vector, Vector, Vector, Vector); 2 * MAX_SPLIT_DEPTH + 2]> =
            ArrayVec::new();
        stack.push((self.current, control0, control1, to));
        while let Some((p0, c0, c1, p1)) = stack.pop() {
            if stack.len() >= 2 * MAX_SPLIT_DEPTH || self.cubic_is_flat(p0, c0, c1, p1) {
                self.emit_line(p1)?;
                continue;
            }
            let ab = p0.midpoint(c0);
            let bc = c0.midpoint(c1);
            let cd = c1.midpoint(p1);
            let abbc = ab.midpoint(bc);
            let bccd = bc.midpoint(cd);
            let mid = abbc.midpoint(bccd);
            stack.push((mid, bccd, cd, p1));
            stack.push((p0, ab, abbc, mid));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::flatten::flatten_outline;
    use fontloom_content::{Outline, PointTags};
    use fontloom_geometry::vector::vec26;

    #[test]
    fn polygon_passes_through_unchanged() {
        let mut outline = Outline::new();
        for &(x, y) in &[(0, 0), (640, 0), (640, 640)] {
            outline.push_point(vec26(x, y), PointTags::ON_CURVE).unwrap();
        }
        outline.end_contour().unwrap();

        let mut segments = vec![];
        flatten_outline(&outline, 1, |from, to| {
            segments.push((from, to));
            Ok(())
        })
        .unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], (vec26(0, 0), vec26(640, 0)));
        assert_eq!(segments[2].1, vec26(0, 0));
    }

    #[test]
    fn conic_stays_within_tolerance() {
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline
            .push_point(vec26(320, 640), PointTags::empty())
            .unwrap();
        outline
            .push_point(vec26(640, 0), PointTags::ON_CURVE)
            .unwrap();
        outline.end_contour().unwrap();

        let mut chain_closes = false;
        let mut count = 0;
        let mut last = vec26(0, 0);
        flatten_outline(&outline, 1, |from, to| {
            assert_eq!(from, last);
            last = to;
            count += 1;
            if to == vec26(0, 0) {
                chain_closes = true;
            }
            Ok(())
        })
        .unwrap();
        assert!(count > 8, "curve should split repeatedly, got {}", count);
        assert!(chain_closes);
    }

    #[test]
    fn empty_outline_emits_nothing() {
        let outline = Outline::new();
        let mut count = 0;
        flatten_outline(&outline, 1, |_, _| {
            count += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 0);
    }
}
