// fontloom/content/src/outline.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The tagged in-memory representation of a glyph outline.

use crate::bbox as exact_bbox;
use fontloom_error::{Error, FontResult};
use fontloom_geometry::fixed::F26Dot6;
use fontloom_geometry::transform::{Matrix, Transform};
use fontloom_geometry::trig::{self, ANGLE_PI2};
use fontloom_geometry::vector::{vec26, Vector};
use fontloom_geometry::BBox;
use std::fmt::{self, Debug, Formatter};

bitflags! {
    /// Per-point tags. Bit 0 distinguishes on-curve from off-curve points;
    /// bit 1 marks a cubic (third-order) control point, clear means conic
    /// (second-order); bits 2..7 are reserved for the hinter.
    #[derive(Default)]
    pub struct PointTags: u8 {
        const ON_CURVE = 0x01;
        const CUBIC = 0x02;
        const HINTER_MASK = 0xFC;
    }
}

impl PointTags {
    #[inline]
    pub fn is_on_curve(self) -> bool {
        self.contains(PointTags::ON_CURVE)
    }

    #[inline]
    pub fn is_conic_control(self) -> bool {
        !self.contains(PointTags::ON_CURVE) && !self.contains(PointTags::CUBIC)
    }

    #[inline]
    pub fn is_cubic_control(self) -> bool {
        !self.contains(PointTags::ON_CURVE) && self.contains(PointTags::CUBIC)
    }
}

bitflags! {
    /// Properties of an outline as a whole.
    #[derive(Default)]
    pub struct OutlineFlags: u32 {
        /// The outline owns its point arrays.
        const OWNER = 0x0001;
        /// Fill with the even-odd rule instead of non-zero winding.
        const EVEN_ODD_FILL = 0x0002;
        /// The fill is on the clockwise side of the contours.
        const REVERSE_FILL = 0x0004;
        /// Do not apply dropout control when scan converting.
        const IGNORE_DROPOUTS = 0x0008;
        /// Request the high-precision rasterizer path.
        const HIGH_PRECISION = 0x0100;
        /// Request single-pass rendering.
        const SINGLE_PASS = 0x0200;
    }
}

/// A glyph outline: contours of tagged points.
///
/// Contours are stored as an ordered point array plus, per contour, the
/// index of its last point. Contours close implicitly onto their first
/// point. The empty outline is valid and renders to nothing.
#[derive(Clone, Default)]
pub struct Outline {
    pub(crate) points: Vec<Vector>,
    pub(crate) tags: Vec<PointTags>,
    pub(crate) contours: Vec<u16>,
    pub flags: OutlineFlags,
}

impl Outline {
    /// Creates a new empty outline.
    #[inline]
    pub fn new() -> Outline {
        Outline {
            points: vec![],
            tags: vec![],
            contours: vec![],
            flags: OutlineFlags::OWNER,
        }
    }

    /// Returns a new outline with storage preallocated.
    pub fn with_capacity(n_points: usize, n_contours: usize) -> Outline {
        Outline {
            points: Vec::with_capacity(n_points),
            tags: Vec::with_capacity(n_points),
            contours: Vec::with_capacity(n_contours),
            flags: OutlineFlags::OWNER,
        }
    }

    #[inline]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn n_contours(&self) -> usize {
        self.contours.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.contours.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[Vector] {
        &self.points
    }

    #[inline]
    pub fn points_mut(&mut self) -> &mut [Vector] {
        &mut self.points
    }

    #[inline]
    pub fn tags(&self) -> &[PointTags] {
        &self.tags
    }

    #[inline]
    pub fn contours(&self) -> &[u16] {
        &self.contours
    }

    /// The half-open point range of contour `i`.
    pub(crate) fn contour_range(&self, i: usize) -> (usize, usize) {
        let first = if i == 0 {
            0
        } else {
            self.contours[i - 1] as usize + 1
        };
        (first, self.contours[i] as usize + 1)
    }

    /// Appends a point to the outline without touching the contour array.
    /// The caller finishes the contour with `end_contour`.
    pub fn push_point(&mut self, point: Vector, tags: PointTags) -> FontResult<()> {
        if self.points.len() >= u16::max_value() as usize {
            return Err(Error::TooManyPoints);
        }
        self.points.push(point);
        self.tags.push(tags);
        Ok(())
    }

    /// Closes the contour under construction at the current last point.
    pub fn end_contour(&mut self) -> FontResult<()> {
        if self.points.is_empty() {
            return Err(Error::InvalidOutline);
        }
        if self.contours.len() >= u16::max_value() as usize {
            return Err(Error::TooManyContours);
        }
        let last = (self.points.len() - 1) as u16;
        if let Some(&previous) = self.contours.last() {
            if previous >= last {
                return Err(Error::InvalidOutline);
            }
        }
        self.contours.push(last);
        Ok(())
    }

    /// Removes all points and contours, keeping the allocations.
    pub fn clear(&mut self) {
        self.points.clear();
        self.tags.clear();
        self.contours.clear();
    }

    /// Copies `src` into `self`, reusing existing capacity.
    pub fn copy_from(&mut self, src: &Outline) {
        self.points.clear();
        self.points.extend_from_slice(&src.points);
        self.tags.clear();
        self.tags.extend_from_slice(&src.tags);
        self.contours.clear();
        self.contours.extend_from_slice(&src.contours);
        self.flags = src.flags;
    }

    /// Validates the structural invariants: strictly increasing contour
    /// ends terminating at the last point, points and contours empty or
    /// non-empty together, and no conic control followed by a cubic one.
    pub fn check(&self) -> FontResult<()> {
        if self.points.len() != self.tags.len() {
            return Err(Error::InvalidOutline);
        }
        if self.points.is_empty() != self.contours.is_empty() {
            return Err(Error::InvalidOutline);
        }
        if self.is_empty() {
            return Ok(());
        }
        let mut previous_end: Option<u16> = None;
        for &end in &self.contours {
            if let Some(previous) = previous_end {
                if end <= previous {
                    return Err(Error::InvalidOutline);
                }
            }
            previous_end = Some(end);
        }
        if previous_end != Some((self.points.len() - 1) as u16) {
            debug!(
                "outline check: contour ends do not cover {} points",
                self.points.len()
            );
            return Err(Error::InvalidOutline);
        }
        for window in self.tags.windows(2) {
            if window[0].is_conic_control() && window[1].is_cubic_control() {
                debug!("outline check: conic control followed by cubic control");
                return Err(Error::InvalidOutline);
            }
        }
        Ok(())
    }

    /// Translates every point by `delta`.
    pub fn translate(&mut self, delta: Vector) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    /// Applies a 2x2 matrix to every point.
    pub fn transform(&mut self, matrix: &Matrix) {
        for point in &mut self.points {
            *point = matrix.transform_vector(*point);
        }
    }

    /// Applies a full affine transform (matrix, then delta).
    pub fn apply(&mut self, transform: &Transform) {
        for point in &mut self.points {
            *point = transform.apply(*point);
        }
    }

    /// The control box: the tight box around every point, on-curve and
    /// off-curve alike. Cheap, and never smaller than the true shape.
    pub fn get_cbox(&self) -> BBox {
        if self.points.is_empty() {
            return BBox::zero();
        }
        let mut cbox = BBox::EMPTY;
        for &point in &self.points {
            cbox.include(point);
        }
        cbox
    }

    /// The exact bounding box: curve extrema are solved, so the box can be
    /// tighter than the control box when off-curve points overshoot.
    pub fn get_bbox(&self) -> FontResult<BBox> {
        exact_bbox::outline_bbox(self)
    }

    /// Reverses the drawing direction of every contour and records the
    /// flipped fill side in the flags.
    pub fn reverse(&mut self) {
        for i in 0..self.contours.len() {
            let (first, end) = self.contour_range(i);
            self.points[first..end].reverse();
            self.tags[first..end].reverse();
            // Keep the first point first so contour starts stay stable.
            self.points[first..end].rotate_right(1);
            self.tags[first..end].rotate_right(1);
        }
        self.flags.toggle(OutlineFlags::REVERSE_FILL);
    }

    /// Emboldens the outline by shifting each point half of `strength`
    /// along the outward normal of its incoming edge.
    pub fn embolden(&mut self, strength: F26Dot6) -> FontResult<()> {
        let half = F26Dot6(strength.0 / 2);
        if half.0 == 0 {
            return Ok(());
        }
        let orientation_ccw = self.signed_area() >= 0;
        let source = self.points.clone();
        for i in 0..self.contours.len() {
            let (first, end) = self.contour_range(i);
            if end - first < 2 {
                continue;
            }
            for j in first..end {
                let previous = if j == first { end - 1 } else { j - 1 };
                let incoming = source[j] - source[previous];
                if incoming.is_zero() {
                    continue;
                }
                let angle = trig::atan2(incoming.x.0, incoming.y.0);
                let normal_angle = if orientation_ccw {
                    angle - ANGLE_PI2
                } else {
                    angle + ANGLE_PI2
                };
                let unit = trig::vector_unit(normal_angle);
                let offset = vec26(
                    ((unit.x.0 as i64 * half.0 as i64) >> 16) as i32,
                    ((unit.y.0 as i64 * half.0 as i64) >> 16) as i32,
                );
                self.points[j] += offset;
            }
        }
        Ok(())
    }

    /// Twice the signed area of the polygon through all points; positive
    /// for counter-clockwise outlines in a y-up coordinate system.
    pub(crate) fn signed_area(&self) -> i64 {
        let mut area = 0i64;
        for i in 0..self.contours.len() {
            let (first, end) = self.contour_range(i);
            for j in first..end {
                let next = if j + 1 == end { first } else { j + 1 };
                area += self.points[j].cross(self.points[next]);
            }
        }
        area
    }
}

impl Debug for Outline {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Outline({} points, {} contours)",
            self.points.len(),
            self.contours.len()
        )
    }
}

#[cfg(test)]
mod test {
    use crate::outline::{Outline, OutlineFlags, PointTags};
    use fontloom_geometry::vector::vec26;
    use fontloom_geometry::BBox;

    pub(crate) fn unit_square() -> Outline {
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(64, 0), PointTags::ON_CURVE).unwrap();
        outline
            .push_point(vec26(64, 64), PointTags::ON_CURVE)
            .unwrap();
        outline.push_point(vec26(0, 64), PointTags::ON_CURVE).unwrap();
        outline.end_contour().unwrap();
        outline
    }

    #[test]
    fn empty_outline_is_valid() {
        let outline = Outline::new();
        assert!(outline.check().is_ok());
        assert_eq!(outline.get_cbox(), BBox::zero());
    }

    #[test]
    fn check_rejects_conic_then_cubic() {
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(10, 10), PointTags::empty()).unwrap();
        outline.push_point(vec26(20, 20), PointTags::CUBIC).unwrap();
        outline.end_contour().unwrap();
        assert!(outline.check().is_err());
    }

    #[test]
    fn translate_round_trips() {
        let mut outline = unit_square();
        let original = outline.points().to_vec();
        outline.translate(vec26(100, -50));
        outline.translate(vec26(-100, 50));
        assert_eq!(outline.points(), &original[..]);
    }

    #[test]
    fn reverse_twice_is_identity() {
        let mut outline = unit_square();
        let original = outline.points().to_vec();
        outline.reverse();
        assert!(outline.flags.contains(OutlineFlags::REVERSE_FILL));
        outline.reverse();
        assert!(!outline.flags.contains(OutlineFlags::REVERSE_FILL));
        assert_eq!(outline.points(), &original[..]);
    }

    #[test]
    fn cbox_covers_all_points() {
        let outline = unit_square();
        assert_eq!(outline.get_cbox(), BBox::new_raw(0, 0, 64, 64));
    }

    #[test]
    fn embolden_grows_the_cbox() {
        use fontloom_geometry::fixed::F26Dot6;
        let mut outline = unit_square();
        outline.embolden(F26Dot6(32)).unwrap();
        let cbox = outline.get_cbox();
        assert!(cbox.width().0 > 64);
        assert!(cbox.height().0 > 64);
    }
}
