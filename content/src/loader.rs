// fontloom/content/src/loader.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The glyph loader: a growable workspace for assembling glyphs.
//!
//! The loader maintains two zones over one shared set of arrays. The
//! *base* zone accumulates everything loaded so far; the *current* zone is
//! the sub-glyph being parsed, starting past the end of the base. `add`
//! promotes the current zone into the base without copying; composite
//! loading snapshots base offsets, recurses, and then transforms the newly
//! promoted range in place. The arrays grow monotonically over a face's
//! lifetime so repeated loads stop allocating.

use crate::outline::{Outline, OutlineFlags, PointTags};
use fontloom_error::{Error, FontResult};
use fontloom_geometry::transform::Matrix;
use fontloom_geometry::vector::Vector;

/// The maximum depth of composite recursion before `InvalidComposite`.
pub const MAX_COMPOSITE_DEPTH: u32 = 16;

/// A resizable glyph-assembly workspace. See the module docs.
#[derive(Default)]
pub struct GlyphLoader {
    points: Vec<Vector>,
    tags: Vec<PointTags>,
    contours: Vec<u16>,
    base_points: usize,
    base_contours: usize,
}

impl GlyphLoader {
    #[inline]
    pub fn new() -> GlyphLoader {
        GlyphLoader::default()
    }

    /// Resets the loader for a new top-level glyph, keeping allocations.
    pub fn rewind(&mut self) {
        self.points.clear();
        self.tags.clear();
        self.contours.clear();
        self.base_points = 0;
        self.base_contours = 0;
    }

    /// Ensures room for `n_points` more points and `n_contours` more
    /// contours in the current zone. Growth is geometric and preserves
    /// content; the arrays are never shrunk.
    pub fn check_points(&mut self, n_points: usize, n_contours: usize) -> FontResult<()> {
        if self.points.len() + n_points > u16::max_value() as usize {
            return Err(Error::TooManyPoints);
        }
        if self.contours.len() + n_contours > u16::max_value() as usize {
            return Err(Error::TooManyContours);
        }
        self.points.reserve(n_points);
        self.tags.reserve(n_points);
        self.contours.reserve(n_contours);
        Ok(())
    }

    /// Drops the current zone, leaving only the promoted base.
    pub fn prepare(&mut self) {
        self.points.truncate(self.base_points);
        self.tags.truncate(self.base_points);
        self.contours.truncate(self.base_contours);
    }

    /// Promotes the current zone into the base. No points move.
    pub fn add(&mut self) {
        self.base_points = self.points.len();
        self.base_contours = self.contours.len();
    }

    /// Number of points in the base zone.
    #[inline]
    pub fn base_point_count(&self) -> usize {
        self.base_points
    }

    /// Number of contours in the base zone.
    #[inline]
    pub fn base_contour_count(&self) -> usize {
        self.base_contours
    }

    /// Number of points in the current zone.
    #[inline]
    pub fn current_point_count(&self) -> usize {
        self.points.len() - self.base_points
    }

    /// Appends a point to the current zone.
    pub fn push_point(&mut self, point: Vector, tags: PointTags) -> FontResult<()> {
        if self.points.len() >= u16::max_value() as usize {
            return Err(Error::TooManyPoints);
        }
        self.points.push(point);
        self.tags.push(tags);
        Ok(())
    }

    /// Ends the current zone's contour at its current last point. The
    /// index is absolute, like every contour end in the outline model.
    pub fn end_contour(&mut self) -> FontResult<()> {
        if self.points.len() <= self.base_points {
            return Err(Error::InvalidOutline);
        }
        if self.contours.len() >= u16::max_value() as usize {
            return Err(Error::TooManyContours);
        }
        self.contours.push((self.points.len() - 1) as u16);
        Ok(())
    }

    /// All base-zone points, mutable; composite loading transforms the
    /// `p..` tail after a child load promotes into the base.
    #[inline]
    pub fn base_points_mut(&mut self) -> &mut [Vector] {
        &mut self.points[..self.base_points]
    }

    #[inline]
    pub fn base_points(&self) -> &[Vector] {
        &self.points[..self.base_points]
    }

    /// Transforms the base-zone points from `start` on by `matrix`.
    pub fn transform_base_from(&mut self, start: usize, matrix: &Matrix) {
        for point in &mut self.points[start..self.base_points] {
            *point = matrix.transform_vector(*point);
        }
    }

    /// Translates the base-zone points from `start` on by `delta`.
    pub fn translate_base_from(&mut self, start: usize, delta: Vector) {
        for point in &mut self.points[start..self.base_points] {
            *point += delta;
        }
    }

    /// Copies the base zone out into a standalone outline.
    pub fn to_outline(&self, flags: OutlineFlags) -> Outline {
        let mut outline = Outline::with_capacity(self.base_points, self.base_contours);
        outline.flags = flags;
        for i in 0..self.base_points {
            outline.push_point(self.points[i], self.tags[i]).unwrap();
        }
        outline
            .contours
            .extend_from_slice(&self.contours[..self.base_contours]);
        outline
    }
}

#[cfg(test)]
mod test {
    use crate::loader::GlyphLoader;
    use crate::outline::{OutlineFlags, PointTags};
    use fontloom_geometry::fixed::F16Dot16;
    use fontloom_geometry::transform::Matrix;
    use fontloom_geometry::vector::vec26;

    fn push_triangle(loader: &mut GlyphLoader, offset: i32) {
        loader.check_points(3, 1).unwrap();
        loader
            .push_point(vec26(offset, 0), PointTags::ON_CURVE)
            .unwrap();
        loader
            .push_point(vec26(offset + 64, 0), PointTags::ON_CURVE)
            .unwrap();
        loader
            .push_point(vec26(offset, 64), PointTags::ON_CURVE)
            .unwrap();
        loader.end_contour().unwrap();
    }

    #[test]
    fn add_promotes_current_into_base() {
        let mut loader = GlyphLoader::new();
        push_triangle(&mut loader, 0);
        assert_eq!(loader.base_point_count(), 0);
        assert_eq!(loader.current_point_count(), 3);
        loader.add();
        assert_eq!(loader.base_point_count(), 3);
        assert_eq!(loader.current_point_count(), 0);
    }

    #[test]
    fn prepare_discards_an_unpromoted_child()  {
        let mut loader = GlyphLoader::new();
        push_triangle(&mut loader, 0);
        loader.add();
        push_triangle(&mut loader, 100);
        loader.prepare();
        assert_eq!(loader.base_point_count(), 3);
        assert_eq!(loader.current_point_count(), 0);
        let outline = loader.to_outline(OutlineFlags::OWNER);
        assert_eq!(outline.n_points(), 3);
        assert_eq!(outline.n_contours(), 1);
    }

    #[test]
    fn composite_transform_touches_only_the_tail() {
        let mut loader = GlyphLoader::new();
        push_triangle(&mut loader, 0);
        loader.add();
        let snapshot = loader.base_point_count();

        push_triangle(&mut loader, 0);
        loader.add();

        // Double the child's coordinates, leave the first triangle alone.
        let double = Matrix::from_scale(F16Dot16::from_i32(2), F16Dot16::from_i32(2));
        loader.transform_base_from(snapshot, &double);
        loader.translate_base_from(snapshot, vec26(10, 0));

        let outline = loader.to_outline(OutlineFlags::OWNER);
        assert_eq!(outline.points()[0], vec26(0, 0));
        assert_eq!(outline.points()[1], vec26(64, 0));
        assert_eq!(outline.points()[3], vec26(10, 0));
        assert_eq!(outline.points()[4], vec26(138, 0));
        assert_eq!(outline.contours(), &[2, 5]);
    }

    #[test]
    fn rewind_clears_zones_but_keeps_capacity() {
        let mut loader = GlyphLoader::new();
        push_triangle(&mut loader, 0);
        loader.add();
        loader.rewind();
        assert_eq!(loader.base_point_count(), 0);
        assert_eq!(loader.current_point_count(), 0);
        let outline = loader.to_outline(OutlineFlags::OWNER);
        assert!(outline.is_empty());
    }
}
