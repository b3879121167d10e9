// fontloom/content/src/decompose.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decomposition of tagged outlines into move/line/conic/cubic callbacks.

use crate::outline::{Outline, PointTags};
use fontloom_error::{Error, FontResult};
use fontloom_geometry::vector::Vector;

/// The push-model consumer of an outline walk.
///
/// `decompose` drives a sink through every contour in order: one `move_to`
/// per contour, then line/conic/cubic segments, with contours implicitly
/// closed back to their start point.
pub trait OutlineSink {
    fn move_to(&mut self, to: Vector) -> FontResult<()>;
    fn line_to(&mut self, to: Vector) -> FontResult<()>;
    fn conic_to(&mut self, control: Vector, to: Vector) -> FontResult<()>;
    fn cubic_to(&mut self, control0: Vector, control1: Vector, to: Vector) -> FontResult<()>;
}

impl Outline {
    /// Walks the outline, emitting segments to `sink`.
    ///
    /// Two consecutive conic controls imply an on-curve midpoint between
    /// them. A contour whose first point is off-curve starts from the
    /// previous on-curve point, or from the midpoint of the first and last
    /// points when neither end is on-curve. A conic control followed by a
    /// cubic control is illegal, as is a lone cubic control.
    pub fn decompose<S>(&self, sink: &mut S) -> FontResult<()>
    where
        S: OutlineSink,
    {
        for contour_index in 0..self.n_contours() {
            let (first, end) = self.contour_range(contour_index);
            if first >= end {
                return Err(Error::InvalidOutline);
            }
            self.decompose_contour(&self.points[first..end], &self.tags[first..end], sink)?;
        }
        Ok(())
    }

    fn decompose_contour<S>(
        &self,
        points: &[Vector],
        tags: &[PointTags],
        sink: &mut S,
    ) -> FontResult<()>
    where
        S: OutlineSink,
    {
        let count = points.len();
        let last = count - 1;

        // Pick the start point. An off-curve conic start borrows the last
        // point when it is on-curve, else synthesizes the midpoint of the
        // two off-curve ends. A cubic control can never start a contour.
        let start;
        let mut cursor = 0;
        if tags[0].is_on_curve() {
            start = points[0];
            cursor = 1;
        } else if tags[0].is_conic_control() {
            if tags[last].is_on_curve() {
                start = points[last];
            } else if tags[last].is_conic_control() {
                start = points[0].midpoint(points[last]);
            } else {
                return Err(Error::InvalidOutline);
            }
        } else {
            return Err(Error::InvalidOutline);
        }

        sink.move_to(start)?;

        let mut current = start;
        while cursor < count {
            let tag = tags[cursor];
            if tag.is_on_curve() {
                current = points[cursor];
                sink.line_to(current)?;
                cursor += 1;
            } else if tag.is_conic_control() {
                let mut control = points[cursor];
                cursor += 1;
                loop {
                    if cursor >= count {
                        // Close through the trailing control point.
                        sink.conic_to(control, start)?;
                        return Ok(());
                    }
                    let next_tag = tags[cursor];
                    if next_tag.is_on_curve() {
                        current = points[cursor];
                        sink.conic_to(control, current)?;
                        cursor += 1;
                        break;
                    }
                    if !next_tag.is_conic_control() {
                        return Err(Error::InvalidOutline);
                    }
                    // Two consecutive conic controls: the midpoint is an
                    // implied on-curve point.
                    let next_control = points[cursor];
                    current = control.midpoint(next_control);
                    sink.conic_to(control, current)?;
                    control = next_control;
                    cursor += 1;
                }
            } else {
                // Cubic controls come in pairs followed by an on-curve
                // point (or the contour start).
                if cursor + 1 >= count || !tags[cursor + 1].is_cubic_control() {
                    return Err(Error::InvalidOutline);
                }
                let control0 = points[cursor];
                let control1 = points[cursor + 1];
                cursor += 2;
                if cursor < count {
                    if !tags[cursor].is_on_curve() {
                        return Err(Error::InvalidOutline);
                    }
                    current = points[cursor];
                    sink.cubic_to(control0, control1, current)?;
                    cursor += 1;
                } else {
                    sink.cubic_to(control0, control1, start)?;
                    return Ok(());
                }
            }
        }

        // Close the contour with a line when the walk ended on-curve.
        if current != start {
            sink.line_to(start)?;
        }
        Ok(())
    }
}

/// A sink that reconstructs a tagged outline from decomposition callbacks.
///
/// Drivers whose formats are segment-oriented (CFF, Type 1) build outlines
/// through this; it is also the witness for the decompose round-trip law.
#[derive(Default)]
pub struct OutlineBuilder {
    outline: Outline,
    open: bool,
    contour_start: Option<Vector>,
}

impl OutlineBuilder {
    #[inline]
    pub fn new() -> OutlineBuilder {
        OutlineBuilder::default()
    }

    /// Finishes the outline, closing any open contour.
    pub fn finish(mut self) -> FontResult<Outline> {
        self.close_open_contour()?;
        self.outline.check()?;
        Ok(self.outline)
    }

    fn close_open_contour(&mut self) -> FontResult<()> {
        if self.open {
            // Drop an unclosed trailing point that merely repeats the
            // contour start; implicit closing supplies it.
            self.trim_closing_point();
            self.outline.end_contour()?;
            self.open = false;
        }
        Ok(())
    }

    fn trim_closing_point(&mut self) {
        let first_index = self
            .outline
            .contours
            .last()
            .map(|&end| end as usize + 1)
            .unwrap_or(0);
        let n = self.outline.points.len();
        if n > first_index + 1
            && self.contour_start == Some(self.outline.points[n - 1])
            && self.outline.tags[n - 1].is_on_curve()
        {
            self.outline.points.pop();
            self.outline.tags.pop();
        }
    }
}

impl OutlineSink for OutlineBuilder {
    fn move_to(&mut self, to: Vector) -> FontResult<()> {
        self.close_open_contour()?;
        self.outline.push_point(to, PointTags::ON_CURVE)?;
        self.contour_start = Some(to);
        self.open = true;
        Ok(())
    }

    fn line_to(&mut self, to: Vector) -> FontResult<()> {
        if !self.open {
            return Err(Error::InvalidOutline);
        }
        self.outline.push_point(to, PointTags::ON_CURVE)
    }

    fn conic_to(&mut self, control: Vector, to: Vector) -> FontResult<()> {
        if !self.open {
            return Err(Error::InvalidOutline);
        }
        self.outline.push_point(control, PointTags::empty())?;
        self.outline.push_point(to, PointTags::ON_CURVE)
    }

    fn cubic_to(&mut self, control0: Vector, control1: Vector, to: Vector) -> FontResult<()> {
        if !self.open {
            return Err(Error::InvalidOutline);
        }
        self.outline.push_point(control0, PointTags::CUBIC)?;
        self.outline.push_point(control1, PointTags::CUBIC)?;
        self.outline.push_point(to, PointTags::ON_CURVE)
    }
}

#[cfg(test)]
mod test {
    use crate::decompose::{OutlineBuilder, OutlineSink};
    use crate::outline::{Outline, PointTags};
    use fontloom_error::FontResult;
    use fontloom_geometry::vector::{vec26, Vector};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl OutlineSink for Recorder {
        fn move_to(&mut self, to: Vector) -> FontResult<()> {
            self.events.push(format!("M {} {}", to.x.0, to.y.0));
            Ok(())
        }
        fn line_to(&mut self, to: Vector) -> FontResult<()> {
            self.events.push(format!("L {} {}", to.x.0, to.y.0));
            Ok(())
        }
        fn conic_to(&mut self, c: Vector, to: Vector) -> FontResult<()> {
            self.events
                .push(format!("Q {} {} {} {}", c.x.0, c.y.0, to.x.0, to.y.0));
            Ok(())
        }
        fn cubic_to(&mut self, c0: Vector, c1: Vector, to: Vector) -> FontResult<()> {
            self.events.push(format!(
                "C {} {} {} {} {} {}",
                c0.x.0, c0.y.0, c1.x.0, c1.y.0, to.x.0, to.y.0
            ));
            Ok(())
        }
    }

    #[test]
    fn square_decomposes_to_lines() {
        let mut outline = Outline::new();
        for &(x, y) in &[(0, 0), (64, 0), (64, 64), (0, 64)] {
            outline.push_point(vec26(x, y), PointTags::ON_CURVE).unwrap();
        }
        outline.end_contour().unwrap();

        let mut recorder = Recorder::default();
        outline.decompose(&mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec!["M 0 0", "L 64 0", "L 64 64", "L 0 64", "L 0 0"]
        );
    }

    #[test]
    fn consecutive_conics_imply_midpoint() {
        // A TrueType-style "o": four on-curve points with conic controls
        // between them would be larger; two consecutive conic controls is
        // the minimal case.
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(64, 0), PointTags::empty()).unwrap();
        outline.push_point(vec26(64, 64), PointTags::empty()).unwrap();
        outline.end_contour().unwrap();

        let mut recorder = Recorder::default();
        outline.decompose(&mut recorder).unwrap();
        // Midpoint of the two controls is (64, 32).
        assert_eq!(
            recorder.events,
            vec!["M 0 0", "Q 64 0 64 32", "Q 64 64 0 0"]
        );
    }

    #[test]
    fn off_curve_start_borrows_last_on_curve_point() {
        let mut outline = Outline::new();
        outline.push_point(vec26(32, 32), PointTags::empty()).unwrap();
        outline.push_point(vec26(64, 0), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline.end_contour().unwrap();

        let mut recorder = Recorder::default();
        outline.decompose(&mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec!["M 0 0", "Q 32 32 64 0", "L 0 0"]
        );
    }

    #[test]
    fn lone_cubic_control_is_rejected() {
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(10, 0), PointTags::CUBIC).unwrap();
        outline.push_point(vec26(20, 0), PointTags::ON_CURVE).unwrap();
        outline.end_contour().unwrap();

        let mut recorder = Recorder::default();
        assert!(outline.decompose(&mut recorder).is_err());
    }

    #[test]
    fn builder_round_trips_mixed_curves() {
        let mut outline = Outline::new();
        outline.push_point(vec26(0, 0), PointTags::ON_CURVE).unwrap();
        outline.push_point(vec26(50, 0), PointTags::empty()).unwrap();
        outline
            .push_point(vec26(100, 50), PointTags::ON_CURVE)
            .unwrap();
        outline.push_point(vec26(90, 90), PointTags::CUBIC).unwrap();
        outline.push_point(vec26(10, 90), PointTags::CUBIC).unwrap();
        outline.push_point(vec26(0, 50), PointTags::ON_CURVE).unwrap();
        outline.end_contour().unwrap();

        let mut builder = OutlineBuilder::new();
        outline.decompose(&mut builder).unwrap();
        let rebuilt = builder.finish().unwrap();

        assert_eq!(rebuilt.points(), outline.points());
        assert_eq!(rebuilt.tags(), outline.tags());
        assert_eq!(rebuilt.contours(), outline.contours());
    }
}
