// fontloom/geometry/src/trig.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CORDIC trigonometry over 16.16 angles in degrees.
//!
//! Rotation and polarization run a shift-and-add pseudo-rotation loop over
//! a small arctangent table; a single downscale multiplication undoes the
//! accumulated CORDIC gain. Accuracy is within 1/65536 of the true value,
//! which is all the outline pipeline ever needs.

use crate::fixed::{div_fix, F16Dot16};
use crate::vector::{vec26, Vector};

/// An angle in 16.16 fixed-point degrees.
pub type Angle = F16Dot16;

pub const ANGLE_PI: Angle = F16Dot16(180 << 16);
pub const ANGLE_2PI: Angle = F16Dot16(360 << 16);
pub const ANGLE_PI2: Angle = F16Dot16(90 << 16);
pub const ANGLE_PI4: Angle = F16Dot16(45 << 16);

// atan(2^-n) in 16.16 degrees, n = 1..=22.
static ARCTAN_TABLE: [i32; 22] = [
    1_740_967, 919_879, 466_945, 234_379, 117_304, 58_666, 29_335, 14_668, 7_334, 3_667, 1_833,
    917, 458, 229, 115, 57, 29, 14, 7, 4, 2, 1,
];

// The CORDIC gain reciprocal, 0.858785336480436 * 2^32.
const TRIG_SCALE: u32 = 0xDBD9_5B16;

// Keep prenormalized magnitudes below this bit so the pseudo-rotation
// adds cannot overflow.
const TRIG_SAFE_MSB: i32 = 29;

/// Multiplies by the CORDIC gain reciprocal, rounding.
#[inline]
fn downscale(value: i32) -> i32 {
    let negative = value < 0;
    let magnitude = (value as i64).abs() as u64;
    let scaled = ((magnitude * TRIG_SCALE as u64 + 0x4000_0000) >> 32) as i32;
    if negative {
        -scaled
    } else {
        scaled
    }
}

/// Shifts the vector so its larger component sits at `TRIG_SAFE_MSB`.
/// Returns the (possibly negative) shift applied.
fn prenorm(v: &mut Vector) -> i32 {
    let magnitude = (v.x.0.wrapping_abs() as u32) | (v.y.0.wrapping_abs() as u32);
    if magnitude == 0 {
        return 0;
    }
    let msb = 31 - magnitude.leading_zeros() as i32;
    if msb <= TRIG_SAFE_MSB {
        let shift = TRIG_SAFE_MSB - msb;
        v.x.0 = ((v.x.0 as u32) << shift) as i32;
        v.y.0 = ((v.y.0 as u32) << shift) as i32;
        shift
    } else {
        let shift = msb - TRIG_SAFE_MSB;
        v.x.0 >>= shift;
        v.y.0 >>= shift;
        -shift
    }
}

/// Rounds a prenormalized component back down by `shift`.
#[inline]
fn denorm(value: i32, shift: i32) -> i32 {
    if shift > 0 {
        let half = 1 << (shift - 1);
        (value + half - (value < 0) as i32) >> shift
    } else {
        ((value as u32) << -shift) as i32
    }
}

fn pseudo_rotate(v: &mut Vector, mut theta: i32) {
    let (mut x, mut y) = (v.x.0, v.y.0);

    // Bring theta into [-45, 45] degrees with exact quarter turns.
    while theta < -ANGLE_PI4.0 {
        let t = y;
        y = -x;
        x = t;
        theta += ANGLE_PI2.0;
    }
    while theta > ANGLE_PI4.0 {
        let t = -y;
        y = x;
        x = t;
        theta -= ANGLE_PI2.0;
    }

    let mut b = 1;
    for (i, &arctan) in (1..).zip(ARCTAN_TABLE.iter()) {
        if theta < 0 {
            let t = x + ((y + b) >> i);
            y -= (x + b) >> i;
            x = t;
            theta += arctan;
        } else {
            let t = x - ((y + b) >> i);
            y += (x + b) >> i;
            x = t;
            theta -= arctan;
        }
        b <<= 1;
    }

    v.x.0 = x;
    v.y.0 = y;
}

fn pseudo_polarize(v: &mut Vector) -> i32 {
    let (mut x, mut y) = (v.x.0, v.y.0);

    // Move the vector into the [-45, 45] degree sector.
    let mut theta;
    if y > x {
        if y > -x {
            theta = ANGLE_PI2.0;
            let t = y;
            y = -x;
            x = t;
        } else {
            theta = if y > 0 { ANGLE_PI.0 } else { -ANGLE_PI.0 };
            x = -x;
            y = -y;
        }
    } else if y < -x {
        theta = -ANGLE_PI2.0;
        let t = -y;
        y = x;
        x = t;
    } else {
        theta = 0;
    }

    let mut b = 1;
    for (i, &arctan) in (1..).zip(ARCTAN_TABLE.iter()) {
        if y > 0 {
            let t = x + ((y + b) >> i);
            y -= (x + b) >> i;
            x = t;
            theta += arctan;
        } else {
            let t = x - ((y + b) >> i);
            y += (x + b) >> i;
            x = t;
            theta -= arctan;
        }
        b <<= 1;
    }

    // Absorb the residual rounding drift of the iteration.
    theta = if theta >= 0 {
        (theta + 16) & !31
    } else {
        -((-theta + 16) & !31)
    };

    v.x.0 = x;
    v.y.0 = y;
    theta
}

/// The sine of an angle, in 16.16.
#[inline]
pub fn sin(angle: Angle) -> F16Dot16 {
    unit_vector(angle).1
}

/// The cosine of an angle, in 16.16.
#[inline]
pub fn cos(angle: Angle) -> F16Dot16 {
    unit_vector(angle).0
}

/// The tangent of an angle, in 16.16. Saturates near the poles.
pub fn tan(angle: Angle) -> F16Dot16 {
    let mut v = vec26(1 << 24, 0);
    pseudo_rotate(&mut v, angle.0);
    match div_fix(v.y.0, v.x.0) {
        Ok(ratio) => F16Dot16(ratio),
        Err(_) => {
            if v.y.0 >= 0 {
                F16Dot16(i32::max_value())
            } else {
                F16Dot16(i32::min_value())
            }
        }
    }
}

/// The angle of the vector `(x, y)`, in 16.16 degrees within
/// `[-180, 180]`. The zero vector maps to angle 0.
pub fn atan2(x: i32, y: i32) -> Angle {
    let mut v = vec26(x, y);
    if v.is_zero() {
        return F16Dot16(0);
    }
    prenorm(&mut v);
    F16Dot16(pseudo_polarize(&mut v))
}

fn unit_vector(angle: Angle) -> (F16Dot16, F16Dot16) {
    let mut v = vec26((TRIG_SCALE >> 8) as i32, 0);
    pseudo_rotate(&mut v, angle.0);
    (
        F16Dot16((v.x.0 + 0x80) >> 8),
        F16Dot16((v.y.0 + 0x80) >> 8),
    )
}

/// The unit vector for `angle`, with 16.16 components packed into a
/// `Vector` (the conventional trick: unit vectors are scale-free).
#[inline]
pub fn vector_unit(angle: Angle) -> Vector {
    let (x, y) = unit_vector(angle);
    vec26(x.0, y.0)
}

/// Rotates `v` by `angle`, preserving its length within 1/65536.
pub fn vector_rotate(v: Vector, angle: Angle) -> Vector {
    if v.is_zero() {
        return v;
    }
    let mut work = v;
    let shift = prenorm(&mut work);
    pseudo_rotate(&mut work, angle.0);
    work.x.0 = downscale(work.x.0);
    work.y.0 = downscale(work.y.0);
    vec26(denorm(work.x.0, shift), denorm(work.y.0, shift))
}

/// The Euclidean length of `v`, in the same unit as its components.
pub fn vector_length(v: Vector) -> i32 {
    if v.x.0 == 0 {
        return v.y.0.abs();
    }
    if v.y.0 == 0 {
        return v.x.0.abs();
    }
    let mut work = v;
    let shift = prenorm(&mut work);
    pseudo_polarize(&mut work);
    let length = downscale(work.x.0);
    if shift > 0 {
        (length + (1 << (shift - 1))) >> shift
    } else {
        ((length as u32) << -shift) as i32
    }
}

/// Splits `v` into its length and angle.
pub fn vector_polarize(v: Vector) -> (i32, Angle) {
    if v.is_zero() {
        return (0, F16Dot16(0));
    }
    let mut work = v;
    let shift = prenorm(&mut work);
    let theta = pseudo_polarize(&mut work);
    let length = denorm(downscale(work.x.0), shift);
    (length, F16Dot16(theta))
}

#[cfg(test)]
mod test {
    use crate::fixed::F16Dot16;
    use crate::trig::{
        atan2, cos, sin, tan, vector_length, vector_polarize, vector_rotate, ANGLE_PI, ANGLE_PI2,
        ANGLE_PI4,
    };
    use crate::vector::vec26;
    use quickcheck::quickcheck;

    const UNIT: i32 = 0x10000;

    fn assert_close(actual: i32, expected: i32, tolerance: i32) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} not within {} of {}",
            actual,
            tolerance,
            expected
        );
    }

    #[test]
    fn cardinal_angles() {
        assert_close(sin(F16Dot16(0)).0, 0, 2);
        assert_close(cos(F16Dot16(0)).0, UNIT, 2);
        assert_close(sin(ANGLE_PI2).0, UNIT, 2);
        assert_close(cos(ANGLE_PI2).0, 0, 2);
        assert_close(sin(ANGLE_PI).0, 0, 2);
        assert_close(cos(ANGLE_PI).0, -UNIT, 2);
    }

    #[test]
    fn forty_five_degrees() {
        // sin 45 = cos 45 = 0.70710678 = 0xB505 in 16.16.
        assert_close(sin(ANGLE_PI4).0, 0xB505, 2);
        assert_close(cos(ANGLE_PI4).0, 0xB505, 2);
        assert_close(tan(ANGLE_PI4).0, UNIT, 4);
    }

    #[test]
    fn atan2_quadrants() {
        assert_close(atan2(100, 100).0, ANGLE_PI4.0, 64);
        assert_close(atan2(-100, 100).0, ANGLE_PI2.0 + ANGLE_PI4.0, 64);
        assert_close(atan2(0, 100).0, ANGLE_PI2.0, 64);
        assert_close(atan2(-100, 0).0.abs(), ANGLE_PI.0, 64);
    }

    #[test]
    fn rotate_quarter_turn() {
        let rotated = vector_rotate(vec26(1000, 0), ANGLE_PI2);
        assert_close(rotated.x.0, 0, 2);
        assert_close(rotated.y.0, 1000, 2);
    }

    #[test]
    fn length_of_pythagorean_triple() {
        assert_eq!(vector_length(vec26(300, 400)), 500);
        assert_eq!(vector_length(vec26(-300, 400)), 500);
        assert_eq!(vector_length(vec26(0, -77)), 77);
    }

    #[test]
    fn polarize_round_trips_through_rotate() {
        let v = vec26(5000, -1200);
        let (length, angle) = vector_polarize(v);
        let rebuilt = vector_rotate(vec26(length, 0), angle);
        assert_close(rebuilt.x.0, v.x.0, 2);
        assert_close(rebuilt.y.0, v.y.0, 2);
    }

    quickcheck! {
        fn rotation_preserves_length(x: i16, y: i16, angle: i32) -> bool {
            let v = vec26(x as i32, y as i32);
            let angle = F16Dot16(angle % (360 << 16));
            let before = vector_length(v);
            let after = vector_length(vector_rotate(v, angle));
            (before - after).abs() <= 4
        }
    }
}
