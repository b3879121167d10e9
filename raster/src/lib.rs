// fontloom/raster/src/lib.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scan conversion of outlines into bitmaps.
//!
//! Two converters share one input contract: an outline in 26.6 device
//! coordinates, already translated so the target bitmap's bottom-left
//! pixel corner is the origin. The monochrome converter builds per-scanline
//! crossing profiles in a bounded pool; the anti-aliased converter
//! accumulates exact per-cell coverage and sweeps rows into spans.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod bitmap;
pub mod gray;
pub mod mono;

mod flatten;

pub use crate::bitmap::{Bitmap, PixelMode};
pub use crate::gray::render_gray;
pub use crate::mono::{render_mono, DEFAULT_POOL_SIZE};

/// How a glyph slot should be rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// 1-bit monochrome with dropout control.
    Mono,
    /// 8-bit, 256-level anti-aliasing.
    Normal,
    /// Like `Normal` but intended for lightly-hinted outlines; the scan
    /// converter itself is identical.
    Light,
    /// Horizontal LCD sub-pixel coverage (interface point only).
    Lcd,
    /// Vertical LCD sub-pixel coverage (interface point only).
    LcdV,
}

impl RenderMode {
    /// True for the modes this crate can rasterize directly.
    #[inline]
    pub fn is_supported(self) -> bool {
        match self {
            RenderMode::Mono | RenderMode::Normal | RenderMode::Light => true,
            RenderMode::Lcd | RenderMode::LcdV => false,
        }
    }
}
