// fontloom/font/src/incremental.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The incremental-glyph interface point.
//!
//! Environments that stream fonts piecemeal (embedded PDF fonts, remote
//! font services) can hand an implementation of this trait to `open_face`
//! via the `incr` parameter; drivers then ask it for per-glyph data
//! instead of reading the glyph table directly.

/// Caller-supplied provider of per-glyph data for partial fonts.
pub trait IncrementalInterface {
    /// Returns the raw glyph record for `glyph_index`, in the font's
    /// native format, or `None` to fall back to the font file.
    fn glyph_data(&self, glyph_index: u32) -> Option<Vec<u8>>;

    /// Optionally overrides the unscaled advance and left side bearing,
    /// in font units.
    fn glyph_metrics(&self, _glyph_index: u32) -> Option<(i32, i32)> {
        None
    }
}
