// fontloom/font/src/lib.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Font format drivers and the face objects they produce.
//!
//! A face is opened by probing each registered driver against a stream;
//! the first driver that recognizes the format parses the font's metadata
//! and becomes responsible for loading its glyphs. All formats feed the
//! same outline model and the same slot, so everything above the driver
//! layer is format-agnostic.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod charmap;
pub mod driver;
pub mod face;
pub mod incremental;
pub mod slot;
pub mod stream;

mod cff;
mod cid;
mod psnames;
mod sfnt;
mod type1;

pub use crate::charmap::{CharmapDesc, Encoding, Platform};
pub use crate::driver::{Driver, DriverRegistry, FontDriver, ModuleFlags, Service};
pub use crate::face::{
    Face, FaceFlags, KerningMode, LoadFlags, OpenParameter, SizeMetrics, StyleFlags,
};
pub use crate::incremental::IncrementalInterface;
pub use crate::slot::{GlyphFormat, GlyphMetrics, GlyphSlot, SubGlyph, SubGlyphFlags};
pub use crate::stream::{Frame, Stream};
