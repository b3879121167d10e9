// fontloom/content/src/lib.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The glyph outline model and the loader that assembles composites.
//!
//! The names "outline" and "contour" come from the TrueType specification.
//! An outline stores contours of on-curve and off-curve points, tagged the
//! way font files tag them; decomposition into move/line/conic/cubic
//! callbacks happens on demand.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod bbox;
pub mod decompose;
pub mod loader;
pub mod outline;

pub use crate::decompose::{OutlineBuilder, OutlineSink};
pub use crate::loader::GlyphLoader;
pub use crate::outline::{Outline, OutlineFlags, PointTags};
