// fontloom/font/src/driver.rs
//
// Copyright © 2026 The Fontloom Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The driver registry: format probing and dispatch.
//!
//! The built-in formats are a closed set, dispatched by tagged variant so
//! hot paths pay no indirect calls. External drivers slot in through the
//! `Custom` variant behind the same capability trait.

use crate::face::{Face, OpenParameter};
use crate::stream::Stream;
use crate::{cff, cid, sfnt, type1};
use fontloom_error::{Error, FontResult};
use fontloom_geometry::F16Dot16;
use hashbrown::HashMap;

bitflags! {
    /// Capability flags a driver module declares.
    pub struct ModuleFlags: u32 {
        /// The module is a font driver.
        const FONT_DRIVER = 0x0001;
        /// The module is a renderer.
        const RENDERER = 0x0002;
        /// The driver produces scalable outlines.
        const DRIVER_SCALABLE = 0x0004;
        /// The driver carries a format-native hinter.
        const DRIVER_HAS_HINTER = 0x0008;
        /// The driver only produces bitmaps.
        const DRIVER_NO_OUTLINES = 0x0010;
    }
}

/// A named extension a driver publishes beyond the core capability set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Service {
    /// PostScript font name lookup.
    PostScriptName,
    /// Glyph name dictionary access.
    GlyphDict,
    /// Raw SFNT table access.
    SfntTables,
    /// Pair kerning.
    Kerning,
}

/// The capability set every driver implements. Built-in drivers get
/// static dispatch through [`Driver`]; external ones are boxed.
pub trait FontDriver {
    /// The registry name, e.g. `"truetype"`.
    fn name(&self) -> &str;

    /// The driver's own version, 16.16.
    fn version(&self) -> F16Dot16 {
        F16Dot16::ONE
    }

    /// The minimum engine version the driver requires, 16.16.
    fn requires(&self) -> F16Dot16 {
        F16Dot16::ONE
    }

    fn flags(&self) -> ModuleFlags;

    /// The named-service table.
    fn services(&self) -> &[(&'static str, Service)] {
        &[]
    }

    /// Checks whether the stream holds this driver's format. Must leave
    /// the stream reusable regardless of the outcome.
    fn probe(&self, stream: &mut Stream) -> FontResult<()>;

    /// Parses the font and builds a face. `face_index < 0` requests a
    /// counting-only face.
    fn init_face(
        &self,
        stream: Stream,
        face_index: i32,
        params: &[OpenParameter],
    ) -> FontResult<Face>;
}

/// The TrueType driver: plain SFNT, `true`/`typ1` magics and collections.
pub struct TrueTypeDriver;

impl FontDriver for TrueTypeDriver {
    fn name(&self) -> &str {
        "truetype"
    }

    fn flags(&self) -> ModuleFlags {
        ModuleFlags::FONT_DRIVER | ModuleFlags::DRIVER_SCALABLE
    }

    fn services(&self) -> &[(&'static str, Service)] {
        &[
            ("postscript-font-name", Service::PostScriptName),
            ("glyph-dict", Service::GlyphDict),
            ("sfnt-table", Service::SfntTables),
            ("kerning", Service::Kerning),
        ]
    }

    fn probe(&self, stream: &mut Stream) -> FontResult<()> {
        sfnt::probe(stream, sfnt::Flavor::TrueType)
    }

    fn init_face(
        &self,
        stream: Stream,
        face_index: i32,
        params: &[OpenParameter],
    ) -> FontResult<Face> {
        sfnt::init_face(stream, face_index, params, sfnt::Flavor::TrueType)
    }
}

/// The CFF driver: OpenType fonts with `OTTO` containers.
pub struct CffDriver;

impl FontDriver for CffDriver {
    fn name(&self) -> &str {
        "cff"
    }

    fn flags(&self) -> ModuleFlags {
        ModuleFlags::FONT_DRIVER | ModuleFlags::DRIVER_SCALABLE
    }

    fn services(&self) -> &[(&'static str, Service)] {
        &[
            ("postscript-font-name", Service::PostScriptName),
            ("glyph-dict", Service::GlyphDict),
            ("sfnt-table", Service::SfntTables),
            ("kerning", Service::Kerning),
        ]
    }

    fn probe(&self, stream: &mut Stream) -> FontResult<()> {
        sfnt::probe(stream, sfnt::Flavor::Cff)
    }

    fn init_face(
        &self,
        stream: Stream,
        face_index: i32,
        params: &[OpenParameter],
    ) -> FontResult<Face> {
        sfnt::init_face(stream, face_index, params, sfnt::Flavor::Cff)
    }
}

/// The Type 1 driver: PFA and PFB PostScript fonts.
pub struct Type1Driver;

impl FontDriver for Type1Driver {
    fn name(&self) -> &str {
        "type1"
    }

    fn flags(&self) -> ModuleFlags {
        ModuleFlags::FONT_DRIVER | ModuleFlags::DRIVER_SCALABLE
    }

    fn services(&self) -> &[(&'static str, Service)] {
        &[
            ("postscript-font-name", Service::PostScriptName),
            ("glyph-dict", Service::GlyphDict),
        ]
    }

    fn probe(&self, stream: &mut Stream) -> FontResult<()> {
        type1::probe(stream)
    }

    fn init_face(
        &self,
        stream: Stream,
        face_index: i32,
        params: &[OpenParameter],
    ) -> FontResult<Face> {
        type1::init_face(stream, face_index, params)
    }
}

/// The CID driver: CID-keyed Type 1 fonts.
pub struct CidDriver;

impl FontDriver for CidDriver {
    fn name(&self) -> &str {
        "t1cid"
    }

    fn flags(&self) -> ModuleFlags {
        ModuleFlags::FONT_DRIVER | ModuleFlags::DRIVER_SCALABLE
    }

    fn probe(&self, stream: &mut Stream) -> FontResult<()> {
        cid::probe(stream)
    }

    fn init_face(
        &self,
        stream: Stream,
        face_index: i32,
        params: &[OpenParameter],
    ) -> FontResult<Face> {
        cid::init_face(stream, face_index, params)
    }
}

/// A registered driver. Built-ins dispatch statically.
pub enum Driver {
    TrueType(TrueTypeDriver),
    Cff(CffDriver),
    Type1(Type1Driver),
    Cid(CidDriver),
    Custom(Box<dyn FontDriver>),
}

impl Driver {
    fn as_dyn(&self) -> &dyn FontDriver {
        match self {
            Driver::TrueType(d) => d,
            Driver::Cff(d) => d,
            Driver::Type1(d) => d,
            Driver::Cid(d) => d,
            Driver::Custom(d) => d.as_ref(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.as_dyn().name()
    }

    #[inline]
    pub fn version(&self) -> F16Dot16 {
        self.as_dyn().version()
    }

    #[inline]
    pub fn flags(&self) -> ModuleFlags {
        self.as_dyn().flags()
    }

    #[inline]
    pub fn services(&self) -> &[(&'static str, Service)] {
        self.as_dyn().services()
    }

    #[inline]
    pub fn probe(&self, stream: &mut Stream) -> FontResult<()> {
        match self {
            Driver::TrueType(d) => d.probe(stream),
            Driver::Cff(d) => d.probe(stream),
            Driver::Type1(d) => d.probe(stream),
            Driver::Cid(d) => d.probe(stream),
            Driver::Custom(d) => d.probe(stream),
        }
    }

    #[inline]
    pub fn init_face(
        &self,
        stream: Stream,
        face_index: i32,
        params: &[OpenParameter],
    ) -> FontResult<Face> {
        match self {
            Driver::TrueType(d) => d.init_face(stream, face_index, params),
            Driver::Cff(d) => d.init_face(stream, face_index, params),
            Driver::Type1(d) => d.init_face(stream, face_index, params),
            Driver::Cid(d) => d.init_face(stream, face_index, params),
            Driver::Custom(d) => d.init_face(stream, face_index, params),
        }
    }
}

/// The ordered driver list. Probe order is registration order; the first
/// match wins.
pub struct DriverRegistry {
    drivers: Vec<Driver>,
    by_name: HashMap<String, usize>,
}

impl DriverRegistry {
    /// An empty registry.
    pub fn new() -> DriverRegistry {
        DriverRegistry {
            drivers: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// The built-in driver set, in the engine's canonical order.
    pub fn with_builtin_drivers() -> DriverRegistry {
        let mut registry = DriverRegistry::new();
        registry.register(Driver::TrueType(TrueTypeDriver));
        registry.register(Driver::Cff(CffDriver));
        registry.register(Driver::Type1(Type1Driver));
        registry.register(Driver::Cid(CidDriver));
        registry
    }

    /// Appends a driver. A later driver with the same name shadows an
    /// earlier one for forced lookups but not for probing order.
    pub fn register(&mut self, driver: Driver) {
        let name = driver.name().to_owned();
        let index = self.drivers.len();
        self.drivers.push(driver);
        self.by_name.insert(name, index);
    }

    #[inline]
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    /// Finds a driver by registry name.
    pub fn by_name(&self, name: &str) -> Option<&Driver> {
        self.by_name.get(name).map(|&i| &self.drivers[i])
    }

    /// Resolves a named service for the driver that owns `driver_name`.
    pub fn lookup_service(&self, driver_name: &str, service_id: &str) -> Option<Service> {
        let driver = self.by_name(driver_name)?;
        driver
            .services()
            .iter()
            .find(|(id, _)| *id == service_id)
            .map(|&(_, service)| service)
    }

    /// Opens a face: probes drivers in order (or only the forced one) and
    /// lets the first match parse the font.
    pub fn open_face(
        &self,
        mut stream: Stream,
        face_index: i32,
        params: &[OpenParameter],
        forced: Option<&str>,
    ) -> FontResult<Face> {
        if let Some(name) = forced {
            let driver = self.by_name(name).ok_or(Error::InvalidDriverHandle)?;
            driver.probe(&mut stream)?;
            return driver.init_face(stream, face_index, params);
        }
        for driver in &self.drivers {
            if driver.probe(&mut stream).is_ok() {
                debug!("face accepted by driver `{}`", driver.name());
                return driver.init_face(stream, face_index, params);
            }
        }
        Err(Error::UnknownFileFormat)
    }
}

impl Default for DriverRegistry {
    fn default() -> DriverRegistry {
        DriverRegistry::with_builtin_drivers()
    }
}

#[cfg(test)]
mod test {
    use crate::driver::{DriverRegistry, Service};
    use crate::stream::Stream;
    use fontloom_error::Error;
    use std::sync::Arc;

    #[test]
    fn builtin_order_is_stable() {
        let registry = DriverRegistry::with_builtin_drivers();
        let names: Vec<&str> = registry.drivers().iter().map(|d| d.name()).collect();
        assert_eq!(names, ["truetype", "cff", "type1", "t1cid"]);
    }

    #[test]
    fn garbage_is_unknown_format() {
        let registry = DriverRegistry::with_builtin_drivers();
        let bytes: Vec<u8> = (0..64u8).map(|i| i.wrapping_mul(37)).collect();
        let stream = Stream::from_bytes(Arc::from(bytes.into_boxed_slice()));
        assert_eq!(
            registry.open_face(stream, 0, &[], None).err(),
            Some(Error::UnknownFileFormat)
        );
    }

    #[test]
    fn forcing_an_unknown_driver_fails() {
        let registry = DriverRegistry::with_builtin_drivers();
        let stream = Stream::from_bytes(Arc::from(vec![0u8; 4].into_boxed_slice()));
        assert_eq!(
            registry.open_face(stream, 0, &[], Some("nonesuch")).err(),
            Some(Error::InvalidDriverHandle)
        );
    }

    #[test]
    fn services_resolve_by_string_id() {
        let registry = DriverRegistry::with_builtin_drivers();
        assert_eq!(
            registry.lookup_service("truetype", "glyph-dict"),
            Some(Service::GlyphDict)
        );
        assert_eq!(registry.lookup_service("truetype", "nope"), None);
        assert_eq!(registry.lookup_service("t1cid", "glyph-dict"), None);
    }
}
