// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform transfer mediums.
//!
//! A native data object negotiates both *what* (a format id) and *how* (a
//! [`Tymed`] transport). This module holds the medium vocabulary and the
//! narrow [`PlatformDataObject`] trait the converter reads through; the
//! format-synonym and decoding logic stays pure and platform-free on top of
//! it.

use core::fmt;

use crate::error::TransferError;
use crate::value::ImageData;

bitflags::bitflags! {
    /// Transfer medium kinds, matching the native TYMED bit values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tymed: u32 {
        /// Global-memory handle.
        const HGLOBAL = 1;
        /// File on disk.
        const FILE = 1 << 1;
        /// Byte stream.
        const ISTREAM = 1 << 2;
        /// Structured storage.
        const ISTORAGE = 1 << 3;
        /// GDI object handle.
        const GDI = 1 << 4;
        /// Metafile picture handle.
        const MFPICT = 1 << 5;
        /// Enhanced-metafile handle.
        const ENHMF = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Presentation aspect of a stored entry, matching DVASPECT.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Aspect: u32 {
        /// Full content.
        const CONTENT = 1;
        /// Thumbnail rendering.
        const THUMBNAIL = 1 << 1;
        /// Iconic rendering.
        const ICON = 1 << 2;
        /// Print-ready rendering.
        const DOCPRINT = 1 << 3;
    }
}

/// A structured query against a platform data object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatQuery {
    /// Numeric clipboard format id.
    pub format_id: u32,
    /// Requested aspect.
    pub aspect: Aspect,
    /// Aspect index (`-1` for the whole content).
    pub index: i32,
    /// Acceptable transfer mediums.
    pub tymed: Tymed,
}

impl FormatQuery {
    /// A content query for `format_id` over `tymed`.
    #[must_use]
    pub fn content(format_id: u32, tymed: Tymed) -> Self {
        Self {
            format_id,
            aspect: Aspect::CONTENT,
            index: -1,
            tymed,
        }
    }
}

/// A blob handed over by the platform, tagged with its medium.
#[derive(Clone, PartialEq)]
pub enum Medium {
    /// Global-memory contents.
    Global(Vec<u8>),
    /// Stream contents.
    Stream(Vec<u8>),
    /// A GDI bitmap.
    Gdi(ImageData),
    /// An enhanced-metafile blob.
    EnhMetafile(Vec<u8>),
}

impl fmt::Debug for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global(bytes) => f.debug_tuple("Global").field(&bytes.len()).finish(),
            Self::Stream(bytes) => f.debug_tuple("Stream").field(&bytes.len()).finish(),
            Self::Gdi(image) => f.debug_tuple("Gdi").field(image).finish(),
            Self::EnhMetafile(bytes) => f.debug_tuple("EnhMetafile").field(&bytes.len()).finish(),
        }
    }
}

/// The narrow read surface of a native data object.
///
/// One implementation exists per target OS; tests use in-memory fakes. All
/// calls are blocking and synchronous.
pub trait PlatformDataObject {
    /// Returns `true` if the object can satisfy `query`.
    fn query_get(&self, query: &FormatQuery) -> bool;

    /// Reads the data for `query` in one of the requested mediums.
    fn get_medium(&self, query: &FormatQuery) -> Result<Medium, TransferError>;

    /// Enumerates the format ids the object offers.
    fn formats(&self) -> Vec<u32>;
}

impl fmt::Debug for dyn PlatformDataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformDataObject").finish_non_exhaustive()
    }
}
