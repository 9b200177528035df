// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Format synonym expansion and the platform converter.
//!
//! Some formats are interchangeable through conversion: the text flavors,
//! the file-drop flavors, and the two bitmap/metafile representations. The
//! synonym table is a closed set with ordinal-exact matching — nothing else
//! expands.
//!
//! [`PlatformConverter`] is the read-only adapter over a
//! [`PlatformDataObject`]: it negotiates a transfer medium per format (GDI
//! and enhanced-metafile handles first where they apply, then global
//! memory, then stream) and decodes what arrives by format name.

use smallvec::SmallVec;

use crate::codec;
use crate::error::TransferError;
use crate::format::{self, formats};
use crate::medium::{FormatQuery, Medium, PlatformDataObject, Tymed};
use crate::serial;
use crate::value::{ImageKind, TransferValue};

/// Format name of the native bitmap object representation.
pub const NATIVE_BITMAP_FORMAT: &str = "System.Drawing.Bitmap";

/// Format name of the decoded bitmap-source representation.
pub const BITMAP_SOURCE_FORMAT: &str = "System.Windows.Media.Imaging.BitmapSource";

/// Format name of the native metafile object representation.
pub const NATIVE_METAFILE_FORMAT: &str = "System.Drawing.Imaging.Metafile";

/// Returns the synonym group for `format`, the requested format first.
///
/// The groups are closed and matched ordinally:
///
/// | requested | group |
/// |---|---|
/// | text flavors | Text, UnicodeText, System.String |
/// | file-drop flavors | FileDrop, FileNameW, FileName |
/// | bitmap flavors | Bitmap, native bitmap, bitmap source |
/// | metafile flavors | EnhancedMetafile, native metafile |
/// | anything else | just itself |
#[must_use]
pub fn mapped_formats(format: &str) -> SmallVec<[&str; 4]> {
    const TEXT_GROUP: [&str; 3] = [formats::TEXT, formats::UNICODE_TEXT, formats::STRING];
    const FILE_GROUP: [&str; 3] = [formats::FILE_DROP, formats::FILE_NAME_W, formats::FILE_NAME];
    const BITMAP_GROUP: [&str; 3] = [formats::BITMAP, NATIVE_BITMAP_FORMAT, BITMAP_SOURCE_FORMAT];
    const METAFILE_GROUP: [&str; 2] = [formats::ENHANCED_METAFILE, NATIVE_METAFILE_FORMAT];

    let group: &[&str] = if TEXT_GROUP.contains(&format) {
        &TEXT_GROUP
    } else if FILE_GROUP.contains(&format) {
        &FILE_GROUP
    } else if BITMAP_GROUP.contains(&format) {
        &BITMAP_GROUP
    } else if METAFILE_GROUP.contains(&format) {
        &METAFILE_GROUP
    } else {
        return SmallVec::from_slice(&[format]);
    };

    let mut out: SmallVec<[&str; 4]> = SmallVec::new();
    out.push(format);
    for member in group {
        if *member != format {
            out.push(member);
        }
    }
    out
}

/// Returns `true` if `format` names one of the bitmap representations.
#[must_use]
pub fn is_bitmap_format(format: &str) -> bool {
    format == formats::BITMAP || format == NATIVE_BITMAP_FORMAT || format == BITMAP_SOURCE_FORMAT
}

/// Coerces an image value to the representation `format` implies.
///
/// Requesting the native object format yields the native kind; `Bitmap` and
/// the bitmap-source format yield the decoded kind. Non-image values pass
/// through untouched.
#[must_use]
pub fn coerce_bitmap(format: &str, value: TransferValue) -> TransferValue {
    let TransferValue::Image(image) = value else {
        return value;
    };
    let wanted = if format == NATIVE_BITMAP_FORMAT {
        ImageKind::Native
    } else if format == formats::BITMAP || format == BITMAP_SOURCE_FORMAT {
        ImageKind::Source
    } else {
        image.kind
    };
    if image.kind == wanted {
        TransferValue::Image(image)
    } else {
        TransferValue::Image(image.with_kind(wanted))
    }
}

/// Medium preference order for a format: handle mediums first where the
/// format calls for one, then global memory, then stream.
fn preferred_tymeds(format: &str) -> &'static [Tymed] {
    if is_bitmap_format(format) {
        &[Tymed::GDI, Tymed::HGLOBAL, Tymed::ISTREAM]
    } else if format == formats::ENHANCED_METAFILE || format == NATIVE_METAFILE_FORMAT {
        &[Tymed::ENHMF, Tymed::HGLOBAL, Tymed::ISTREAM]
    } else {
        &[Tymed::HGLOBAL, Tymed::ISTREAM]
    }
}

/// Read-only adapter over a platform data object.
///
/// Construction binds the object; from then on the data is reachable only
/// through format-keyed reads — the adapter never writes back.
#[derive(Debug)]
pub struct PlatformConverter {
    inner: Box<dyn PlatformDataObject>,
}

impl PlatformConverter {
    /// Wraps a platform data object.
    #[must_use]
    pub fn new(inner: Box<dyn PlatformDataObject>) -> Self {
        Self { inner }
    }

    /// Reads `format`, walking the synonym group when `auto_convert` is set
    /// and coercing bitmap representations to the requested one.
    #[must_use]
    pub fn get_data(&self, format: &str, auto_convert: bool) -> Option<TransferValue> {
        assert!(!format.is_empty(), "format name must not be empty");
        if auto_convert {
            for candidate in mapped_formats(format) {
                if let Some(value) = self.get_data_exact(candidate) {
                    return Some(coerce_bitmap(format, value));
                }
            }
            None
        } else {
            self.get_data_exact(format)
        }
    }

    /// Returns `true` if the object offers `format` (or a synonym, with
    /// `auto_convert`).
    #[must_use]
    pub fn get_data_present(&self, format: &str, auto_convert: bool) -> bool {
        assert!(!format.is_empty(), "format name must not be empty");
        let candidates = if auto_convert {
            mapped_formats(format)
        } else {
            SmallVec::from_slice(&[format])
        };
        candidates.iter().any(|candidate| {
            let id = format::get_format(candidate).id();
            preferred_tymeds(candidate)
                .iter()
                .any(|tymed| self.inner.query_get(&FormatQuery::content(id, *tymed)))
        })
    }

    /// Enumerates the offered format names, appending synonyms when
    /// `auto_convert` is set.
    #[must_use]
    pub fn get_formats(&self, auto_convert: bool) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for id in self.inner.formats() {
            let name = format::get_format_by_id(id).name().to_owned();
            if auto_convert {
                for candidate in mapped_formats(&name) {
                    if !out.iter().any(|existing| existing == candidate) {
                        out.push((*candidate).to_owned());
                    }
                }
            } else if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }

    fn get_data_exact(&self, format: &str) -> Option<TransferValue> {
        let id = format::get_format(format).id();
        for tymed in preferred_tymeds(format) {
            let query = FormatQuery::content(id, *tymed);
            if !self.inner.query_get(&query) {
                continue;
            }
            match self.inner.get_medium(&query) {
                Ok(medium) => return decode_medium(format, medium),
                Err(TransferError::MediumUnavailable { .. }) => continue,
                Err(error) => {
                    tracing::debug!(format, %error, "platform read failed");
                    return None;
                }
            }
        }
        None
    }
}

/// Decodes a medium by the format it was read under.
fn decode_medium(format: &str, medium: Medium) -> Option<TransferValue> {
    match medium {
        Medium::Gdi(image) => Some(TransferValue::Image(image.with_kind(ImageKind::Native))),
        Medium::EnhMetafile(bytes) => Some(TransferValue::Metafile(bytes)),
        Medium::Global(bytes) | Medium::Stream(bytes) => decode_global(format, &bytes),
    }
}

/// Decodes a global-memory or stream blob by format name.
fn decode_global(format: &str, bytes: &[u8]) -> Option<TransferValue> {
    match format {
        // UTF-8 formats: the allocator may over-report, scan for the
        // terminator instead.
        formats::HTML | formats::XAML => Some(TransferValue::Text(codec::read_utf8_nul(bytes))),
        formats::TEXT
        | formats::RTF
        | formats::OEM_TEXT
        | formats::COMMA_SEPARATED_VALUE
        | formats::FILE_NAME => Some(TransferValue::Text(codec::read_ansi_nul(bytes))),
        formats::UNICODE_TEXT | formats::FILE_NAME_W => {
            Some(TransferValue::Text(codec::read_utf16_nul(bytes)))
        }
        formats::FILE_DROP => codec::read_file_drop(bytes).map(TransferValue::Files),
        formats::LOCALE => codec::read_locale(bytes).map(TransferValue::Locale),
        _ if is_bitmap_format(format) || format == formats::DIB => {
            codec::read_dib(bytes).map(TransferValue::Image)
        }
        _ => serial::decode_serialized(format, bytes),
    }
}
