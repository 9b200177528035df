// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The process-global clipboard format registry.
//!
//! Format names map to numeric clipboard ids. The sixteen OS-predefined
//! formats are seeded with their fixed 16-bit ids; every other name is
//! assigned lazily from the registered range on first use. The mapping is
//! append-only for the life of the process — other clipboard producers and
//! consumers rely on a name keeping its id.
//!
//! Numeric lookups ignore the upper 16 bits: the OLE `CLIPFORMAT` is an
//! unsigned 16-bit value and callers routinely hand over sign-extended or
//! flag-carrying variants.

use std::sync::{Mutex, MutexGuard, OnceLock};

/// Well-known format names.
///
/// The exact string literals are load-bearing: they are how payloads from
/// other processes are recognized, and how ours are recognized by them.
pub mod formats {
    /// ANSI text.
    pub const TEXT: &str = "Text";
    /// Unicode (UTF-16) text.
    pub const UNICODE_TEXT: &str = "UnicodeText";
    /// Device-independent bitmap.
    pub const DIB: &str = "DeviceIndependentBitmap";
    /// GDI bitmap handle.
    pub const BITMAP: &str = "Bitmap";
    /// Enhanced metafile.
    pub const ENHANCED_METAFILE: &str = "EnhancedMetafile";
    /// Windows metafile picture.
    pub const METAFILE_PICTURE: &str = "MetaFilePict";
    /// Symbolic link.
    pub const SYMBOLIC_LINK: &str = "SymbolicLink";
    /// Data interchange format.
    pub const DIF: &str = "DataInterchangeFormat";
    /// Tagged image file format.
    pub const TIFF: &str = "TaggedImageFileFormat";
    /// OEM code-page text.
    pub const OEM_TEXT: &str = "OEMText";
    /// GDI palette.
    pub const PALETTE: &str = "Palette";
    /// Pen computing data.
    pub const PEN_DATA: &str = "PenData";
    /// RIFF audio.
    pub const RIFF: &str = "RiffAudio";
    /// Wave audio.
    pub const WAVE_AUDIO: &str = "WaveAudio";
    /// File drop list.
    pub const FILE_DROP: &str = "FileDrop";
    /// Input locale for accompanying text.
    pub const LOCALE: &str = "Locale";
    /// HTML clipboard format.
    pub const HTML: &str = "HTML Format";
    /// Rich text format.
    pub const RTF: &str = "Rich Text Format";
    /// Comma-separated values.
    pub const COMMA_SEPARATED_VALUE: &str = "CSV";
    /// A serialized string object.
    pub const STRING: &str = "System.String";
    /// An arbitrary serialized object payload.
    pub const SERIALIZABLE: &str = "PersistentObject";
    /// Xaml markup.
    pub const XAML: &str = "Xaml";
    /// A Xaml package archive.
    pub const XAML_PACKAGE: &str = "XamlPackage";
    /// Single ANSI file name (legacy drop format).
    pub const FILE_NAME: &str = "FileName";
    /// Single Unicode file name (legacy drop format).
    pub const FILE_NAME_W: &str = "FileNameW";
}

/// A (name, numeric id) pair from the format registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFormat {
    name: String,
    id: u32,
}

impl DataFormat {
    /// Returns the format name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the numeric clipboard id.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// First id handed out to formats registered by name.
///
/// Matches the OS registered-format range so our ids never collide with the
/// predefined ones.
const FIRST_REGISTERED_ID: u32 = 0xC000;

/// The sixteen predefined formats with their fixed ids.
const PREDEFINED: [(&str, u32); 16] = [
    (formats::TEXT, 1),
    (formats::BITMAP, 2),
    (formats::METAFILE_PICTURE, 3),
    (formats::SYMBOLIC_LINK, 4),
    (formats::DIF, 5),
    (formats::TIFF, 6),
    (formats::OEM_TEXT, 7),
    (formats::DIB, 8),
    (formats::PALETTE, 9),
    (formats::PEN_DATA, 10),
    (formats::RIFF, 11),
    (formats::WAVE_AUDIO, 12),
    (formats::UNICODE_TEXT, 13),
    (formats::ENHANCED_METAFILE, 14),
    (formats::FILE_DROP, 15),
    (formats::LOCALE, 16),
];

struct FormatTable {
    entries: Vec<DataFormat>,
    next_id: u32,
}

impl FormatTable {
    fn seeded() -> Self {
        Self {
            entries: PREDEFINED
                .iter()
                .map(|(name, id)| DataFormat {
                    name: (*name).to_owned(),
                    id: *id,
                })
                .collect(),
            next_id: FIRST_REGISTERED_ID,
        }
    }
}

fn table() -> MutexGuard<'static, FormatTable> {
    static TABLE: OnceLock<Mutex<FormatTable>> = OnceLock::new();
    TABLE
        .get_or_init(|| Mutex::new(FormatTable::seeded()))
        .lock()
        .expect("format registry lock poisoned")
}

/// Returns the format for `name`, registering it on first use.
///
/// # Panics
///
/// Panics if `name` is empty.
#[must_use]
pub fn get_format(name: &str) -> DataFormat {
    assert!(!name.is_empty(), "format name must not be empty");
    let mut table = table();
    if let Some(format) = table.entries.iter().find(|f| f.name == name) {
        return format.clone();
    }
    let id = table.next_id;
    table.next_id += 1;
    let format = DataFormat {
        name: name.to_owned(),
        id,
    };
    table.entries.push(format.clone());
    format
}

/// Returns the format for a numeric id, masking to the low 16 bits first.
///
/// Unknown ids are recorded with a synthesized `Format{id}` name, the way
/// foreign ids arriving from the OS are handled.
#[must_use]
pub fn get_format_by_id(id: u32) -> DataFormat {
    let id = id & 0xFFFF;
    let mut table = table();
    if let Some(format) = table.entries.iter().find(|f| f.id == id) {
        return format.clone();
    }
    let format = DataFormat {
        name: format!("Format{id}"),
        id,
    };
    // Keep name-registered ids clear of the foreign id we just learned.
    if id >= table.next_id {
        table.next_id = id + 1;
    }
    table.entries.push(format.clone());
    format
}
