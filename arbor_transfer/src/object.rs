// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The data-transfer object.
//!
//! A [`DataObject`] wraps exactly one backing: the in-process
//! [`DataStore`], a read-only [`PlatformConverter`] over data arriving from
//! the OS, or a caller-supplied [`DataTransfer`] implementation passed
//! through untouched. Everything reaches the data through the same
//! [`DataTransfer`] trait, so producers and consumers never care which
//! backing they hold.

use core::fmt;

use crate::convert::PlatformConverter;
use crate::error::TransferError;
use crate::format::formats;
use crate::medium::PlatformDataObject;
use crate::store::DataStore;
use crate::value::{ImageData, TransferValue};

/// Format-keyed access to transferable data.
pub trait DataTransfer {
    /// Reads the value stored under `format`, walking format synonyms when
    /// `auto_convert` is set.
    fn get_data(&self, format: &str, auto_convert: bool) -> Option<TransferValue>;

    /// Returns `true` if data is available under `format`.
    fn get_data_present(&self, format: &str, auto_convert: bool) -> bool;

    /// Lists the available formats.
    fn get_formats(&self, auto_convert: bool) -> Vec<String>;

    /// Stores a value under `format`.
    fn set_data(
        &mut self,
        format: &str,
        value: TransferValue,
        auto_convert: bool,
    ) -> Result<(), TransferError>;
}

enum Backing {
    Store(DataStore),
    Converter(PlatformConverter),
    External(Box<dyn DataTransfer>),
}

/// A data-transfer object for clipboard and drag-and-drop payloads.
///
/// # Example
///
/// ```rust
/// use arbor_transfer::{DataObject, DataTransfer, formats};
///
/// let mut data = DataObject::new();
/// data.set_text("héllo");
///
/// assert!(data.contains_text());
/// assert_eq!(data.get_text().as_deref(), Some("héllo"));
/// // The text synonym group answers for ANSI text too.
/// assert!(data.get_data_present(formats::TEXT, true));
/// ```
pub struct DataObject {
    backing: Backing,
}

impl Default for DataObject {
    fn default() -> Self {
        Self::new()
    }
}

impl DataObject {
    /// Creates an empty, writable data object.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backing: Backing::Store(DataStore::new()),
        }
    }

    /// Wraps data arriving from the OS. The object is read-only.
    #[must_use]
    pub fn from_platform(inner: Box<dyn PlatformDataObject>) -> Self {
        Self {
            backing: Backing::Converter(PlatformConverter::new(inner)),
        }
    }

    /// Wraps a caller-supplied transfer implementation, passed through
    /// untouched.
    #[must_use]
    pub fn from_transfer(inner: Box<dyn DataTransfer>) -> Self {
        Self {
            backing: Backing::External(inner),
        }
    }

    /// Creates a writable object seeded with one value under its natural
    /// format.
    #[must_use]
    pub fn with_value(value: TransferValue) -> Self {
        let mut data = Self::new();
        let format = natural_format(&value);
        data.set_data(format, value, true)
            .expect("a fresh store-backed object is writable");
        data
    }

    /// Returns `true` if the object is bound to a platform source and
    /// therefore read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self.backing, Backing::Converter(_))
    }

    // =========================================================================
    // Convenience accessors
    // =========================================================================

    /// Stores Unicode text.
    pub fn set_text(&mut self, text: &str) {
        self.set_data(formats::UNICODE_TEXT, text.into(), true)
            .expect("text write on a read-only data object");
    }

    /// Reads text through the synonym group.
    #[must_use]
    pub fn get_text(&self) -> Option<String> {
        match self.get_data(formats::UNICODE_TEXT, true)? {
            TransferValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` if text is available.
    #[must_use]
    pub fn contains_text(&self) -> bool {
        self.get_data_present(formats::UNICODE_TEXT, true)
    }

    /// Stores a file drop list.
    pub fn set_file_drop_list(&mut self, files: Vec<String>) {
        self.set_data(formats::FILE_DROP, TransferValue::Files(files), true)
            .expect("file list write on a read-only data object");
    }

    /// Reads the file drop list.
    #[must_use]
    pub fn get_file_drop_list(&self) -> Option<Vec<String>> {
        match self.get_data(formats::FILE_DROP, true)? {
            TransferValue::Files(files) => Some(files),
            _ => None,
        }
    }

    /// Returns `true` if a file drop list is available.
    #[must_use]
    pub fn contains_file_drop_list(&self) -> bool {
        self.get_data_present(formats::FILE_DROP, true)
    }

    /// Stores an image.
    pub fn set_image(&mut self, image: ImageData) {
        self.set_data(formats::BITMAP, TransferValue::Image(image), true)
            .expect("image write on a read-only data object");
    }

    /// Reads an image through the bitmap synonym group.
    #[must_use]
    pub fn get_image(&self) -> Option<ImageData> {
        match self.get_data(formats::BITMAP, true)? {
            TransferValue::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Returns `true` if an image is available.
    #[must_use]
    pub fn contains_image(&self) -> bool {
        self.get_data_present(formats::BITMAP, true)
    }

    /// Stores an audio stream.
    pub fn set_audio(&mut self, bytes: Vec<u8>) {
        self.set_data(formats::WAVE_AUDIO, TransferValue::Bytes(bytes), true)
            .expect("audio write on a read-only data object");
    }

    /// Reads the audio stream.
    #[must_use]
    pub fn get_audio(&self) -> Option<Vec<u8>> {
        match self.get_data(formats::WAVE_AUDIO, true)? {
            TransferValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns `true` if audio is available.
    #[must_use]
    pub fn contains_audio(&self) -> bool {
        self.get_data_present(formats::WAVE_AUDIO, true)
    }
}

impl DataTransfer for DataObject {
    fn get_data(&self, format: &str, auto_convert: bool) -> Option<TransferValue> {
        match &self.backing {
            Backing::Store(store) => store.get_data(format, auto_convert),
            Backing::Converter(converter) => converter.get_data(format, auto_convert),
            Backing::External(inner) => inner.get_data(format, auto_convert),
        }
    }

    fn get_data_present(&self, format: &str, auto_convert: bool) -> bool {
        match &self.backing {
            Backing::Store(store) => store.get_data_present(format, auto_convert),
            Backing::Converter(converter) => converter.get_data_present(format, auto_convert),
            Backing::External(inner) => inner.get_data_present(format, auto_convert),
        }
    }

    fn get_formats(&self, auto_convert: bool) -> Vec<String> {
        match &self.backing {
            Backing::Store(store) => store.get_formats(auto_convert),
            Backing::Converter(converter) => converter.get_formats(auto_convert),
            Backing::External(inner) => inner.get_formats(auto_convert),
        }
    }

    fn set_data(
        &mut self,
        format: &str,
        value: TransferValue,
        auto_convert: bool,
    ) -> Result<(), TransferError> {
        assert!(!format.is_empty(), "format name must not be empty");
        match &mut self.backing {
            Backing::Store(store) => store.set_data(format, value, auto_convert),
            Backing::Converter(_) => Err(TransferError::ReadOnly),
            Backing::External(inner) => inner.set_data(format, value, auto_convert),
        }
    }
}

impl fmt::Debug for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backing = match &self.backing {
            Backing::Store(_) => "Store",
            Backing::Converter(_) => "Converter",
            Backing::External(_) => "External",
        };
        f.debug_struct("DataObject")
            .field("backing", &backing)
            .finish()
    }
}

/// The format a bare value naturally lands under.
fn natural_format(value: &TransferValue) -> &'static str {
    match value {
        TransferValue::Text(_) => formats::UNICODE_TEXT,
        TransferValue::Files(_) => formats::FILE_DROP,
        TransferValue::Image(_) => formats::BITMAP,
        TransferValue::Metafile(_) => formats::ENHANCED_METAFILE,
        TransferValue::Locale(_) => formats::LOCALE,
        TransferValue::Object(_) => formats::SERIALIZABLE,
        TransferValue::Bytes(_) => formats::SERIALIZABLE,
    }
}
