// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transfer value shapes.
//!
//! [`TransferValue`] is the closed set of shapes a data-transfer object can
//! hold. An opaque [`TransferValue::Bytes`] blob doubles as the placeholder
//! an auto-converting lookup will try to improve on by walking format
//! synonyms.

use core::fmt;

/// Which of the two bitmap representations an image currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageKind {
    /// A native (GDI-style) bitmap handle representation.
    Native,
    /// A decoded bitmap-source representation.
    Source,
}

/// Raw image data tagged with its representation.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Current representation.
    pub kind: ImageKind,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Encoded pixel data.
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// Returns a copy re-tagged with `kind`.
    ///
    /// Re-tagging is the coercion seam between the native and decoded
    /// bitmap worlds; the pixel payload is carried across unchanged.
    #[must_use]
    pub fn with_kind(&self, kind: ImageKind) -> Self {
        Self {
            kind,
            width: self.width,
            height: self.height,
            bytes: self.bytes.clone(),
        }
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// A value held by a data-transfer object.
#[derive(Clone, Debug, PartialEq)]
pub enum TransferValue {
    /// Plain text.
    Text(String),
    /// An opaque byte stream.
    Bytes(Vec<u8>),
    /// A file drop list.
    Files(Vec<String>),
    /// Bitmap data in either representation.
    Image(ImageData),
    /// An enhanced-metafile blob.
    Metafile(Vec<u8>),
    /// An input locale identifier.
    Locale(u32),
    /// A decoded serialized-object graph.
    Object(serde_json::Value),
}

impl TransferValue {
    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the file list, if this is a file drop value.
    #[must_use]
    pub fn as_files(&self) -> Option<&[String]> {
        match self {
            Self::Files(files) => Some(files),
            _ => None,
        }
    }

    /// Returns the image, if this is an image value.
    #[must_use]
    pub fn as_image(&self) -> Option<&ImageData> {
        match self {
            Self::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Returns `true` for the opaque byte-stream shape.
    ///
    /// Auto-converting lookups treat a placeholder like absent data and
    /// keep walking the synonym group for something richer.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Bytes(_))
    }
}

impl From<&str> for TransferValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for TransferValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
