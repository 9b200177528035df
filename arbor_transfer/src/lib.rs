// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Transfer: format-keyed data interchange for clipboard and
//! drag-and-drop.
//!
//! ## Core Concepts
//!
//! ### Formats
//!
//! Format names map to process-global numeric clipboard ids
//! ([`get_format`], [`get_format_by_id`]); the sixteen OS-predefined
//! formats keep their fixed 16-bit ids and everything else registers
//! lazily. The [`formats`] module holds the well-known name literals other
//! clipboard producers and consumers recognize.
//!
//! ### The data object
//!
//! [`DataObject`] holds one of three backings behind one [`DataTransfer`]
//! trait: an in-process [`DataStore`], a read-only [`PlatformConverter`]
//! over a native [`PlatformDataObject`], or a caller-supplied pass-through.
//! Reads expand a closed synonym table ([`mapped_formats`]) — the text
//! flavors, the file-drop flavors, and the two bitmap/metafile
//! representations — and coerce bitmap representations to the requested
//! one.
//!
//! ### Platform marshaling
//!
//! The converter negotiates a transfer medium per format (GDI and
//! enhanced-metafile handles first where they apply, then global memory,
//! then stream) and decodes blobs by format name: terminator-scanned text,
//! the native `DROPFILES` file-list layout, DIB headers, locales.
//!
//! ### Restricted deserialization
//!
//! Serialized objects travel as a 16-byte magic GUID plus a structured
//! payload. Decoding under a *restricted* format name (plain string data
//! and the OS-native predefined formats) accepts only strings and
//! primitives; anything richer is dropped as absent data. A payload
//! claiming to be plain text cannot smuggle an object graph, and cannot
//! crash the paste either.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_transfer::{DataObject, DataTransfer, formats};
//!
//! let mut data = DataObject::new();
//! data.set_text("héllo");
//!
//! // Exact format, exact value.
//! let exact = data.get_data(formats::UNICODE_TEXT, false).unwrap();
//! assert_eq!(exact.as_text(), Some("héllo"));
//!
//! // The synonym group answers for the ANSI flavor.
//! let ansi = data.get_data(formats::TEXT, true).unwrap();
//! assert_eq!(ansi.as_text(), Some("héllo"));
//! ```

mod codec;
mod convert;
mod error;
mod format;
mod medium;
mod object;
mod serial;
mod store;
mod value;

pub use codec::{
    read_ansi_nul, read_dib, read_file_drop, read_locale, read_utf8_nul, read_utf16_nul,
    write_ansi_nul, write_file_drop, write_utf16_nul,
};
pub use convert::{
    BITMAP_SOURCE_FORMAT, NATIVE_BITMAP_FORMAT, NATIVE_METAFILE_FORMAT, PlatformConverter,
    coerce_bitmap, is_bitmap_format, mapped_formats,
};
pub use error::TransferError;
pub use format::{DataFormat, formats, get_format, get_format_by_id};
pub use medium::{Aspect, FormatQuery, Medium, PlatformDataObject, Tymed};
pub use object::{DataObject, DataTransfer};
pub use serial::{
    SERIALIZED_OBJECT_MAGIC, decode_serialized, encode_serialized, is_restricted_format,
};
pub use store::{DataStore, DataStoreEntry};
pub use value::{ImageData, ImageKind, TransferValue};
