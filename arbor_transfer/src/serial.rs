// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serialized-object payloads and restricted deserialization.
//!
//! A serialized object on the wire is a fixed 16-byte GUID followed by a
//! JSON document; the prefix is what distinguishes it from a raw byte
//! stream on round-trip. Blobs without the prefix stay opaque bytes.
//!
//! Decoding is a security boundary. A payload arriving from another
//! process can claim any format name it likes; for the *restricted* formats
//! — plain string data and the OS-native predefined formats — only strings
//! and primitives may survive decoding. Richer shapes are rejected by
//! construction and reported as absent data, never as an error: a malicious
//! clipboard must not get an object graph smuggled in under "plain text",
//! and must not crash the paste either.

use serde_json::Value;

use crate::format::formats;
use crate::value::TransferValue;

/// The wire prefix marking a serialized-object payload.
///
/// GUID `7b4d2a1c-9f63-4e8b-b1a5-0c2e94d7f058` as little-endian field bytes.
pub const SERIALIZED_OBJECT_MAGIC: [u8; 16] = [
    0x1c, 0x2a, 0x4d, 0x7b, 0x63, 0x9f, 0x8b, 0x4e, 0xb1, 0xa5, 0x0c, 0x2e, 0x94, 0xd7, 0xf0, 0x58,
];

/// Formats whose serialized payloads may only contain strings/primitives.
const RESTRICTED_FORMATS: [&str; 13] = [
    formats::STRING,
    formats::DIB,
    formats::BITMAP,
    formats::ENHANCED_METAFILE,
    formats::METAFILE_PICTURE,
    formats::SYMBOLIC_LINK,
    formats::DIF,
    formats::TIFF,
    formats::PALETTE,
    formats::PEN_DATA,
    formats::RIFF,
    formats::WAVE_AUDIO,
    formats::LOCALE,
];

/// Returns `true` if serialized payloads under `format` are restricted to
/// strings and primitives.
#[must_use]
pub fn is_restricted_format(format: &str) -> bool {
    RESTRICTED_FORMATS.contains(&format)
}

/// Encodes a value as a serialized-object blob (magic prefix + JSON).
#[must_use]
pub fn encode_serialized(value: &Value) -> Vec<u8> {
    let mut out = SERIALIZED_OBJECT_MAGIC.to_vec();
    out.extend_from_slice(
        serde_json::to_vec(value)
            .expect("serde_json::Value serialization cannot fail")
            .as_slice(),
    );
    out
}

/// Decodes a blob read under `format`.
///
/// Without the magic prefix the blob stays an opaque byte stream. With it,
/// the payload is decoded structurally; restricted formats then accept only
/// strings and primitives — anything else becomes absent data (`None`).
#[must_use]
pub fn decode_serialized(format: &str, bytes: &[u8]) -> Option<TransferValue> {
    let Some(payload) = bytes.strip_prefix(SERIALIZED_OBJECT_MAGIC.as_slice()) else {
        return Some(TransferValue::Bytes(bytes.to_vec()));
    };

    let value: Value = match serde_json::from_slice(payload) {
        Ok(value) => value,
        Err(error) => {
            tracing::debug!(format, %error, "malformed serialized payload dropped");
            return None;
        }
    };

    if is_restricted_format(format) {
        match value {
            Value::String(text) => Some(TransferValue::Text(text)),
            Value::Number(_) | Value::Bool(_) | Value::Null => Some(TransferValue::Object(value)),
            Value::Array(_) | Value::Object(_) => {
                tracing::warn!(
                    format,
                    "restricted format carried a non-primitive serialized payload; dropped"
                );
                None
            }
        }
    } else {
        Some(TransferValue::Object(value))
    }
}
