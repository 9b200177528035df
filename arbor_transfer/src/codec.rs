// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte-level decoders for platform blobs.
//!
//! Global-memory blobs arrive with allocator-rounded sizes, so text lengths
//! are detected by terminator scan rather than trusting the reported size.
//! The file-drop layout is the native `DROPFILES` one: a 20-byte header
//! (list offset, drop point, non-client flag, wide flag) followed by a
//! NUL-separated, double-NUL-terminated name list.

use crate::value::{ImageData, ImageKind};

/// Decodes UTF-8 text, length-detected by NUL scan.
#[must_use]
pub fn read_utf8_nul(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Decodes single-byte ANSI text, length-detected by NUL scan.
#[must_use]
pub fn read_ansi_nul(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    bytes[..end].iter().map(|b| *b as char).collect()
}

/// Encodes text as NUL-terminated single-byte ANSI, replacing characters
/// outside the single-byte range.
#[must_use]
pub fn write_ansi_nul(text: &str) -> Vec<u8> {
    let mut out: Vec<u8> = text
        .chars()
        .map(|c| u8::try_from(c as u32).unwrap_or(b'?'))
        .collect();
    out.push(0);
    out
}

/// Decodes UTF-16LE text, length-detected by NUL scan.
#[must_use]
pub fn read_utf16_nul(bytes: &[u8]) -> String {
    let mut units = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        if unit == 0 {
            break;
        }
        units.push(unit);
    }
    String::from_utf16_lossy(&units)
}

/// Encodes text as NUL-terminated UTF-16LE.
#[must_use]
pub fn write_utf16_nul(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity((text.len() + 1) * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out.extend_from_slice(&[0, 0]);
    out
}

/// Byte length of the `DROPFILES` header.
const DROPFILES_HEADER: usize = 20;

/// Encodes a file list in the `DROPFILES` layout (wide strings).
#[must_use]
pub fn write_file_drop(files: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    // pFiles: offset of the name list.
    out.extend_from_slice(&(DROPFILES_HEADER as u32).to_le_bytes());
    // pt: drop point, unused on the clipboard path.
    out.extend_from_slice(&0_i32.to_le_bytes());
    out.extend_from_slice(&0_i32.to_le_bytes());
    // fNC: drop point is client-relative.
    out.extend_from_slice(&0_u32.to_le_bytes());
    // fWide: wide strings follow.
    out.extend_from_slice(&1_u32.to_le_bytes());
    for file in files {
        for unit in file.encode_utf16() {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out.extend_from_slice(&[0, 0]);
    }
    out.extend_from_slice(&[0, 0]);
    out
}

/// Decodes a `DROPFILES` blob into its file list.
///
/// Returns `None` for a malformed header; a well-formed header with an
/// empty list decodes to an empty vector.
#[must_use]
pub fn read_file_drop(bytes: &[u8]) -> Option<Vec<String>> {
    if bytes.len() < DROPFILES_HEADER {
        return None;
    }
    let offset = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let wide = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]) != 0;
    if offset < DROPFILES_HEADER || offset > bytes.len() {
        return None;
    }

    let list = &bytes[offset..];
    let mut files = Vec::new();
    if wide {
        let mut units = Vec::new();
        for pair in list.chunks_exact(2) {
            let unit = u16::from_le_bytes([pair[0], pair[1]]);
            if unit == 0 {
                if units.is_empty() {
                    break;
                }
                files.push(String::from_utf16_lossy(&units));
                units.clear();
            } else {
                units.push(unit);
            }
        }
    } else {
        let mut run = Vec::new();
        for byte in list {
            if *byte == 0 {
                if run.is_empty() {
                    break;
                }
                files.push(run.iter().map(|b| *b as char).collect());
                run.clear();
            } else {
                run.push(*byte);
            }
        }
    }
    Some(files)
}

/// Byte length of a `BITMAPINFOHEADER`.
const BITMAPINFOHEADER: usize = 40;

/// Parses a device-independent bitmap blob into image data.
///
/// Only the header is interpreted; the full blob rides along as the pixel
/// payload for downstream encoders.
#[must_use]
pub fn read_dib(bytes: &[u8]) -> Option<ImageData> {
    if bytes.len() < BITMAPINFOHEADER {
        return None;
    }
    let header_size = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if (header_size as usize) < BITMAPINFOHEADER {
        return None;
    }
    let width = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let height = i32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    if width <= 0 {
        return None;
    }
    Some(ImageData {
        kind: ImageKind::Source,
        width: width.unsigned_abs(),
        // Top-down DIBs carry a negative height.
        height: height.unsigned_abs(),
        bytes: bytes.to_vec(),
    })
}

/// Decodes a locale blob (a little-endian `u32` LCID).
#[must_use]
pub fn read_locale(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < 4 {
        return None;
    }
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_nul_scan_ignores_allocator_slack() {
        let mut bytes = b"<html>hi</html>".to_vec();
        bytes.push(0);
        // Over-allocated garbage past the terminator.
        bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(read_utf8_nul(&bytes), "<html>hi</html>");
    }

    #[test]
    fn utf8_without_terminator_takes_everything() {
        assert_eq!(read_utf8_nul(b"abc"), "abc");
    }

    #[test]
    fn ansi_round_trip() {
        let bytes = write_ansi_nul("héllo");
        assert_eq!(read_ansi_nul(&bytes), "héllo");
    }

    #[test]
    fn ansi_replaces_out_of_range() {
        let bytes = write_ansi_nul("héllo→");
        assert_eq!(read_ansi_nul(&bytes), "héllo?");
    }

    #[test]
    fn utf16_round_trip() {
        let bytes = write_utf16_nul("héllo wörld");
        assert_eq!(read_utf16_nul(&bytes), "héllo wörld");
    }

    #[test]
    fn utf16_nul_scan_stops_early() {
        let mut bytes = write_utf16_nul("short");
        bytes.extend_from_slice(&write_utf16_nul("tail"));
        assert_eq!(read_utf16_nul(&bytes), "short");
    }

    #[test]
    fn file_drop_round_trip() {
        let files = vec!["C:\\a.txt".to_owned(), "C:\\dir\\ü.png".to_owned()];
        let blob = write_file_drop(&files);
        assert_eq!(read_file_drop(&blob), Some(files));
    }

    #[test]
    fn file_drop_empty_list() {
        let blob = write_file_drop(&[]);
        assert_eq!(read_file_drop(&blob), Some(Vec::new()));
    }

    #[test]
    fn file_drop_rejects_short_blob() {
        assert_eq!(read_file_drop(&[0; 8]), None);
    }

    #[test]
    fn file_drop_rejects_bad_offset() {
        let mut blob = write_file_drop(&["x".to_owned()]);
        let bad = (blob.len() as u32 + 10).to_le_bytes();
        blob[..4].copy_from_slice(&bad);
        assert_eq!(read_file_drop(&blob), None);
    }

    #[test]
    fn dib_header_parse() {
        let mut blob = vec![0_u8; 48];
        blob[..4].copy_from_slice(&40_u32.to_le_bytes());
        blob[4..8].copy_from_slice(&16_i32.to_le_bytes());
        blob[8..12].copy_from_slice(&(-8_i32).to_le_bytes());

        let image = read_dib(&blob).unwrap();
        assert_eq!(image.width, 16);
        assert_eq!(image.height, 8);
        assert_eq!(image.kind, ImageKind::Source);
    }

    #[test]
    fn dib_rejects_garbage() {
        assert!(read_dib(&[1, 2, 3]).is_none());
        let mut blob = vec![0_u8; 48];
        blob[..4].copy_from_slice(&12_u32.to_le_bytes());
        assert!(read_dib(&blob).is_none());
    }

    #[test]
    fn locale_reads_lcid() {
        assert_eq!(read_locale(&0x0409_u32.to_le_bytes()), Some(0x0409));
        assert_eq!(read_locale(&[1, 2]), None);
    }
}
