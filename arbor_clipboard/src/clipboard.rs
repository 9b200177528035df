// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The clipboard facade.
//!
//! Native clipboard calls fail transiently when another process holds the
//! clipboard lock, so every call runs under a bounded retry: up to
//! [`RETRY_COUNT`] attempts spaced [`RETRY_DELAY`] apart. Only after the
//! retries are exhausted does the native error code surface to the caller.
//! Everything here is blocking and synchronous.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arbor_transfer::{DataObject, DataTransfer, ImageData, PlatformDataObject, TransferValue};
use thiserror::Error;

/// Attempts per native call before the error surfaces.
pub const RETRY_COUNT: u32 = 10;

/// Spacing between retry attempts.
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Settle delay before flushing a copy, so clipboard listeners reacting to
/// the set don't race the flush.
const FLUSH_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// The native "clipboard is locked by someone else" code.
pub const CLIPBOARD_LOCKED: i32 = -2147221040;

/// An error reported by a platform clipboard call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NativeError {
    /// The native error code.
    pub code: i32,
    /// Whether retrying can help (the clipboard was locked).
    pub transient: bool,
}

impl NativeError {
    /// A transient lock failure worth retrying.
    #[must_use]
    pub fn locked() -> Self {
        Self {
            code: CLIPBOARD_LOCKED,
            transient: true,
        }
    }

    /// A fatal failure with the given code.
    #[must_use]
    pub fn fatal(code: i32) -> Self {
        Self {
            code,
            transient: false,
        }
    }
}

/// Failures surfaced by clipboard operations after retry exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClipboardError {
    /// A native call failed; carries the last native error code.
    #[error("clipboard operation failed with native error code {code}")]
    Native {
        /// The last native error code observed.
        code: i32,
    },
}

/// The narrow surface of the OS clipboard.
///
/// One implementation exists per target OS; tests use in-memory fakes.
pub trait PlatformClipboard {
    /// Empties the clipboard.
    fn clear(&mut self) -> Result<(), NativeError>;

    /// Renders any delayed content so it outlives this process.
    fn flush(&mut self) -> Result<(), NativeError>;

    /// Places a data object on the clipboard.
    fn set_data_object(&mut self, data: Arc<DataObject>) -> Result<(), NativeError>;

    /// Reads the current clipboard contents as a platform data object.
    fn get_data_object(&mut self) -> Result<Option<Box<dyn PlatformDataObject>>, NativeError>;

    /// Returns `true` if `data` is still what the clipboard holds.
    fn is_current(&mut self, data: &Arc<DataObject>) -> Result<bool, NativeError>;
}

/// Clipboard operations with bounded retry and format-name sugar.
///
/// # Example
///
/// ```rust,ignore
/// let mut clipboard = Clipboard::new(platform);
/// clipboard.set_text("héllo")?;
/// assert_eq!(clipboard.get_text()?.as_deref(), Some("héllo"));
/// ```
#[derive(Debug)]
pub struct Clipboard<P: PlatformClipboard> {
    platform: P,
}

impl<P: PlatformClipboard> Clipboard<P> {
    /// Wraps a platform clipboard.
    #[must_use]
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    /// Borrows the underlying platform.
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Unwraps back into the platform.
    #[must_use]
    pub fn into_inner(self) -> P {
        self.platform
    }

    /// Runs `op` under the bounded retry policy.
    fn retry<T>(
        &mut self,
        what: &'static str,
        mut op: impl FnMut(&mut P) -> Result<T, NativeError>,
    ) -> Result<T, ClipboardError> {
        let mut last_code = CLIPBOARD_LOCKED;
        for attempt in 1..=RETRY_COUNT {
            match op(&mut self.platform) {
                Ok(value) => return Ok(value),
                Err(error) if error.transient => {
                    tracing::debug!(what, attempt, code = error.code, "clipboard busy; retrying");
                    last_code = error.code;
                    if attempt < RETRY_COUNT {
                        thread::sleep(RETRY_DELAY);
                    }
                }
                Err(error) => {
                    tracing::warn!(what, code = error.code, "clipboard call failed");
                    return Err(ClipboardError::Native { code: error.code });
                }
            }
        }
        tracing::warn!(what, code = last_code, "clipboard retries exhausted");
        Err(ClipboardError::Native { code: last_code })
    }

    // =========================================================================
    // Generic surface
    // =========================================================================

    /// Empties the clipboard.
    pub fn clear(&mut self) -> Result<(), ClipboardError> {
        self.retry("clear", |p| p.clear())
    }

    /// Renders any delayed content.
    pub fn flush(&mut self) -> Result<(), ClipboardError> {
        self.retry("flush", |p| p.flush())
    }

    /// Places `data` on the clipboard. With `copy`, the content is flushed
    /// so it survives this process exiting.
    pub fn set_data_object(
        &mut self,
        data: Arc<DataObject>,
        copy: bool,
    ) -> Result<(), ClipboardError> {
        self.retry("set_data_object", |p| p.set_data_object(Arc::clone(&data)))?;
        if copy {
            // Give clipboard listeners a beat before rendering everything.
            thread::sleep(FLUSH_SETTLE_DELAY);
            self.flush()?;
        }
        Ok(())
    }

    /// Reads the clipboard as a read-only [`DataObject`], or `None` when it
    /// is empty.
    pub fn get_data_object(&mut self) -> Result<Option<DataObject>, ClipboardError> {
        let platform_object = self.retry("get_data_object", |p| p.get_data_object())?;
        Ok(platform_object.map(DataObject::from_platform))
    }

    /// Returns `true` if `data` is still what the clipboard holds.
    pub fn is_current(&mut self, data: &Arc<DataObject>) -> Result<bool, ClipboardError> {
        self.retry("is_current", |p| p.is_current(data))
    }

    // =========================================================================
    // Format-name sugar
    // =========================================================================

    /// Returns `true` if data is available under `format`.
    pub fn contains_data(&mut self, format: &str) -> Result<bool, ClipboardError> {
        Ok(self
            .get_data_object()?
            .is_some_and(|data| data.get_data_present(format, true)))
    }

    /// Reads the value under `format` with synonym conversion.
    pub fn get_data(&mut self, format: &str) -> Result<Option<TransferValue>, ClipboardError> {
        Ok(self
            .get_data_object()?
            .and_then(|data| data.get_data(format, true)))
    }

    /// Copies text.
    pub fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut data = DataObject::new();
        data.set_text(text);
        self.set_data_object(Arc::new(data), true)
    }

    /// Reads text through the synonym group.
    pub fn get_text(&mut self) -> Result<Option<String>, ClipboardError> {
        Ok(self.get_data_object()?.and_then(|data| data.get_text()))
    }

    /// Returns `true` if text is available.
    pub fn contains_text(&mut self) -> Result<bool, ClipboardError> {
        Ok(self
            .get_data_object()?
            .is_some_and(|data| data.contains_text()))
    }

    /// Copies a file drop list.
    pub fn set_file_drop_list(&mut self, files: Vec<String>) -> Result<(), ClipboardError> {
        let mut data = DataObject::new();
        data.set_file_drop_list(files);
        self.set_data_object(Arc::new(data), true)
    }

    /// Reads the file drop list.
    pub fn get_file_drop_list(&mut self) -> Result<Option<Vec<String>>, ClipboardError> {
        Ok(self
            .get_data_object()?
            .and_then(|data| data.get_file_drop_list()))
    }

    /// Returns `true` if a file drop list is available.
    pub fn contains_file_drop_list(&mut self) -> Result<bool, ClipboardError> {
        Ok(self
            .get_data_object()?
            .is_some_and(|data| data.contains_file_drop_list()))
    }

    /// Copies an image.
    pub fn set_image(&mut self, image: ImageData) -> Result<(), ClipboardError> {
        let mut data = DataObject::new();
        data.set_image(image);
        self.set_data_object(Arc::new(data), true)
    }

    /// Reads an image through the bitmap synonym group.
    pub fn get_image(&mut self) -> Result<Option<ImageData>, ClipboardError> {
        Ok(self.get_data_object()?.and_then(|data| data.get_image()))
    }

    /// Returns `true` if an image is available.
    pub fn contains_image(&mut self) -> Result<bool, ClipboardError> {
        Ok(self
            .get_data_object()?
            .is_some_and(|data| data.contains_image()))
    }

    /// Copies an audio stream.
    pub fn set_audio(&mut self, bytes: Vec<u8>) -> Result<(), ClipboardError> {
        let mut data = DataObject::new();
        data.set_audio(bytes);
        self.set_data_object(Arc::new(data), true)
    }

    /// Reads the audio stream.
    pub fn get_audio(&mut self) -> Result<Option<Vec<u8>>, ClipboardError> {
        Ok(self.get_data_object()?.and_then(|data| data.get_audio()))
    }

    /// Returns `true` if audio is available.
    pub fn contains_audio(&mut self) -> Result<bool, ClipboardError> {
        Ok(self
            .get_data_object()?
            .is_some_and(|data| data.contains_audio()))
    }
}
