// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The in-process backing store for data-transfer objects.
//!
//! A [`DataStore`] keys entries by format name. A format can hold several
//! entries (most recent first); each remembers whether it participates in
//! synonym conversion and which aspect/index it was stored under.
//!
//! Synonym expansion happens on the read side: writes land under exactly
//! the given format, and an auto-converting read walks the synonym group
//! when the exact slot is absent or holds only an opaque byte stream.

use hashbrown::HashMap;

use crate::convert::{coerce_bitmap, mapped_formats};
use crate::error::TransferError;
use crate::medium::Aspect;
use crate::object::DataTransfer;
use crate::value::TransferValue;

/// One stored entry.
#[derive(Clone, Debug, PartialEq)]
pub struct DataStoreEntry {
    /// The stored value.
    pub value: TransferValue,
    /// Whether reads may satisfy synonym requests from this entry.
    pub auto_convert: bool,
    /// Presentation aspect the entry was stored under.
    pub aspect: Aspect,
    /// Aspect index (`-1` for the whole content).
    pub index: i32,
}

/// Format-keyed in-process storage.
#[derive(Default, Debug, Clone)]
pub struct DataStore {
    /// Entries per format, most recent first.
    entries: HashMap<String, Vec<DataStoreEntry>>,
}

impl DataStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores a value under `format` with an explicit aspect and index.
    ///
    /// # Panics
    ///
    /// Panics if `format` is empty.
    pub fn set_data_with(
        &mut self,
        format: &str,
        value: TransferValue,
        auto_convert: bool,
        aspect: Aspect,
        index: i32,
    ) {
        assert!(!format.is_empty(), "format name must not be empty");
        let entry = DataStoreEntry {
            value,
            auto_convert,
            aspect,
            index,
        };
        // Most-recent-first: the newest entry wins exact reads.
        self.entries
            .entry(format.to_owned())
            .or_default()
            .insert(0, entry);
    }

    /// Returns the newest entry stored under exactly `format`, filtered by
    /// aspect and index.
    #[must_use]
    pub fn entry_with(&self, format: &str, aspect: Aspect, index: i32) -> Option<&DataStoreEntry> {
        self.entries.get(format).and_then(|list| {
            list.iter()
                .find(|e| e.aspect.contains(aspect) && (e.index == index || e.index == -1))
        })
    }

    fn exact_value(&self, format: &str) -> Option<&DataStoreEntry> {
        self.entries.get(format).and_then(|list| list.first())
    }
}

impl DataTransfer for DataStore {
    fn get_data(&self, format: &str, auto_convert: bool) -> Option<TransferValue> {
        assert!(!format.is_empty(), "format name must not be empty");
        let exact = self.exact_value(format);
        if !auto_convert {
            return exact.map(|e| e.value.clone());
        }

        let mut best = exact.map(|e| e.value.clone());
        if best.as_ref().is_none_or(TransferValue::is_placeholder) {
            for candidate in mapped_formats(format) {
                if candidate == format {
                    continue;
                }
                if let Some(entry) = self.exact_value(candidate)
                    && entry.auto_convert
                    && !entry.value.is_placeholder()
                {
                    best = Some(entry.value.clone());
                    break;
                }
            }
        }
        best.map(|value| coerce_bitmap(format, value))
    }

    fn get_data_present(&self, format: &str, auto_convert: bool) -> bool {
        assert!(!format.is_empty(), "format name must not be empty");
        self.get_formats(auto_convert)
            .iter()
            .any(|candidate| candidate == format)
    }

    fn get_formats(&self, auto_convert: bool) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        for name in names {
            if !out.contains(name) {
                out.push(name.clone());
            }
            let convertible = self.entries[name].iter().any(|e| e.auto_convert);
            if auto_convert && convertible {
                for candidate in mapped_formats(name) {
                    if !out.iter().any(|existing| existing == candidate) {
                        out.push((*candidate).to_owned());
                    }
                }
            }
        }
        out
    }

    fn set_data(
        &mut self,
        format: &str,
        value: TransferValue,
        auto_convert: bool,
    ) -> Result<(), TransferError> {
        self.set_data_with(format, value, auto_convert, Aspect::CONTENT, -1);
        Ok(())
    }
}
