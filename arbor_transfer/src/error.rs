// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transfer error taxonomy.
//!
//! Only genuinely recoverable conditions live here. Contract violations
//! (empty format names, writes through forged handles) panic at the call
//! site, and absent data is an `Option`, not an error.

use thiserror::Error;

/// Failures surfaced by data-transfer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Writing through an object bound to a platform source.
    #[error("data object is read-only once bound to a platform source")]
    ReadOnly,

    /// The platform object offers the format but no acceptable medium.
    #[error("no transfer medium available for format '{format}'")]
    MediumUnavailable {
        /// The requested format name.
        format: String,
    },

    /// A native call failed with an OS error code.
    #[error("platform data transfer failed with native error code {code}")]
    Native {
        /// The native error code.
        code: i32,
    },
}
