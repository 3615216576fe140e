// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the environment adapters

use stringmod_core::{HostError, MaterializeError};
use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors raised while supplying content or resolving specifiers
#[derive(Debug, Error)]
pub enum AdapterError {
    /// No file backs the reference
    #[error("Could not find content for module: {0}")]
    ContentNotFound(String),

    /// A `file:` URL that does not name a local path
    #[error("Invalid file URL: {0}")]
    InvalidFileUrl(String),

    /// Bare specifier with no matching package
    #[error("Cannot find package '{name}' imported from {base}")]
    PackageNotFound { name: String, base: String },

    /// Path specifier with no matching file
    #[error("Cannot find module '{specifier}' imported from {base}")]
    ModuleNotFound { specifier: String, base: String },

    /// Non-success HTTP status
    #[error("Failed to fetch {url}: HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid package.json: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AdapterError> for MaterializeError {
    fn from(err: AdapterError) -> Self {
        MaterializeError::adapter(err)
    }
}

impl From<AdapterError> for HostError {
    fn from(err: AdapterError) -> Self {
        HostError::failed(err.to_string())
    }
}
