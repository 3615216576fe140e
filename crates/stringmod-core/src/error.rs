// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for module materialization

use thiserror::Error;

/// Result type for materialization operations
pub type Result<T> = std::result::Result<T, MaterializeError>;

/// Boxed error raised by a caller-supplied hook
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while materializing or loading a module
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Source text could not be parsed as a module
    #[error("SyntaxError: {message}")]
    Syntax {
        /// Parser diagnostics, one per line
        message: String,
    },

    /// An injected data value cannot be serialized
    #[error(
        "Data passed for injection needs to be JSON-serializable. The '{path}' property was a `function`."
    )]
    Serialization {
        /// Key path of the offending value (e.g. `options.callback`)
        path: String,
    },

    /// The host could not resolve a specifier and no content was supplied for it.
    ///
    /// The message is the host resolver's own wording, unmodified.
    #[error("{message}")]
    UnresolvedSpecifier {
        /// Specifier as written in the source
        specifier: String,
        /// Host resolver failure message
        message: String,
    },

    /// Two options (or an option and the source) cannot be combined
    #[error("Configuration conflict: {0}")]
    ConfigurationConflict(String),

    /// The host lacks a primitive the pipeline needs
    #[error("Unsupported host feature: {0}")]
    UnsupportedHostFeature(String),

    /// A module graph re-entered a module that is still being materialized
    #[error("Circular module reference: {}", chain.join(" -> "))]
    CircularReference {
        /// Module keys from the root to the repeated module
        chain: Vec<String>,
    },

    /// A content-resolution or preprocess hook failed
    #[error("{0}")]
    Adapter(BoxError),

    /// The host's dynamic import rejected the module
    #[error("{0}")]
    Load(String),

    /// JSON serialization failure while emitting data
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MaterializeError {
    /// Wrap an error raised by a content adapter
    pub fn adapter(err: impl Into<BoxError>) -> Self {
        Self::Adapter(err.into())
    }

    /// Create a configuration conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConfigurationConflict(msg.into())
    }
}

/// Failure reported by a host primitive (resolution, handle creation, import)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host does not provide this primitive at all
    #[error("{0}")]
    Unsupported(String),

    /// The primitive exists but failed; the message is the host's own
    #[error("{0}")]
    Failed(String),
}

impl HostError {
    /// Create a failure carrying the host's message
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Create an unsupported-primitive error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// The host's message, unmodified
    pub fn message(&self) -> &str {
        match self {
            Self::Unsupported(msg) | Self::Failed(msg) => msg,
        }
    }
}

impl From<HostError> for MaterializeError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::Unsupported(msg) => Self::UnsupportedHostFeature(msg),
            HostError::Failed(msg) => Self::Load(msg),
        }
    }
}
