// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Target encoding
//!
//! Final source is loaded either through a transient host handle or as a
//! self-contained `data:` URI. Which one is decided by probing the host once.

use crate::error::Result;
use crate::host::ModuleHost;
use std::fmt;
use tokio::sync::OnceCell;
use tracing::debug;

/// Prefix of every generated data URI
pub const DATA_URI_PREFIX: &str = "data:text/javascript;charset=utf-8,";

/// Source the capability probe imports
const PROBE_SOURCE: &str = "/* */";

/// How final source is handed to the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Host handles, released after loading
    TransientHandle,
    /// Percent-encoded `data:` URI
    DataUri,
}

/// A loadable target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Handle(String),
    DataUri(String),
}

impl Target {
    /// The string passed to the host import
    pub fn as_str(&self) -> &str {
        match self {
            Self::Handle(s) | Self::DataUri(s) => s,
        }
    }

    pub fn is_handle(&self) -> bool {
        matches!(self, Self::Handle(_))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-encode source into a `data:` URI
pub fn data_uri(source: &str) -> String {
    format!("{DATA_URI_PREFIX}{}", urlencoding::encode(source))
}

/// Transformed source and its target, with the artifacts of every inlined
/// dependency.
///
/// Owns the handles behind its targets, so it is not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct FinalArtifact {
    /// Fully transformed source
    pub source: String,
    /// Where the loader imports it from
    pub target: Target,
    /// Artifacts of materialized dependencies
    pub children: Vec<FinalArtifact>,
}

impl FinalArtifact {
    /// Every handle held by this artifact and its dependencies
    pub fn handles(&self) -> Vec<&str> {
        let mut handles = Vec::new();
        self.collect_handles(&mut handles);
        handles
    }

    fn collect_handles<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Target::Handle(handle) = &self.target {
            out.push(handle);
        }
        for child in &self.children {
            child.collect_handles(out);
        }
    }

    /// Revoke every handle held by this artifact and its dependencies
    pub fn release<H: ModuleHost + ?Sized>(&self, host: &H) {
        for handle in self.handles() {
            host.revoke_handle(handle);
        }
    }
}

/// Probe result shared by every [`TargetEncoder::process_wide`] encoder
static PROCESS_ENCODING: OnceCell<Encoding> = OnceCell::const_new();

#[derive(Debug)]
enum EncodingCell {
    Local(OnceCell<Encoding>),
    Process(&'static OnceCell<Encoding>),
}

impl EncodingCell {
    fn cell(&self) -> &OnceCell<Encoding> {
        match self {
            Self::Local(cell) => cell,
            Self::Process(cell) => cell,
        }
    }
}

/// Encodes source as a [`Target`], probing the host on first use.
///
/// The probe runs at most once per encoder, even under concurrent callers.
/// [`TargetEncoder::new`] keeps the result for this encoder alone; encoders
/// from [`TargetEncoder::process_wide`] share one result for the life of the
/// process, so they must all front the same kind of host.
#[derive(Debug)]
pub struct TargetEncoder {
    encoding: EncodingCell,
}

impl Default for TargetEncoder {
    fn default() -> Self {
        Self {
            encoding: EncodingCell::Local(OnceCell::new()),
        }
    }
}

impl TargetEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An encoder sharing the process-wide probe result
    pub fn process_wide() -> Self {
        Self {
            encoding: EncodingCell::Process(&PROCESS_ENCODING),
        }
    }

    /// An encoder whose decision is already made
    pub fn with_encoding(encoding: Encoding) -> Self {
        Self {
            encoding: EncodingCell::Local(OnceCell::new_with(Some(encoding))),
        }
    }

    /// The probed encoding, if the probe has run
    pub fn probed(&self) -> Option<Encoding> {
        self.encoding.cell().get().copied()
    }

    /// The encoding for `host`, probing it the first time
    pub async fn encoding<H: ModuleHost + ?Sized>(&self, host: &H) -> Encoding {
        *self.encoding.cell().get_or_init(|| probe(host)).await
    }

    /// Encode `source` for loading through `host`
    pub async fn encode<H: ModuleHost + ?Sized>(&self, host: &H, source: &str) -> Result<Target> {
        Ok(match self.encoding(host).await {
            Encoding::TransientHandle => Target::Handle(host.create_handle(source)?),
            Encoding::DataUri => Target::DataUri(data_uri(source)),
        })
    }
}

/// Import a trivial module through a handle; any failure means handles are
/// unusable.
async fn probe<H: ModuleHost + ?Sized>(host: &H) -> Encoding {
    let encoding = match host.create_handle(PROBE_SOURCE) {
        Ok(handle) => {
            let imported = host.import(&handle).await;
            host.revoke_handle(&handle);
            match imported {
                Ok(_) => Encoding::TransientHandle,
                Err(_) => Encoding::DataUri,
            }
        }
        Err(_) => Encoding::DataUri,
    };

    debug!(?encoding, "probed host target encoding");
    encoding
}
