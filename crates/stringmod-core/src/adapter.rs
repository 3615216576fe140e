// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Content adapter capability
//!
//! An adapter is the environment-specific half of the pipeline: it supplies
//! source text for references the host cannot load directly, and may rewrite
//! a unit's source before data is injected.

use crate::analyzer::Features;
use crate::error::Result;
use crate::specifier::ReferenceDescriptor;
use async_trait::async_trait;
use indexmap::IndexSet;

/// What a preprocess hook sees of the unit being materialized
#[derive(Debug, Clone)]
pub struct PreprocessContext<'a> {
    /// Top-level bindings
    pub bindings: &'a IndexSet<String>,
    /// Feature flags
    pub features: Features,
    /// Module request specifiers as written
    pub imports: &'a IndexSet<String>,
    /// Every reference with its resolution state
    pub references: Vec<ReferenceDescriptor>,
}

/// Environment strategy for content resolution and preprocessing
#[async_trait]
pub trait ContentAdapter: Send + Sync {
    /// Supply source for a reference.
    ///
    /// `Ok(None)` or empty text leaves the reference to host resolution.
    async fn resolve_content(&self, reference: &ReferenceDescriptor) -> Result<Option<String>>;

    /// Optionally replace the working source before injection.
    async fn preprocess(
        &self,
        _source: &str,
        _context: &PreprocessContext<'_>,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}
