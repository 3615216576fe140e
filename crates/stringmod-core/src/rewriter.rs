// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Import rewriting
//!
//! Emulates a specifier map by rewriting specifier literals in place. Only the
//! string literal of each `import`/`export … from` is touched, so binding
//! forms and statement order survive unchanged.

use crate::analyzer::Analysis;
use crate::edits::TextEdits;
use crate::error::Result;
use crate::inject::SELF_URL_BINDING;
use crate::specifier::ModuleReference;
use indexmap::IndexMap;
use std::borrow::Cow;
use tracing::trace;

/// Rewritten source text
#[derive(Debug)]
pub struct Rewritten<'a> {
    /// Source with specifiers (and `import.meta.url`) substituted
    pub source: Cow<'a, str>,
    /// Whether `import.meta.url` reads now use [`SELF_URL_BINDING`]
    pub self_url_substituted: bool,
}

/// Specifier → target for every reference that needs remapping
pub fn specifier_map(references: &[ModuleReference]) -> IndexMap<&str, &str> {
    references
        .iter()
        .filter_map(|reference| {
            reference
                .rewrite_target()
                .map(|target| (reference.original_text.as_str(), target))
        })
        .collect()
}

/// Rewrite specifiers per the map, and substitute `import.meta.url` when a
/// base location is known.
pub fn rewrite<'a>(
    source: &'a str,
    analysis: &Analysis,
    references: &[ModuleReference],
    base_path: Option<&str>,
) -> Result<Rewritten<'a>> {
    let map = specifier_map(references);
    let mut edits = TextEdits::new();

    for site in &analysis.specifier_sites {
        if let Some(target) = map.get(site.specifier.as_str()) {
            edits.replace(site.range, serde_json::to_string(target)?);
        }
    }

    let self_url_substituted = base_path.is_some() && !analysis.self_url_sites.is_empty();
    if self_url_substituted {
        for site in &analysis.self_url_sites {
            edits.replace(*site, SELF_URL_BINDING);
        }
    }

    trace!(
        remapped = map.len(),
        edits = edits.len(),
        self_url_substituted,
        "rewriting source"
    );

    Ok(Rewritten {
        source: edits.apply(source),
        self_url_substituted,
    })
}
