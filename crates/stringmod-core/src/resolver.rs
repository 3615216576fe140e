// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Specifier resolution
//!
//! Combines lexical classification, URL joining against a base location and
//! the host's own specifier resolver into a [`ModuleReference`].

use crate::error::{HostError, MaterializeError, Result};
use crate::specifier::{ModuleReference, ReferenceMode};
use tracing::debug;
use url::Url;

/// The host runtime's own module-specifier resolution.
///
/// Returns an absolute location for `specifier`, resolving relative forms
/// against `base` when one is given.
pub trait SpecifierResolver: Send + Sync {
    /// Resolve a specifier to an absolute location
    fn resolve(&self, specifier: &str, base: Option<&str>) -> std::result::Result<String, HostError>;
}

/// Resolver for hosts without a specifier-resolution primitive
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl SpecifierResolver for NoResolver {
    fn resolve(&self, _specifier: &str, _base: Option<&str>) -> std::result::Result<String, HostError> {
        Err(HostError::unsupported(
            "the host does not provide module specifier resolution",
        ))
    }
}

/// Build the reference for one specifier.
///
/// Never fails: a host resolution failure is recorded on the reference so a
/// content hook can still supply the module out-of-band.
pub fn resolve_reference(
    specifier: &str,
    base: Option<&str>,
    resolver: &dyn SpecifierResolver,
) -> ModuleReference {
    let mut reference = ModuleReference::new(specifier);

    match reference.mode {
        ReferenceMode::Data | ReferenceMode::Absolute => {
            reference.resolved_location = Some(specifier.to_string());
        }
        ReferenceMode::Relative => match base.map(|base| join(base, specifier)) {
            Some(Some(joined)) => {
                match resolver.resolve(&joined, None) {
                    Ok(location) => {
                        reference.resolved_location = Some(location);
                        reference.was_host_resolved = true;
                    }
                    Err(err) => {
                        reference.resolved_location = Some(joined);
                        reference.resolution_failure = Some(err);
                    }
                }
            }
            // base missing or not a URL: the host decides, otherwise the
            // text is carried forward
            _ => host_resolve(&mut reference, base, resolver),
        },
        ReferenceMode::Bare => host_resolve(&mut reference, base, resolver),
    }

    debug!(
        specifier,
        mode = %reference.mode,
        location = reference.resolved_location.as_deref(),
        host_resolved = reference.was_host_resolved,
        "resolved specifier"
    );

    reference
}

fn host_resolve(reference: &mut ModuleReference, base: Option<&str>, resolver: &dyn SpecifierResolver) {
    match resolver.resolve(&reference.original_text, base) {
        Ok(location) => {
            reference.resolved_location = Some(location);
            reference.was_host_resolved = true;
        }
        Err(err) => reference.resolution_failure = Some(err),
    }
}

/// Standard URL join of a relative specifier onto a base location
pub fn join(base: &str, specifier: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(specifier).ok().map(String::from)
}

/// Fail for references nothing can satisfy.
///
/// A bare reference needs a host resolution or a materialized target. A
/// relative one only fails when the host definitely could not resolve it;
/// without a resolver the host's loader reports it instead.
pub fn ensure_resolvable(references: &[ModuleReference]) -> Result<()> {
    for reference in references {
        if reference.materialized_target.is_some() || reference.was_host_resolved {
            continue;
        }

        match (reference.mode, &reference.resolution_failure) {
            (ReferenceMode::Bare | ReferenceMode::Relative, Some(HostError::Failed(msg))) => {
                return Err(MaterializeError::UnresolvedSpecifier {
                    specifier: reference.original_text.clone(),
                    message: msg.clone(),
                });
            }
            (ReferenceMode::Bare, Some(HostError::Unsupported(msg))) => {
                return Err(MaterializeError::UnsupportedHostFeature(format!(
                    "cannot resolve '{}': {}",
                    reference.original_text, msg
                )));
            }
            (ReferenceMode::Bare, None) => {
                return Err(MaterializeError::UnresolvedSpecifier {
                    specifier: reference.original_text.clone(),
                    message: format!(
                        "Failed to resolve module specifier \"{}\"",
                        reference.original_text
                    ),
                });
            }
            _ => {}
        }
    }

    Ok(())
}
