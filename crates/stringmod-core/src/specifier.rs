// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Specifier classification and module references

use crate::error::HostError;
use std::fmt;
use url::Url;

/// How a specifier is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceMode {
    /// Starts with `/`, `./` or `../`
    Relative,
    /// A parseable absolute URL (`file:`, `https:`, `node:` …)
    Absolute,
    /// A `data:` URI
    Data,
    /// Anything else; looked up by the host's own resolver
    Bare,
}

impl ReferenceMode {
    /// Classify a specifier by its lexical shape. No I/O is performed.
    pub fn classify(specifier: &str) -> Self {
        if specifier.starts_with("data:") {
            return Self::Data;
        }

        if is_relative(specifier) {
            return Self::Relative;
        }

        if Url::parse(specifier).is_ok() {
            return Self::Absolute;
        }

        Self::Bare
    }

    /// Lower-case name used in logs and descriptors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Absolute => "absolute",
            Self::Data => "data",
            Self::Bare => "bare",
        }
    }
}

impl fmt::Display for ReferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a specifier is a relative path reference
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with('/') || specifier.starts_with("./") || specifier.starts_with("../")
}

/// One distinct specifier of a source unit and what is known about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    /// Specifier exactly as written
    pub original_text: String,
    /// Lexical classification
    pub mode: ReferenceMode,
    /// Joined or host-resolved location
    pub resolved_location: Option<String>,
    /// Encoded target of inlined content; wins over `resolved_location`
    pub materialized_target: Option<String>,
    /// `resolved_location` came from the host resolver
    pub was_host_resolved: bool,
    /// Why host resolution failed, if it was attempted and failed
    pub resolution_failure: Option<HostError>,
}

impl ModuleReference {
    /// A reference with nothing resolved yet
    pub fn new(original_text: impl Into<String>) -> Self {
        let original_text = original_text.into();
        let mode = ReferenceMode::classify(&original_text);
        Self {
            original_text,
            mode,
            resolved_location: None,
            materialized_target: None,
            was_host_resolved: false,
            resolution_failure: None,
        }
    }

    /// Best known location: resolved location, else the original text
    pub fn location(&self) -> &str {
        self.resolved_location
            .as_deref()
            .unwrap_or(&self.original_text)
    }

    /// Target the rewriter should point the specifier at, if any
    pub fn rewrite_target(&self) -> Option<&str> {
        if let Some(target) = &self.materialized_target {
            return Some(target);
        }
        if self.was_host_resolved {
            return self
                .resolved_location
                .as_deref()
                .filter(|location| *location != self.original_text);
        }
        None
    }

    /// Description handed to content-resolution hooks
    pub fn descriptor(&self) -> ReferenceDescriptor {
        ReferenceDescriptor {
            name: self.original_text.clone(),
            mode: self.mode,
            path: self.location().to_string(),
            resolved: self.was_host_resolved,
        }
    }
}

/// What a content-resolution hook is told about a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDescriptor {
    /// Specifier as written
    pub name: String,
    /// Lexical classification
    pub mode: ReferenceMode,
    /// Resolved location, or the specifier when unresolved
    pub path: String,
    /// Whether `path` came from the host resolver
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_precedence() {
        assert_eq!(
            ReferenceMode::classify("data:text/javascript,export default 1"),
            ReferenceMode::Data
        );
        assert_eq!(ReferenceMode::classify("./dep.js"), ReferenceMode::Relative);
        assert_eq!(ReferenceMode::classify("../dep.js"), ReferenceMode::Relative);
        assert_eq!(ReferenceMode::classify("/abs/dep.js"), ReferenceMode::Relative);
        assert_eq!(
            ReferenceMode::classify("file:///abs/dep.js"),
            ReferenceMode::Absolute
        );
        assert_eq!(
            ReferenceMode::classify("https://unpkg.com/@zachleat/noop"),
            ReferenceMode::Absolute
        );
        assert_eq!(ReferenceMode::classify("node:fs"), ReferenceMode::Absolute);
        assert_eq!(ReferenceMode::classify("@zachleat/noop"), ReferenceMode::Bare);
        assert_eq!(ReferenceMode::classify("lodash"), ReferenceMode::Bare);
    }

    #[test]
    fn test_rewrite_target_precedence() {
        let mut reference = ModuleReference::new("lodash");
        assert_eq!(reference.rewrite_target(), None);

        reference.resolved_location = Some("file:///n/lodash/index.js".into());
        assert_eq!(reference.rewrite_target(), None);

        reference.was_host_resolved = true;
        assert_eq!(
            reference.rewrite_target(),
            Some("file:///n/lodash/index.js")
        );

        reference.materialized_target = Some("data:text/javascript;charset=utf-8,".into());
        assert_eq!(
            reference.rewrite_target(),
            Some("data:text/javascript;charset=utf-8,")
        );
    }

    #[test]
    fn test_identity_resolution_is_not_a_rewrite() {
        let mut reference = ModuleReference::new("node:fs");
        reference.resolved_location = Some("node:fs".into());
        reference.was_host_resolved = true;
        assert_eq!(reference.rewrite_target(), None);
    }

    #[test]
    fn test_descriptor() {
        let mut reference = ModuleReference::new("./dep.js");
        let descriptor = reference.descriptor();
        assert_eq!(descriptor.path, "./dep.js");
        assert!(!descriptor.resolved);

        reference.resolved_location = Some("file:///proj/dep.js".into());
        let descriptor = reference.descriptor();
        assert_eq!(descriptor.mode, ReferenceMode::Relative);
        assert_eq!(descriptor.path, "file:///proj/dep.js");
    }
}
