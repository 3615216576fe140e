// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Filesystem content adapter

use crate::error::{AdapterError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use stringmod_core::{ContentAdapter, ReferenceDescriptor, ReferenceMode};
use tracing::{debug, instrument};
use url::Url;

/// Supplies module source from the local filesystem.
///
/// Handles `file:` locations, absolute paths and relative references. Every
/// other reference (packages left to the host, URLs, builtins) is declined.
#[derive(Debug, Clone)]
pub struct FsAdapter {
    root: PathBuf,
}

impl FsAdapter {
    /// Adapter resolving unresolved relative references against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Adapter rooted at the current working directory
    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path for a reference, if this adapter handles it
    fn local_path(&self, reference: &ReferenceDescriptor) -> Result<Option<PathBuf>> {
        if reference.path.starts_with("file:") {
            return file_url_to_path(&reference.path).map(Some);
        }

        let path = Path::new(&reference.path);
        if path.is_absolute() {
            return Ok(Some(path.to_path_buf()));
        }

        if reference.mode == ReferenceMode::Relative {
            return Ok(Some(self.root.join(path)));
        }

        Ok(None)
    }

    async fn read(&self, reference: &ReferenceDescriptor, path: &Path) -> Result<String> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                // a relative specifier may have been joined against a base
                // that is not where the file lives
                if reference.mode == ReferenceMode::Relative {
                    let fallback = self.root.join(&reference.name);
                    if fallback != path {
                        debug!(path = %fallback.display(), "retrying relative to root");
                        if let Ok(content) = tokio::fs::read_to_string(&fallback).await {
                            return Ok(content);
                        }
                    }
                }
                Err(AdapterError::ContentNotFound(reference.name.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ContentAdapter for FsAdapter {
    #[instrument(level = "debug", skip_all, fields(name = %reference.name))]
    async fn resolve_content(
        &self,
        reference: &ReferenceDescriptor,
    ) -> stringmod_core::Result<Option<String>> {
        let Some(path) = self.local_path(reference)? else {
            return Ok(None);
        };

        debug!(path = %path.display(), "reading module source");
        Ok(Some(self.read(reference, &path).await?))
    }
}

/// Convert a `file:` URL to a local path
pub fn file_url_to_path(location: &str) -> Result<PathBuf> {
    Url::parse(location)
        .ok()
        .filter(|url| url.scheme() == "file")
        .and_then(|url| url.to_file_path().ok())
        .ok_or_else(|| AdapterError::InvalidFileUrl(location.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn descriptor(name: &str, mode: ReferenceMode, path: &str) -> ReferenceDescriptor {
        ReferenceDescriptor {
            name: name.to_string(),
            mode,
            path: path.to_string(),
            resolved: false,
        }
    }

    #[test]
    fn test_file_url_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("dep.js")).unwrap();
        assert_eq!(
            file_url_to_path(url.as_str()).unwrap(),
            dir.path().join("dep.js")
        );
        assert!(file_url_to_path("https://example.com/dep.js").is_err());
    }

    #[tokio::test]
    async fn test_reads_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dep.js");
        fs::write(&file, "export const dep = 1;").unwrap();

        let adapter = FsAdapter::new(dir.path());
        let url = Url::from_file_path(&file).unwrap();
        let content = adapter
            .resolve_content(&descriptor("./dep.js", ReferenceMode::Relative, url.as_str()))
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("export const dep = 1;"));
    }

    #[tokio::test]
    async fn test_unresolved_relative_reads_from_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dep.js"), "var dep = 1;").unwrap();

        let adapter = FsAdapter::new(dir.path());
        let content = adapter
            .resolve_content(&descriptor("./dep.js", ReferenceMode::Relative, "./dep.js"))
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("var dep = 1;"));
    }

    #[tokio::test]
    async fn test_missing_joined_file_falls_back_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dep.js"), "var dep = 2;").unwrap();

        let adapter = FsAdapter::new(dir.path());
        let elsewhere = Url::from_file_path(dir.path().join("nested").join("dep.js")).unwrap();
        let content = adapter
            .resolve_content(&descriptor("./dep.js", ReferenceMode::Relative, elsewhere.as_str()))
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("var dep = 2;"));
    }

    #[tokio::test]
    async fn test_missing_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = FsAdapter::new(dir.path());
        let err = adapter
            .resolve_content(&descriptor("./nope.js", ReferenceMode::Relative, "./nope.js"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Could not find content for module: ./nope.js");
    }

    #[tokio::test]
    async fn test_declines_other_references() {
        let adapter = FsAdapter::new(".");
        for (name, mode) in [
            ("node:fs", ReferenceMode::Absolute),
            ("https://unpkg.com/x", ReferenceMode::Absolute),
            ("lodash", ReferenceMode::Bare),
        ] {
            let content = adapter
                .resolve_content(&descriptor(name, mode, name))
                .await
                .unwrap();
            assert_eq!(content, None, "{name}");
        }
    }
}
