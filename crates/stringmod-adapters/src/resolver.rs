// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Node-style specifier resolution for hosts with filesystem access

use crate::error::{AdapterError, Result};
use crate::fs::file_url_to_path;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use stringmod_core::{HostError, SpecifierResolver};
use tracing::trace;
use url::Url;

/// Built-in module names, resolved to `node:` URLs
const BUILTINS: &[&str] = &[
    "assert",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "https",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

/// Extensions tried for extensionless paths
const EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".json"];

/// `exports` conditions honored, in priority order
const CONDITIONS: &[&str] = &["import", "node", "default"];

/// Resolves specifiers the way Node's ESM loader does, to `file:` URLs.
///
/// Builtins become `node:` URLs; other absolute URLs pass through.
#[derive(Debug, Clone)]
pub struct NodeResolver {
    /// Directory used when no base location is given
    root: PathBuf,
}

impl NodeResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolver rooted at the current working directory
    pub fn from_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// Check if a module is a built-in
    pub fn is_builtin(name: &str) -> bool {
        let name = name.strip_prefix("node:").unwrap_or(name);
        BUILTINS.contains(&name)
    }

    /// Resolve `specifier` imported from `base`
    pub fn resolve_location(&self, specifier: &str, base: Option<&str>) -> Result<String> {
        if Self::is_builtin(specifier) {
            let name = specifier.strip_prefix("node:").unwrap_or(specifier);
            return Ok(format!("node:{name}"));
        }

        if let Ok(url) = Url::parse(specifier) {
            if url.scheme() != "file" {
                return Ok(specifier.to_string());
            }
            let path = file_url_to_path(specifier)?;
            let base = self.base_display(base);
            return self.resolve_file(&path, specifier, &base).and_then(to_file_url);
        }

        let parent = self.parent_dir(base)?;
        let base = self.base_display(base);

        if specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/') {
            let path = parent.join(specifier);
            return self.resolve_file(&path, specifier, &base).and_then(to_file_url);
        }

        self.resolve_package(specifier, &parent, &base)
            .and_then(to_file_url)
    }

    /// Directory the base location lives in
    fn parent_dir(&self, base: Option<&str>) -> Result<PathBuf> {
        let Some(base) = base else {
            return Ok(self.root.clone());
        };
        let path = if base.starts_with("file:") {
            file_url_to_path(base)?
        } else {
            PathBuf::from(base)
        };
        Ok(path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone()))
    }

    fn base_display(&self, base: Option<&str>) -> String {
        match base {
            Some(base) => file_url_to_path(base)
                .map(|path| path.display().to_string())
                .unwrap_or_else(|_| base.to_string()),
            None => self.root.display().to_string(),
        }
    }

    /// Exact file, then with each extension, then as a directory
    fn resolve_file(&self, path: &Path, specifier: &str, base: &str) -> Result<PathBuf> {
        if let Some(found) = probe_file(path) {
            return Ok(found);
        }

        if path.is_dir() {
            if let Some(found) = self.resolve_directory(path)? {
                return Ok(found);
            }
        }

        Err(AdapterError::ModuleNotFound {
            specifier: specifier.to_string(),
            base: base.to_string(),
        })
    }

    /// Package entry point, then an index file
    fn resolve_directory(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let package_json_path = dir.join("package.json");
        if package_json_path.is_file() {
            let content = std::fs::read_to_string(&package_json_path)?;
            let pkg: PackageJson = serde_json::from_str(&content)?;
            if let Some(entry) = pkg.entry_point() {
                if let Some(found) = probe_file(&dir.join(entry)) {
                    return Ok(Some(found));
                }
            }
        }

        Ok(EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("index{ext}")))
            .find(|index| index.is_file())
            .map(|index| canonical(&index)))
    }

    /// Walk up from `parent` through every `node_modules`
    fn resolve_package(&self, specifier: &str, parent: &Path, base: &str) -> Result<PathBuf> {
        let (package_name, subpath) = parse_package_specifier(specifier);

        let mut current = Some(parent);
        while let Some(dir) = current {
            let package_dir = dir.join("node_modules").join(package_name);
            trace!(dir = %package_dir.display(), "probing package");

            if package_dir.is_dir() {
                let found = match subpath {
                    Some(sub) => {
                        let target = package_dir.join(sub);
                        match probe_file(&target) {
                            Some(found) => Some(found),
                            None if target.is_dir() => self.resolve_directory(&target)?,
                            None => None,
                        }
                    }
                    None => self.resolve_directory(&package_dir)?,
                };
                if let Some(found) = found {
                    return Ok(found);
                }
            }

            current = dir.parent();
        }

        Err(AdapterError::PackageNotFound {
            name: package_name.to_string(),
            base: base.to_string(),
        })
    }
}

impl SpecifierResolver for NodeResolver {
    fn resolve(&self, specifier: &str, base: Option<&str>) -> std::result::Result<String, HostError> {
        Ok(self.resolve_location(specifier, base)?)
    }
}

/// Existing file at `path`, or at `path` plus one of the known extensions
fn probe_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(canonical(path));
    }

    let file_name = path.file_name()?.to_string_lossy().to_string();
    EXTENSIONS
        .iter()
        .map(|ext| path.with_file_name(format!("{file_name}{ext}")))
        .find(|candidate| candidate.is_file())
        .map(|found| canonical(&found))
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn to_file_url(path: PathBuf) -> Result<String> {
    Url::from_file_path(&path)
        .map(String::from)
        .map_err(|_| AdapterError::InvalidFileUrl(path.display().to_string()))
}

/// Split a package specifier into name and optional subpath
fn parse_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    if let Some(scoped) = specifier.strip_prefix('@') {
        // @scope/name or @scope/name/subpath
        if let Some(slash_pos) = scoped.find('/') {
            let after_scope = &scoped[slash_pos + 1..];
            if let Some(subpath_pos) = after_scope.find('/') {
                let name_end = slash_pos + 2 + subpath_pos;
                return (&specifier[..name_end], Some(&specifier[name_end + 1..]));
            }
        }
        (specifier, None)
    } else if let Some(slash_pos) = specifier.find('/') {
        (&specifier[..slash_pos], Some(&specifier[slash_pos + 1..]))
    } else {
        (specifier, None)
    }
}

/// Fields of package.json that select an entry point
#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    exports: Option<Value>,
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    main: Option<String>,
}

impl PackageJson {
    /// `exports` root target, then `module`, then `main`
    fn entry_point(&self) -> Option<&str> {
        self.exports
            .as_ref()
            .and_then(export_target)
            .or(self.module.as_deref())
            .or(self.main.as_deref())
    }
}

/// Root target of an `exports` value
fn export_target(value: &Value) -> Option<&str> {
    match value {
        Value::String(target) => Some(target.as_str()),
        Value::Object(map) => {
            if let Some(root) = map.get(".") {
                return export_target(root);
            }
            CONDITIONS
                .iter()
                .find_map(|condition| map.get(*condition).and_then(export_target))
        }
        Value::Array(targets) => targets.iter().find_map(export_target),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn url_of(path: &Path) -> String {
        Url::from_file_path(path.canonicalize().unwrap())
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_is_builtin() {
        assert!(NodeResolver::is_builtin("fs"));
        assert!(NodeResolver::is_builtin("node:path"));
        assert!(!NodeResolver::is_builtin("lodash"));
    }

    #[test]
    fn test_builtins_and_urls() {
        let resolver = NodeResolver::new("/");
        assert_eq!(resolver.resolve("fs", None).unwrap(), "node:fs");
        assert_eq!(resolver.resolve("node:fs", None).unwrap(), "node:fs");
        assert_eq!(
            resolver.resolve("https://unpkg.com/x", None).unwrap(),
            "https://unpkg.com/x"
        );
    }

    #[test]
    fn test_parse_package_specifier() {
        assert_eq!(parse_package_specifier("lodash"), ("lodash", None));
        assert_eq!(parse_package_specifier("lodash/get"), ("lodash", Some("get")));
        assert_eq!(parse_package_specifier("@types/node"), ("@types/node", None));
        assert_eq!(
            parse_package_specifier("@babel/core/lib/index"),
            ("@babel/core", Some("lib/index"))
        );
    }

    #[test]
    fn test_export_target() {
        assert_eq!(export_target(&json!("./index.js")), Some("./index.js"));
        assert_eq!(
            export_target(&json!({ ".": { "require": "./c.cjs", "import": "./e.mjs" } })),
            Some("./e.mjs")
        );
        assert_eq!(
            export_target(&json!({ "default": "./d.js" })),
            Some("./d.js")
        );
        assert_eq!(export_target(&json!({ "require": "./c.cjs" })), None);
    }

    #[test]
    fn test_relative_with_extension_probe() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/dep.mjs"), "export {}").unwrap();
        fs::write(dir.path().join("src/main.js"), "").unwrap();

        let resolver = NodeResolver::new(dir.path());
        let base = url_of(&dir.path().join("src/main.js"));
        assert_eq!(
            resolver.resolve("./dep", Some(&base)).unwrap(),
            url_of(&dir.path().join("src/dep.mjs"))
        );
    }

    #[test]
    fn test_joined_file_url() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dep.js"), "").unwrap();

        let resolver = NodeResolver::new(dir.path());
        let joined = url_of(&dir.path().join("dep.js"));
        assert_eq!(resolver.resolve(&joined, None).unwrap(), joined);
    }

    #[test]
    fn test_package_lookup_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("node_modules/@zachleat/noop");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            pkg.join("package.json"),
            r#"{ "main": "cjs.js", "exports": { ".": { "import": "./esm.js" } } }"#,
        )
        .unwrap();
        fs::write(pkg.join("esm.js"), "export function noop() {}").unwrap();
        fs::create_dir_all(dir.path().join("src/deep")).unwrap();

        let resolver = NodeResolver::new(dir.path());
        let base = Url::from_file_path(dir.path().join("src/deep/main.js"))
            .unwrap()
            .to_string();
        assert_eq!(
            resolver.resolve("@zachleat/noop", Some(&base)).unwrap(),
            url_of(&pkg.join("esm.js"))
        );
    }

    #[test]
    fn test_package_index_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("node_modules/plain");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("index.js"), "").unwrap();

        let resolver = NodeResolver::new(dir.path());
        assert_eq!(
            resolver.resolve("plain", None).unwrap(),
            url_of(&pkg.join("index.js"))
        );
    }

    #[test]
    fn test_missing_package_uses_node_wording() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = NodeResolver::new(dir.path());
        let base_path = dir.path().join("main.js");
        let base = Url::from_file_path(&base_path).unwrap().to_string();

        let err = resolver.resolve("@zachleat/noop", Some(&base)).unwrap_err();
        assert_eq!(
            err,
            HostError::failed(format!(
                "Cannot find package '@zachleat/noop' imported from {}",
                base_path.display()
            ))
        );
    }

    #[test]
    fn test_missing_relative_module() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = NodeResolver::new(dir.path());
        let err = resolver.resolve("./missing.js", None).unwrap_err();
        assert!(err.message().starts_with("Cannot find module './missing.js'"));
    }
}
