// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration file (`stringmod.toml`)
//!
//! ```toml
//! [options]
//! base = "file:///srv/app/main.js"
//! implicit_exports = true
//! require_shim = false
//! as_function = false
//! adapter = "fs"
//! emit = "source"
//!
//! [data]
//! name = "stringmod"
//! limits = { max = 3 }
//! ```

use crate::cli::{AdapterKind, Cli, Emit};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stringmod_core::{DataMap, DataValue};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "stringmod.toml";

/// Contents of a configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub options: OptionsSection,
    pub data: toml::Table,
}

/// `[options]`; unset keys fall back to built-in defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsSection {
    pub base: Option<String>,
    pub implicit_exports: Option<bool>,
    pub require_shim: Option<bool>,
    pub as_function: Option<bool>,
    pub adapter: Option<AdapterKind>,
    pub emit: Option<Emit>,
}

/// Options after merging flags over the file over defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base: Option<String>,
    pub implicit_exports: bool,
    pub require_shim: bool,
    pub as_function: bool,
    pub adapter: AdapterKind,
    pub emit: Emit,
    pub data: DataMap,
}

impl Config {
    /// Load an explicit file, or `./stringmod.toml` when it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Merge command line flags over this file
    pub fn settings(&self, cli: &Cli) -> Result<Settings> {
        let options = &self.options;

        let mut data = DataMap::new();
        for (key, value) in &self.data {
            let json = serde_json::to_value(value)
                .with_context(|| format!("data value '{key}' is not representable"))?;
            data.insert(key.clone(), DataValue::from(json));
        }
        for (key, value) in &cli.data {
            data.insert(key.clone(), DataValue::from(value.clone()));
        }

        Ok(Settings {
            base: cli.base.clone().or_else(|| options.base.clone()),
            implicit_exports: !cli.no_implicit_exports && options.implicit_exports.unwrap_or(true),
            require_shim: cli.require_shim || options.require_shim.unwrap_or(false),
            as_function: cli.as_function || options.as_function.unwrap_or(false),
            adapter: cli.adapter.or(options.adapter).unwrap_or_default(),
            emit: cli.emit.or(options.emit).unwrap_or_default(),
            data,
        })
    }
}
