// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Command line arguments

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// stringmod - turn module source strings into loadable ES modules
#[derive(Parser, Debug)]
#[command(name = "stringmod")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Module source file, or `-` for stdin
    pub input: String,

    /// Base location for relative imports and `import.meta.url`
    #[arg(long)]
    pub base: Option<String>,

    /// Inject a constant, e.g. `--data count=3` (repeatable)
    #[arg(long = "data", value_name = "KEY=JSON", value_parser = parse_data_arg)]
    pub data: Vec<(String, serde_json::Value)>,

    /// Emit a default-exported wrapper function
    #[arg(long)]
    pub as_function: bool,

    /// Do not append `export { … }` for undeclared exports
    #[arg(long)]
    pub no_implicit_exports: bool,

    /// Declare `require` via `createRequire`
    #[arg(long)]
    pub require_shim: bool,

    /// Where dependency source comes from
    #[arg(long, value_enum)]
    pub adapter: Option<AdapterKind>,

    /// What to print
    #[arg(long, value_enum)]
    pub emit: Option<Emit>,

    /// Configuration file (defaults to ./stringmod.toml when present)
    #[arg(long, env = "STRINGMOD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Content adapter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Read dependencies from the filesystem
    #[default]
    Fs,
    /// Fetch dependencies over HTTP(S)
    Fetch,
    /// Never inline dependencies
    None,
}

/// Output selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emit {
    /// The transformed module source
    #[default]
    Source,
    /// The encoded loadable target
    Target,
}

/// Parse `KEY=JSON`; a value that is not JSON is taken as a string
fn parse_data_arg(arg: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=JSON, got '{arg}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{arg}'"));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
