// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! stringmod - turn module source strings into loadable ES modules
//!
//! Reads module source from a file or stdin, runs it through the
//! materialization pipeline and prints the transformed source or its
//! encoded target.

mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{AdapterKind, Cli, Emit};
use config::{Config, Settings};
use owo_colors::OwoColorize;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use stringmod_adapters::{FetchAdapter, FsAdapter, NodeResolver};
use stringmod_core::{DetachedHost, MaterializeOptions, Materializer, TargetEncoder};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "stringmod=debug,stringmod_core=debug,stringmod_adapters=debug"
    } else {
        "stringmod=warn,stringmod_core=warn,stringmod_adapters=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: &Cli) -> Result<String> {
    let config = Config::load(cli.config.as_deref())?;
    let settings = config.settings(cli)?;
    let source = read_input(&cli.input)?;

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let base = match &settings.base {
        Some(base) => Some(base.clone()),
        None => input_location(&cli.input, &cwd),
    };
    debug!(input = %cli.input, base = base.as_deref(), "materializing");

    let options = build_options(&settings, base, &cwd)?;
    let materializer = Materializer::new(DetachedHost)
        .with_resolver(Arc::new(NodeResolver::new(&cwd)))
        .with_encoder(TargetEncoder::process_wide());
    let artifact = materializer.materialize(&source, &options).await?;

    Ok(match settings.emit {
        Emit::Source => artifact.source,
        Emit::Target => artifact.target.to_string(),
    })
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        return Ok(source);
    }

    std::fs::read_to_string(input).with_context(|| format!("file not found '{input}'"))
}

/// `file:` URL of an input file, used as the default base
fn input_location(input: &str, cwd: &Path) -> Option<String> {
    if input == "-" {
        return None;
    }
    let path = cwd.join(input);
    let path = path.canonicalize().unwrap_or(path);
    Url::from_file_path(path).ok().map(String::from)
}

fn build_options(settings: &Settings, base: Option<String>, cwd: &Path) -> Result<MaterializeOptions> {
    let mut options = MaterializeOptions::new()
        .with_data_map(settings.data.clone())
        .with_implicit_exports(settings.implicit_exports)
        .with_require_shim(settings.require_shim)
        .with_compile_as_function(settings.as_function);

    if let Some(base) = base {
        options = options.with_base_path(base);
    }

    options = match settings.adapter {
        AdapterKind::Fs => options.with_adapter(Arc::new(FsAdapter::new(cwd))),
        AdapterKind::Fetch => options.with_adapter(Arc::new(FetchAdapter::new()?)),
        AdapterKind::None => options,
    };

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_location() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.js"), "").unwrap();

        let location = input_location("main.js", dir.path()).unwrap();
        assert!(location.starts_with("file:///"));
        assert!(location.ends_with("/main.js"));
        assert_eq!(input_location("-", dir.path()), None);
    }

    #[test]
    fn test_build_options() {
        let settings = Settings {
            base: None,
            implicit_exports: false,
            require_shim: true,
            as_function: true,
            adapter: AdapterKind::None,
            emit: Emit::Source,
            data: Default::default(),
        };
        let options =
            build_options(&settings, Some("file:///a.js".to_string()), Path::new("/")).unwrap();
        assert_eq!(options.base_path.as_deref(), Some("file:///a.js"));
        assert!(!options.implicit_exports);
        assert!(options.add_require_shim);
        assert!(options.compile_as_function);
        assert!(options.adapter.is_none());
    }
}
