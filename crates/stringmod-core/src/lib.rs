// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # stringmod-core
//!
//! Turns a string of ES module source into something a host's dynamic
//! module loader can import.
//!
//! ## Pipeline
//!
//! - **Analysis**: top-level bindings, module requests and feature flags
//! - **Resolution**: relative joins against a base, host lookup for bare names
//! - **Materialization**: adapter-supplied dependencies, recursively
//! - **Rewriting**: specifier literals point at their final targets
//! - **Injection**: caller data becomes preamble constants
//! - **Export normalization**: implicit `export { … }` or a wrapper function
//! - **Encoding**: transient host handle or `data:` URI, probed once
//! - **Loading**: host import, then handle release
//!
//! ## Example
//!
//! ```no_run
//! use stringmod_core::{DetachedHost, MaterializeOptions, Materializer};
//!
//! # async fn run() -> stringmod_core::Result<()> {
//! let materializer = Materializer::new(DetachedHost);
//! let options = MaterializeOptions::new().with_data("b", 2);
//! let artifact = materializer.materialize("var a = b;", &options).await?;
//! assert_eq!(artifact.source, "const b = 2;\nvar a = b;\nexport { a };");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod analyzer;
pub mod edits;
pub mod error;
pub mod exports;
pub mod host;
pub mod inject;
pub mod loader;
pub mod materializer;
pub mod options;
pub mod resolver;
pub mod rewriter;
pub mod specifier;
pub mod target;

pub use adapter::{ContentAdapter, PreprocessContext};
pub use analyzer::{analyze, Analysis, Features};
pub use error::{BoxError, HostError, MaterializeError, Result};
pub use host::{DetachedHost, ModuleHost};
pub use inject::{DataSerializer, JsonDataSerializer, SELF_URL_BINDING};
pub use loader::load;
pub use materializer::{Materializer, Stage};
pub use options::{DataMap, DataValue, MaterializeOptions};
pub use resolver::{NoResolver, SpecifierResolver};
pub use specifier::{ModuleReference, ReferenceDescriptor, ReferenceMode};
pub use target::{data_uri, Encoding, FinalArtifact, Target, TargetEncoder, DATA_URI_PREFIX};
