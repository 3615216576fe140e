// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The materialization pipeline
//!
//! One call walks a source unit through every stage:
//!
//! ```text
//! Analyzing → Resolving → Materializing → Rewriting → Injecting
//!           → Wrapping (as-function only) → Encoding → Loading
//! ```
//!
//! Dependencies supplied by a content adapter go through the same pipeline
//! recursively, depth first and one at a time, before their parent is
//! rewritten.

use crate::adapter::{ContentAdapter, PreprocessContext};
use crate::analyzer::analyze;
use crate::error::{MaterializeError, Result};
use crate::exports::{implicit_exports, wrap_as_function};
use crate::host::ModuleHost;
use crate::inject::{assemble, injected_names, preamble};
use crate::loader::load;
use crate::options::MaterializeOptions;
use crate::resolver::{ensure_resolvable, resolve_reference, NoResolver, SpecifierResolver};
use crate::rewriter::rewrite;
use crate::specifier::ModuleReference;
use crate::target::{FinalArtifact, Target, TargetEncoder};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Pipeline state of one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analyzing,
    Resolving,
    Materializing,
    Rewriting,
    Injecting,
    Wrapping,
    Encoding,
    Loading,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Analyzing => "analyzing",
            Self::Resolving => "resolving",
            Self::Materializing => "materializing",
            Self::Rewriting => "rewriting",
            Self::Injecting => "injecting",
            Self::Wrapping => "wrapping",
            Self::Encoding => "encoding",
            Self::Loading => "loading",
        };
        f.write_str(name)
    }
}

/// Boxed future of one unit; boxing allows the pipeline to recurse
type UnitFuture<'a> = Pin<Box<dyn Future<Output = Result<FinalArtifact>> + Send + 'a>>;

/// Turns module source strings into loadable modules for one host
pub struct Materializer<H: ModuleHost> {
    host: Arc<H>,
    resolver: Arc<dyn SpecifierResolver>,
    encoder: TargetEncoder,
}

impl<H: ModuleHost> Materializer<H> {
    /// Create a materializer for `host`, with no specifier resolution
    pub fn new(host: H) -> Self {
        Self::with_shared_host(Arc::new(host))
    }

    /// Create a materializer for a host shared with other components
    pub fn with_shared_host(host: Arc<H>) -> Self {
        Self {
            host,
            resolver: Arc::new(NoResolver),
            encoder: TargetEncoder::new(),
        }
    }

    /// Use the host's own specifier resolution
    pub fn with_resolver(mut self, resolver: Arc<dyn SpecifierResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use a preconfigured encoder
    pub fn with_encoder(mut self, encoder: TargetEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn encoder(&self) -> &TargetEncoder {
        &self.encoder
    }

    /// Materialize `source` and import it.
    ///
    /// Handles created along the way are released once the import settles.
    pub async fn import_from_string(
        &self,
        source: &str,
        options: &MaterializeOptions,
    ) -> Result<H::Module> {
        let artifact = self.materialize(source, options).await?;
        debug!(stage = %Stage::Loading, target = %artifact.target, "loading module");
        load(self.host.as_ref(), &artifact).await
    }

    /// Run every stage up to encoding, without importing.
    ///
    /// The caller owns any handles in the returned artifact; pass it to
    /// [`load`] or release it with [`FinalArtifact::release`].
    #[instrument(level = "debug", skip_all, fields(base = options.base_path.as_deref()))]
    pub async fn materialize(
        &self,
        source: &str,
        options: &MaterializeOptions,
    ) -> Result<FinalArtifact> {
        let lineage = options.base_path.iter().cloned().collect();
        self.materialize_unit(source.to_string(), options.clone(), lineage)
            .await
    }

    fn materialize_unit(
        &self,
        source: String,
        options: MaterializeOptions,
        lineage: Vec<String>,
    ) -> UnitFuture<'_> {
        Box::pin(async move {
            let mut children = Vec::new();
            match self
                .run_stages(&source, &options, &lineage, &mut children)
                .await
            {
                Ok((source, target)) => Ok(FinalArtifact {
                    source,
                    target,
                    children,
                }),
                Err(err) => {
                    for child in &children {
                        child.release(self.host.as_ref());
                    }
                    debug!(error = %err, "materialization failed");
                    Err(err)
                }
            }
        })
    }

    async fn run_stages(
        &self,
        source: &str,
        options: &MaterializeOptions,
        lineage: &[String],
        children: &mut Vec<FinalArtifact>,
    ) -> Result<(String, Target)> {
        debug!(stage = %Stage::Analyzing, len = source.len());
        let analysis = analyze(source)?;

        debug!(
            stage = %Stage::Resolving,
            specifiers = analysis.import_specifiers.len()
        );
        let base = options.base_path.as_deref();
        let mut references: Vec<ModuleReference> = analysis
            .import_specifiers
            .iter()
            .map(|specifier| resolve_reference(specifier, base, self.resolver.as_ref()))
            .collect();

        if let Some(adapter) = &options.adapter {
            debug!(stage = %Stage::Materializing, references = references.len());
            self.materialize_children(adapter.as_ref(), &mut references, options, lineage, children)
                .await?;
        }
        ensure_resolvable(&references)?;

        debug!(stage = %Stage::Rewriting);
        let rewritten = rewrite(source, &analysis, &references, base)?;
        let self_url_substituted = rewritten.self_url_substituted;
        let mut working = rewritten.source.into_owned();
        let mut replaced = false;

        if let Some(adapter) = &options.adapter {
            let context = PreprocessContext {
                bindings: &analysis.bindings,
                features: analysis.features,
                imports: &analysis.import_specifiers,
                references: references.iter().map(ModuleReference::descriptor).collect(),
            };
            if let Some(text) = adapter.preprocess(&working, &context).await? {
                working = text;
                replaced = true;
            }
        }

        let analysis = if replaced || options.compile_as_function {
            analyze(&working)?
        } else {
            analysis
        };

        debug!(stage = %Stage::Injecting, keys = options.data.len());
        if analysis.features.uses_host_require && !options.add_require_shim {
            warn!("source calls require() but no require shim was requested");
        }
        let preamble = preamble(options, self_url_substituted)?;

        let transformed = if options.compile_as_function {
            debug!(stage = %Stage::Wrapping, bindings = analysis.bindings.len());
            let injected = injected_names(options, self_url_substituted);
            let wrapped = wrap_as_function(&working, &analysis, &injected)?;
            assemble(&preamble, &wrapped, "")
        } else {
            let trailer = implicit_exports(&analysis, options.implicit_exports);
            assemble(&preamble, &working, &trailer)
        };

        debug!(stage = %Stage::Encoding, len = transformed.len());
        let target = self
            .encoder
            .encode(self.host.as_ref(), &transformed)
            .await?;

        Ok((transformed, target))
    }

    /// Ask the adapter for each reference's content and materialize what it
    /// supplies, installing the child's target on the reference.
    async fn materialize_children(
        &self,
        adapter: &dyn ContentAdapter,
        references: &mut [ModuleReference],
        options: &MaterializeOptions,
        lineage: &[String],
        children: &mut Vec<FinalArtifact>,
    ) -> Result<()> {
        for reference in references.iter_mut() {
            let content = adapter.resolve_content(&reference.descriptor()).await?;
            let Some(content) = content.filter(|text| !text.is_empty()) else {
                continue;
            };

            let key = reference.location().to_string();
            let mut chain = lineage.to_vec();
            chain.push(key.clone());
            if lineage.contains(&key) {
                return Err(MaterializeError::CircularReference { chain });
            }

            debug!(specifier = %reference.original_text, location = %key, "materializing dependency");
            let child = self
                .materialize_unit(content, options.for_child(&key), chain)
                .await?;

            reference.materialized_target = Some(child.target.as_str().to_string());
            children.push(child);
        }

        Ok(())
    }
}

impl<H: ModuleHost> fmt::Debug for Materializer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Materializer")
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}
