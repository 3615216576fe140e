// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Source analysis
//!
//! Parses module source with oxc and extracts, in one pass over the tree:
//! - top-level bindings (declarations, destructuring patterns, import locals)
//! - module request specifiers (`import … from`, `export … from`)
//! - feature flags (`export` syntax, `require()` calls, `import.meta.url`)
//! - names read but never declared (wrapper parameters)
//!
//! Byte ranges of everything the later stages edit are kept alongside, so the
//! rewriter and wrapper never need to re-walk the tree.

use crate::error::{MaterializeError, Result};
use indexmap::IndexSet;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPattern, BindingPatternKind, CallExpression, Declaration, Expression,
    ImportDeclarationSpecifier, Program, Statement, StaticMemberExpression, StringLiteral,
    VariableDeclaration,
};
use oxc_ast::visit::walk;
use oxc_ast::Visit;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::{GetSpan, SourceType, Span};
use std::ops::Range;
use tracing::trace;

/// Half-open byte range into the analyzed source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    /// First byte
    pub start: usize,
    /// One past the last byte
    pub end: usize,
}

impl TextRange {
    /// Range as a slice index
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        Self {
            start: span.start as usize,
            end: span.end as usize,
        }
    }
}

/// Syntax features observed anywhere in the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    /// Any `export` statement is present
    pub has_explicit_export: bool,
    /// Something is exported under the name `default`
    pub has_default_export: bool,
    /// A `require(...)` call appears
    pub uses_host_require: bool,
    /// An `import.meta.url` expression appears
    pub uses_self_url: bool,
}

/// A module request specifier and the string literal it was written as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifierSite {
    /// Specifier value (quotes removed)
    pub specifier: String,
    /// Range of the string literal, quotes included
    pub range: TextRange,
}

/// Top-level statement carrying module syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleItem {
    /// `import … from "x"` / `import "x"`
    Import(TextRange),
    /// `export { … } from "x"` / `export * from "x"`
    Reexport(TextRange),
    /// `export { a, b as c }`
    ExportList(TextRange),
    /// `export const …` / `export function …` / `export class …`
    ExportDeclaration {
        /// Whole statement
        range: TextRange,
        /// Start of the wrapped declaration
        declaration_start: usize,
    },
    /// `export default …`
    ExportDefault(TextRange),
}

/// Everything the pipeline needs to know about one source unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// Names introduced at the top level
    pub bindings: IndexSet<String>,
    /// Distinct module request specifiers, in source order
    pub import_specifiers: IndexSet<String>,
    /// Feature flags
    pub features: Features,
    /// Names read but not declared anywhere in the module, sorted
    pub referenced_names: IndexSet<String>,
    /// Every specifier literal, one entry per occurrence
    pub specifier_sites: Vec<SpecifierSite>,
    /// Every `import.meta.url` expression
    pub self_url_sites: Vec<TextRange>,
    /// Top-level module syntax, in source order
    pub module_items: Vec<ModuleItem>,
}

/// Parse and analyze module source text.
///
/// Fails with [`MaterializeError::Syntax`] when the text is not a valid
/// module; no partial analysis is returned.
pub fn analyze(source: &str) -> Result<Analysis> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        return Err(syntax_error(ret.errors.iter().map(ToString::to_string)));
    }

    let program: &Program<'_> = allocator.alloc(ret.program);
    let semantic_ret = SemanticBuilder::new()
        .with_check_syntax_error(true)
        .build(program);

    if !semantic_ret.errors.is_empty() {
        return Err(syntax_error(
            semantic_ret.errors.iter().map(ToString::to_string),
        ));
    }

    let mut referenced: Vec<String> = semantic_ret
        .semantic
        .scopes()
        .root_unresolved_references()
        .keys()
        .map(ToString::to_string)
        .collect();
    referenced.sort();

    let mut analysis = scan_top_level(program);
    analysis.referenced_names = referenced.into_iter().collect();

    let scan = FeatureScan::collect(program);
    analysis.features.uses_host_require = scan.uses_host_require;
    analysis.features.uses_self_url = !scan.self_url_sites.is_empty();
    analysis.self_url_sites = scan.self_url_sites;

    trace!(
        bindings = analysis.bindings.len(),
        specifiers = analysis.import_specifiers.len(),
        features = ?analysis.features,
        "analyzed source"
    );

    Ok(analysis)
}

fn syntax_error(messages: impl Iterator<Item = String>) -> MaterializeError {
    let message = messages.collect::<Vec<_>>().join("\n");
    MaterializeError::Syntax {
        message: if message.is_empty() {
            "Unexpected end of input".to_string()
        } else {
            message
        },
    }
}

/// Walk top-level statements only; nested scopes never contribute bindings.
fn scan_top_level(program: &Program<'_>) -> Analysis {
    let mut analysis = Analysis::default();

    for stmt in &program.body {
        match stmt {
            Statement::VariableDeclaration(decl) => {
                collect_declarators(decl, &mut analysis.bindings);
            }
            Statement::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    analysis.bindings.insert(id.name.to_string());
                }
            }
            Statement::ClassDeclaration(class) => {
                if let Some(id) = &class.id {
                    analysis.bindings.insert(id.name.to_string());
                }
            }
            Statement::ImportDeclaration(import) => {
                record_specifier(&mut analysis, &import.source);
                if let Some(specifiers) = &import.specifiers {
                    for spec in specifiers {
                        let local = match spec {
                            ImportDeclarationSpecifier::ImportSpecifier(s) => &s.local,
                            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => &s.local,
                            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => &s.local,
                        };
                        analysis.bindings.insert(local.name.to_string());
                    }
                }
                analysis
                    .module_items
                    .push(ModuleItem::Import(import.span.into()));
            }
            Statement::ExportNamedDeclaration(export) => {
                analysis.features.has_explicit_export = true;
                // `export { a as default }` and `export { default } from …`
                if export
                    .specifiers
                    .iter()
                    .any(|spec| spec.exported.name().as_str() == "default")
                {
                    analysis.features.has_default_export = true;
                }
                let range = TextRange::from(export.span);

                if let Some(decl) = &export.declaration {
                    match decl {
                        Declaration::VariableDeclaration(var_decl) => {
                            collect_declarators(var_decl, &mut analysis.bindings);
                        }
                        Declaration::FunctionDeclaration(func) => {
                            if let Some(id) = &func.id {
                                analysis.bindings.insert(id.name.to_string());
                            }
                        }
                        Declaration::ClassDeclaration(class) => {
                            if let Some(id) = &class.id {
                                analysis.bindings.insert(id.name.to_string());
                            }
                        }
                        _ => {}
                    }
                    analysis.module_items.push(ModuleItem::ExportDeclaration {
                        range,
                        declaration_start: decl.span().start as usize,
                    });
                } else if let Some(source) = &export.source {
                    record_specifier(&mut analysis, source);
                    analysis.module_items.push(ModuleItem::Reexport(range));
                } else {
                    analysis.module_items.push(ModuleItem::ExportList(range));
                }
            }
            Statement::ExportAllDeclaration(export) => {
                analysis.features.has_explicit_export = true;
                if export
                    .exported
                    .as_ref()
                    .is_some_and(|name| name.name().as_str() == "default")
                {
                    analysis.features.has_default_export = true;
                }
                record_specifier(&mut analysis, &export.source);
                analysis
                    .module_items
                    .push(ModuleItem::Reexport(export.span.into()));
            }
            Statement::ExportDefaultDeclaration(export) => {
                analysis.features.has_explicit_export = true;
                analysis.features.has_default_export = true;
                analysis
                    .module_items
                    .push(ModuleItem::ExportDefault(export.span.into()));
            }
            _ => {}
        }
    }

    analysis
}

fn record_specifier(analysis: &mut Analysis, literal: &StringLiteral<'_>) {
    let specifier = literal.value.to_string();
    analysis.import_specifiers.insert(specifier.clone());
    analysis.specifier_sites.push(SpecifierSite {
        specifier,
        range: literal.span.into(),
    });
}

fn collect_declarators(decl: &VariableDeclaration<'_>, out: &mut IndexSet<String>) {
    for declarator in &decl.declarations {
        collect_pattern_names(&declarator.id, out);
    }
}

/// Bound names of a binding pattern, including nested destructuring.
fn collect_pattern_names(pattern: &BindingPattern<'_>, out: &mut IndexSet<String>) {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => {
            out.insert(ident.name.to_string());
        }
        BindingPatternKind::ObjectPattern(object) => {
            for property in &object.properties {
                collect_pattern_names(&property.value, out);
            }
            if let Some(rest) = &object.rest {
                collect_pattern_names(&rest.argument, out);
            }
        }
        BindingPatternKind::ArrayPattern(array) => {
            for element in array.elements.iter().flatten() {
                collect_pattern_names(element, out);
            }
            if let Some(rest) = &array.rest {
                collect_pattern_names(&rest.argument, out);
            }
        }
        BindingPatternKind::AssignmentPattern(assign) => {
            collect_pattern_names(&assign.left, out);
        }
    }
}

/// Whole-tree feature scan; the result is assembled once and never shared.
#[derive(Debug, Default)]
struct FeatureScan {
    uses_host_require: bool,
    self_url_sites: Vec<TextRange>,
}

impl FeatureScan {
    fn collect(program: &Program<'_>) -> Self {
        let mut scan = Self::default();
        scan.visit_program(program);
        scan
    }
}

impl<'a> Visit<'a> for FeatureScan {
    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        if it.property.name.as_str() == "url" {
            if let Expression::MetaProperty(meta) = &it.object {
                if meta.meta.name.as_str() == "import" && meta.property.name.as_str() == "meta" {
                    self.self_url_sites.push(it.span.into());
                }
            }
        }
        walk::walk_static_member_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &it.callee {
            if ident.name.as_str() == "require" {
                self.uses_host_require = true;
            }
        }
        walk::walk_call_expression(self, it);
    }
}
