// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Export normalization and the function wrapper

use crate::analyzer::{Analysis, ModuleItem, TextRange};
use crate::edits::TextEdits;
use crate::error::{MaterializeError, Result};
use indexmap::IndexSet;

/// Never wrapper parameters: strict-mode reserved, or read by the defaults
const EXCLUDED_PARAMS: &[&str] = &["arguments", "eval", "globalThis"];

/// Trailing `export { … }` statement, or an empty string when the source
/// already exports or nothing would be exported.
pub fn implicit_exports(analysis: &Analysis, enabled: bool) -> String {
    if !enabled || analysis.features.has_explicit_export || analysis.bindings.is_empty() {
        return String::new();
    }
    format!("export {};", binding_record(&analysis.bindings))
}

/// Wrap `source` in a default-exported function.
///
/// Import and re-export statements move above the function. Export lists are
/// dropped and `export` prefixes stripped; the function takes every free name
/// as a defaulted record field and returns every binding.
pub fn wrap_as_function(
    source: &str,
    analysis: &Analysis,
    injected: &IndexSet<String>,
) -> Result<String> {
    if analysis.features.has_default_export {
        return Err(MaterializeError::conflict(
            "a default export cannot be combined with compiling as a function",
        ));
    }

    let mut hoisted = Vec::new();
    let mut edits = TextEdits::new();

    for item in &analysis.module_items {
        match *item {
            ModuleItem::Import(range) | ModuleItem::Reexport(range) => {
                hoisted.push(&source[range.as_range()]);
                edits.remove(range);
            }
            ModuleItem::ExportList(range) => edits.remove(range),
            ModuleItem::ExportDeclaration {
                range,
                declaration_start,
            } => edits.remove(TextRange {
                start: range.start,
                end: declaration_start,
            }),
            // rejected above
            ModuleItem::ExportDefault(_) => {}
        }
    }

    let params: Vec<String> = analysis
        .referenced_names
        .iter()
        .filter(|name| !injected.contains(*name) && !EXCLUDED_PARAMS.contains(&name.as_str()))
        .map(|name| format!("{name} = globalThis.{name}"))
        .collect();

    let params = if params.is_empty() {
        String::new()
    } else {
        format!("{{ {} }} = {{}}", params.join(", "))
    };

    let body = edits.apply(source);

    let mut out = String::new();
    for statement in hoisted {
        out.push_str(statement);
        out.push('\n');
    }
    out.push_str(&format!("export default function({params}) {{\n"));
    out.push_str(body.trim_end());
    out.push_str(&format!(
        "\nreturn {};\n}}",
        binding_record(&analysis.bindings)
    ));

    Ok(out)
}

/// `{ a, b }`, or `{}` with no bindings
fn binding_record(bindings: &IndexSet<String>) -> String {
    if bindings.is_empty() {
        return "{}".to_string();
    }
    let names: Vec<&str> = bindings.iter().map(String::as_str).collect();
    format!("{{ {} }}", names.join(", "))
}
