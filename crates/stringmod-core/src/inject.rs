// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Data injection
//!
//! Builds the preamble placed ahead of the module body: one constant per
//! data key, the self-url binding and the optional `require` shim.

use crate::error::Result;
use crate::options::{DataMap, MaterializeOptions};
use indexmap::IndexSet;

/// Identifier `import.meta.url` reads are replaced with
pub const SELF_URL_BINDING: &str = "__importmetaurl";

/// Base used for the `require` shim when no base location is known
const DEFAULT_REQUIRE_BASE: &str = "/";

/// Turns injected data into preamble declarations
pub trait DataSerializer: Send + Sync {
    /// Render `data` as source text declaring one binding per key
    fn serialize(&self, data: &DataMap) -> Result<String>;
}

/// Declares each key as a `const` holding its JSON value
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDataSerializer;

impl DataSerializer for JsonDataSerializer {
    fn serialize(&self, data: &DataMap) -> Result<String> {
        let mut lines = Vec::with_capacity(data.len());
        for (key, value) in data {
            let json = serde_json::to_string(&value.to_json(key)?)?;
            lines.push(format!("const {key} = {json};"));
        }
        Ok(lines.join("\n"))
    }
}

/// Build the preamble for one unit
pub fn preamble(options: &MaterializeOptions, self_url_substituted: bool) -> Result<String> {
    let mut parts = Vec::new();

    let data = match &options.serialize_data {
        Some(serializer) => serializer.serialize(&options.data)?,
        None => JsonDataSerializer.serialize(&options.data)?,
    };
    if !data.is_empty() {
        parts.push(data);
    }

    if self_url_substituted {
        if let Some(base) = &options.base_path {
            parts.push(format!(
                "const {SELF_URL_BINDING} = {};",
                serde_json::to_string(base)?
            ));
        }
    }

    if options.add_require_shim {
        let base = options.base_path.as_deref().unwrap_or(DEFAULT_REQUIRE_BASE);
        parts.push(format!(
            "import {{ createRequire }} from \"node:module\";\nconst require = createRequire({});",
            serde_json::to_string(base)?
        ));
    }

    Ok(parts.join("\n"))
}

/// Names the preamble declares
pub fn injected_names(options: &MaterializeOptions, self_url_substituted: bool) -> IndexSet<String> {
    let mut names: IndexSet<String> = options.data.keys().cloned().collect();
    if self_url_substituted {
        names.insert(SELF_URL_BINDING.to_string());
    }
    if options.add_require_shim {
        names.insert("require".to_string());
    }
    names
}

/// Join preamble, body and trailer with newlines, skipping empty parts
pub fn assemble(preamble: &str, body: &str, trailer: &str) -> String {
    let mut out = String::with_capacity(preamble.len() + body.len() + trailer.len() + 2);
    if !preamble.is_empty() {
        out.push_str(preamble);
        out.push('\n');
    }
    out.push_str(body);
    if !trailer.is_empty() {
        out.push('\n');
        out.push_str(trailer);
    }
    out
}
