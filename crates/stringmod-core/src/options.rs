// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Materialization options and injectable data

use crate::adapter::ContentAdapter;
use crate::error::{MaterializeError, Result};
use crate::inject::DataSerializer;
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::sync::Arc;

/// Injected data, keyed by constant name
pub type DataMap = IndexMap<String, DataValue>;

/// A value to inject as a preamble constant.
///
/// Mirrors JSON, plus a `Function` leaf for callables, which can never be
/// injected.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<DataValue>),
    Object(IndexMap<String, DataValue>),
    /// A callable, with its source text
    Function(String),
}

impl DataValue {
    /// Convert to JSON, failing on the first function found.
    ///
    /// `path` is the key path of this value, used in the error.
    pub fn to_json(&self, path: &str) -> Result<Value> {
        Ok(match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| item.to_json(&format!("{path}[{i}]")))
                    .collect::<Result<_>>()?,
            ),
            Self::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json(&format!("{path}.{key}"))?);
                }
                Value::Object(map)
            }
            Self::Function(_) => {
                return Err(MaterializeError::Serialization {
                    path: path.to_string(),
                });
            }
        })
    }

    /// Whether this is a callable
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }
}

impl From<Value> for DataValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for DataValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// Immutable configuration for one materialization call
#[derive(Clone)]
pub struct MaterializeOptions {
    /// Constants injected ahead of the source
    pub data: DataMap,
    /// Location relative specifiers and `import.meta.url` resolve against
    pub base_path: Option<String>,
    /// Append `export { … }` of every binding when the source exports nothing
    pub implicit_exports: bool,
    /// Declare a `require` built with `createRequire`
    pub add_require_shim: bool,
    /// Content resolution and preprocessing
    pub adapter: Option<Arc<dyn ContentAdapter>>,
    /// Replaces the default JSON data serialization
    pub serialize_data: Option<Arc<dyn DataSerializer>>,
    /// Emit a default-exported wrapper function instead of module bindings
    pub compile_as_function: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            data: DataMap::new(),
            base_path: None,
            implicit_exports: true,
            add_require_shim: false,
            adapter: None,
            serialize_data: None,
            compile_as_function: false,
        }
    }
}

impl MaterializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject one constant
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Replace all injected data
    pub fn with_data_map(mut self, data: DataMap) -> Self {
        self.data = data;
        self
    }

    pub fn with_base_path(mut self, base: impl Into<String>) -> Self {
        self.base_path = Some(base.into());
        self
    }

    pub fn with_implicit_exports(mut self, enabled: bool) -> Self {
        self.implicit_exports = enabled;
        self
    }

    pub fn with_require_shim(mut self, enabled: bool) -> Self {
        self.add_require_shim = enabled;
        self
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ContentAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn DataSerializer>) -> Self {
        self.serialize_data = Some(serializer);
        self
    }

    pub fn with_compile_as_function(mut self, enabled: bool) -> Self {
        self.compile_as_function = enabled;
        self
    }

    /// Options for materializing a dependency located at `location`
    pub(crate) fn for_child(&self, location: &str) -> Self {
        Self {
            base_path: Some(location.to_string()),
            compile_as_function: false,
            ..self.clone()
        }
    }
}

impl fmt::Debug for MaterializeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterializeOptions")
            .field("data", &self.data.keys().collect::<Vec<_>>())
            .field("base_path", &self.base_path)
            .field("implicit_exports", &self.implicit_exports)
            .field("add_require_shim", &self.add_require_shim)
            .field("adapter", &self.adapter.is_some())
            .field("serialize_data", &self.serialize_data.is_some())
            .field("compile_as_function", &self.compile_as_function)
            .finish()
    }
}
