// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # stringmod-adapters
//!
//! Environment strategies for `stringmod-core`:
//!
//! - [`FsAdapter`]: module source from the local filesystem
//! - [`FetchAdapter`]: module source over HTTP(S)
//! - [`NodeResolver`]: Node-style specifier resolution to `file:` URLs

pub mod error;
pub mod fetch;
pub mod fs;
pub mod resolver;

pub use error::{AdapterError, Result};
pub use fetch::FetchAdapter;
pub use fs::FsAdapter;
pub use resolver::NodeResolver;
