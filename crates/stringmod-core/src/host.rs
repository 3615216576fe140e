// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host module primitives
//!
//! The pipeline never executes code itself. Whatever embeds it provides
//! transient handles and the dynamic-import primitive through [`ModuleHost`].

use crate::error::HostError;
use async_trait::async_trait;

/// The embedding runtime's module loading primitives
#[async_trait]
pub trait ModuleHost: Send + Sync {
    /// Module record produced by a successful import
    type Module: Send;

    /// Create a transient, revocable handle the loader can import.
    ///
    /// Hosts without such handles keep the default, which reports the
    /// primitive as unsupported.
    fn create_handle(&self, _source: &str) -> Result<String, HostError> {
        Err(HostError::unsupported("transient module handles"))
    }

    /// Release a handle returned by [`create_handle`](Self::create_handle)
    fn revoke_handle(&self, _handle: &str) {}

    /// Import and evaluate the module at `target`
    async fn import(&self, target: &str) -> Result<Self::Module, HostError>;
}

/// A host that can encode but never execute.
///
/// Used to materialize source for inspection or emission.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

#[async_trait]
impl ModuleHost for DetachedHost {
    type Module = ();

    async fn import(&self, _target: &str) -> Result<(), HostError> {
        Err(HostError::unsupported("dynamic import"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_detached_host() {
        let host = DetachedHost;
        assert!(matches!(
            host.create_handle("/* */"),
            Err(HostError::Unsupported(_))
        ));
        assert!(matches!(
            host.import("data:text/javascript,").await,
            Err(HostError::Unsupported(_))
        ));
    }
}
