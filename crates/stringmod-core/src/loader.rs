// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loading

use crate::error::Result;
use crate::host::ModuleHost;
use crate::target::FinalArtifact;
use tracing::{debug, instrument};

/// Import an artifact through the host.
///
/// Every handle the artifact holds, its dependencies' included, is released
/// once the import settles, whether it succeeded or not. Host failures are
/// returned with the host's own message.
#[instrument(level = "debug", skip_all, fields(target_len = artifact.target.as_str().len()))]
pub async fn load<H: ModuleHost + ?Sized>(host: &H, artifact: &FinalArtifact) -> Result<H::Module> {
    let result = host.import(artifact.target.as_str()).await;

    let handles = artifact.handles();
    if !handles.is_empty() {
        debug!(count = handles.len(), "releasing module handles");
        for handle in handles {
            host.revoke_handle(handle);
        }
    }

    Ok(result?)
}
