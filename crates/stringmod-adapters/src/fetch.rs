// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Network content adapter

use crate::error::{AdapterError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use stringmod_core::{ContentAdapter, ReferenceDescriptor};
use tracing::{debug, instrument};

/// Supplies module source for `http:` and `https:` locations
#[derive(Debug, Clone)]
pub struct FetchAdapter {
    client: Client,
}

impl FetchAdapter {
    /// Create an adapter with its own HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(30))
            .user_agent(format!("stringmod/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Create an adapter sharing an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the text at `url`
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching module source from {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "text/javascript, application/javascript, */*")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AdapterError::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Whether this adapter fetches `location`
pub fn is_fetchable(location: &str) -> bool {
    location.starts_with("https://") || location.starts_with("http://")
}

#[async_trait]
impl ContentAdapter for FetchAdapter {
    async fn resolve_content(
        &self,
        reference: &ReferenceDescriptor,
    ) -> stringmod_core::Result<Option<String>> {
        if !is_fetchable(&reference.path) {
            return Ok(None);
        }
        Ok(Some(self.fetch(&reference.path).await?))
    }
}
