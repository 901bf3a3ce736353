// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::retry::retry_async;
use crate::domain::error::AppError;
use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SNAPSHOT_ATTEMPTS: usize = 2;
const SNAPSHOT_RETRY_DELAY: Duration = Duration::from_millis(200);
const SNAPSHOT_RETRY_CAP: Duration = Duration::from_secs(2);

/// Wire form of a targeting intent exchanged with the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteIntent {
    pub target: Address,
    pub attacker: Address,
    pub kind: String,
    pub phase: String,
    pub created_at_ms: u64,
}

/// Backend collaborator for targeting coordination. Broadcasts are
/// best-effort; the snapshot is the eventual source of truth.
#[async_trait]
pub trait TargetingRemote: Send + Sync {
    async fn broadcast(&self, intent: &RemoteIntent) -> Result<(), AppError>;
    async fn snapshot(&self) -> Result<Vec<RemoteIntent>, AppError>;
}

pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder().timeout(timeout).build().unwrap(),
            base_url,
        }
    }

    /// Opaque feature read: a named list of addresses (leaderboards,
    /// suspect lists) feeding discovery. The shape of the list is the
    /// backend's business.
    pub async fn watchlist(&self, name: &str) -> Result<Vec<Address>, AppError> {
        let url = format!("{}/watchlist/{}", self.base_url, name);
        retry_async(
            |_| {
                let client = self.client.clone();
                let url = url.clone();
                async move { fetch_json::<Vec<Address>>(&client, &url).await }
            },
            SNAPSHOT_ATTEMPTS,
            SNAPSHOT_RETRY_DELAY,
            SNAPSHOT_RETRY_CAP,
        )
        .await
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, AppError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Connection(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(AppError::Api {
            provider: "backend".into(),
            status: resp.status().as_u16(),
        });
    }
    resp.json::<T>().await.map_err(|_| AppError::Api {
        provider: "backend json".into(),
        status: 0,
    })
}

#[async_trait]
impl TargetingRemote for BackendClient {
    /// Single attempt, no retry: the caller treats this as fire-and-forget
    /// and the reconcile cycle repairs any miss.
    async fn broadcast(&self, intent: &RemoteIntent) -> Result<(), AppError> {
        let url = format!("{}/targeting/register", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(intent)
            .send()
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(AppError::Api {
                provider: "backend".into(),
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<RemoteIntent>, AppError> {
        let url = format!("{}/targeting/active", self.base_url);
        retry_async(
            |_| {
                let client = self.client.clone();
                let url = url.clone();
                async move { fetch_json::<Vec<RemoteIntent>>(&client, &url).await }
            },
            SNAPSHOT_ATTEMPTS,
            SNAPSHOT_RETRY_DELAY,
            SNAPSHOT_RETRY_CAP,
        )
        .await
    }
}
