// Copyright (C) 2021 Bosutech XXI S.L.
//
// nucliadb is offered under the AGPL v3.0 and as commercial software.
// For commercial licensing, contact us at info@nuclia.com.
//
// AGPL:
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{Error, SnapshotProvider};
use crate::views::{ClusterHealth, ClusterState, NodeStatistics, VersionInfo};

const CLUSTER_HEALTH_PATH: &str = "_cluster/health";
const CLUSTER_STATE_PATH: &str = "_cluster/state";
const LOCAL_NODE_STATS_PATH: &str = "_nodes/_local/stats";
const ROOT_PATH: &str = "";

/// A snapshot provider talking to the Elasticsearch REST API.
///
/// Requests are issued one at a time and each one is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpSnapshotProvider {
    http_client: HttpClient,
    base_url: Url,
}

impl HttpSnapshotProvider {
    /// Creates a provider for the cluster listening at `base_url`.
    ///
    /// Note that `base_url` must end with a `/` for any path prefix to be kept.
    ///
    /// # Errors
    /// This associated function will return an error if the HTTP client cannot be
    /// initialised.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, Error> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    #[inline]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!(%url, "Fetching snapshot");

        let transport_error = |source| Error::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .map_err(transport_error)?;
        let status = response.status();
        let body = response.text().map_err(transport_error)?;

        if !status.is_success() {
            return Err(Error::Api {
                url: url.to_string(),
                status: status.as_u16(),
                reason: api_error_reason(status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl SnapshotProvider for HttpSnapshotProvider {
    fn cluster_summary(&self) -> Result<ClusterHealth, Error> {
        self.fetch(CLUSTER_HEALTH_PATH)
    }

    fn cluster_state(&self) -> Result<ClusterState, Error> {
        self.fetch(CLUSTER_STATE_PATH)
    }

    fn node_statistics(&self) -> Result<NodeStatistics, Error> {
        self.fetch(LOCAL_NODE_STATS_PATH)
    }

    fn version_info(&self) -> Result<VersionInfo, Error> {
        self.fetch(ROOT_PATH)
    }
}

/// Extracts the reason of an API error response.
///
/// Depending on the version, errors are reported as `{"error": "..."}` or
/// `{"error": {"reason": "..."}}`; anything else falls back to the HTTP reason phrase.
fn api_error_reason(status: StatusCode, body: &str) -> String {
    let reported = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|document| match document.get("error") {
            Some(Value::String(reason)) => Some(reason.clone()),
            Some(error) => error
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_string),
            None => None,
        });

    reported.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string()
    })
}
