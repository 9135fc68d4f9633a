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

//! Retrieval of the cluster snapshots the evaluation works on.

mod http;

use thiserror::Error;

use crate::severity::Status;
use crate::views::{ClusterHealth, ClusterState, NodeStatistics, VersionInfo};

pub use self::http::HttpSnapshotProvider;

/// The message of any evaluation aborted because the cluster answered with data
/// that could not be understood.
pub const NONSENSE: &str = "Elasticsearch returned nonsense";

/// The errors that may occur when fetching a snapshot.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}: {reason}")]
    Api {
        url: String,
        status: u16,
        reason: String,
    },
    #[error("cannot decode the document returned by {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("invalid cluster URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// The status this error is reported with.
    ///
    /// An unreachable cluster is critical, while a cluster that answers but cannot be
    /// understood leaves the evaluation undecided.
    pub fn status(&self) -> Status {
        match self {
            Self::Transport { .. } => Status::Critical,
            Self::Api { .. } | Self::Decode { .. } | Self::Url(_) => Status::Unknown,
        }
    }

    /// The operator-facing message for this error.
    pub fn message(&self) -> String {
        match self {
            Self::Transport { source, .. } => {
                format!("Failed to connect to Elasticsearch: {source}")
            }
            Self::Api { status, reason, .. } => {
                format!("Elasticsearch API error ({status}): {reason}")
            }
            Self::Decode { .. } => NONSENSE.to_string(),
            Self::Url(e) => format!("Invalid Elasticsearch URL: {e}"),
        }
    }
}

/// Supplies the independent snapshots of the cluster state.
///
/// Each call either returns a decoded document or fails; implementations decide
/// about deadlines.
pub trait SnapshotProvider {
    /// The cluster summary (`/_cluster/health`).
    fn cluster_summary(&self) -> Result<ClusterHealth, Error>;

    /// The full cluster topology (`/_cluster/state`).
    fn cluster_state(&self) -> Result<ClusterState, Error>;

    /// The statistics of the node answering the requests (`/_nodes/_local/stats`).
    fn node_statistics(&self) -> Result<NodeStatistics, Error>;

    /// The version of the reporting software (`/`).
    fn version_info(&self) -> Result<VersionInfo, Error>;
}
