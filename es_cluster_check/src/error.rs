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

use thiserror::Error;

use crate::severity::Status;
use crate::snapshot;

/// The errors that may abort a cluster evaluation.
///
/// None of them is a data-level violation: those are accumulated by the assertion
/// engine and never surface as an error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Snapshot(#[from] snapshot::Error),
    #[error("Node '{node_name}' ({node_id}) is missing failure-domain attribute '{attribute}'")]
    MissingFailureDomain {
        node_id: String,
        node_name: String,
        attribute: String,
    },
    #[error("invalid boolean value '{0}': expected 'true' or 'false'")]
    InvalidBoolean(String),
    #[error("invalid version string '{0}'")]
    InvalidVersion(String),
    #[error("index '{index}' has no usable '{setting}' setting")]
    InvalidSetting { index: String, setting: &'static str },
    #[error("index '{index}' reports a non-numeric shard '{shard}'")]
    InvalidShardNumber { index: String, shard: String },
    #[error("node statistics do not describe any local node")]
    MissingLocalNode,
}

impl Error {
    /// The status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Snapshot(error) => error.status(),
            Self::MissingFailureDomain { .. } => Status::Warning,
            Self::InvalidBoolean(_)
            | Self::InvalidVersion(_)
            | Self::InvalidSetting { .. }
            | Self::InvalidShardNumber { .. }
            | Self::MissingLocalNode => Status::Unknown,
        }
    }

    /// The operator-facing message for this error.
    ///
    /// Anything that means the cluster answered with data we cannot make sense of is
    /// reported with the same generic message, the details go to the logs.
    pub fn message(&self) -> String {
        match self {
            Self::Snapshot(error) => error.message(),
            Self::MissingFailureDomain { .. } => self.to_string(),
            _ => snapshot::NONSENSE.to_string(),
        }
    }
}
