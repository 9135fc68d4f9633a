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

use serde::Deserialize;
use strum::Display;

use crate::severity::Severity;

/// The health colour the cluster reports about itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClusterStatus {
    Green,
    Yellow,
    Red,
}

impl ClusterStatus {
    /// The severity tier matching the reported colour.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Green => Severity::Ok,
            Self::Yellow => Severity::Warning,
            Self::Red => Severity::Critical,
        }
    }
}

/// The `/_cluster/health` representation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: ClusterStatus,
    pub number_of_nodes: u64,
    pub number_of_data_nodes: u64,
    /// Not reported by every version.
    #[serde(default)]
    pub active_primary_shards: Option<u64>,
    pub active_shards: u64,
    pub relocating_shards: u64,
    pub initializing_shards: u64,
    pub unassigned_shards: u64,
}
