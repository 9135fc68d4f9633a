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

//! Raw Elasticsearch API representations.
//!
//! These types mirror the JSON documents returned by the cluster and carry no
//! invariants beyond what serde enforces. The domain types in [`crate::node`],
//! [`crate::index`] and [`crate::shard`] are built from them.

mod cluster_health;
mod cluster_state;
mod node_stats;
mod version;

pub use cluster_health::{ClusterHealth, ClusterStatus};
pub use cluster_state::{
    ClusterState, IndexMetadata, IndexRouting, IndexState, Metadata, Node, RoutingTable, ShardCopy,
};
pub use node_stats::{NodeStatistics, NodeStats};
pub use version::{VersionInfo, VersionNumber};
