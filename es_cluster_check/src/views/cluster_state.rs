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

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

use crate::shard::ShardState;

/// The `/_cluster/state` representation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterState {
    /// All cluster nodes, keyed by the cluster-assigned node identifier.
    pub nodes: HashMap<String, Node>,
    pub metadata: Metadata,
    pub routing_table: RoutingTable,
}

/// A cluster node as listed in the cluster state.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub name: String,
    /// Free-form node attributes (`data`, `master`, `client`, `rack`, ...).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub indices: HashMap<String, IndexMetadata>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    Open,
    Close,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexMetadata {
    pub state: IndexState,
    /// Shaped differently depending on the reporting version, see [`crate::index::SettingsSchema`].
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutingTable {
    #[serde(default)]
    pub indices: HashMap<String, IndexRouting>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexRouting {
    /// Shard copies keyed by shard number (as a string, the way the API reports it).
    #[serde(default)]
    pub shards: BTreeMap<String, Vec<ShardCopy>>,
}

/// One copy of a shard in the routing table.
#[derive(Debug, Clone, Deserialize)]
pub struct ShardCopy {
    pub state: ShardState,
    pub primary: bool,
    /// The owning node, `null` while unassigned.
    #[serde(default)]
    pub node: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn it_decodes_routing_table() {
        let state: ClusterState = serde_json::from_value(json!({
            "cluster_name": "search",
            "nodes": {
                "n1": { "name": "es-1", "attributes": { "rack": "r1", "master": "false" } },
                "n2": { "name": "es-2" }
            },
            "metadata": {
                "indices": {
                    "logs": { "state": "open", "settings": { "index": { "number_of_shards": "1" } } },
                    "old": { "state": "close" }
                }
            },
            "routing_table": {
                "indices": {
                    "logs": {
                        "shards": {
                            "0": [
                                { "state": "STARTED", "primary": true, "node": "n1", "relocating_node": null },
                                { "state": "UNASSIGNED", "primary": false, "node": null }
                            ]
                        }
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(state.nodes["n1"].attributes["rack"], "r1");
        assert!(state.nodes["n2"].attributes.is_empty());
        assert_eq!(state.metadata.indices["old"].state, IndexState::Close);
        assert!(state.metadata.indices["old"].settings.is_null());

        let copies = &state.routing_table.indices["logs"].shards["0"];
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].state, ShardState::Started);
        assert_eq!(copies[1].node, None);
    }
}
