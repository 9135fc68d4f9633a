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

#![allow(dead_code)]

use es_cluster_check::snapshot::{Error, SnapshotProvider};
use es_cluster_check::views::{ClusterHealth, ClusterState, NodeStatistics, VersionInfo};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub const LOCAL_NODE: &str = "n1";

/// A snapshot provider serving fixed documents.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    pub health: Value,
    pub state: Value,
    pub stats: Value,
    pub version: Value,
}

impl FixtureProvider {
    pub fn new(status: &str, state: Value) -> Self {
        Self {
            health: health(status),
            state,
            stats: node_stats(LOCAL_NODE),
            version: version("1.7.5"),
        }
    }
}

fn decode<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T, Error> {
    serde_json::from_value(value.clone()).map_err(|e| Error::Decode {
        url: format!("fixture://{what}"),
        reason: e.to_string(),
    })
}

impl SnapshotProvider for FixtureProvider {
    fn cluster_summary(&self) -> Result<ClusterHealth, Error> {
        decode(&self.health, "health")
    }

    fn cluster_state(&self) -> Result<ClusterState, Error> {
        decode(&self.state, "state")
    }

    fn node_statistics(&self) -> Result<NodeStatistics, Error> {
        decode(&self.stats, "stats")
    }

    fn version_info(&self) -> Result<VersionInfo, Error> {
        decode(&self.version, "version")
    }
}

pub fn health(status: &str) -> Value {
    json!({
        "cluster_name": "search",
        "status": status,
        "timed_out": false,
        "number_of_nodes": 3,
        "number_of_data_nodes": 3,
        "active_primary_shards": 2,
        "active_shards": 4,
        "relocating_shards": 0,
        "initializing_shards": 0,
        "unassigned_shards": 0
    })
}

pub fn node_stats(node: &str) -> Value {
    json!({
        "cluster_name": "search",
        "nodes": {
            node: {
                "name": "es-1",
                "indices": {
                    "docs": { "count": 1000, "deleted": 0 },
                    "store": { "size_in_bytes": 123456, "throttle_time_in_millis": 0 },
                    "indexing": { "index_total": 10, "index_time_in_millis": 20, "delete_total": 1, "delete_time_in_millis": 2 },
                    "search": { "query_total": 30, "query_time_in_millis": 40, "fetch_total": 5, "fetch_time_in_millis": 6 }
                }
            }
        }
    })
}

pub fn version(number: &str) -> Value {
    json!({ "name": "es-1", "version": { "number": number } })
}

/// Three data nodes, two racks: `n1` and `n2` in `r1`, `n3` in `r2`.
pub fn nodes() -> Value {
    json!({
        "n1": { "name": "es-1", "attributes": { "rack": "r1" } },
        "n2": { "name": "es-2", "attributes": { "rack": "r1" } },
        "n3": { "name": "es-3", "attributes": { "rack": "r2" } }
    })
}

pub fn copy(state: &str, primary: bool, node: Option<&str>) -> Value {
    json!({ "state": state, "primary": primary, "node": node, "relocating_node": null })
}

/// A cluster state holding a single open `logs` index with nested settings.
pub fn cluster_state(nodes: Value, shards: u32, replicas: u32, routing: Value) -> Value {
    json!({
        "cluster_name": "search",
        "nodes": nodes,
        "metadata": {
            "indices": {
                "logs": {
                    "state": "open",
                    "settings": {
                        "index": {
                            "number_of_shards": shards.to_string(),
                            "number_of_replicas": replicas.to_string()
                        }
                    }
                }
            }
        },
        "routing_table": {
            "indices": {
                "logs": { "shards": routing }
            }
        }
    })
}

/// A healthy `logs` index: two shards, one replica each, spread over both racks.
pub fn healthy_routing() -> Value {
    json!({
        "0": [copy("STARTED", true, Some("n1")), copy("STARTED", false, Some("n3"))],
        "1": [copy("STARTED", true, Some("n3")), copy("STARTED", false, Some("n2"))]
    })
}
