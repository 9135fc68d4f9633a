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

//! The cross-referenced cluster graph.
//!
//! A [`Topology`] is built once per evaluation from the raw cluster state and is
//! immutable afterwards. It answers the questions the assertion rules ask:
//! - which node is which, by identifier or by name;
//! - which indices are open, and how they are configured;
//! - for each shard slot, the primary copy (or its absence) and the replica copies;
//! - which copies live on which node, and in which failure domain.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::index::{Index, SettingsSchema};
use crate::node::{Location, Node};
use crate::shard::{ShardCopy, ShardKey, ShardRole};
use crate::views::{ClusterState, IndexState};
use crate::Error;

#[derive(Debug, Default)]
pub struct Topology {
    nodes: HashMap<String, Node>,
    node_ids_by_name: HashMap<String, String>,
    indices: BTreeMap<String, Index>,
    closed_indices: usize,
    /// One slot per shard number, `None` when the primary is missing.
    primaries: BTreeMap<String, Vec<Option<ShardCopy>>>,
    replicas: HashMap<ShardKey, Vec<ShardCopy>>,
    node_shards: HashMap<String, Vec<ShardCopy>>,
    locations: HashMap<String, Location>,
    failure_domain: Vec<String>,
}

impl Topology {
    /// Builds the topology from a cluster state snapshot.
    ///
    /// Closed indices are only counted. Unassigned copies are kept in the replica sets
    /// but placed on no node, and an unassigned primary leaves its slot missing.
    ///
    /// # Errors
    /// This associated function will return an error if:
    /// - A data node lacks one of the `failure_domain` attributes. Building stops at the
    ///   first such node.
    /// - A node role attribute is not a boolean.
    /// - An index reports unusable shard settings or shard numbers.
    pub fn build(
        state: ClusterState,
        schema: SettingsSchema,
        failure_domain: &[String],
    ) -> Result<Self, Error> {
        let mut topology = Self {
            failure_domain: failure_domain.to_vec(),
            ..Self::default()
        };

        // sorted so that the reported misconfigured node does not depend on map order
        for (id, view) in state.nodes.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
            let node = Node::new(id, view)?;

            if let Some(location) = node.location(failure_domain)? {
                topology.locations.insert(node.id().to_string(), location);
            }

            topology
                .node_ids_by_name
                .insert(node.name().to_string(), node.id().to_string());
            topology.nodes.insert(node.id().to_string(), node);
        }

        for (name, metadata) in state.metadata.indices {
            match metadata.state {
                IndexState::Close => topology.closed_indices += 1,
                IndexState::Open => {
                    let index = Index::from_settings(name.clone(), &metadata.settings, schema)?;
                    topology.indices.insert(name, index);
                }
            }
        }

        let mut routing_table = state.routing_table.indices;

        for index in topology.indices.values() {
            let mut slots = vec![None; index.shards() as usize];

            let Some(routing) = routing_table.remove(index.name()) else {
                warn!(index = %index.name(), "Open index has no routing table entry");
                topology.primaries.insert(index.name().to_string(), slots);
                continue;
            };

            for (shard, copies) in routing.shards {
                let number = shard
                    .parse::<u32>()
                    .map_err(|_| Error::InvalidShardNumber {
                        index: index.name().to_string(),
                        shard: shard.clone(),
                    })?;

                if number >= index.shards() {
                    debug!(
                        index = %index.name(),
                        shard = number,
                        "Ignoring shard outside of the index slots"
                    );
                    continue;
                }

                let key = ShardKey::new(index.name(), number);

                for copy in copies {
                    let role = if copy.primary {
                        ShardRole::Primary
                    } else {
                        ShardRole::Replica
                    };
                    let copy = ShardCopy::new(key.clone(), copy.state, copy.node);

                    if let Some(node) = copy.node() {
                        topology
                            .node_shards
                            .entry(node.to_string())
                            .or_default()
                            .push(copy.clone());
                    }

                    match role {
                        ShardRole::Primary if !copy.is_placed() => {
                            debug!(shard = %key, "Unassigned primary");
                        }
                        ShardRole::Primary => {
                            let slot = &mut slots[number as usize];

                            if slot.is_some() {
                                warn!(shard = %key, "Routing table reports more than one primary");
                            } else {
                                *slot = Some(copy);
                            }
                        }
                        ShardRole::Replica => {
                            topology.replicas.entry(key.clone()).or_default().push(copy);
                        }
                    }
                }
            }

            topology.primaries.insert(index.name().to_string(), slots);
        }

        debug!(
            nodes = topology.nodes.len(),
            indices = topology.indices.len(),
            closed_indices = topology.closed_indices,
            "Topology built"
        );

        Ok(topology)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.node_ids_by_name
            .get(name)
            .and_then(|id| self.nodes.get(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Counts the nodes allowed to be elected cluster coordinator.
    pub fn master_eligible_nodes(&self) -> usize {
        self.nodes().filter(|node| node.is_master_eligible()).count()
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indices.get(name)
    }

    /// Open indices, by name.
    pub fn indices(&self) -> impl Iterator<Item = &Index> {
        self.indices.values()
    }

    #[inline]
    pub fn open_indices(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn closed_indices(&self) -> usize {
        self.closed_indices
    }

    /// The primary slots of an open index, by shard number.
    pub fn primaries(&self, index: &str) -> &[Option<ShardCopy>] {
        self.primaries.get(index).map_or(&[], Vec::as_slice)
    }

    pub fn primary(&self, key: &ShardKey) -> Option<&ShardCopy> {
        self.primaries(&key.index)
            .get(key.number as usize)
            .and_then(Option::as_ref)
    }

    /// The replica copies sharing the given primary's slot.
    pub fn replicas_of(&self, primary: &ShardCopy) -> &[ShardCopy] {
        self.replicas.get(primary.key()).map_or(&[], Vec::as_slice)
    }

    /// The copies physically located on the given node.
    pub fn shards_on(&self, node_id: &str) -> &[ShardCopy] {
        self.node_shards.get(node_id).map_or(&[], Vec::as_slice)
    }

    /// The configured failure-domain attribute names.
    pub fn failure_domain(&self) -> &[String] {
        &self.failure_domain
    }

    /// The failure-domain location of a node, if it has one.
    pub fn location(&self, node_id: &str) -> Option<&Location> {
        self.locations.get(node_id)
    }

    /// The failure-domain location of the node a copy is placed on.
    pub fn location_of(&self, copy: &ShardCopy) -> Option<&Location> {
        copy.node().and_then(|node| self.location(node))
    }
}
