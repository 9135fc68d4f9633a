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

//! The fixed battery of cluster invariant checks.
//!
//! Rules never stop at the first violation: each one records a detail line per
//! violation and asks the [`SeverityAggregator`] for a downgrade.

use std::collections::BTreeSet;
use std::iter;
use std::num::NonZeroUsize;

use tracing::debug;

use crate::severity::{Severity, SeverityAggregator};
use crate::shard::ShardCopy;
use crate::topology::Topology;

pub const MISSING_PRIMARIES: &str = "One or more indexes are missing primary shards";
pub const MISSING_REPLICAS: &str = "One or more indexes are missing replica shards";
pub const MASTER_NODES: &str = "Elasticsearch cluster has too few master-eligible nodes";
pub const FAILURE_DOMAINS: &str = "One or more shards are not replicated across failure domains";

/// What the rules concluded.
#[derive(Debug, Default)]
pub struct Findings {
    aggregator: SeverityAggregator,
    headline: Option<&'static str>,
    details: Vec<String>,
}

impl Findings {
    /// Records one violation.
    ///
    /// The headline belongs to the last rule that made the severity worse.
    pub fn record(&mut self, severity: Severity, headline: &'static str, detail: String) {
        if self.aggregator.downgrade(severity) {
            self.headline = Some(headline);
        }
        self.details.push(detail);
    }

    #[inline]
    pub fn severity(&self) -> Severity {
        self.aggregator.current()
    }

    /// The headline of the current severity, `None` while everything is fine.
    #[inline]
    pub fn headline(&self) -> Option<&'static str> {
        self.headline
    }

    #[inline]
    pub fn details(&self) -> &[String] {
        &self.details
    }

    pub fn into_details(self) -> Vec<String> {
        self.details
    }
}

/// Walks a [`Topology`] looking for violations.
pub struct AssertionEngine<'a> {
    topology: &'a Topology,
    /// The node the statistics snapshot was taken from.
    local_node: &'a str,
    master_nodes: Option<NonZeroUsize>,
}

impl<'a> AssertionEngine<'a> {
    pub fn new(
        topology: &'a Topology,
        local_node: &'a str,
        master_nodes: Option<NonZeroUsize>,
    ) -> Self {
        Self {
            topology,
            local_node,
            master_nodes,
        }
    }

    /// Runs all rules in order.
    pub fn run(&self) -> Findings {
        let mut findings = Findings::default();

        self.check_primaries(&mut findings);
        self.check_replicas(&mut findings);
        self.check_master_nodes(&mut findings);
        self.check_failure_domains(&mut findings);

        debug!(
            severity = ?findings.severity(),
            violations = findings.details().len(),
            "Assertions done"
        );

        findings
    }

    /// Every shard slot must have an active primary.
    pub fn check_primaries(&self, findings: &mut Findings) {
        for index in self.topology.indices() {
            for (number, slot) in self.topology.primaries(index.name()).iter().enumerate() {
                match slot {
                    None => findings.record(
                        Severity::Critical,
                        MISSING_PRIMARIES,
                        format!("Index '{}' missing primary for shard {number}", index.name()),
                    ),
                    Some(primary) if !primary.state().is_active() => findings.record(
                        Severity::Critical,
                        MISSING_PRIMARIES,
                        format!(
                            "Index '{}' primary down for shard {number} (state {})",
                            index.name(),
                            primary.state()
                        ),
                    ),
                    Some(_) => (),
                }
            }
        }
    }

    /// Every primary must have as many active replicas as its index is configured with.
    ///
    /// Slots without a primary are left to [`Self::check_primaries`].
    pub fn check_replicas(&self, findings: &mut Findings) {
        for index in self.topology.indices() {
            for (number, primary) in self.present_primaries(index.name()) {
                let replicas = self.topology.replicas_of(primary);

                if replicas.len() < index.replicas() as usize {
                    findings.record(
                        Severity::Warning,
                        MISSING_REPLICAS,
                        format!(
                            "Index '{}' missing replica for shard {number} (expected {}, found {})",
                            index.name(),
                            index.replicas(),
                            replicas.len()
                        ),
                    );
                }

                for replica in replicas.iter().filter(|replica| !replica.state().is_active()) {
                    findings.record(
                        Severity::Warning,
                        MISSING_REPLICAS,
                        format!(
                            "Index '{}' replica down for shard {number} on node '{}' (state {})",
                            index.name(),
                            self.node_label(replica),
                            replica.state()
                        ),
                    );
                }
            }
        }
    }

    /// The cluster must have at least the configured number of master-eligible nodes.
    pub fn check_master_nodes(&self, findings: &mut Findings) {
        let Some(expected) = self.master_nodes else {
            return;
        };

        let found = self.topology.master_eligible_nodes();

        if found < expected.get() {
            findings.record(
                Severity::Warning,
                MASTER_NODES,
                format!("Expected at least {expected} master-eligible nodes but found {found}"),
            );
        }
    }

    /// Copies of a replicated shard must not all live in the same failure domain.
    ///
    /// Only slots with a copy on the local node are checked, and copies whose location
    /// is unknown are ignored.
    pub fn check_failure_domains(&self, findings: &mut Findings) {
        if self.topology.failure_domain().is_empty() {
            return;
        }

        for index in self.topology.indices().filter(|index| index.replicas() > 0) {
            for (number, primary) in self.present_primaries(index.name()) {
                let copies = iter::once(primary)
                    .chain(self.topology.replicas_of(primary))
                    .collect::<Vec<_>>();

                if !copies.iter().any(|copy| copy.node() == Some(self.local_node)) {
                    continue;
                }

                let locations = copies
                    .iter()
                    .filter_map(|copy| self.topology.location_of(copy))
                    .collect::<Vec<_>>();
                let distinct = locations.iter().collect::<BTreeSet<_>>();

                if locations.len() > 1 && distinct.len() == 1 {
                    findings.record(
                        Severity::Warning,
                        FAILURE_DOMAINS,
                        format!(
                            "Index '{}' shard {number} only exists in location {}",
                            index.name(),
                            locations[0]
                        ),
                    );
                }
            }
        }
    }

    fn present_primaries(&self, index: &str) -> impl Iterator<Item = (usize, &'a ShardCopy)> {
        self.topology
            .primaries(index)
            .iter()
            .enumerate()
            .filter_map(|(number, slot)| slot.as_ref().map(|primary| (number, primary)))
    }

    fn node_label(&self, copy: &ShardCopy) -> String {
        match copy.node() {
            Some(id) => self
                .topology
                .node(id)
                .map_or_else(|| id.to_string(), |node| node.name().to_string()),
            None => "unassigned".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::index::SettingsSchema;

    fn topology(nodes: Value, replicas: u32, shards: Value, failure_domain: &[&str]) -> Topology {
        let count = shards.as_object().unwrap().len();
        let state = serde_json::from_value(json!({
            "nodes": nodes,
            "metadata": {
                "indices": {
                    "logs": {
                        "state": "open",
                        "settings": { "index": {
                            "number_of_shards": count.to_string(),
                            "number_of_replicas": replicas.to_string()
                        } }
                    }
                }
            },
            "routing_table": { "indices": { "logs": { "shards": shards } } }
        }))
        .unwrap();
        let failure_domain = failure_domain.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Topology::build(state, SettingsSchema::Nested, &failure_domain).unwrap()
    }

    fn nodes() -> Value {
        json!({
            "n1": { "name": "es-1", "attributes": { "rack": "r1" } },
            "n2": { "name": "es-2", "attributes": { "rack": "r1" } },
            "n3": { "name": "es-3", "attributes": { "rack": "r2" } }
        })
    }

    fn copy(state: &str, primary: bool, node: Option<&str>) -> Value {
        json!({ "state": state, "primary": primary, "node": node })
    }

    #[test]
    fn it_accepts_healthy_clusters() {
        let topology = topology(
            nodes(),
            1,
            json!({
                "0": [copy("STARTED", true, Some("n1")), copy("STARTED", false, Some("n3"))],
                "1": [copy("RELOCATING", true, Some("n3")), copy("STARTED", false, Some("n2"))]
            }),
            &["rack"],
        );

        let findings = AssertionEngine::new(&topology, "n1", NonZeroUsize::new(3)).run();

        assert_eq!(findings.severity(), Severity::Ok);
        assert_eq!(findings.headline(), None);
        assert!(findings.details().is_empty());
    }

    #[test]
    fn it_reports_missing_and_down_primaries() {
        let topology = topology(
            nodes(),
            0,
            json!({
                "0": [copy("UNASSIGNED", true, None)],
                "1": [copy("INITIALIZING", true, Some("n1"))],
                "2": [copy("STARTED", true, Some("n2"))]
            }),
            &[],
        );

        let mut findings = Findings::default();
        AssertionEngine::new(&topology, "n1", None).check_primaries(&mut findings);

        assert_eq!(findings.severity(), Severity::Critical);
        assert_eq!(findings.headline(), Some(MISSING_PRIMARIES));
        assert_eq!(
            findings.details(),
            [
                "Index 'logs' missing primary for shard 0",
                "Index 'logs' primary down for shard 1 (state INITIALIZING)",
            ]
        );
    }

    #[test]
    fn it_reports_missing_and_down_replicas() {
        let topology = topology(
            nodes(),
            2,
            json!({
                "0": [
                    copy("STARTED", true, Some("n1")),
                    copy("STARTED", false, Some("n2")),
                    copy("INITIALIZING", false, Some("n3"))
                ],
                "1": [copy("STARTED", true, Some("n1")), copy("UNASSIGNED", false, None)],
                "2": [copy("UNASSIGNED", true, None), copy("STARTED", false, Some("n2"))]
            }),
            &[],
        );

        let mut findings = Findings::default();
        AssertionEngine::new(&topology, "n1", None).check_replicas(&mut findings);

        assert_eq!(findings.severity(), Severity::Warning);
        assert_eq!(findings.headline(), Some(MISSING_REPLICAS));
        assert_eq!(
            findings.details(),
            [
                "Index 'logs' replica down for shard 0 on node 'es-3' (state INITIALIZING)",
                "Index 'logs' missing replica for shard 1 (expected 2, found 1)",
                "Index 'logs' replica down for shard 1 on node 'unassigned' (state UNASSIGNED)",
            ]
        );
    }

    #[test]
    fn it_counts_master_eligible_nodes() {
        let nodes = json!({
            "n1": { "name": "es-1" },
            "n2": { "name": "es-2", "attributes": { "master": "true", "data": "false" } },
            "n3": { "name": "es-3", "attributes": { "master": "false" } },
            "n4": { "name": "es-4", "attributes": { "client": "true" } }
        });
        let topology = topology(nodes, 0, json!({ "0": [copy("STARTED", true, Some("n1"))] }), &[]);

        let tests = [
            (None, Severity::Ok),
            (NonZeroUsize::new(2), Severity::Ok),
            (NonZeroUsize::new(3), Severity::Warning),
        ];

        for (master_nodes, expected) in tests {
            let findings = AssertionEngine::new(&topology, "n1", master_nodes).run();

            assert_eq!(findings.severity(), expected);
        }

        let findings = AssertionEngine::new(&topology, "n1", NonZeroUsize::new(3)).run();
        assert_eq!(findings.headline(), Some(MASTER_NODES));
        assert_eq!(findings.details(), ["Expected at least 3 master-eligible nodes but found 2"]);
    }

    #[test]
    fn it_reports_single_failure_domain_from_local_node_only() {
        let topology = topology(
            nodes(),
            1,
            json!({
                "0": [copy("STARTED", true, Some("n1")), copy("STARTED", false, Some("n2"))],
                "1": [copy("STARTED", true, Some("n3")), copy("STARTED", false, Some("n2"))]
            }),
            &["rack"],
        );

        let findings = AssertionEngine::new(&topology, "n1", None).run();
        assert_eq!(findings.severity(), Severity::Warning);
        assert_eq!(findings.headline(), Some(FAILURE_DOMAINS));
        assert_eq!(findings.details(), ["Index 'logs' shard 0 only exists in location r1"]);

        let findings = AssertionEngine::new(&topology, "n3", None).run();
        assert_eq!(findings.severity(), Severity::Ok);
    }

    #[test]
    fn it_ignores_unknown_locations() {
        let nodes = json!({
            "n1": { "name": "es-1", "attributes": { "rack": "r1" } },
            "n2": { "name": "es-2", "attributes": { "rack": "r1", "data": "false" } }
        });
        let topology = topology(
            nodes,
            1,
            json!({
                "0": [copy("STARTED", true, Some("n1")), copy("STARTED", false, Some("n2"))],
                "1": [copy("STARTED", true, Some("n1")), copy("UNASSIGNED", false, None)]
            }),
            &["rack"],
        );

        let mut findings = Findings::default();
        AssertionEngine::new(&topology, "n1", None).check_failure_domains(&mut findings);

        assert_eq!(findings.severity(), Severity::Ok);
    }

    #[test]
    fn it_skips_failure_domains_when_not_configured() {
        let topology = topology(
            nodes(),
            1,
            json!({ "0": [copy("STARTED", true, Some("n1")), copy("STARTED", false, Some("n2"))] }),
            &[],
        );

        let mut findings = Findings::default();
        AssertionEngine::new(&topology, "n1", None).check_failure_domains(&mut findings);

        assert!(findings.details().is_empty());
    }

    #[test]
    fn it_keeps_the_headline_of_the_last_downgrade() {
        let mut findings = Findings::default();

        findings.record(Severity::Warning, MISSING_REPLICAS, "a".to_string());
        findings.record(Severity::Critical, MISSING_PRIMARIES, "b".to_string());
        findings.record(Severity::Warning, FAILURE_DOMAINS, "c".to_string());

        assert_eq!(findings.severity(), Severity::Critical);
        assert_eq!(findings.headline(), Some(MISSING_PRIMARIES));
        assert_eq!(findings.into_details(), ["a", "b", "c"]);
    }
}
