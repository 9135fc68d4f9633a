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

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::views::{ClusterHealth, ClusterState, IndexState, NodeStats};

/// The unit a metric value is reported with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Reported as is.
    None,
    Bytes,
    /// A monotonically increasing counter.
    Counter,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Bytes => "B",
            Self::Counter => "c",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    label: &'static str,
    value: u64,
    unit: Unit,
}

impl Metric {
    pub fn new(label: &'static str, value: u64, unit: Unit) -> Self {
        Self { label, value, unit }
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.value
    }

    #[inline]
    pub fn unit(&self) -> Unit {
        self.unit
    }
}

/// Renders the metric as a performance data item.
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}'={}{}", self.label, self.value, self.unit.symbol())
    }
}

/// Local node counters, as `(label, path under "indices", unit)`.
const NODE_COUNTERS: &[(&str, &[&str], Unit)] = &[
    ("storesize", &["store", "size_in_bytes"], Unit::Bytes),
    ("documents", &["docs", "count"], Unit::None),
    ("index_ops", &["indexing", "index_total"], Unit::Counter),
    ("index_time", &["indexing", "index_time_in_millis"], Unit::Counter),
    ("delete_ops", &["indexing", "delete_total"], Unit::Counter),
    ("delete_time", &["indexing", "delete_time_in_millis"], Unit::Counter),
    ("get_ops", &["get", "total"], Unit::Counter),
    ("get_time", &["get", "time_in_millis"], Unit::Counter),
    ("exists_ops", &["get", "exists_total"], Unit::Counter),
    ("exists_time", &["get", "exists_time_in_millis"], Unit::Counter),
    ("missing_ops", &["get", "missing_total"], Unit::Counter),
    ("missing_time", &["get", "missing_time_in_millis"], Unit::Counter),
    ("query_ops", &["search", "query_total"], Unit::Counter),
    ("query_time", &["search", "query_time_in_millis"], Unit::Counter),
    ("fetch_ops", &["search", "fetch_total"], Unit::Counter),
    ("fetch_time", &["search", "fetch_time_in_millis"], Unit::Counter),
    ("merge_ops", &["merges", "total"], Unit::Counter),
    ("merge_time", &["merges", "total_time_in_millis"], Unit::Counter),
    ("refresh_ops", &["refresh", "total"], Unit::Counter),
    ("refresh_time", &["refresh", "total_time_in_millis"], Unit::Counter),
    ("flush_ops", &["flush", "total"], Unit::Counter),
    ("flush_time", &["flush", "total_time_in_millis"], Unit::Counter),
    ("throttle_time", &["store", "throttle_time_in_millis"], Unit::Counter),
];

/// Extracts the fixed, ordered metric list.
///
/// Counters the reporting version does not provide are skipped.
pub fn extract(health: &ClusterHealth, state: &ClusterState, stats: &NodeStats) -> Vec<Metric> {
    let mut metrics = vec![
        Metric::new("cluster_nodes", health.number_of_nodes, Unit::None),
        Metric::new("data_nodes", health.number_of_data_nodes, Unit::None),
    ];

    if let Some(value) = health.active_primary_shards {
        metrics.push(Metric::new("active_primary_shards", value, Unit::None));
    }

    metrics.extend([
        Metric::new("active_shards", health.active_shards, Unit::None),
        Metric::new("relocating_shards", health.relocating_shards, Unit::None),
        Metric::new("initializing_shards", health.initializing_shards, Unit::None),
        Metric::new("unassigned_shards", health.unassigned_shards, Unit::None),
    ]);

    let (open, closed) = state
        .metadata
        .indices
        .values()
        .fold((0, 0), |(open, closed), index| match index.state {
            IndexState::Open => (open + 1, closed),
            IndexState::Close => (open, closed + 1),
        });

    metrics.push(Metric::new("open_indices", open, Unit::None));
    metrics.push(Metric::new("closed_indices", closed, Unit::None));

    for (label, path, unit) in NODE_COUNTERS {
        match lookup(&stats.indices, path) {
            Some(value) => metrics.push(Metric::new(*label, value, *unit)),
            None => debug!(metric = *label, "Counter not reported, skipping"),
        }
    }

    metrics
}

fn lookup(value: &Value, path: &[&str]) -> Option<u64> {
    path.iter()
        .try_fold(value, |value, key| value.get(key))
        .and_then(Value::as_u64)
}
