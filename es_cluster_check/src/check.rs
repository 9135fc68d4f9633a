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

//! One complete cluster evaluation.
//!
//! The snapshots are fetched sequentially, the metrics extracted, the topology built
//! and the rules run against it. Whatever happens, the evaluation ends with a
//! [`Verdict`]: failures abort it with the metrics computed so far attached.

use std::mem;
use std::num::NonZeroUsize;

use tracing::{info, warn};

use crate::assertions::AssertionEngine;
use crate::index::SettingsSchema;
use crate::metrics::{self, Metric};
use crate::report::Verdict;
use crate::settings::CheckSettings;
use crate::severity::Status;
use crate::snapshot::SnapshotProvider;
use crate::topology::Topology;
use crate::version::Version;
use crate::Error;

/// What the cluster is expected to look like, beyond its own invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectations {
    /// Node attributes defining a failure domain, none disables the check.
    pub failure_domain: Vec<String>,
    /// Minimum number of master-eligible nodes, none disables the check.
    pub master_nodes: Option<NonZeroUsize>,
}

impl From<&CheckSettings> for Expectations {
    fn from(settings: &CheckSettings) -> Self {
        Self {
            failure_domain: settings.failure_domain(),
            master_nodes: settings.master_nodes,
        }
    }
}

/// Evaluates the health of the cluster behind `provider`.
pub fn evaluate<P>(provider: &P, expectations: &Expectations) -> Verdict
where P: SnapshotProvider + ?Sized {
    let mut computed = Vec::default();

    match try_evaluate(provider, expectations, &mut computed) {
        Ok(verdict) => {
            info!(status = %verdict.status(), "Evaluation done");
            verdict
        }
        Err(error) => {
            warn!(%error, "Evaluation aborted");
            Verdict::from_error(&error, computed)
        }
    }
}

fn try_evaluate<P>(
    provider: &P,
    expectations: &Expectations,
    computed: &mut Vec<Metric>,
) -> Result<Verdict, Error>
where P: SnapshotProvider + ?Sized {
    let health = provider.cluster_summary()?;
    let state = provider.cluster_state()?;
    let statistics = provider.node_statistics()?;
    let version = provider.version_info()?.version.number.parse::<Version>()?;

    let (local_node, local_stats) = statistics.local_node().ok_or(Error::MissingLocalNode)?;
    *computed = metrics::extract(&health, &state, local_stats);

    let schema = SettingsSchema::for_version(&version);
    let topology = Topology::build(state, schema, &expectations.failure_domain)?;

    let findings = AssertionEngine::new(&topology, local_node, expectations.master_nodes).run();

    // the cluster knows something we could not detect
    if health.status.severity() > findings.severity() {
        return Ok(Verdict::new(
            Status::Critical,
            format!(
                "Elasticsearch cluster '{}' reports status '{}'",
                health.cluster_name, health.status
            ),
        )
        .with_metrics(mem::take(computed)));
    }

    let message = match findings.headline() {
        Some(headline) => headline.to_string(),
        None => format!("Elasticsearch cluster '{}' is healthy", health.cluster_name),
    };

    Ok(Verdict::new(findings.severity().into(), message)
        .with_details(findings.into_details())
        .with_metrics(mem::take(computed)))
}
