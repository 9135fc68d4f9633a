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

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// The `/_nodes/_local/stats` representation.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeStatistics {
    #[serde(default)]
    pub nodes: HashMap<String, NodeStats>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeStats {
    /// Nested numeric counters; the exact set depends on the reporting version.
    #[serde(default)]
    pub indices: Value,
}

impl NodeStatistics {
    /// The node that answered the request, if it reported itself.
    pub fn local_node(&self) -> Option<(&str, &NodeStats)> {
        self.nodes.iter().next().map(|(id, stats)| (id.as_str(), stats))
    }
}
