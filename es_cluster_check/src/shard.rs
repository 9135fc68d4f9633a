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

use serde::Deserialize;
use strum::Display;

/// The lifecycle stage of a shard copy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ShardState {
    Unassigned,
    Initializing,
    Started,
    Relocating,
}

impl ShardState {
    /// Indicates if a copy in this state is serving data.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Started | Self::Relocating)
    }

    /// Indicates if a copy in this state lives on a node.
    #[inline]
    pub fn is_placed(&self) -> bool {
        *self != Self::Unassigned
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShardRole {
    Primary,
    Replica,
}

/// Identifies one shard slot of an index.
///
/// Primary and replica copies of the same slot share this key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardKey {
    pub index: String,
    pub number: u32,
}

impl ShardKey {
    pub fn new(index: impl Into<String>, number: u32) -> Self {
        Self {
            index: index.into(),
            number,
        }
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}]", self.index, self.number)
    }
}

/// The internal representation of one copy of a shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardCopy {
    key: ShardKey,
    state: ShardState,
    /// Only placed copies have an owning node.
    node: Option<String>,
}

impl ShardCopy {
    /// Creates a shard copy.
    ///
    /// The owning node of an unassigned copy is dropped, whatever the routing table says.
    pub fn new(key: ShardKey, state: ShardState, node: Option<String>) -> Self {
        let node = node.filter(|_| state.is_placed());

        Self { key, state, node }
    }

    #[inline]
    pub fn key(&self) -> &ShardKey {
        &self.key
    }

    #[inline]
    pub fn state(&self) -> ShardState {
        self.state
    }

    /// The node this copy is physically located on.
    #[inline]
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    #[inline]
    pub fn is_placed(&self) -> bool {
        self.node.is_some()
    }
}
