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

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

use crate::views::Node as NodeView;
use crate::Error;

const CLIENT_ATTRIBUTE: &str = "client";
const DATA_ATTRIBUTE: &str = "data";
const MASTER_ATTRIBUTE: &str = "master";

/// Parses a boolean the way node attributes report them.
///
/// Only `true` and `false` are accepted, in any case.
pub fn parse_case_insensitive_bool(value: &str) -> Result<bool, Error> {
    match value.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::InvalidBoolean(value.to_string())),
    }
}

/// An ordered tuple of failure-domain attribute values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location(Vec<String>);

impl Location {
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(values.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}

/// The internal node representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: String,
    name: String,
    attributes: BTreeMap<String, String>,
    master_eligible: bool,
    data: bool,
}

impl Node {
    /// Creates a node from its cluster state representation.
    ///
    /// Roles default to data-holding and master-eligible. A `client` node turns both
    /// off unless the `data` or `master` attribute explicitly says otherwise.
    ///
    /// # Errors
    /// This associated function will return an error if any role attribute is not a
    /// boolean.
    pub fn new(id: String, view: NodeView) -> Result<Self, Error> {
        let attributes = view.attributes;
        let flag = |key: &str| -> Result<Option<bool>, Error> {
            attributes
                .get(key)
                .map(|value| parse_case_insensitive_bool(value))
                .transpose()
        };

        let client = flag(CLIENT_ATTRIBUTE)?.unwrap_or(false);
        let master_eligible = flag(MASTER_ATTRIBUTE)?.unwrap_or(!client);
        let data = flag(DATA_ATTRIBUTE)?.unwrap_or(!client);

        Ok(Self {
            id,
            name: view.name,
            attributes,
            master_eligible,
            data,
        })
    }

    #[inline]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Indicates if the node may be elected cluster coordinator.
    #[inline]
    pub fn is_master_eligible(&self) -> bool {
        self.master_eligible
    }

    /// Indicates if the node is expected to hold data.
    #[inline]
    pub fn is_data(&self) -> bool {
        self.data
    }

    /// Computes the node failure-domain location for the given attribute keys.
    ///
    /// Nodes not expected to hold data have no location, and neither does any node
    /// when no keys are given.
    ///
    /// # Errors
    /// A data node lacking one of the keys is a deployment misconfiguration and
    /// yields [`Error::MissingFailureDomain`].
    pub fn location(&self, keys: &[String]) -> Result<Option<Location>, Error> {
        if keys.is_empty() || !self.data {
            return Ok(None);
        }

        keys.iter()
            .map(|key| {
                self.attribute(key)
                    .map(str::to_string)
                    .ok_or_else(|| Error::MissingFailureDomain {
                        node_id: self.id.clone(),
                        node_name: self.name.clone(),
                        attribute: key.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|values| Some(Location(values)))
    }
}
