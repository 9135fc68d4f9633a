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

use serde_json::Value;

use crate::version::Version;
use crate::Error;

const NUMBER_OF_SHARDS: &str = "number_of_shards";
const NUMBER_OF_REPLICAS: &str = "number_of_replicas";
/// Elasticsearch refuses to create indices with more shards than this.
pub const MAX_SHARDS: u32 = 1024;

/// The two shapes index settings are reported with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SettingsSchema {
    /// Pre-1.0 flat keys: `{"index.number_of_shards": "5"}`.
    Flat,
    /// Nested keys: `{"index": {"number_of_shards": "5"}}`.
    Nested,
}

impl SettingsSchema {
    /// Selects the schema used by the given reporting version.
    pub fn for_version(version: &Version) -> Self {
        if *version < Version::new([1, 0, 0]) {
            Self::Flat
        } else {
            Self::Nested
        }
    }

    fn lookup<'a>(&self, settings: &'a Value, key: &str) -> Option<&'a Value> {
        match self {
            Self::Flat => settings.get(format!("index.{key}")),
            Self::Nested => settings.get("index").and_then(|index| index.get(key)),
        }
    }

    /// Reads a numeric setting, reported either as a JSON string or number.
    fn read(&self, settings: &Value, index: &str, key: &'static str) -> Result<u32, Error> {
        let value = match self.lookup(settings, key) {
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        };

        value.ok_or_else(|| Error::InvalidSetting {
            index: index.to_string(),
            setting: key,
        })
    }
}

/// The internal index representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    name: String,
    shards: u32,
    replicas: u32,
}

impl Index {
    pub fn new(name: String, shards: u32, replicas: u32) -> Self {
        Self {
            name,
            shards,
            replicas,
        }
    }

    /// Creates an index from its reported settings.
    ///
    /// # Errors
    /// This associated function will return an error if the shard or replica count is
    /// missing or not numeric, or if the shard count exceeds [`MAX_SHARDS`].
    pub fn from_settings(
        name: String,
        settings: &Value,
        schema: SettingsSchema,
    ) -> Result<Self, Error> {
        let shards = schema.read(settings, &name, NUMBER_OF_SHARDS)?;

        if shards > MAX_SHARDS {
            return Err(Error::InvalidSetting {
                index: name,
                setting: NUMBER_OF_SHARDS,
            });
        }

        let replicas = schema.read(settings, &name, NUMBER_OF_REPLICAS)?;

        Ok(Self::new(name, shards, replicas))
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The number of shard slots of the index.
    #[inline]
    pub fn shards(&self) -> u32 {
        self.shards
    }

    /// The configured number of replicas per shard.
    #[inline]
    pub fn replicas(&self) -> u32 {
        self.replicas
    }
}
