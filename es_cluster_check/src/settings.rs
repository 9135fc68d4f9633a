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

use std::num::NonZeroUsize;
use std::time::Duration;

use clap::Args;
use url::Url;

/// A structure containing all the cluster check settings.
#[derive(Debug, Clone, Args)]
pub struct CheckSettings {
    /// The host Elasticsearch listens on.
    #[arg(short = 'H', long, env = "ES_HOST", default_value = "localhost")]
    pub host: String,
    /// The port Elasticsearch listens on.
    #[arg(short = 'P', long, env = "ES_PORT", default_value_t = 9200)]
    pub port: u16,
    /// A path prefix to put in front of every API path, for proxied clusters.
    #[arg(long, env = "ES_URL_PREFIX", default_value = "")]
    pub prefix: String,
    /// The node attributes that define a failure domain (comma-separated).
    ///
    /// When given, primary and replica copies are expected to span more than one
    /// failure domain.
    #[arg(short, long, env = "ES_FAILURE_DOMAIN", value_delimiter = ',')]
    pub failure_domain: Vec<String>,
    /// The minimum number of master-eligible nodes the cluster should have.
    #[arg(short, long, env = "ES_MASTER_NODES")]
    pub master_nodes: Option<NonZeroUsize>,
    /// The deadline of every API request.
    #[arg(
        short,
        long,
        env = "ES_TIMEOUT",
        default_value = "30s",
        value_parser(parse_duration::parse)
    )]
    pub timeout: Duration,
}

impl CheckSettings {
    /// The failure-domain attribute names, without blanks.
    pub fn failure_domain(&self) -> Vec<String> {
        self.failure_domain
            .iter()
            .map(|attribute| attribute.trim())
            .filter(|attribute| !attribute.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The URL every API path is resolved against.
    ///
    /// # Errors
    /// This method will return an error if the host or prefix do not form a valid URL.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        let prefix = self.prefix.trim_matches('/');

        if prefix.is_empty() {
            Url::parse(&format!("http://{}:{}/", self.host, self.port))
        } else {
            Url::parse(&format!("http://{}:{}/{prefix}/", self.host, self.port))
        }
    }
}
