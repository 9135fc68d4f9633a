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
use std::str::FromStr;

use itertools::Itertools;

use crate::Error;

/// A dotted software version, compared component by component as integers.
///
/// Only the leading digits of each `.`-separated component are kept and parsing
/// stops at the first component without any, so `7.10.2-SNAPSHOT` reads as
/// `(7, 10, 2)` and `1.0.0.Beta1` as `(1, 0, 0)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(Vec<u64>);

impl Version {
    pub fn new(components: impl IntoIterator<Item = u64>) -> Self {
        Self(components.into_iter().collect())
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = s
            .trim()
            .split('.')
            .map(|component| {
                let digits = component
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect::<String>();
                digits.parse::<u64>().ok()
            })
            .while_some()
            .collect::<Vec<_>>();

        if components.is_empty() {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        Ok(Self(components))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("."))
    }
}
