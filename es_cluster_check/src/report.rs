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

use itertools::Itertools;

use crate::metrics::Metric;
use crate::severity::Status;
use crate::Error;

/// The service name prefixed to every status line.
pub const SERVICE: &str = "ES_CLUSTER";

/// The outcome of one evaluation, ready to be handed to the monitoring receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    status: Status,
    message: String,
    details: Vec<String>,
    metrics: Vec<Metric>,
}

impl Verdict {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::default(),
            metrics: Vec::default(),
        }
    }

    /// Creates the verdict of an aborted evaluation, keeping the metrics computed so far.
    pub fn from_error(error: &Error, metrics: Vec<Metric>) -> Self {
        Self::new(error.status(), error.message()).with_metrics(metrics)
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    #[inline]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    #[inline]
    pub fn details(&self) -> &[String] {
        &self.details
    }

    #[inline]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Renders the verdict in the monitoring plugin format:
    ///
    /// ```text
    /// ES_CLUSTER WARNING - <message> | 'label'=value<unit> ...
    /// <detail>
    /// <detail>
    /// ```
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // '|' separates performance data and must not leak from messages
        let sanitize = |s: &str| s.replace('|', "/");

        write!(f, "{SERVICE} {} - {}", self.status, sanitize(&self.message))?;

        if !self.metrics.is_empty() {
            write!(f, " | {}", self.metrics.iter().join(" "))?;
        }

        for detail in &self.details {
            write!(f, "\n{}", sanitize(detail))?;
        }

        Ok(())
    }
}
