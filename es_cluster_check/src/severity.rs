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

use strum::Display;

/// The severity tiers the assertion engine can conclude.
///
/// Variants are declared from best to worst, so `a > b` reads "a is worse than b".
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Critical,
}

/// The final status handed to the monitoring receiver.
///
/// `Unknown` is reserved for evaluations that could not be carried out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// The process exit status monitoring receivers expect for this status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }
}

impl From<Severity> for Status {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Ok => Self::Ok,
            Severity::Warning => Self::Warning,
            Severity::Critical => Self::Critical,
        }
    }
}

/// Tracks the worst severity observed during one evaluation.
///
/// The aggregate only ever gets worse: ties and improvements are ignored.
#[derive(Debug, Default)]
pub struct SeverityAggregator {
    current: Severity,
}

impl SeverityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowers the aggregate to `candidate` if it is worse than the current one.
    ///
    /// Returns whether the aggregate changed.
    pub fn downgrade(&mut self, candidate: Severity) -> bool {
        if candidate > self.current {
            self.current = candidate;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn current(&self) -> Severity {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_starts_ok() {
        assert_eq!(SeverityAggregator::new().current(), Severity::Ok);
    }

    #[test]
    fn it_only_gets_worse() {
        let mut aggregator = SeverityAggregator::new();

        assert!(!aggregator.downgrade(Severity::Ok));
        assert!(aggregator.downgrade(Severity::Warning));
        assert!(!aggregator.downgrade(Severity::Warning));
        assert!(aggregator.downgrade(Severity::Critical));

        for candidate in [Severity::Warning, Severity::Ok, Severity::Critical] {
            assert!(!aggregator.downgrade(candidate));
            assert_eq!(aggregator.current(), Severity::Critical);
        }
    }

    #[test]
    fn it_maps_to_exit_codes() {
        let tests = [
            (Status::Ok, 0, "OK"),
            (Status::Warning, 1, "WARNING"),
            (Status::Critical, 2, "CRITICAL"),
            (Status::Unknown, 3, "UNKNOWN"),
        ];

        for (status, code, display) in tests {
            assert_eq!(status.exit_code(), code);
            assert_eq!(status.to_string(), display);
        }
    }
}
