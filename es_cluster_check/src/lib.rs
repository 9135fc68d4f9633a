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

// #![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assertions;
pub mod check;
pub mod error;
pub mod index;
pub mod metrics;
pub mod node;
pub mod report;
pub mod settings;
pub mod severity;
pub mod shard;
pub mod snapshot;
pub mod topology;
pub mod version;
pub mod views;

pub use check::{evaluate, Expectations};
pub use error::Error;
pub use report::Verdict;
pub use settings::CheckSettings;
pub use severity::{Severity, SeverityAggregator, Status};
pub use snapshot::{HttpSnapshotProvider, SnapshotProvider};
pub use topology::Topology;
