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

use std::process;

use clap::Parser;
use es_cluster_check::{
    evaluate, snapshot, CheckSettings, Error, Expectations, HttpSnapshotProvider, Status, Verdict,
};
use eyre::{eyre, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Opt {
    #[command(flatten)]
    settings: CheckSettings,
    /// The log filter used when `RUST_LOG` is not set. Logs go to stderr.
    #[arg(long, env = "ES_CHECK_LOG", default_value = "warn")]
    log_level: String,
}

/// Hands the verdict to the monitoring receiver and terminates.
fn report(verdict: Verdict) -> ! {
    println!("{}", verdict.render());
    process::exit(verdict.status().exit_code())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = match Opt::try_parse() {
        Ok(opt) => opt,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(Status::Unknown.exit_code())
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&opt.log_level))
        .map_err(|e| eyre!(e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| eyre!(e))?;

    let settings = opt.settings;
    tracing::debug!(?settings, "Settings loaded");

    let verdict = settings
        .base_url()
        .map_err(snapshot::Error::from)
        .and_then(|base_url| HttpSnapshotProvider::new(base_url, settings.timeout))
        .map(|provider| evaluate(&provider, &Expectations::from(&settings)))
        .unwrap_or_else(|e| Verdict::from_error(&Error::from(e), Vec::default()));

    report(verdict)
}
