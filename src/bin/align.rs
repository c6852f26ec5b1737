// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::fs;
use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use structopt::StructOpt;

use pairhmm_aligner::{align_pairs_banded_with_config, align_pairs_with_config, AlignerConfig};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "align",
    about = "Compute posterior-weighted aligned base pairs between two sequences.",
    setting = structopt::clap::AppSettings::ColoredHelp
)]
struct Opt {
    /// First sequence, or a path to a file containing it when --from-file is set.
    x: String,
    /// Second sequence, or a path to a file containing it when --from-file is set.
    y: String,
    /// Treat X and Y as paths to files holding the raw sequences.
    #[structopt(long)]
    from_file: bool,
    /// Run the banded driver with this band size instead of the full algorithm.
    #[structopt(long)]
    band: Option<usize>,
    /// Load tuning constants from a YAML AlignerConfig file instead of the defaults.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn setup_logger(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .unwrap();
}

fn read_sequence(arg: &str, from_file: bool) -> Result<Vec<u8>> {
    if from_file {
        let contents = fs::read(PathBuf::from(arg))
            .with_context(|| format!("could not read sequence file {}", arg))?;
        Ok(contents
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .collect())
    } else {
        Ok(arg.as_bytes().to_vec())
    }
}

fn run(opt: Opt) -> Result<()> {
    let x = read_sequence(&opt.x, opt.from_file)?;
    let y = read_sequence(&opt.y, opt.from_file)?;

    let config = match &opt.config {
        Some(path) => AlignerConfig::from_yaml_file(path)
            .with_context(|| format!("invalid config file {}", path.display()))?,
        None => AlignerConfig::default(),
    };

    let pairs = match opt.band {
        Some(band_size) => align_pairs_banded_with_config(&x, &y, band_size, &config),
        None => align_pairs_with_config(&x, &y, &config),
    };

    for pair in &pairs {
        println!("{}\t{}\t{}", pair.x, pair.y, pair.score);
    }

    Ok(())
}

pub fn main() {
    let opt = Opt::from_args();
    setup_logger(opt.verbose);

    exit(match run(opt) {
        Err(e) => {
            println!("Error: {}", e);
            1
        }
        _ => 0,
    })
}
