// src/main.rs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use purge::config::PurgeConfig;
use purge::filter::CostPolicy;
use purge::relation::{CadoRelationParser, FileRelationSource};
use purge::{Purge, PurgeReport, Result};

/// Remove singletons and excess relations, then write the matrix for merge.
#[derive(Debug, Parser)]
#[command(name = "purge", version)]
struct Cli {
    /// Relation files, read in order
    files: Vec<PathBuf>,

    /// File listing the relation files, one per line
    #[arg(long)]
    filelist: Option<PathBuf>,

    /// Output matrix file
    #[arg(long)]
    out: PathBuf,

    /// Number of relations in the input
    #[arg(long)]
    nrels: Option<usize>,

    /// Expected number of prime ideals
    #[arg(long)]
    nprimes: Option<usize>,

    /// Only consider rational primes >= this on the first pass (default rlim)
    #[arg(long)]
    minpr: Option<u64>,

    /// Only consider algebraic primes >= this on the first pass (default alim)
    #[arg(long)]
    minpa: Option<u64>,

    #[arg(long)]
    rlim: Option<u64>,

    #[arg(long)]
    alim: Option<u64>,

    #[arg(long)]
    lpbr: Option<u32>,

    #[arg(long)]
    lpba: Option<u32>,

    /// Initial excess must be >= this
    #[arg(long)]
    excess: Option<usize>,

    /// Prune if the excess is above this
    #[arg(long)]
    keep: Option<usize>,

    /// Output relations in their input format
    #[arg(long)]
    raw: bool,

    /// Write the renumbering table to this file
    #[arg(long)]
    sos: Option<PathBuf>,

    /// Scoring of components when pruning the excess
    #[arg(long, value_enum)]
    cost_policy: Option<CostPolicy>,

    /// Configuration file (default: purge.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the run summary as JSON
    #[arg(long)]
    stats: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut PurgeConfig) {
        if let Some(nrels) = self.nrels {
            config.nrels = nrels;
        }
        if self.nprimes.is_some() {
            config.expected_ideals = self.nprimes;
        }
        if self.minpr.is_some() {
            config.min_rational = self.minpr;
        }
        if self.minpa.is_some() {
            config.min_algebraic = self.minpa;
        }
        if let Some(rlim) = self.rlim {
            config.rlim = rlim;
        }
        if let Some(alim) = self.alim {
            config.alim = alim;
        }
        if let Some(lpbr) = self.lpbr {
            config.lpbr = lpbr;
        }
        if let Some(lpba) = self.lpba {
            config.lpba = lpba;
        }
        if let Some(excess) = self.excess {
            config.min_excess = excess;
        }
        if let Some(keep) = self.keep {
            config.keep = keep;
        }
        if self.raw {
            config.raw = true;
        }
        if let Some(policy) = self.cost_policy {
            config.cost_policy = policy;
        }
    }
}

fn run(cli: &Cli, config: PurgeConfig) -> Result<PurgeReport> {
    let source = match &cli.filelist {
        Some(filelist) => FileRelationSource::from_filelist(filelist)?,
        None => FileRelationSource::new(cli.files.clone()),
    };
    let parser = CadoRelationParser;

    let mut matrix_out = BufWriter::new(File::create(&cli.out)?);
    let mut sos_out = match &cli.sos {
        Some(path) => {
            info!("Outputting renumber table in file {}", path.display());
            Some(BufWriter::new(File::create(path)?))
        }
        None => None,
    };

    let purge = Purge::new(config, &source, &parser);
    let report = purge.run(
        &mut matrix_out,
        sos_out.as_mut().map(|w| w as &mut dyn Write),
    )?;
    if let Some(mut sos) = sos_out {
        sos.flush()?;
    }

    if let Some(path) = &cli.stats {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)?;
    }
    Ok(report)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => PurgeConfig::load_from_file(path),
        None => PurgeConfig::load(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    // Initialize the logger
    let env = Env::default()
        .filter_or("PURGE_LOG", config.log_level.as_str())
        .write_style_or("PURGE_LOG_STYLE", "auto");
    env_logger::Builder::from_env(env).init();

    if config.nrels == 0 {
        error!("missing --nrels (or nrels in the configuration)");
        return ExitCode::FAILURE;
    }
    if cli.files.is_empty() && cli.filelist.is_none() {
        error!("no relation files given");
        return ExitCode::FAILURE;
    }

    match run(&cli, config) {
        Ok(report) => {
            for line in report.summary_lines() {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            // a half-written matrix must not be picked up by merge
            let _ = std::fs::remove_file(&cli.out);
            if let Some(sos) = &cli.sos {
                let _ = std::fs::remove_file(sos);
            }
            ExitCode::FAILURE
        }
    }
}
