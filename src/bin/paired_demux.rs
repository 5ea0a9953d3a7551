// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Split a pair of FASTQ files by the sample barcodes found in mate 1.

use anyhow::{Context, Error};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use paired_demux::classifier::FASTX_SPLITTER;
use paired_demux::config::DEFAULT_MISMATCHES;
use paired_demux::job::resolve_jobs;
use paired_demux::{run_jobs, FastxBarcodeSplitter, SplitterConfig, WhichEnd};

/// Demultiplex paired-end reads whose barcodes are only in mate 1.
///
/// Mate 1 is split by barcode with fastx_barcode_splitter.pl into
/// <prefix><barcode>_demux1.fastq files; mate 2 is then sorted into
/// matching <prefix><barcode>_demux2.fastq files by read name.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Read a list of jobs instead of a single pair: tab-separated lines of
    /// barcode file, mate 1 and mate 2, from FILE or stdin. Output prefixes
    /// are taken from the file names.
    #[arg(short = 'b', long = "batch")]
    batch: bool,

    /// Barcode file: one `name tag` pair per line.
    #[arg(long, required_unless_present = "batch", conflicts_with = "batch")]
    bcfile: Option<PathBuf>,

    /// Number of tolerated barcode mismatches.
    #[arg(long, default_value_t = DEFAULT_MISMATCHES)]
    mismatch: u32,

    /// Prepended to output file names. Defaults to the common leading part
    /// of the two input paths.
    #[arg(long, conflicts_with = "batch")]
    prefix: Option<String>,

    /// Where the barcode sits: bol (5' end) or eol (3' end).
    #[arg(long)]
    position: WhichEnd,

    /// Barcode classifier executable.
    #[arg(long, default_value = FASTX_SPLITTER)]
    program: PathBuf,

    /// Write a JSON summary of every job to this file.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// FILE_1 FILE_2 (mate 1 carries the barcodes), or the batch list.
    files: Vec<PathBuf>,
}

impl Args {
    fn config(&self) -> Result<SplitterConfig, Error> {
        let mut builder = SplitterConfig::builder()
            .position(self.position)
            .mismatches(self.mismatch)
            .program(&self.program);

        if self.batch {
            if self.files.len() > 1 {
                anyhow::bail!("batch mode takes at most one list file");
            }
            builder = builder.batch(self.files.first().cloned());
        } else {
            if self.files.len() != 2 {
                anyhow::bail!("expected FILE_1 and FILE_2, got {} files", self.files.len());
            }
            builder = builder.pair(&self.files[0], &self.files[1]);
            if let Some(bc) = &self.bcfile {
                builder = builder.barcodes(bc);
            }
            if let Some(prefix) = &self.prefix {
                builder = builder.prefix(prefix.as_str());
            }
        }

        Ok(builder.build()?)
    }
}

fn run(args: &Args) -> Result<bool, Error> {
    let config = args.config()?;
    let jobs = resolve_jobs(config.source()).context("reading the job list")?;
    let classifier = FastxBarcodeSplitter::new(config.program());

    let report = run_jobs(&jobs, &config, &classifier);

    let (matched, unmatched, unconsumed) = report.totals();
    info!(
        "{} of {} jobs completed: {} mate-2 reads demultiplexed, {} not matched, {} mate-1 reads unpaired",
        report.jobs.len() - report.failures(),
        report.jobs.len(),
        matched,
        unmatched,
        unconsumed
    );

    if let Some(path) = &args.summary {
        report.write_json(path)?;
    }
    Ok(report.all_succeeded())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
