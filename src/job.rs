// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Resolve the jobs of a run and drive each one: classify mate 1, then
//! synchronize mate 2 against the resulting buckets.

use anyhow::{Context, Error};
use itertools::Itertools;
use log::{error, info};
use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::{Path, PathBuf};

use crate::classifier::{Bucket, ClassifyRequest, Classifier};
use crate::config::{JobSource, SplitterConfig};
use crate::error::SplitError;
use crate::filenames::common_prefix;
use crate::sync::{synchronize, SyncSummary};

/// One pair of files to split.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub barcodes: PathBuf,
    pub mate1: PathBuf,
    pub mate2: PathBuf,
    /// Prepended to every output file name
    pub prefix: String,
}

impl Job {
    /// Without an explicit `prefix`, outputs are named after the common
    /// leading part of the two input paths.
    pub fn new(
        barcodes: impl Into<PathBuf>,
        mate1: impl Into<PathBuf>,
        mate2: impl Into<PathBuf>,
        prefix: Option<String>,
    ) -> Job {
        let mate1 = mate1.into();
        let mate2 = mate2.into();
        let prefix = prefix.unwrap_or_else(|| {
            common_prefix(&mate1.to_string_lossy(), &mate2.to_string_lossy())
        });
        Job {
            barcodes: barcodes.into(),
            mate1,
            mate2,
            prefix,
        }
    }

    fn request<'a>(&'a self, config: &SplitterConfig) -> ClassifyRequest<'a> {
        ClassifyRequest {
            barcodes: &self.barcodes,
            mate1: &self.mate1,
            prefix: &self.prefix,
            position: config.position(),
            mismatches: config.mismatches(),
        }
    }
}

/// Parse a batch list: tab-separated `barcodes mate1 mate2` lines. Blank
/// lines and `#` comments are skipped.
pub fn read_batch_list<R: Read>(reader: R) -> Result<Vec<Job>, SplitError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut jobs = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| SplitError::BatchFormat {
            line: e.position().map_or(0, |p| p.line()),
            msg: e.to_string(),
        })?;
        let line = record.position().map_or(0, |p| p.line());

        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        if record.len() != 3 {
            return Err(SplitError::BatchFormat {
                line,
                msg: format!(
                    "expected 3 tab-separated columns (barcodes, mate 1, mate 2), found {}",
                    record.len()
                ),
            });
        }
        if record.iter().any(|f| f.is_empty()) {
            return Err(SplitError::BatchFormat {
                line,
                msg: "empty column".to_string(),
            });
        }

        jobs.push(Job::new(&record[0], &record[1], &record[2], None));
    }
    Ok(jobs)
}

/// The jobs described by `source`.
pub fn resolve_jobs(source: &JobSource) -> Result<Vec<Job>, SplitError> {
    match source {
        JobSource::Single {
            barcodes,
            mate1,
            mate2,
            prefix,
        } => Ok(vec![Job::new(
            barcodes.clone(),
            mate1.clone(),
            mate2.clone(),
            prefix.clone(),
        )]),
        JobSource::Batch { list: Some(path) } => {
            let f = File::open(path).map_err(|e| SplitError::io(path, e))?;
            read_batch_list(f)
        }
        JobSource::Batch { list: None } => read_batch_list(io::stdin().lock()),
    }
}

/// Outputs and counts of a completed job.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct JobSummary {
    pub job: Job,
    /// Mate-1 buckets, in the order they were matched against
    pub buckets: Vec<Bucket>,
    pub sync: SyncSummary,
}

/// Classify mate 1, then split mate 2 to match. Nothing is synchronized
/// if classification fails.
pub fn run_job(
    job: &Job,
    config: &SplitterConfig,
    classifier: &dyn Classifier,
) -> Result<JobSummary, Error> {
    info!("start processing: {:?} / {:?}", job.mate1, job.mate2);

    let buckets = classifier
        .classify(&job.request(config))
        .with_context(|| format!("classifying {:?}", job.mate1))?;
    info!(
        "mate 1 split into {} buckets: {}",
        buckets.len(),
        buckets.iter().map(|b| b.barcode.as_str()).join(", ")
    );

    let sync = synchronize(&buckets, &job.mate2)
        .with_context(|| format!("splitting {:?} to follow {:?}", job.mate2, job.mate1))?;
    info!(
        "done processing: {:?}: {} mate-2 reads matched, {} unmatched, {} mate-1 reads unpaired",
        job.mate2,
        sync.matched,
        sync.unmatched,
        sync.unconsumed()
    );

    Ok(JobSummary {
        job: job.clone(),
        buckets,
        sync,
    })
}

/// Result of one job in a run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Done(JobSummary),
    Failed { job: Job, error: String },
}

impl JobOutcome {
    pub fn job(&self) -> &Job {
        match self {
            JobOutcome::Done(s) => &s.job,
            JobOutcome::Failed { job, .. } => job,
        }
    }
}

/// Outcomes of all jobs of a run, in input order.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub config: SplitterConfig,
    pub jobs: Vec<JobOutcome>,
}

impl RunReport {
    pub fn completed(&self) -> impl Iterator<Item = &JobSummary> {
        self.jobs.iter().filter_map(|o| match o {
            JobOutcome::Done(s) => Some(s),
            JobOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> usize {
        self.jobs.len() - self.completed().count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures() == 0
    }

    /// Totals over completed jobs: (matched, unmatched, unconsumed).
    pub fn totals(&self) -> (u64, u64, u64) {
        self.completed().fold((0, 0, 0), |(m, u, c), s| {
            (m + s.sync.matched, u + s.sync.unmatched, c + s.sync.unconsumed())
        })
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let f = File::create(path).with_context(|| format!("creating {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(f), self)
            .with_context(|| format!("writing summary to {:?}", path))?;
        Ok(())
    }
}

/// Run `jobs` one after another. A failed job is logged and recorded, and
/// the remaining jobs still run.
pub fn run_jobs(jobs: &[Job], config: &SplitterConfig, classifier: &dyn Classifier) -> RunReport {
    let outcomes = jobs
        .iter()
        .map(|job| match run_job(job, config, classifier) {
            Ok(summary) => JobOutcome::Done(summary),
            Err(e) => {
                error!("job {:?} failed: {:#}", job.prefix, e);
                JobOutcome::Failed {
                    job: job.clone(),
                    error: format!("{:#}", e),
                }
            }
        })
        .collect();

    RunReport {
        config: config.clone(),
        jobs: outcomes,
    }
}
