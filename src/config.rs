// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Settings for a splitter run, checked once when they are built.

use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::barcode::WhichEnd;
use crate::classifier::FASTX_SPLITTER;
use crate::error::SplitError;

/// Number of barcode mismatches tolerated unless configured otherwise.
pub const DEFAULT_MISMATCHES: u32 = 1;

/// Where the jobs of a run come from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum JobSource {
    /// One pair of files. Without a prefix, one is inferred from the
    /// file names.
    Single {
        barcodes: PathBuf,
        mate1: PathBuf,
        mate2: PathBuf,
        prefix: Option<String>,
    },
    /// A tab-separated list of `barcodes mate1 mate2` lines, read from
    /// the given file or from stdin. Prefixes are always inferred.
    Batch { list: Option<PathBuf> },
}

/// Immutable configuration of a splitter run. Build with
/// `SplitterConfig::builder()`; there is no other way to construct one.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SplitterConfig {
    position: WhichEnd,
    mismatches: u32,
    program: PathBuf,
    source: JobSource,
}

impl SplitterConfig {
    pub fn builder() -> SplitterConfigBuilder {
        SplitterConfigBuilder::default()
    }

    pub fn position(&self) -> WhichEnd {
        self.position
    }

    pub fn mismatches(&self) -> u32 {
        self.mismatches
    }

    /// Classifier executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn source(&self) -> &JobSource {
        &self.source
    }
}

#[derive(Default, Clone, Debug)]
pub struct SplitterConfigBuilder {
    position: Option<WhichEnd>,
    mismatches: Option<u32>,
    program: Option<PathBuf>,
    barcodes: Option<PathBuf>,
    pair: Option<(PathBuf, PathBuf)>,
    prefix: Option<String>,
    batch: Option<Option<PathBuf>>,
}

impl SplitterConfigBuilder {
    pub fn position(mut self, position: WhichEnd) -> Self {
        self.position = Some(position);
        self
    }

    pub fn mismatches(mut self, mismatches: u32) -> Self {
        self.mismatches = Some(mismatches);
        self
    }

    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn barcodes(mut self, barcodes: impl Into<PathBuf>) -> Self {
        self.barcodes = Some(barcodes.into());
        self
    }

    /// Split one pair of files: `mate1` carries the barcodes.
    pub fn pair(mut self, mate1: impl Into<PathBuf>, mate2: impl Into<PathBuf>) -> Self {
        self.pair = Some((mate1.into(), mate2.into()));
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Read jobs from a batch list; `None` reads it from stdin.
    pub fn batch(mut self, list: Option<PathBuf>) -> Self {
        self.batch = Some(list);
        self
    }

    pub fn build(self) -> Result<SplitterConfig, SplitError> {
        let position = self
            .position
            .ok_or_else(|| SplitError::Config("a barcode position (bol or eol) is required".into()))?;

        let source = match (self.batch, self.pair) {
            (Some(_), Some(_)) => {
                return Err(SplitError::Config(
                    "give either a batch list or a pair of files, not both".into(),
                ))
            }
            (Some(list), None) => {
                // each batch line names its own barcode file and prefix
                if self.barcodes.is_some() || self.prefix.is_some() {
                    return Err(SplitError::Config(
                        "barcode file and prefix come from the batch list in batch mode".into(),
                    ));
                }
                JobSource::Batch { list }
            }
            (None, Some((mate1, mate2))) => {
                let barcodes = self.barcodes.ok_or_else(|| {
                    SplitError::Config("a barcode file is required to split a pair".into())
                })?;
                if mate1 == mate2 {
                    return Err(SplitError::Config(format!(
                        "mate 1 and mate 2 are the same file: {:?}",
                        mate1
                    )));
                }
                JobSource::Single {
                    barcodes,
                    mate1,
                    mate2,
                    prefix: self.prefix,
                }
            }
            (None, None) => {
                return Err(SplitError::Config(
                    "nothing to split: give a pair of files or a batch list".into(),
                ))
            }
        };

        Ok(SplitterConfig {
            position,
            mismatches: self.mismatches.unwrap_or(DEFAULT_MISMATCHES),
            program: self.program.unwrap_or_else(|| PathBuf::from(FASTX_SPLITTER)),
            source,
        })
    }
}
