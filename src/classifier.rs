// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Splitting mate 1 by barcode. The classifier is an external collaborator:
//! the synchronizer only needs the ordered list of buckets it produced.

use log::{debug, info};
use serde_derive::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::barcode::{read_barcode_defs, WhichEnd, UNMATCHED_BUCKET};
use crate::error::SplitError;
use crate::filenames::{bucket_path, WhichMate};
use crate::utils;

/// Default classifier executable, from the FASTX-Toolkit.
pub const FASTX_SPLITTER: &str = "fastx_barcode_splitter.pl";

/// One mate-1 output of the classifier.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Bucket {
    pub barcode: String,
    pub path: PathBuf,
}

/// What a classifier needs to split one mate-1 file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifyRequest<'a> {
    pub barcodes: &'a Path,
    pub mate1: &'a Path,
    pub prefix: &'a str,
    pub position: WhichEnd,
    pub mismatches: u32,
}

/// Splits a mate-1 file into per-barcode buckets.
///
/// Implementations must return every bucket they wrote, in a stable order;
/// that order decides which bucket wins when two hold the same read. Each
/// mate-1 read should land in at most one bucket. This is not checked.
pub trait Classifier {
    fn classify(&self, request: &ClassifyRequest<'_>) -> Result<Vec<Bucket>, SplitError>;
}

/// Runs `fastx_barcode_splitter.pl`, feeding it the (decompressed) mate-1
/// file on stdin. Buckets are reported for the files named
/// `<prefix><barcode>_demux1.fastq` and `<prefix>unmatched_demux1.fastq`
/// that exist once it has exited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastxBarcodeSplitter {
    program: PathBuf,
}

impl Default for FastxBarcodeSplitter {
    fn default() -> Self {
        FastxBarcodeSplitter::new(FASTX_SPLITTER)
    }
}

impl FastxBarcodeSplitter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        FastxBarcodeSplitter {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    fn args(&self, request: &ClassifyRequest<'_>) -> Vec<String> {
        vec![
            "--bcfile".to_string(),
            request.barcodes.to_string_lossy().into_owned(),
            "--mismatch".to_string(),
            request.mismatches.to_string(),
            "--prefix".to_string(),
            request.prefix.to_string(),
            request.position.splitter_flag().to_string(),
            "--suffix".to_string(),
            format!("{}.fastq", WhichMate::Mate1.marker()),
        ]
    }

    fn run(&self, request: &ClassifyRequest<'_>) -> Result<(), SplitError> {
        let mut input =
            utils::open_with_gz(request.mate1).map_err(|e| SplitError::io(request.mate1, e))?;

        let args = self.args(request);
        debug!("running {} {}", self.program_name(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SplitError::classifier(self.program_name(), format!("could not start: {}", e))
            })?;

        // stdin is closed when `stdin` drops, letting the child finish
        let copied = match child.stdin.take() {
            Some(mut stdin) => io::copy(&mut input, &mut stdin),
            None => Err(io::Error::new(io::ErrorKind::Other, "no stdin pipe")),
        };

        let status = child
            .wait()
            .map_err(|e| SplitError::classifier(self.program_name(), e.to_string()))?;
        if !status.success() {
            return Err(SplitError::classifier(
                self.program_name(),
                format!("exited with {}", status),
            ));
        }
        copied.map_err(|e| SplitError::io(request.mate1, e))?;
        Ok(())
    }
}

impl Classifier for FastxBarcodeSplitter {
    fn classify(&self, request: &ClassifyRequest<'_>) -> Result<Vec<Bucket>, SplitError> {
        // read the barcodes up front: they name the buckets, and a bad file
        // should fail before the classifier runs
        let defs = read_barcode_defs(request.barcodes)?;

        info!("splitting {:?} by barcode", request.mate1);
        self.run(request)?;

        let names = defs
            .iter()
            .map(|d| d.name.as_str())
            .chain(std::iter::once(UNMATCHED_BUCKET));
        let mut buckets = Vec::new();
        for name in names {
            let path = bucket_path(request.prefix, name, WhichMate::Mate1);
            if path.is_file() {
                buckets.push(Bucket {
                    barcode: name.to_string(),
                    path,
                });
            } else {
                debug!("skipping barcode '{}', {:?} does not exist", name, path);
            }
        }
        Ok(buckets)
    }
}
