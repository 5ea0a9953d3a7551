// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

use lazy_static::lazy_static;
use regex::Regex;
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SplitError;

lazy_static! {
    // greedy stem, so the last marker in the name wins
    static ref DEMUX_REGEX: Regex = Regex::new(r"^(.*)_demux([12])(\.[^/]*)?$").unwrap();
}

/// The two mates of a paired-end run. Mate 1 carries the barcode.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash, Debug)]
pub enum WhichMate {
    Mate1 = 1,
    Mate2 = 2,
}

impl WhichMate {
    pub fn marker(self) -> &'static str {
        match self {
            WhichMate::Mate1 => "_demux1",
            WhichMate::Mate2 => "_demux2",
        }
    }
}

/// A parsed representation of a demultiplexed bucket file name. We expect
/// a filename of the form <path>/<prefix><barcode>_demux1.fastq, with any
/// extension (or none) following the marker.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DemuxFastqFile {
    /// Everything in the file name before the marker: prefix and barcode.
    pub stem: String,
    pub mate: WhichMate,
    pub extension: String,
    pub path: PathBuf,
}

impl DemuxFastqFile {
    /// Attempt to parse `path` as a demultiplexed bucket file.
    pub fn new(path: impl AsRef<Path>) -> Option<DemuxFastqFile> {
        let filename = path.as_ref().file_name()?.to_str()?;
        let cap = DEMUX_REGEX.captures(filename)?;

        let stem = cap.get(1)?.as_str().to_string();
        let mate = match cap.get(2)?.as_str() {
            "1" => WhichMate::Mate1,
            _ => WhichMate::Mate2,
        };
        let extension = cap.get(3).map_or("", |m| m.as_str()).to_string();

        Some(DemuxFastqFile {
            stem,
            mate,
            extension,
            path: path.as_ref().into(),
        })
    }

    /// Path of the corresponding bucket of `mate`, in the same directory.
    pub fn with_mate(&self, mate: WhichMate) -> PathBuf {
        let name = format!("{}{}{}", self.stem, mate.marker(), self.extension);
        self.path.with_file_name(name)
    }
}

/// Name of the mate-2 output matching the mate-1 bucket at `mate1`.
pub fn mate2_output_path(mate1: impl AsRef<Path>) -> Result<PathBuf, SplitError> {
    let mate1 = mate1.as_ref();
    match DemuxFastqFile::new(mate1) {
        Some(f) if f.mate == WhichMate::Mate1 => Ok(f.with_mate(WhichMate::Mate2)),
        _ => Err(SplitError::OutputName {
            path: mate1.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse() {
        let filename = "out/SRR01_BC1_demux1.fastq";
        let r = DemuxFastqFile::new(filename);

        let expected = DemuxFastqFile {
            stem: "SRR01_BC1".to_string(),
            mate: WhichMate::Mate1,
            extension: ".fastq".to_string(),
            path: PathBuf::from(filename),
        };

        assert_eq!(r.unwrap(), expected);
    }

    #[test]
    fn test_parse_compressed_and_bare() {
        let r = DemuxFastqFile::new("BC1_demux2.fastq.gz").unwrap();
        assert_eq!(r.mate, WhichMate::Mate2);
        assert_eq!(r.extension, ".fastq.gz");

        let r = DemuxFastqFile::new("BC1_demux1").unwrap();
        assert_eq!(r.extension, "");
    }

    #[test]
    fn test_bad() {
        assert!(DemuxFastqFile::new("SRR01_BC1_1.fastq").is_none());
        assert!(DemuxFastqFile::new("SRR01_BC1_demux3.fastq").is_none());
        assert!(DemuxFastqFile::new("SRR01_BC1_demux12.fastq").is_none());
    }

    #[test]
    fn test_mate2_output_path() {
        assert_eq!(
            mate2_output_path("run/x_demux1_BC1_demux1.fastq").unwrap(),
            PathBuf::from("run/x_demux1_BC1_demux2.fastq")
        );
        assert_eq!(
            mate2_output_path("run_demux1/BC1_demux1.fastq").unwrap(),
            PathBuf::from("run_demux1/BC1_demux2.fastq")
        );
    }

    #[test]
    fn test_mate2_output_path_rejects() {
        assert!(matches!(
            mate2_output_path("BC1.fastq"),
            Err(SplitError::OutputName { .. })
        ));
        assert!(matches!(
            mate2_output_path("BC1_demux2.fastq"),
            Err(SplitError::OutputName { .. })
        ));
    }
}
