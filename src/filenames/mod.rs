// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! File naming conventions shared by the classifier and the mate-2 writer.
//!
//! The classifier writes mate-1 buckets named `<prefix><barcode>_demux1.fastq`;
//! each matching mate-2 bucket is the same name with `_demux2`.

pub mod demux;

use std::path::PathBuf;

pub use demux::{DemuxFastqFile, WhichMate};

/// Path of the bucket for `barcode` and `mate` under output `prefix`.
/// The prefix is prepended verbatim, so it may carry a directory.
pub fn bucket_path(prefix: &str, barcode: &str, mate: WhichMate) -> PathBuf {
    PathBuf::from(format!("{}{}{}.fastq", prefix, barcode, mate.marker()))
}

/// Longest common leading part of `a` and `b`, compared by character.
/// Used to name outputs after an input pair such as `run_1.fastq.gz` and
/// `run_2.fastq.gz` (giving `run_`).
pub fn common_prefix(a: &str, b: &str) -> String {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix("SRR01_1.fastq.gz", "SRR01_2.fastq.gz"), "SRR01_");
        assert_eq!(common_prefix("data/a_1.fq", "data/a_2.fq"), "data/a_");
        assert_eq!(common_prefix("x.fq", "y.fq"), "");
        assert_eq!(common_prefix("same", "same"), "same");
        assert_eq!(common_prefix("short", "shorter"), "short");
    }

    #[test]
    fn test_common_prefix_multibyte() {
        assert_eq!(common_prefix("échantillon_1", "échantillon_2"), "échantillon_");
    }

    #[test]
    fn test_bucket_path() {
        assert_eq!(
            bucket_path("out/SRR01_", "BC3", WhichMate::Mate1),
            PathBuf::from("out/SRR01_BC3_demux1.fastq")
        );
        assert_eq!(
            bucket_path("", "unmatched", WhichMate::Mate2),
            PathBuf::from("unmatched_demux2.fastq")
        );
    }
}
