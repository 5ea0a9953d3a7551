// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Error conditions raised while splitting a pair of FASTQ files.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single demultiplexing job. Every variant is fatal for the
/// job that raised it; other jobs in a batch are unaffected.
#[derive(Error, Debug)]
pub enum SplitError {
    /// A stream ended part-way through a 4-line record, or a record's
    /// identifier line was unusable.
    #[error("malformed FASTQ record #{record} at line {line} of {path:?}: {msg}")]
    MalformedRecord {
        path: PathBuf,
        record: u64,
        line: u64,
        msg: String,
    },

    #[error("I/O error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The external barcode classifier could not run, or exited abnormally.
    #[error("barcode classifier '{program}' failed: {msg}")]
    ClassifierFailure { program: String, msg: String },

    #[error("invalid barcode file {path:?}, line {line}: {msg}")]
    BarcodeFile {
        path: PathBuf,
        line: u64,
        msg: String,
    },

    #[error("invalid batch list, line {line}: {msg}")]
    BatchFormat { line: u64, msg: String },

    /// A mate-1 bucket whose file name carries no `_demux1` marker, so no
    /// mate-2 output name can be derived from it.
    #[error("cannot derive a mate-2 output name from {path:?}")]
    OutputName { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SplitError {
    #[cold]
    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        SplitError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    #[cold]
    pub fn malformed<P: AsRef<Path>, M: Into<String>>(
        path: P,
        record: u64,
        line: u64,
        msg: M,
    ) -> Self {
        SplitError::MalformedRecord {
            path: path.as_ref().to_path_buf(),
            record,
            line,
            msg: msg.into(),
        }
    }

    #[cold]
    pub fn classifier<P: Into<String>, M: Into<String>>(program: P, msg: M) -> Self {
        SplitError::ClassifierFailure {
            program: program.into(),
            msg: msg.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_malformed_message_names_position() {
        let e = SplitError::malformed("mate_2.fastq", 3, 11, "stream ended after 2 of 4 lines");
        assert_eq!(
            e.to_string(),
            "malformed FASTQ record #3 at line 11 of \"mate_2.fastq\": stream ended after 2 of 4 lines"
        );
    }

    #[test]
    fn test_io_keeps_source() {
        let e = SplitError::io("x.fastq", io::Error::new(io::ErrorKind::NotFound, "gone"));
        let source = std::error::Error::source(&e).map(|s| s.to_string());
        assert_eq!(source, Some("gone".to_string()));
    }
}
