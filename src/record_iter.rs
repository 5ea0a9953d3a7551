// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Read a FASTQ file, convert into an Iterator over FastqRecords.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::SplitError;
use crate::record::FastqRecord;
use crate::utils;

/// Forward-only reader of 4-line FASTQ records from a plain, gzipped or
/// lz4-compressed file (selected by extension).
///
/// Blank lines before a record, including trailing blank lines at the end
/// of the file, are skipped. A stream that ends after 1 to 3 lines of a
/// record yields `SplitError::MalformedRecord`.
pub struct RecordIter {
    reader: Box<dyn BufRead>,
    path: PathBuf,
    records: u64,
    lines: u64,
    failed: bool,
}

impl RecordIter {
    /// Open the FASTQ file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RecordIter, SplitError> {
        let reader = utils::open_with_gz(&path).map_err(|e| SplitError::io(&path, e))?;
        Ok(Self::new(reader, path))
    }

    /// Read records from an already opened `reader`. `path` is only used
    /// in error messages.
    pub fn new<P: AsRef<Path>>(reader: Box<dyn BufRead>, path: P) -> RecordIter {
        RecordIter {
            reader,
            path: path.as_ref().to_path_buf(),
            records: 0,
            lines: 0,
            failed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of complete records returned so far.
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Append the next line, without its `\n`, to `buf`. Returns false at
    /// the end of the stream.
    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<bool, SplitError> {
        let n = self
            .reader
            .read_until(b'\n', buf)
            .map_err(|e| SplitError::io(&self.path, e))?;
        if n == 0 {
            return Ok(false);
        }
        self.lines += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(true)
    }

    /// Read the next record, or `None` at the end of the stream.
    pub fn next_record(&mut self) -> Result<Option<FastqRecord>, SplitError> {
        let mut data = Vec::with_capacity(FastqRecord::CAPACITY);
        let mut ends = [0usize; 4];

        // skip blank lines ahead of the header
        loop {
            data.clear();
            if !self.read_line(&mut data)? {
                return Ok(None);
            }
            if !data.iter().all(|b| b.is_ascii_whitespace()) {
                break;
            }
        }
        ends[0] = data.len();

        for (i, end) in ends.iter_mut().enumerate().skip(1) {
            if !self.read_line(&mut data)? {
                return Err(SplitError::malformed(
                    &self.path,
                    self.records + 1,
                    self.lines,
                    format!("stream ended after {} of 4 lines", i),
                ));
            }
            *end = data.len();
        }

        // a header followed only by blank lines is a truncated record
        if data[ends[0]..].iter().all(|b| b.is_ascii_whitespace()) {
            return Err(SplitError::malformed(
                &self.path,
                self.records + 1,
                self.lines,
                "only blank lines follow the header",
            ));
        }

        self.records += 1;
        Ok(Some(FastqRecord::from_buffer(data, ends)))
    }
}

impl Iterator for RecordIter {
    type Item = Result<FastqRecord, SplitError>;

    /// Iterate over FastqRecord objects. Iteration stops after the first error.
    fn next(&mut self) -> Option<Result<FastqRecord, SplitError>> {
        if self.failed {
            return None;
        }
        // Convert Result<Option<_>, Error> to Option<Result<_, Error>>
        match self.next_record() {
            Ok(Some(v)) => Some(Ok(v)),
            Ok(None) => None,
            Err(v) => {
                self.failed = true;
                Some(Err(v))
            }
        }
    }
}
