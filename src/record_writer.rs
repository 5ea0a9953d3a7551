// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Write `FastqRecord` objects to a FASTQ file.

use std::path::{Path, PathBuf};

use crate::error::SplitError;
use crate::record::FastqRecord;
use crate::utils::{self, FileWriter};

/// Write records to a plain, gzipped or lz4-compressed FASTQ file, which
/// will be selected based on the filename extension.
///
/// The file is created on construction. `finish` flushes it and reports
/// any error; a writer that is dropped without `finish` (e.g. while an
/// error propagates) still closes its file.
pub struct RecordWriter {
    writer: FileWriter,
    path: PathBuf,
    records: u64,
}

impl RecordWriter {
    /// Create (or truncate) the FASTQ file at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<RecordWriter, SplitError> {
        let writer = utils::write_with_gz(&path).map_err(|e| SplitError::io(&path, e))?;
        Ok(RecordWriter {
            writer,
            path: path.as_ref().to_path_buf(),
            records: 0,
        })
    }

    pub fn write(&mut self, rec: &FastqRecord) -> Result<(), SplitError> {
        let path = &self.path;
        rec.write_fastq(&mut self.writer)
            .map_err(|e| SplitError::io(path, e))?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Flush and close the file, returning the number of records written.
    pub fn finish(self) -> Result<u64, SplitError> {
        let RecordWriter {
            writer,
            path,
            records,
        } = self;
        writer.finish().map_err(|e| SplitError::io(&path, e))?;
        Ok(records)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record_iter::RecordIter;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_then_read_gz() -> Result<(), SplitError> {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("out_demux2.fastq.gz");

        let recs = vec![
            FastqRecord::new(b"@r1 1:N", b"ACGT", b"+", b"IIII"),
            FastqRecord::new(b"@r2 1:N", b"GGTT", b"+r2 1:N", b"#III"),
        ];

        let mut w = RecordWriter::new(&p)?;
        for r in &recs {
            w.write(r)?;
        }
        assert_eq!(w.records_written(), 2);
        assert_eq!(w.finish()?, 2);

        let read: Vec<FastqRecord> = RecordIter::from_path(&p)?.collect::<Result<_, _>>()?;
        assert_eq!(read, recs);
        Ok(())
    }

    #[test]
    fn test_empty_output_is_created() -> Result<(), SplitError> {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("empty_demux2.fastq");
        RecordWriter::new(&p)?.finish()?;
        assert_eq!(std::fs::read(&p).unwrap(), Vec::<u8>::new());
        Ok(())
    }

    #[test]
    fn test_dropped_writer_keeps_written_records() -> Result<(), SplitError> {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("dropped.fastq");
        {
            let mut w = RecordWriter::new(&p)?;
            w.write(&FastqRecord::new(b"@r", b"A", b"+", b"I"))?;
        }
        assert_eq!(std::fs::read(&p).unwrap(), b"@r\nA\n+\nI\n".to_vec());
        Ok(())
    }
}
