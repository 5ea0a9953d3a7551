// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Utility methods for opening (possibly compressed) files.

use std::boxed::Box;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use lz4;

const GZ_BUF_SIZE: usize = 1 << 22;
const PLAIN_BUF_SIZE: usize = 32 * 1024;

/// Compression of a file, as implied by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Plain,
    Gzip,
    Lz4,
}

impl Encoding {
    pub fn from_path<P: AsRef<Path>>(p: P) -> Encoding {
        match p.as_ref().extension().and_then(|e| e.to_str()) {
            Some("gz") => Encoding::Gzip,
            Some("lz4") => Encoding::Lz4,
            _ => Encoding::Plain,
        }
    }
}

/// Open a (possibly gzipped or lz4-compressed) file into a BufReader.
pub fn open_with_gz<P: AsRef<Path>>(p: P) -> io::Result<Box<dyn BufRead>> {
    let r = File::open(p.as_ref())?;

    match Encoding::from_path(&p) {
        Encoding::Gzip => {
            let gz = MultiGzDecoder::new(r);
            Ok(Box::new(BufReader::with_capacity(GZ_BUF_SIZE, gz)))
        }
        Encoding::Lz4 => {
            let lz = lz4::Decoder::new(r)?;
            Ok(Box::new(BufReader::with_capacity(GZ_BUF_SIZE, lz)))
        }
        Encoding::Plain => Ok(Box::new(BufReader::with_capacity(PLAIN_BUF_SIZE, r))),
    }
}

/// Create `p`, compressing according to its extension.
pub fn write_with_gz<P: AsRef<Path>>(p: P) -> io::Result<FileWriter> {
    let w = BufWriter::with_capacity(PLAIN_BUF_SIZE, File::create(p.as_ref())?);

    let writer = match Encoding::from_path(&p) {
        Encoding::Gzip => FileWriter::Gzip(GzEncoder::new(w, Compression::default())),
        Encoding::Lz4 => FileWriter::Lz4(lz4::EncoderBuilder::new().build(w)?),
        Encoding::Plain => FileWriter::Plain(w),
    };
    Ok(writer)
}

/// A file opened for writing by `write_with_gz`. Call `finish` to flush
/// buffered data and write any compression trailer; dropping the writer
/// instead still closes the file but swallows errors.
pub enum FileWriter {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Lz4(lz4::Encoder<BufWriter<File>>),
}

impl FileWriter {
    pub fn finish(self) -> io::Result<()> {
        let mut inner = match self {
            FileWriter::Plain(w) => w,
            FileWriter::Gzip(gz) => gz.finish()?,
            FileWriter::Lz4(lz) => {
                let (w, result) = lz.finish();
                result?;
                w
            }
        };
        inner.flush()
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileWriter::Plain(w) => w.write(buf),
            FileWriter::Gzip(w) => w.write(buf),
            FileWriter::Lz4(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileWriter::Plain(w) => w.flush(),
            FileWriter::Gzip(w) => w.flush(),
            FileWriter::Lz4(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    #[test]
    fn test_encoding_from_path() {
        assert_eq!(Encoding::from_path("a_1.fastq.gz"), Encoding::Gzip);
        assert_eq!(Encoding::from_path("a_1.fq.lz4"), Encoding::Lz4);
        assert_eq!(Encoding::from_path("a_1.fastq"), Encoding::Plain);
        assert_eq!(Encoding::from_path("no_extension"), Encoding::Plain);
    }

    #[test]
    fn test_compressed_round_trip() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["x.fastq", "x.fastq.gz", "x.fastq.lz4"].iter() {
            let p = dir.path().join(name);
            let mut w = write_with_gz(&p)?;
            w.write_all(b"@r\nACGT\n+\nIIII\n")?;
            w.finish()?;

            let mut contents = Vec::new();
            open_with_gz(&p)?.read_to_end(&mut contents)?;
            assert_eq!(contents, b"@r\nACGT\n+\nIIII\n".to_vec());
        }
        Ok(())
    }

    #[test]
    fn test_gz_is_compressed_on_disk() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let p = dir.path().join("x.fastq.gz");
        let mut w = write_with_gz(&p)?;
        w.write_all(b"@r\nACGT\n+\nIIII\n")?;
        w.finish()?;

        let raw = std::fs::read(&p)?;
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        Ok(())
    }
}
