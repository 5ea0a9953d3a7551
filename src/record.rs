// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Container for one FASTQ record: the identifier, sequence, secondary
//! identifier and quality lines, kept byte-for-byte as they were read.

use std::fmt;
use std::io::{self, Write};

/// Pointers into a buffer that identify the positions of the lines of a record.
/// header exists at buf[0 .. head], seq exists at buf[head .. seq], etc.
/// The key is buf[key_start .. key_end], a sub-slice of the header.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
struct LineOffsets {
    head: usize,
    seq: usize,
    sep: usize,
    qual: usize,
    key_start: usize,
    key_end: usize,
}

/// Lines of a FASTQ record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordPart {
    Header,
    Seq,
    Sep,
    Qual,
}

impl RecordPart {
    pub fn parts() -> [RecordPart; 4] {
        [
            RecordPart::Header,
            RecordPart::Seq,
            RecordPart::Sep,
            RecordPart::Qual,
        ]
    }
}

/// An immutable 4-line FASTQ record. Line terminators are not stored;
/// anything else on the line (including a trailing `\r`) is kept verbatim.
///
/// Records from the two mates of one fragment share the same `key()`:
/// the first whitespace-delimited token of the header line.
#[derive(Clone, PartialEq, Eq)]
pub struct FastqRecord {
    offsets: LineOffsets,

    // Single vector with all four lines
    data: Vec<u8>,
}

impl FastqRecord {
    // Make space for a typical short read in one allocation
    pub(crate) const CAPACITY: usize = 512;

    /// Build a record from its four lines, which must not contain newlines.
    pub fn new(head: &[u8], seq: &[u8], sep: &[u8], qual: &[u8]) -> FastqRecord {
        let mut data = Vec::with_capacity(head.len() + seq.len() + sep.len() + qual.len());
        let mut ends = [0; 4];
        for (i, line) in [head, seq, sep, qual].iter().enumerate() {
            data.extend_from_slice(line);
            ends[i] = data.len();
        }
        FastqRecord::from_buffer(data, ends)
    }

    /// Wrap a buffer holding the four lines back to back, ending at `ends`.
    pub(crate) fn from_buffer(data: Vec<u8>, ends: [usize; 4]) -> FastqRecord {
        let (key_start, key_end) = key_bounds(&data[..ends[0]]);
        FastqRecord {
            offsets: LineOffsets {
                head: ends[0],
                seq: ends[1],
                sep: ends[2],
                qual: ends[3],
                key_start,
                key_end,
            },
            data,
        }
    }

    #[inline]
    /// Get the line `part` of this record
    pub fn get(&self, part: RecordPart) -> &[u8] {
        let w = self.offsets;
        match part {
            RecordPart::Header => &self.data[..w.head],
            RecordPart::Seq => &self.data[w.head..w.seq],
            RecordPart::Sep => &self.data[w.seq..w.sep],
            RecordPart::Qual => &self.data[w.sep..w.qual],
        }
    }

    pub fn head(&self) -> &[u8] {
        self.get(RecordPart::Header)
    }

    pub fn seq(&self) -> &[u8] {
        self.get(RecordPart::Seq)
    }

    pub fn qual(&self) -> &[u8] {
        self.get(RecordPart::Qual)
    }

    #[inline]
    /// Read identity used to pair mates. Empty only if the header is blank.
    pub fn key(&self) -> &[u8] {
        &self.data[self.offsets.key_start..self.offsets.key_end]
    }

    /// Write the four lines, each followed by `\n`.
    pub fn write_fastq<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for part in RecordPart::parts().iter() {
            w.write_all(self.get(*part))?;
            w.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Bounds of the first whitespace-delimited token of `head`.
fn key_bounds(head: &[u8]) -> (usize, usize) {
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let end = head[start..]
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .map_or(head.len(), |p| start + p);
    (start, end)
}

impl fmt::Debug for FastqRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FastqRecord")
            .field("head", &String::from_utf8_lossy(self.head()))
            .field("seq", &String::from_utf8_lossy(self.seq()))
            .field("sep", &String::from_utf8_lossy(self.get(RecordPart::Sep)))
            .field("qual", &String::from_utf8_lossy(self.qual()))
            .finish()
    }
}
