// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Sample barcode definitions handed to the mate-1 classifier, and the
//! read end the barcode tag is anchored to.

use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use crate::error::SplitError;
use crate::utils;

/// Name of the bucket holding mate-1 reads that matched no barcode.
pub const UNMATCHED_BUCKET: &str = "unmatched";

/// End of the read where the barcode tag is expected: `bol` (5') or `eol` (3').
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum WhichEnd {
    #[serde(rename = "bol")]
    FivePrime,
    #[serde(rename = "eol")]
    ThreePrime,
}

impl WhichEnd {
    /// Command-line flag selecting this end in `fastx_barcode_splitter.pl`.
    pub fn splitter_flag(self) -> &'static str {
        match self {
            WhichEnd::FivePrime => "--bol",
            WhichEnd::ThreePrime => "--eol",
        }
    }
}

impl FromStr for WhichEnd {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bol" | "5" | "5'" | "five_prime" => Ok(WhichEnd::FivePrime),
            "eol" | "3" | "3'" | "three_prime" => Ok(WhichEnd::ThreePrime),
            _ => Err(SplitError::Config(format!(
                "position must be 'bol' or 'eol', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for WhichEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhichEnd::FivePrime => write!(f, "bol"),
            WhichEnd::ThreePrime => write!(f, "eol"),
        }
    }
}

/// One sample barcode: the name used in output file names, and the tag
/// sequence searched for in mate 1.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BarcodeDef {
    pub name: String,
    pub tag: String,
}

/// Read a barcode file: one `name<whitespace>tag` pair per line. Blank
/// lines and `#` comments are skipped. The definitions are returned sorted
/// by name.
pub fn read_barcode_defs(filename: impl AsRef<Path>) -> Result<Vec<BarcodeDef>, SplitError> {
    let filename = filename.as_ref();
    let reader = utils::open_with_gz(filename).map_err(|e| SplitError::io(filename, e))?;
    parse_barcode_defs(reader, filename)
}

fn parse_barcode_defs(reader: impl BufRead, filename: &Path) -> Result<Vec<BarcodeDef>, SplitError> {
    let bad_line = |line: usize, msg: String| SplitError::BarcodeFile {
        path: filename.to_path_buf(),
        line: line as u64 + 1,
        msg,
    };

    let mut defs: Vec<BarcodeDef> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SplitError::io(filename, e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let name = fields.next().unwrap_or_default();
        let tag = fields
            .next()
            .ok_or_else(|| bad_line(i, format!("barcode '{}' has no tag sequence", name)))?;

        if fields.next().is_some() {
            return Err(bad_line(i, "expected two columns: name and tag".to_string()));
        }
        if name == UNMATCHED_BUCKET || name.contains('/') {
            return Err(bad_line(i, format!("'{}' cannot be used as a barcode name", name)));
        }
        if !tag.bytes().all(|b| b"ACGTN".contains(&b.to_ascii_uppercase())) {
            return Err(bad_line(i, format!("tag '{}' is not a nucleotide sequence", tag)));
        }
        if defs.iter().any(|d| d.name == name) {
            return Err(bad_line(i, format!("duplicate barcode name '{}'", name)));
        }

        defs.push(BarcodeDef {
            name: name.to_string(),
            tag: tag.to_string(),
        });
    }

    if defs.is_empty() {
        return Err(SplitError::BarcodeFile {
            path: filename.to_path_buf(),
            line: 0,
            msg: "no barcodes defined".to_string(),
        });
    }

    defs.sort();
    Ok(defs)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Vec<BarcodeDef>, SplitError> {
        parse_barcode_defs(Cursor::new(text.to_string()), Path::new("bc.txt"))
    }

    #[test]
    fn test_parse_sorted() {
        let defs = parse("# sample barcodes\nBC2\tGGTT\n\nBC1 ACGT\n").unwrap();
        assert_eq!(
            defs,
            vec![
                BarcodeDef {
                    name: "BC1".to_string(),
                    tag: "ACGT".to_string()
                },
                BarcodeDef {
                    name: "BC2".to_string(),
                    tag: "GGTT".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_missing_tag() {
        match parse("BC1 ACGT\nBC2\n") {
            Err(SplitError::BarcodeFile { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_names_and_tags() {
        assert!(parse("BC1 ACGT\nBC1 GGGG\n").is_err());
        assert!(parse("unmatched ACGT\n").is_err());
        assert!(parse("a/b ACGT\n").is_err());
        assert!(parse("BC1 AC-T\n").is_err());
        assert!(parse("BC1 ACGT extra\n").is_err());
        assert!(parse("# only a comment\n").is_err());
    }

    #[test]
    fn test_lower_case_tag() {
        assert_eq!(parse("BC1 acgtn\n").unwrap()[0].tag, "acgtn");
    }

    #[test]
    fn test_which_end() {
        assert_eq!("bol".parse::<WhichEnd>().unwrap(), WhichEnd::FivePrime);
        assert_eq!("EOL".parse::<WhichEnd>().unwrap(), WhichEnd::ThreePrime);
        assert!("middle".parse::<WhichEnd>().is_err());
        assert_eq!(WhichEnd::ThreePrime.splitter_flag(), "--eol");
        assert_eq!(WhichEnd::FivePrime.to_string(), "bol");
    }
}
