// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Demultiplex paired-end FASTQ files whose sample barcodes are only
//! present in mate 1.
//!
//! Mate 1 is split into per-barcode buckets by an external classifier
//! (see [`classifier`]). Mate 2 is then partitioned to match, record for
//! record, by the read identifier shared by both mates (see [`sync`]).
//! Buckets are named `<prefix><barcode>_demux1.fastq`, and the matching
//! mate-2 outputs `<prefix><barcode>_demux2.fastq`.

pub mod barcode;
pub mod classifier;
pub mod config;
pub mod error;
pub mod filenames;
pub mod job;
pub mod record;
pub mod record_iter;
pub mod record_writer;
pub mod sync;
pub mod utils;

pub use barcode::{BarcodeDef, WhichEnd};
pub use classifier::{Bucket, Classifier, ClassifyRequest, FastxBarcodeSplitter};
pub use config::{JobSource, SplitterConfig};
pub use error::SplitError;
pub use job::{run_job, run_jobs, Job, JobOutcome, JobSummary, RunReport};
pub use record::FastqRecord;
pub use record_iter::RecordIter;
pub use record_writer::RecordWriter;
pub use sync::{synchronize, SlotSummary, SyncSummary, Synchronizer};
