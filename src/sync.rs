// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Partition the unbarcoded mate-2 file to follow the classifier's split of
//! mate 1.
//!
//! Each mate-1 bucket is a subsequence of the original mate-1 file, so its
//! records appear in the same relative order as their mates in mate 2. A
//! single forward pass over mate 2 therefore suffices: every bucket keeps
//! one lookahead record, and a mate-2 record belongs to the bucket whose
//! lookahead has the same key. Memory use is one record per bucket,
//! independent of file size.

use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classifier::Bucket;
use crate::error::SplitError;
use crate::filenames::demux::mate2_output_path;
use crate::record::FastqRecord;
use crate::record_iter::RecordIter;
use crate::record_writer::RecordWriter;

/// A barcode's mate-1 bucket, its mate-2 output and the next mate-1
/// record not yet paired. `lookahead` is `None` once the bucket is
/// exhausted; the slot then receives nothing further.
pub struct Slot {
    barcode: String,
    input: RecordIter,
    output: RecordWriter,
    lookahead: Option<FastqRecord>,
}

impl Slot {
    /// Open the mate-1 bucket and create its mate-2 output, named by
    /// swapping the `_demux1` marker for `_demux2`.
    pub fn open(bucket: &Bucket) -> Result<Slot, SplitError> {
        let output_path = mate2_output_path(&bucket.path)?;
        let input = RecordIter::from_path(&bucket.path)?;
        let output = RecordWriter::new(output_path)?;
        Slot::new(bucket.barcode.clone(), input, output)
    }

    /// Bind already opened streams, priming the lookahead.
    pub fn new(
        barcode: String,
        mut input: RecordIter,
        output: RecordWriter,
    ) -> Result<Slot, SplitError> {
        let lookahead = input.next_record()?;
        Ok(Slot {
            barcode,
            input,
            output,
            lookahead,
        })
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    pub fn lookahead(&self) -> Option<&FastqRecord> {
        self.lookahead.as_ref()
    }

    /// Count the mate-1 records that were never paired, then close the
    /// output.
    fn finish(mut self) -> Result<SlotSummary, SplitError> {
        let mut unconsumed = 0;
        if self.lookahead.take().is_some() {
            unconsumed += 1;
            while self.input.next_record()?.is_some() {
                unconsumed += 1;
            }
        }

        if unconsumed > 0 {
            warn!(
                "{} mate-1 reads in bucket '{}' ({:?}) have no mate in mate 2",
                unconsumed,
                self.barcode,
                self.input.path()
            );
        }

        let output = self.output.path().to_path_buf();
        let matched = self.output.finish()?;
        Ok(SlotSummary {
            barcode: self.barcode,
            output,
            matched,
            unconsumed,
        })
    }
}

/// Map from the key of every live lookahead to the slots holding it,
/// in ascending slot order. The first entry is the slot a linear scan in
/// discovery order would pick.
#[derive(Default)]
struct LookaheadIndex {
    slots_by_key: FxHashMap<Vec<u8>, Vec<usize>>,
}

impl LookaheadIndex {
    fn insert(&mut self, key: &[u8], slot: usize) {
        let slots = self.slots_by_key.entry(key.to_vec()).or_default();
        if let Err(pos) = slots.binary_search(&slot) {
            slots.insert(pos, slot);
        }
    }

    fn remove(&mut self, key: &[u8], slot: usize) {
        if let Some(slots) = self.slots_by_key.get_mut(key) {
            slots.retain(|&s| s != slot);
            if slots.is_empty() {
                self.slots_by_key.remove(key);
            }
        }
    }

    fn first(&self, key: &[u8]) -> Option<usize> {
        self.slots_by_key.get(key).and_then(|s| s.first().copied())
    }
}

/// Per-barcode result of a synchronization run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SlotSummary {
    pub barcode: String,
    /// The mate-2 file written for this barcode
    pub output: PathBuf,
    /// Mate-2 records written to `output`
    pub matched: u64,
    /// Mate-1 records left in the bucket when mate 2 ran out
    pub unconsumed: u64,
}

/// Counts from a synchronization run. `matched + unmatched` is the number
/// of mate-2 records read.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct SyncSummary {
    pub matched: u64,
    pub unmatched: u64,
    pub slots: Vec<SlotSummary>,
}

impl SyncSummary {
    pub fn total(&self) -> u64 {
        self.matched + self.unmatched
    }

    pub fn unconsumed(&self) -> u64 {
        self.slots.iter().map(|s| s.unconsumed).sum()
    }
}

/// Routes mate-2 records to slots. Slot order is fixed at construction and
/// breaks ties: if several lookaheads share a key, the earliest slot wins.
pub struct Synchronizer {
    slots: Vec<Slot>,
    index: LookaheadIndex,
    matched: u64,
    unmatched: u64,
}

impl Synchronizer {
    pub fn new(slots: Vec<Slot>) -> Synchronizer {
        let mut index = LookaheadIndex::default();
        for (i, slot) in slots.iter().enumerate() {
            if let Some(rec) = &slot.lookahead {
                index.insert(rec.key(), i);
            }
        }

        Synchronizer {
            slots,
            index,
            matched: 0,
            unmatched: 0,
        }
    }

    /// Open a slot for each bucket, in the given order. Slots opened before
    /// a failure are closed again.
    pub fn open(buckets: &[Bucket]) -> Result<Synchronizer, SplitError> {
        let slots = buckets
            .iter()
            .map(|b| {
                debug!("opening bucket '{}': {:?}", b.barcode, b.path);
                Slot::open(b)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Synchronizer::new(slots))
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Route one mate-2 record: write it to the first slot whose lookahead
    /// has the same key and advance that slot. Returns the slot index, or
    /// `None` if no bucket holds the record's mate.
    pub fn route(&mut self, record: &FastqRecord) -> Result<Option<usize>, SplitError> {
        let key = record.key();
        let i = match self.index.first(key) {
            Some(i) => i,
            None => {
                warn!(
                    "no matching barcode bucket for mate-2 read {}",
                    String::from_utf8_lossy(key)
                );
                self.unmatched += 1;
                return Ok(None);
            }
        };

        let slot = &mut self.slots[i];
        slot.output.write(record)?;
        self.index.remove(key, i);
        slot.lookahead = slot.input.next_record()?;
        if let Some(next) = &slot.lookahead {
            self.index.insert(next.key(), i);
        }

        self.matched += 1;
        Ok(Some(i))
    }

    /// Route every remaining record of `mate2`, then close all slots.
    pub fn run(mut self, mate2: &mut RecordIter) -> Result<SyncSummary, SplitError> {
        while let Some(record) = mate2.next_record()? {
            self.route(&record)?;
        }
        self.finish()
    }

    /// Close all slots, counting their unpaired mate-1 records.
    pub fn finish(self) -> Result<SyncSummary, SplitError> {
        let slots = self
            .slots
            .into_iter()
            .map(Slot::finish)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SyncSummary {
            matched: self.matched,
            unmatched: self.unmatched,
            slots,
        })
    }
}

/// Split the mate-2 file at `mate2` into one output per bucket, following
/// the split of mate 1 recorded in `buckets`. All files opened here are
/// closed before returning, on success or failure.
pub fn synchronize(buckets: &[Bucket], mate2: impl AsRef<Path>) -> Result<SyncSummary, SplitError> {
    let sync = Synchronizer::open(buckets)?;
    let mut mate2 = RecordIter::from_path(mate2)?;
    sync.run(&mut mate2)
}
