// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{fs::File, io, num::NonZeroUsize, path::Path, thread, time::Instant};

use dictsa::DictSuffixArray;

use crate::{
    BwtError,
    da::{self, DA_FLAG, DA_MASK},
    dict::Dictionary,
    merge, output,
    parse::Parse,
    queue::{BUF_SIZE, BoundedQueue},
};

/// Target output bytes per worker batch.
const MIN_BWT_RANGE: u64 = 100_000;

/// Counters reported by [`write_bwt`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BwtStats {
    /// Full-word suffixes merged; always equals the phrase count.
    pub full_words: u64,
    /// Characters emitted through the single-character merge branch.
    pub easy_bwts: u64,
    /// Characters emitted one at a time through the heap merge.
    pub hard_bwts: u64,
    /// Total bytes written to the output file.
    pub output_size: u64,
}

/// A batch of document array entries and the output span its bytes occupy.
#[derive(Clone, Copy)]
struct DaRange {
    start: usize,
    end: usize,
    bwt_start: u64,
    count: u64,
}

/// Read-only state shared by the merge workers.
struct MergeContext<'a> {
    dict: &'a Dictionary,
    da: &'a [u32],
    suflen: &'a [i32],
    parse: &'a Parse,
    w: usize,
    bwt_file: &'a File,
}

/// How one document array entry contributes to the BWT.
enum Entry {
    /// Suffix no longer than the window; contributes nothing
    Skip,
    /// The suffix is a whole phrase; its occurrences emit their preceding
    /// text characters
    FullWord(u32),
    /// The run of flagged entries sharing this suffix; ends at `next`
    Group,
}

struct EntryScan {
    next: usize,
    count: u64,
    entry: Entry,
}

/// Classifies the entry at `i`, returning where the next entry starts and
/// how many BWT bytes this one emits.
///
/// The producer sizes its batches with this and the workers emit with it;
/// keeping a single copy of the rule is what guarantees the pre-scan and the
/// merge agree byte for byte. Batch boundaries always fall between scans, so
/// a flagged group is never split across ranges.
fn scan_entry(ctx: &MergeContext, i: usize, end: usize) -> EntryScan {
    let mut next = i + 1;

    if ctx.suflen[i] <= ctx.w as i32 {
        return EntryScan { next, count: 0, entry: Entry::Skip };
    }

    let seqid = ctx.da[i] & DA_MASK;
    assert!(
        (seqid as usize) < ctx.dict.words(),
        "document array entry out of range",
    );
    let mut count = ctx.parse.positions(seqid).len() as u64;

    if ctx.suflen[i] == ctx.dict.word_lengths()[seqid as usize] {
        return EntryScan { next, count, entry: Entry::FullWord(seqid) };
    }

    while next < end && ctx.suflen[next] == ctx.suflen[i] {
        if ctx.da[next] & DA_FLAG == 0 {
            break;
        }
        let other = ctx.da[next] & DA_MASK;
        debug_assert!(
            ctx.suflen[next] != ctx.dict.word_lengths()[other as usize],
            "a flagged entry cannot be a full word",
        );
        count += ctx.parse.positions(other).len() as u64;
        next += 1;
    }

    EntryScan { next, count, entry: Entry::Group }
}

#[derive(Clone, Copy, Default)]
struct RangeTotals {
    full_words: u64,
    easy_bwts: u64,
    hard_bwts: u64,
}

/// Fills `bwt` with the bytes of one batch.
fn fill_range(
    ctx: &MergeContext,
    range: DaRange,
    bwt: &mut Vec<u8>,
    group: &mut Vec<(u32, u8)>,
    totals: &mut RangeTotals,
) {
    bwt.clear();
    bwt.reserve(range.count as usize);

    let mut i = range.start;
    while i < range.end {
        let scan = scan_entry(ctx, i, range.end);
        match scan.entry {
            Entry::Skip => {}
            Entry::FullWord(seqid) => {
                totals.full_words += 1;
                for &pos in ctx.parse.positions(seqid) {
                    bwt.push(ctx.parse.last()[pos as usize]);
                }
            }
            Entry::Group => {
                group.clear();
                for k in i..scan.next {
                    let seqid = ctx.da[k] & DA_MASK;
                    let end = ctx.dict.eos()[seqid as usize] as usize;
                    let byte = ctx.dict.bytes()[end - ctx.suflen[k] as usize - 1];
                    group.push((seqid, byte));
                }
                let (easy, hard) = merge::write_chars_same_suffix(group, ctx.parse, bwt);
                totals.easy_bwts += easy;
                totals.hard_bwts += hard;
            }
        }
        i = scan.next;
    }

    assert_eq!(
        bwt.len() as u64,
        range.count,
        "pre-scan and merge disagree on the batch size",
    );
}

fn merge_worker(queue: &BoundedQueue<DaRange>, ctx: &MergeContext) -> io::Result<RangeTotals> {
    let mut totals = RangeTotals::default();
    let mut bwt = Vec::new();
    let mut group = Vec::new();
    let mut failure = None;

    while let Some(range) = queue.pop() {
        // After a write failure keep draining, so the producer is never left
        // blocked on a full queue
        if failure.is_some() {
            continue;
        }

        fill_range(ctx, range, &mut bwt, &mut group, &mut totals);
        if let Err(e) = output::write_all_at(ctx.bwt_file, &bwt, range.bwt_start) {
            failure = Some(e);
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(totals),
    }
}

/// Builds the final BWT from the dictionary and the inverted parse, writing
/// it to `<basename>.bwt`.
///
/// The suffix and LCP arrays of the dictionary are computed, converted in
/// place with [`sa_to_da`](crate::sa_to_da), and then merged by `threads`
/// workers: the calling thread walks the document array in order, sizing
/// batches of at least `MIN_BWT_RANGE` output bytes with a read-only
/// pre-scan, and each worker fills a local buffer and writes it at its
/// batch's pre-assigned file offset. Outputs are byte-identical for every
/// thread count.
///
/// The leading [`DOLLAR`](crate::DOLLAR) byte of the dictionary is rewritten
/// to 0 first; it surfaces in the output as the BWT's EOF marker. The file
/// carries no header or trailer.
///
/// # Errors
///
/// Returns an error if the dictionary and parse disagree on the phrase
/// count, the dictionary does not start with the padding byte, the window
/// leaves nothing to merge, or writing the output fails.
///
/// # Panics
///
/// Panics if the merged full-word count does not equal the phrase count,
/// which means the inputs did not come from one prefix-free parse.
pub fn write_bwt(
    dict: &mut Dictionary,
    parse: &Parse,
    w: usize,
    basename: &Path,
    threads: NonZeroUsize,
) -> Result<BwtStats, BwtError> {
    if parse.words() != dict.words() {
        return Err(BwtError::CorruptParse(
            "parse and dictionary disagree on the phrase count",
        ));
    }

    log::info!(
        "Computing the suffix and LCP arrays of the dictionary ({} bytes, {} words)",
        dict.size(),
        dict.words(),
    );
    let (mut sa, mut lcp) = DictSuffixArray::build(dict.bytes()).into_parts();

    dict.install_bwt_eof()?;
    da::sa_to_da(&mut sa, &mut lcp, dict, w, threads.get())?;

    let first = dict.words() + w + 1;
    let da = &sa[first..];
    let suflen = &lcp[first..];

    let bwt_file = output::create_bwt_file(basename)?;
    log::info!("Generating the final BWT using {threads} threads");
    let start = Instant::now();

    let ctx = MergeContext { dict: &*dict, da, suflen, parse, w, bwt_file: &bwt_file };
    let queue = BoundedQueue::new(BUF_SIZE);

    let (totals, written) = thread::scope(|scope| -> io::Result<(RangeTotals, u64)> {
        let workers: Vec<_> = (0..threads.get())
            .map(|_| scope.spawn(|| merge_worker(&queue, &ctx)))
            .collect();

        // Producer: pre-scan the document array, closing a batch whenever it
        // reaches the target output size
        let mut written = 0;
        let mut entries = 0;
        let mut range_start = 0;
        let mut i = 0;
        while i < da.len() {
            if entries >= MIN_BWT_RANGE {
                queue.push(DaRange { start: range_start, end: i, bwt_start: written, count: entries });
                written += entries;
                entries = 0;
                range_start = i;
            }
            let scan = scan_entry(&ctx, i, da.len());
            entries += scan.count;
            i = scan.next;
        }
        queue.push(DaRange { start: range_start, end: da.len(), bwt_start: written, count: entries });
        written += entries;
        queue.close();

        let mut totals = RangeTotals::default();
        for worker in workers {
            let worker_totals = worker.join().expect("merge worker panicked")?;
            totals.full_words += worker_totals.full_words;
            totals.easy_bwts += worker_totals.easy_bwts;
            totals.hard_bwts += worker_totals.hard_bwts;
        }

        Ok((totals, written))
    })?;

    assert_eq!(
        totals.full_words,
        dict.words() as u64,
        "every phrase must surface exactly once as a full-word suffix",
    );
    log::info!("Full words: {}", totals.full_words);
    log::info!("Easy bwt chars: {}", totals.easy_bwts);
    log::info!("Hard bwt chars: {}", totals.hard_bwts);
    log::info!(
        "Generating the final BWT took {:.2?} ({} threads, range {MIN_BWT_RANGE})",
        start.elapsed(),
        threads,
    );

    Ok(BwtStats {
        full_words: totals.full_words,
        easy_bwts: totals.easy_bwts,
        hard_bwts: totals.hard_bwts,
        output_size: written,
    })
}
