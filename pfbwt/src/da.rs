// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{thread, time::Instant};

use crate::{
    BwtError, Dictionary,
    queue::{BUF_SIZE, BoundedQueue},
};

/// Entries converted per work unit handed to the pool.
const SA_BLOCK: usize = 100_000;

/// High bit of a document array entry: set when the suffix equals the LCP
/// with its predecessor, i.e. when the entry merges with its neighbours.
pub const DA_FLAG: u32 = 1 << 31;

/// Mask selecting the phrase id of a document array entry.
pub const DA_MASK: u32 = DA_FLAG - 1;

/// Rewrites the dictionary's suffix and LCP arrays in place into a document
/// array and a suffix-length array.
///
/// On return, for every `i` in `[dict.words() + w + 1, dict.size())`, `sa[i]`
/// holds the id of the phrase containing the suffix that started there, with
/// [`DA_FLAG`] set iff the suffix equals the longest common prefix with the
/// previous entry, and `lcp[i]` holds the length of the suffix within its
/// phrase. Entries below the range are the terminator, phrase-boundary, and
/// trailing-padding suffixes, which never contribute to the BWT.
///
/// `threads == 0` converts on the caller's thread; otherwise `threads`
/// workers are spawned and fed `SA_BLOCK`-sized ranges while the caller
/// produces. The converted arrays are identical either way.
///
/// Returns the number of full-word suffixes found, which the merge pass
/// cross-checks against the phrase count. The 31-bit phrase id limit is
/// already enforced by [`Dictionary::from_bytes`].
///
/// # Errors
///
/// Returns an error if the conversion range is empty, i.e. the window does
/// not leave any suffix long enough to index.
///
/// # Panics
///
/// Panics if the array lengths do not match the dictionary, or if the arrays
/// are not the dictionary's suffix and LCP arrays (phrase boundary checks).
pub fn sa_to_da(
    sa: &mut [u32],
    lcp: &mut [i32],
    dict: &Dictionary,
    w: usize,
    threads: usize,
) -> Result<u64, BwtError> {
    let dwords = dict.words();
    assert_eq!(sa.len(), dict.size(), "suffix array must cover the dictionary");
    assert_eq!(lcp.len(), dict.size(), "LCP array must cover the dictionary");
    // The suffixes starting at the end-of-word bytes sort to the front in
    // position order, right after the terminator
    debug_assert!(
        sa[1..=dwords].iter().zip(dict.eos()).all(|(&s, &e)| s == e),
        "suffix array does not agree with the phrase boundaries",
    );

    let first = dwords + w + 1;
    if first >= dict.size() {
        return Err(BwtError::CorruptDictionary(
            "window leaves no suffix to index",
        ));
    }

    log::info!("Converting SA and LCP to DA and SufLen using {threads} threads, block size {SA_BLOCK}");
    let start = Instant::now();

    let sa_tail = &mut sa[first..];
    let lcp_tail = &mut lcp[first..];
    let full_words = if threads == 0 {
        convert_range(sa_tail, lcp_tail, dict)
    } else {
        convert_parallel(sa_tail, lcp_tail, dict, threads)
    };

    log::info!("Conversion took {:.2?}", start.elapsed());
    log::info!(
        "DA has size {}. Dictionary words found: {full_words}",
        dict.size() - first,
    );

    Ok(full_words)
}

/// Converts one run of entries, returning how many were full words.
///
/// Every entry is rewritten from its own slot, so ranges can be converted in
/// any order and concurrently.
fn convert_range(sa: &mut [u32], lcp: &mut [i32], dict: &Dictionary) -> u64 {
    let wlen = dict.word_lengths();
    let mut full_words = 0;

    for (entry, suf_len) in sa.iter_mut().zip(lcp.iter_mut()) {
        let (suffix_len, seqid) = dict.suffix_len(*entry);
        assert!(
            suffix_len <= wlen[seqid as usize],
            "suffix longer than its phrase",
        );
        debug_assert!(suffix_len >= *suf_len, "suffix shorter than its LCP");

        if suffix_len == wlen[seqid as usize] {
            full_words += 1;
            debug_assert!(
                *suf_len < suffix_len,
                "a full word cannot prefix another suffix",
            );
        }

        *entry = if *suf_len == suffix_len {
            seqid | DA_FLAG
        } else {
            seqid
        };
        *suf_len = suffix_len;
    }

    full_words
}

fn convert_parallel(sa: &mut [u32], lcp: &mut [i32], dict: &Dictionary, threads: usize) -> u64 {
    let queue = BoundedQueue::new(BUF_SIZE);

    thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(|| {
                    let mut full_words = 0;
                    while let Some((sa_chunk, lcp_chunk)) = queue.pop() {
                        full_words += convert_range(sa_chunk, lcp_chunk, dict);
                    }
                    full_words
                })
            })
            .collect();

        for job in sa.chunks_mut(SA_BLOCK).zip(lcp.chunks_mut(SA_BLOCK)) {
            queue.push(job);
        }
        queue.close();

        workers
            .into_iter()
            .map(|worker| worker.join().expect("conversion worker panicked"))
            .sum()
    })
}
