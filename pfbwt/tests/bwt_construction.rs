// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

#![allow(missing_docs)]

use std::{fs, iter, num::NonZeroUsize, path::Path};

use rand::{Rng, SeedableRng, rngs::StdRng};

use pfbwt::{BwtStats, DA_FLAG, DA_MASK, DOLLAR, Dictionary, END_OF_WORD, Parse};

/// Runs the whole pipeline on fresh copies of the inputs, returning the
/// output bytes and the reported counters.
fn run_pipeline(dict_bytes: &[u8], parse: &Parse, w: usize, threads: usize) -> (Vec<u8>, BwtStats) {
    let dir = tempfile::tempdir().unwrap();
    let basename = dir.path().join("text");

    let mut dict = Dictionary::from_bytes(dict_bytes.to_vec()).unwrap();
    let stats = pfbwt::write_bwt(
        &mut dict,
        parse,
        w,
        &basename,
        NonZeroUsize::new(threads).unwrap(),
    )
    .unwrap();

    let output = fs::read(dir.path().join("text.bwt")).unwrap();
    assert_eq!(output.len() as u64, stats.output_size);

    (output, stats)
}

/// A minimal prefix-free parser for test inputs.
///
/// Pads `text` with one leading and `w` trailing `Dollar` bytes and cuts a
/// phrase at every occurrence of a trigger window (the trailing padding
/// window always cuts). Consecutive phrases overlap by `w` characters.
/// Returns the raw dictionary bytes, the parse as ranks into the sorted
/// dictionary, and the character preceding each occurrence's final window.
fn pfp(text: &[u8], w: usize, triggers: &[&[u8]]) -> (Vec<u8>, Vec<u32>, Vec<u8>) {
    assert!(text.iter().all(|&b| b > DOLLAR));
    assert!(triggers.iter().all(|t| t.len() == w));

    let mut padded = Vec::with_capacity(text.len() + w + 1);
    padded.push(DOLLAR);
    padded.extend_from_slice(text);
    padded.extend(iter::repeat_n(DOLLAR, w));

    let mut words: Vec<Vec<u8>> = Vec::new();
    let mut start = 0;
    for p in 1..=padded.len() - w {
        if p == padded.len() - w || triggers.contains(&&padded[p..p + w]) {
            words.push(padded[start..p + w].to_vec());
            start = p;
        }
    }

    let last_chars: Vec<u8> = words.iter().map(|word| word[word.len() - w - 1]).collect();

    let mut sorted = words.clone();
    sorted.sort();
    sorted.dedup();
    let ranks: Vec<u32> = words
        .iter()
        .map(|word| sorted.binary_search(word).unwrap() as u32)
        .collect();

    let mut dict_bytes = Vec::new();
    for word in &sorted {
        dict_bytes.extend_from_slice(word);
        dict_bytes.push(END_OF_WORD);
    }

    (dict_bytes, ranks, last_chars)
}

/// Reference BWT of `text` terminated by a 0 byte.
fn naive_bwt(text: &[u8]) -> Vec<u8> {
    let mut terminated = text.to_vec();
    terminated.push(0);

    let mut order: Vec<usize> = (0..terminated.len()).collect();
    order.sort_by(|&a, &b| terminated[a..].cmp(&terminated[b..]));

    order
        .iter()
        .map(|&pos| terminated[(pos + terminated.len() - 1) % terminated.len()])
        .collect()
}

fn random_text(len: usize, alphabet: &[u8], seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect()
}

#[test]
fn full_words_only() {
    // Two phrases "$e" and "e$" with a window of 1: the only suffixes longer
    // than the window are the phrases themselves, so every output byte comes
    // from the full-word path, in inverted-list order, and the single
    // one-character suffix contributes nothing.
    let dict_bytes = [2, 101, 1, 101, 2, 1];
    let parse = Parse::new(
        vec![0, 2, 4, 1, 3],
        vec![0, 3, 5],
        vec![10, 20, 30, 40, 50],
    )
    .unwrap();

    let (output, stats) = run_pipeline(&dict_bytes, &parse, 1, 2);

    assert_eq!(output, [10, 30, 50, 20, 40]);
    assert_eq!(stats.full_words, 2);
    assert_eq!(stats.easy_bwts, 0);
    assert_eq!(stats.hard_bwts, 0);
    assert_eq!(stats.output_size, 5);
}

#[test]
fn same_suffix_groups_merge() {
    // Phrases "$hh", "k$$", "uaxyz", "vaxyz" with a window of 2. The last
    // two share the suffix "axyz", whose preceding characters differ, so its
    // occurrence lists interleave by position through the heap; they also
    // share "xyz", preceded by 'a' in both, which merges as a plain run.
    let dict_bytes = [
        2, 104, 104, 1, 107, 2, 2, 1, 117, 97, 120, 121, 122, 1, 118, 97, 120, 121, 122, 1,
    ];
    let parse = Parse::new(
        vec![1, 0, 5, 9, 3, 7],
        vec![0, 1, 2, 4, 6],
        vec![200, 201, 202, 203, 204, 205, 206, 207, 208, 209],
    )
    .unwrap();

    let (output, stats) = run_pipeline(&dict_bytes, &parse, 2, 2);

    assert_eq!(
        output,
        [201, 118, 117, 118, 117, 200, 205, 209, 203, 207, 97, 97, 97, 97],
    );
    assert_eq!(stats.full_words, 4);
    // "xyz" merges one 'a' per occurrence of both phrases
    assert_eq!(stats.easy_bwts, 4);
    // "axyz" interleaves the same occurrence lists through the heap
    assert_eq!(stats.hard_bwts, 4);
}

#[test]
fn round_trip_repeated_pattern() {
    let text = b"abcabcabc";
    let (dict_bytes, ranks, last_chars) = pfp(text, 2, &[b"bc"]);
    let parse = Parse::from_ranks(&ranks, &last_chars);

    let (output, stats) = run_pipeline(&dict_bytes, &parse, 2, 1);

    assert_eq!(output, naive_bwt(text));
    assert_eq!(stats.full_words, 3);
    assert_eq!(stats.easy_bwts, 3);
    assert_eq!(stats.hard_bwts, 3);

    // Every occurrence contributes exactly one full-word byte, and the rest
    // arrive through the two merge branches
    assert_eq!(
        stats.easy_bwts + stats.hard_bwts + ranks.len() as u64,
        stats.output_size,
    );

    let (parallel_output, _) = run_pipeline(&dict_bytes, &parse, 2, 4);
    assert_eq!(parallel_output, output);
}

#[test]
fn round_trip_single_character_window() {
    let text = b"mississippi";
    let (dict_bytes, ranks, last_chars) = pfp(text, 1, &[b"i"]);
    let parse = Parse::from_ranks(&ranks, &last_chars);

    let (output, stats) = run_pipeline(&dict_bytes, &parse, 1, 3);

    assert_eq!(output, naive_bwt(text));
    assert_eq!(
        stats.easy_bwts + stats.hard_bwts + ranks.len() as u64,
        stats.output_size,
    );
}

#[test]
fn identical_output_for_every_thread_count() {
    // Large enough that the producer closes several batches, so the workers
    // genuinely race for ranges
    let text = random_text(120_000, b"abc", 0xbada55);
    let (dict_bytes, ranks, last_chars) = pfp(&text, 2, &[b"ab", b"ca"]);
    let parse = Parse::from_ranks(&ranks, &last_chars);

    let (reference, reference_stats) = run_pipeline(&dict_bytes, &parse, 2, 1);
    assert_eq!(reference, naive_bwt(&text));

    for threads in [2, 4, 8] {
        let (output, stats) = run_pipeline(&dict_bytes, &parse, 2, threads);
        assert_eq!(output, reference);
        assert_eq!(stats, reference_stats);
    }
}

#[test]
fn serial_and_parallel_conversion_agree() {
    let text = random_text(20_000, b"ab", 7);
    let (dict_bytes, _, _) = pfp(&text, 2, &[b"ab"]);
    let dict = Dictionary::from_bytes(dict_bytes).unwrap();
    let w = 2;

    let (mut serial_sa, mut serial_lcp) =
        dictsa::DictSuffixArray::build(dict.bytes()).into_parts();
    let serial_words = pfbwt::sa_to_da(&mut serial_sa, &mut serial_lcp, &dict, w, 0).unwrap();

    let (mut parallel_sa, mut parallel_lcp) =
        dictsa::DictSuffixArray::build(dict.bytes()).into_parts();
    let parallel_words =
        pfbwt::sa_to_da(&mut parallel_sa, &mut parallel_lcp, &dict, w, 4).unwrap();

    assert_eq!(serial_words, parallel_words);
    assert_eq!(serial_words, dict.words() as u64);
    assert_eq!(serial_sa, parallel_sa);
    assert_eq!(serial_lcp, parallel_lcp);

    // Converted entries name a valid phrase and never exceed its length,
    // with equality only on unflagged entries
    let first = dict.words() + w + 1;
    for i in first..dict.size() {
        let seqid = (serial_sa[i] & DA_MASK) as usize;
        assert!(seqid < dict.words());

        let word_len = i32::try_from(phrase_len(&dict, seqid)).unwrap();
        assert!(serial_lcp[i] <= word_len);
        if serial_lcp[i] == word_len {
            assert_eq!(serial_sa[i] & DA_FLAG, 0);
        }
    }
}

/// Length of phrase `seqid`, recovered from the dictionary bytes.
fn phrase_len(dict: &Dictionary, seqid: usize) -> usize {
    let mut boundaries = dict
        .bytes()
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == END_OF_WORD)
        .map(|(i, _)| i);
    let end = boundaries.nth(seqid).unwrap();
    let start = if seqid == 0 {
        0
    } else {
        dict.bytes()[..end]
            .iter()
            .rposition(|&b| b == END_OF_WORD)
            .unwrap()
            + 1
    };

    end - start
}

#[test]
fn rejects_mismatched_parse() {
    let mut dict = Dictionary::from_bytes(vec![2, 97, 1, 98, 2, 1]).unwrap();
    let parse = Parse::new(vec![0], vec![0, 1], vec![9, 9]).unwrap();

    let result = pfbwt::write_bwt(
        &mut dict,
        &parse,
        1,
        Path::new("unused"),
        NonZeroUsize::MIN,
    );

    assert!(matches!(result, Err(pfbwt::BwtError::CorruptParse(_))));
}
