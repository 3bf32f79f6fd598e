// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    iter,
};

use crate::parse::Parse;

/// One phrase's pending occurrence positions during a same-suffix merge.
///
/// Ordered by the next position to emit, so a min-heap of sources yields the
/// global BWT order. Positions are globally unique, so ties cannot occur.
struct SuffixSource<'a> {
    positions: &'a [u32],
    byte: u8,
}

impl SuffixSource<'_> {
    fn next_position(&self) -> u32 {
        self.positions[0]
    }
}

impl PartialEq for SuffixSource<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.next_position() == other.next_position()
    }
}

impl Eq for SuffixSource<'_> {}

impl PartialOrd for SuffixSource<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SuffixSource<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.next_position().cmp(&other.next_position())
    }
}

/// Emits the BWT bytes for a group of phrases whose current dictionary
/// suffixes are identical.
///
/// `group` holds, for each phrase, its id and the character preceding the
/// shared suffix within the phrase. When every character is the same the
/// occurrence lists can be concatenated in any order, so the character is
/// emitted once per occurrence in one go. Otherwise the occurrence lists are
/// interleaved by position through a min-heap, emitting each list's
/// character as its positions surface.
///
/// Returns how many bytes went through the easy and the heap branch.
pub(crate) fn write_chars_same_suffix(
    group: &[(u32, u8)],
    parse: &Parse,
    bwt: &mut Vec<u8>,
) -> (u64, u64) {
    let same_byte = group.iter().all(|&(_, byte)| byte == group[0].1);

    if same_byte {
        let mut easy_bwts = 0;
        for &(s, _) in group {
            let occurrences = parse.positions(s).len();
            bwt.extend(iter::repeat_n(group[0].1, occurrences));
            easy_bwts += occurrences as u64;
        }
        (easy_bwts, 0)
    } else {
        let mut heap = BinaryHeap::with_capacity(group.len());
        for &(s, byte) in group {
            let positions = parse.positions(s);
            if !positions.is_empty() {
                heap.push(Reverse(SuffixSource { positions, byte }));
            }
        }

        let mut hard_bwts = 0;
        while let Some(Reverse(source)) = heap.pop() {
            bwt.push(source.byte);
            hard_bwts += 1;

            let rest = &source.positions[1..];
            if !rest.is_empty() {
                heap.push(Reverse(SuffixSource {
                    positions: rest,
                    byte: source.byte,
                }));
            }
        }
        (0, hard_bwts)
    }
}
