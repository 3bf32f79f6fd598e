// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use alloc::{vec, vec::Vec};
use core::cmp::Ordering;

/// Byte values at or below this are collection separators: the end-of-phrase
/// byte `1` and the closing byte `0`.
pub(crate) const MAX_SEPARATOR: u8 = 1;

/// Sorts all suffix start positions of `data` under the generalized order.
pub(crate) fn sort_suffixes(data: &[u8]) -> Vec<u32> {
    let mut suffix_array: Vec<u32> = (0..data.len() as u32).collect();
    suffix_array.sort_unstable_by(|&a, &b| compare_suffixes(data, a as usize, b as usize));

    suffix_array
}

/// Compares two suffixes of `data` treating separator bytes as unique
/// symbols, ranked first by value and then by position in the collection.
///
/// Every suffix ends in a separator, so the scan always terminates: when the
/// scan reaches an equal pair of separator bytes, the start positions decide.
fn compare_suffixes(data: &[u8], a: usize, b: usize) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let mut k = 0;
    loop {
        let byte_a = data[a + k];
        let byte_b = data[b + k];
        if byte_a != byte_b {
            return byte_a.cmp(&byte_b);
        }
        if byte_a <= MAX_SEPARATOR {
            return a.cmp(&b);
        }

        k += 1;
    }
}

/// Computes the LCP of each suffix with its predecessor in sorted order.
///
/// Separator bytes never match each other, so an LCP value counts phrase
/// characters only. `lcp[0]` is 0.
pub(crate) fn lcp_from_sorted(data: &[u8], suffix_array: &[u32]) -> Vec<i32> {
    let mut lcp = vec![0u32; suffix_array.len()];
    for i in 1..suffix_array.len() {
        lcp[i] = common_prefix(data, suffix_array[i - 1] as usize, suffix_array[i] as usize);
    }

    bytemuck::allocation::cast_vec(lcp)
}

fn common_prefix(data: &[u8], a: usize, b: usize) -> u32 {
    let mut k = 0;
    while data[a + k] == data[b + k] && data[a + k] > MAX_SEPARATOR {
        k += 1;
    }

    k as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    // "$abc" "bc$$" "bcabc", separated by 1, closed by 0
    const DICT: &[u8] = &[
        2, 97, 98, 99, 1, 98, 99, 2, 2, 1, 98, 99, 97, 98, 99, 1, 0,
    ];

    #[test]
    fn separator_suffixes_sort_by_position() {
        let suffix_array = sort_suffixes(DICT);

        // The 0 terminator first, then the end-of-phrase bytes in increasing
        // position order regardless of what follows them.
        assert_eq!(&suffix_array[..4], &[16, 4, 9, 15]);
    }

    #[test]
    fn known_dictionary() {
        let suffix_array = sort_suffixes(DICT);

        assert_eq!(
            &suffix_array,
            &[16, 4, 9, 15, 8, 7, 0, 1, 12, 2, 13, 5, 10, 3, 14, 6, 11],
        );
    }

    #[test]
    fn lcp_ignores_separators() {
        let suffix_array = sort_suffixes(DICT);
        let lcp = lcp_from_sorted(DICT, &suffix_array);

        // The suffixes "abc" at positions 1 and 12 agree on all three phrase
        // characters but not on the separators that follow them.
        assert_eq!(
            &lcp,
            &[0, 0, 0, 0, 0, 1, 1, 0, 3, 0, 2, 2, 2, 0, 1, 1, 1],
        );
    }

    #[test]
    fn equal_content_breaks_ties_by_position() {
        // Two identical phrases "ab"
        let data = &[97, 98, 1, 97, 98, 1, 0];
        let suffix_array = sort_suffixes(data);

        assert_eq!(&suffix_array, &[6, 2, 5, 0, 3, 1, 4]);
    }
}
