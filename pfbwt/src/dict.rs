// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use crate::{BwtError, DOLLAR, END_OF_DICT, END_OF_WORD};

/// Phrase ids are packed into 31 bits of a document array entry, so the
/// dictionary may hold at most `2^31 - 1` phrases.
const MAX_WORDS: usize = 1 << 31;

/// The dictionary of a prefix-free parse.
///
/// Holds the distinct phrases of the parse in lexicographic order, each
/// terminated by [`END_OF_WORD`], closed by a final [`END_OF_DICT`] byte,
/// together with the scanned-out phrase boundary tables.
pub struct Dictionary {
    data: Vec<u8>,
    eos: Vec<u32>,
    wlen: Vec<i32>,
}

impl Dictionary {
    /// Creates a `Dictionary` from the raw phrase bytes.
    ///
    /// `data` must hold the phrases in lexicographic order, each terminated
    /// by [`END_OF_WORD`]; the closing [`END_OF_DICT`] byte is appended here.
    /// Phrase characters other than the [`DOLLAR`] padding must be greater
    /// than all sentinel values, i.e. at least 3.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is empty, does not end with
    /// [`END_OF_WORD`], contains an empty phrase or a stray [`END_OF_DICT`]
    /// byte, does not fit 32-bit suffix positions, or holds `2^31` or more
    /// phrases.
    ///
    /// # Examples
    ///
    /// ```
    /// use pfbwt::Dictionary;
    ///
    /// # fn main() -> Result<(), pfbwt::BwtError> {
    /// // The phrases "$ab" and "b$$"
    /// let dict = Dictionary::from_bytes(vec![2, 97, 98, 1, 98, 2, 2, 1])?;
    ///
    /// assert_eq!(dict.words(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_bytes(mut data: Vec<u8>) -> Result<Self, BwtError> {
        if data.is_empty() {
            return Err(BwtError::CorruptDictionary("dictionary is empty"));
        }
        if data[data.len() - 1] != END_OF_WORD {
            return Err(BwtError::CorruptDictionary(
                "dictionary does not end with an end-of-word byte",
            ));
        }

        let mut eos = Vec::new();
        let mut phrase_start = 0;
        for (i, &byte) in data.iter().enumerate() {
            if byte == END_OF_DICT {
                return Err(BwtError::CorruptDictionary("stray end-of-dict byte"));
            }
            if byte == END_OF_WORD {
                if i == phrase_start {
                    return Err(BwtError::CorruptDictionary("empty phrase"));
                }
                eos.push(i as u32);
                phrase_start = i + 1;
            }
        }

        check_word_limit(eos.len())?;
        // Suffix positions are stored as u32, terminator included
        if data.len() >= u32::MAX as usize {
            return Err(BwtError::CorruptDictionary(
                "dictionary does not fit 32-bit suffix positions",
            ));
        }
        data.push(END_OF_DICT);

        // wlen[i] = eos[i] - eos[i - 1] - 1, with wlen[0] = eos[0]; the empty
        // phrase check above keeps every entry positive
        let mut wlen = Vec::with_capacity(eos.len());
        let mut prev = -1i64;
        for &end in &eos {
            let len = i64::from(end) - prev - 1;
            debug_assert!(len > 0, "phrase lengths must be positive");
            wlen.push(len as i32);
            prev = i64::from(end);
        }

        Ok(Self { data, eos, wlen })
    }

    /// Returns the number of phrases in the dictionary.
    #[must_use]
    pub fn words(&self) -> usize {
        self.eos.len()
    }

    /// Returns the total size in bytes, sentinels included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the dictionary bytes, sentinels included.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the length of the dictionary suffix starting at `pos`,
    /// measured up to (excluding) the next end-of-word byte, along with the
    /// id of the phrase containing it.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies past the last phrase terminator.
    #[must_use]
    pub fn suffix_len(&self, pos: u32) -> (i32, u32) {
        let seqid = self.eos.partition_point(|&end| end < pos);
        assert!(seqid < self.eos.len(), "suffix position outside the phrases");

        ((self.eos[seqid] - pos) as i32, seqid as u32)
    }

    /// End-of-word positions of each phrase, in increasing order.
    pub(crate) fn eos(&self) -> &[u32] {
        &self.eos
    }

    /// Length of each phrase, excluding its terminator.
    pub(crate) fn word_lengths(&self) -> &[i32] {
        &self.wlen
    }

    /// Rewrites the leading [`DOLLAR`] byte to 0 so that it surfaces as the
    /// EOF marker of the final BWT.
    pub(crate) fn install_bwt_eof(&mut self) -> Result<(), BwtError> {
        if self.data[0] != DOLLAR {
            return Err(BwtError::CorruptDictionary(
                "first phrase does not start with the padding byte",
            ));
        }
        self.data[0] = 0;

        Ok(())
    }
}

/// Rejects dictionaries whose phrase count would overflow the 31-bit id
/// space of a document array entry.
pub(crate) fn check_word_limit(words: usize) -> Result<(), BwtError> {
    if words >= MAX_WORDS {
        return Err(BwtError::TooManyWords(words));
    }

    Ok(())
}
