// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io,
};

/// An error indicating that BWT construction failed.
///
/// Inputs are validated when the [`Dictionary`](crate::Dictionary) and
/// [`Parse`](crate::Parse) are created and once more when the passes start;
/// after that the construction either completes fully or fails with an I/O
/// error on the output file.
///
/// # Examples
///
/// ```
/// use pfbwt::{BwtError, Dictionary};
///
/// // A phrase with no end-of-word terminator
/// let dict = Dictionary::from_bytes(vec![2, 97, 98]);
///
/// assert!(matches!(dict, Err(BwtError::CorruptDictionary(_))));
/// ```
#[derive(Debug)]
pub enum BwtError {
    /// An I/O error occurred on the output file
    Io(io::Error),
    /// The dictionary holds too many phrases for the 31-bit document array
    TooManyWords(usize),
    /// The dictionary bytes violate the sentinel structure
    CorruptDictionary(&'static str),
    /// The inverted list arrays are inconsistent
    CorruptParse(&'static str),
}

impl Display for BwtError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BwtError::Io(e) => write!(f, "I/O error: {e}"),
            BwtError::TooManyWords(words) => {
                write!(f, "dictionary holds {words} phrases, limit is 2^31 - 1")
            }
            BwtError::CorruptDictionary(reason) => write!(f, "corrupt dictionary: {reason}"),
            BwtError::CorruptParse(reason) => write!(f, "corrupt parse: {reason}"),
        }
    }
}

impl Error for BwtError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BwtError::Io(e) => e.source(),
            _ => None,
        }
    }
}

impl From<io::Error> for BwtError {
    fn from(value: io::Error) -> Self {
        BwtError::Io(value)
    }
}
