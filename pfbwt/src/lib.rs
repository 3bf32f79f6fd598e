// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

//! Parallel construction of the Burrows-Wheeler transform of a text from its
//! prefix-free parse.
//!
//! A prefix-free parsing (PFP) stage splits a text into phrases drawn from a
//! dictionary of distinct words. Given that dictionary, the positions of each
//! phrase in the BWT of the parse, and the character preceding each phrase
//! occurrence, this crate assembles the BWT of the original text byte by
//! byte and writes it straight to disk. The suffix and LCP arrays of the
//! dictionary are rewritten in place into a document array with per-suffix
//! lengths, and a pool of worker threads then merges the occurrence lists of
//! every dictionary suffix into disjoint spans of the output file.
//!
//! # Examples
//!
//! Building the BWT of a text whose PFP stage produced a dictionary, a parse,
//! and the per-occurrence preceding characters:
//!
//! ```no_run
//! use std::{fs, num::NonZeroUsize, path::Path};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut dict = pfbwt::Dictionary::from_bytes(fs::read("text.dict")?)?;
//! # let ranks = vec![0u32];
//! # let last_chars = vec![0u8];
//! let parse = pfbwt::Parse::from_ranks(&ranks, &last_chars);
//!
//! let threads = NonZeroUsize::new(4).unwrap();
//! let stats = pfbwt::write_bwt(&mut dict, &parse, 10, Path::new("text"), threads)?;
//!
//! println!("wrote {} bytes", stats.output_size);
//! # Ok(())
//! # }
//! ```

mod bwt;
mod da;
mod dict;
mod error;
mod merge;
mod output;
mod parse;
mod queue;

pub use bwt::{BwtStats, write_bwt};
pub use da::{DA_FLAG, DA_MASK, sa_to_da};
pub use dict::Dictionary;
pub use error::BwtError;
pub use parse::Parse;

/// Sentinel byte closing the dictionary.
pub const END_OF_DICT: u8 = 0;

/// Sentinel byte terminating each phrase in the dictionary.
pub const END_OF_WORD: u8 = 1;

/// Padding byte marking the conceptual start and end of the parsed text. The
/// leading one becomes the EOF marker of the final BWT.
pub const DOLLAR: u8 = 2;
