// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

//! Generalized suffix array and LCP construction for phrase dictionaries.

#![no_std]

extern crate alloc;

mod dict_suffix_array;
mod gsa;

pub use dict_suffix_array::DictSuffixArray;
