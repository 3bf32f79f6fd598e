// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs::{self, File},
    io::BufReader,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    thread,
};

use anyhow::{Context, ensure};
use byteorder::{LittleEndian, ReadBytesExt};
use clap::Parser;
use pfbwt::{Dictionary, Parse};

/// Builds the BWT of a text from its prefix-free parse.
///
/// Expects the files an external PFP stage produced: `<basename>.dict` (the
/// distinct phrases in lexicographic order, each terminated by the byte 1),
/// `<basename>.parse` (little-endian 32-bit phrase ranks), and
/// `<basename>.last` (the byte preceding the final trigger window of each
/// occurrence). Writes `<basename>.bwt`.
#[derive(Parser)]
struct Args {
    /// Base name of the input files
    basename: PathBuf,
    /// Trigger window size used by the parsing stage
    #[arg(short, long)]
    window: usize,
    /// Worker threads for both passes; defaults to the available cores
    #[arg(short, long)]
    threads: Option<NonZeroUsize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let threads = args
        .threads
        .or_else(|| thread::available_parallelism().ok())
        .unwrap_or(NonZeroUsize::MIN);

    let dict_path = input_path(&args.basename, "dict");
    let dict_data = fs::read(&dict_path)
        .with_context(|| format!("Failed to read dictionary file '{}'", dict_path.display()))?;
    let mut dict = Dictionary::from_bytes(dict_data)
        .with_context(|| format!("Invalid dictionary file '{}'", dict_path.display()))?;

    let parse_path = input_path(&args.basename, "parse");
    let parse_file = File::open(&parse_path)
        .with_context(|| format!("Failed to open parse file '{}'", parse_path.display()))?;
    let parse_len = parse_file
        .metadata()
        .with_context(|| {
            format!("Failed to read metadata of parse file '{}'", parse_path.display())
        })?
        .len();
    ensure!(
        parse_len % 4 == 0,
        "Parse file '{}' is not a sequence of 32-bit ranks",
        parse_path.display(),
    );
    let mut ranks = vec![0u32; (parse_len / 4) as usize];
    BufReader::new(parse_file)
        .read_u32_into::<LittleEndian>(&mut ranks)
        .context("Failure occurred while reading the parse file")?;

    let last_path = input_path(&args.basename, "last");
    let last_chars = fs::read(&last_path)
        .with_context(|| format!("Failed to read last-character file '{}'", last_path.display()))?;
    ensure!(
        last_chars.len() == ranks.len(),
        "Parse and last-character files disagree on the occurrence count",
    );

    let parse = Parse::from_ranks(&ranks, &last_chars);
    let stats = pfbwt::write_bwt(&mut dict, &parse, args.window, &args.basename, threads)
        .context("BWT construction failed")?;

    println!(
        "Wrote {} bytes ({} full words, {} easy + {} hard merge chars)",
        stats.output_size, stats.full_words, stats.easy_bwts, stats.hard_bwts,
    );

    Ok(())
}

/// Appends `.<extension>` to the base name, keeping any extension it already
/// carries.
fn input_path(basename: &Path, extension: &str) -> PathBuf {
    let mut path = basename.as_os_str().to_owned();
    path.push(".");
    path.push(extension);

    PathBuf::from(path)
}
