// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs::File,
    io::{self, ErrorKind},
    os::unix::fs::FileExt,
    path::{Path, PathBuf},
};

/// Writes all of `buf` at `offset`, retrying short writes.
///
/// Positional writes leave the shared descriptor's cursor untouched, so
/// worker threads can target disjoint byte ranges of one open file. A write
/// that makes no progress is an error; one that reports more bytes than
/// requested cannot come from the OS and is fatal.
pub(crate) fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    while !buf.is_empty() {
        match file.write_at(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "positional write made no progress",
                ));
            }
            Ok(written) => {
                assert!(written <= buf.len(), "wrote more bytes than requested");
                buf = &buf[written..];
                offset += written as u64;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Creates the `<basename>.bwt` output file, truncating any previous run.
pub(crate) fn create_bwt_file(basename: &Path) -> io::Result<File> {
    File::create(bwt_path(basename))
}

/// Appends the `.bwt` suffix to `basename` without touching any extension
/// the base name may already carry.
pub(crate) fn bwt_path(basename: &Path) -> PathBuf {
    let mut path = basename.as_os_str().to_owned();
    path.push(".bwt");

    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_disjoint_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranges");
        let file = File::create(&path).unwrap();

        write_all_at(&file, b"xyz", 3).unwrap();
        write_all_at(&file, b"abc", 0).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"abcxyz");
    }

    #[test]
    fn appends_the_bwt_suffix() {
        assert_eq!(bwt_path(Path::new("data.v1")), PathBuf::from("data.v1.bwt"));
    }
}
