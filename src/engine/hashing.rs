//! File hashing and content-addressed lookup

use blake3::Hasher;
use log::debug;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result};
use crate::pipeline::walk::candidate_files;
use crate::utils::config::HashingConsts;

/// Hash a file with blake3 and return the hex digest. Streams in fixed-size chunks;
/// files above the mmap threshold are mapped instead of read.
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).at_path(path)?;
    let size = file.metadata().at_path(path)?.len();
    let mut hasher = Hasher::new();

    if size > HashingConsts::HASH_MMAP_THRESHOLD {
        // SAFETY: single-writer tree; the file is not truncated while we hash it.
        let mmap = unsafe { Mmap::map(&file) }.at_path(path)?;
        hasher.update(&mmap);
    } else {
        let mut reader =
            std::io::BufReader::with_capacity(HashingConsts::HASH_READ_CHUNK_SIZE, file);
        let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buffer).at_path(path)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Compare a stored digest with a computed one (case-insensitive hex).
pub fn hash_equals(stored: &str, actual: &str) -> bool {
    stored.eq_ignore_ascii_case(actual)
}

/// Search `roots` in order for a non-hidden regular file whose content hashes to `digest`.
///
/// The walk is lazy: candidates are pulled in sorted depth-first order, a batch at a time,
/// and each batch is hashed in parallel. The first candidate in listing order that matches
/// wins, so the result is deterministic, and no batch after the one holding it is read.
/// Files that cannot be read are skipped.
pub fn find_by_hash(roots: &[PathBuf], digest: &str) -> Option<PathBuf> {
    for root in roots {
        let mut candidates = candidate_files(root);
        let mut scanned = 0usize;
        loop {
            let batch: Vec<PathBuf> = candidates
                .by_ref()
                .take(HashingConsts::HASH_SEARCH_BATCH)
                .collect();
            if batch.is_empty() {
                break;
            }
            scanned += batch.len();
            let found = batch
                .into_par_iter()
                .find_map_first(|path| match hash_file(&path) {
                    Ok(h) if hash_equals(digest, &h) => Some(path),
                    Ok(_) => None,
                    Err(e) => {
                        debug!("Hash search skipped {}: {}", path.display(), e);
                        None
                    }
                });
            if found.is_some() {
                return found;
            }
        }
        debug!(
            "Hash search: no match among {} file(s) under {}",
            scanned,
            root.display()
        );
    }
    None
}
