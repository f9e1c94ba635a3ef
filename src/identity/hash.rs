//! Keccak-256 hashing of files, byte strings and pipeline tags.

use alloy::primitives::{keccak256, Keccak256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::identity::digest::{Digest32, IdentityError, IdentityResult};

const READ_CHUNK: usize = 64 * 1024;

/// Hash an in-memory byte string.
pub fn hash_bytes(bytes: impl AsRef<[u8]>) -> Digest32 {
    Digest32::from(keccak256(bytes))
}

/// Hash the full contents of a file, streaming it in chunks.
pub fn hash_file(path: impl AsRef<Path>) -> IdentityResult<Digest32> {
    let path = path.as_ref();
    let io_err = |source| IdentityError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    hash_reader(file).map_err(io_err)
}

/// Hash everything `reader` yields. Interrupted reads are retried.
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<Digest32> {
    let mut hasher = Keccak256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }

    Ok(Digest32::from(hasher.finalize()))
}

/// Derive the model identifier for a pipeline/version tag.
pub fn model_id_from_tag(tag: &str) -> Digest32 {
    hash_bytes(tag.as_bytes())
}
