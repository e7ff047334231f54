//! Blake3 digests for artifact objects

use std::io;
use std::path::Path;

/// Digest of a file's contents.
pub fn hash_file(path: &Path) -> io::Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap(path)?;
    Ok(hasher.finalize())
}

pub fn hash_bytes(data: &[u8]) -> blake3::Hash {
    blake3::hash(data)
}

/// Digest of a set of named files.
///
/// Each entry contributes its name and its digest, so renaming a file changes
/// the result. Callers pass entries sorted by name.
pub fn combine_named<'a>(entries: impl IntoIterator<Item = (&'a str, &'a blake3::Hash)>) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for (name, h) in entries {
        hasher.update(&(name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update(h.as_bytes());
    }
    hasher.finalize()
}

/// First 8 hex characters, used as the object directory name.
pub fn short_hash(hash: &blake3::Hash) -> String {
    short_hex(&hash.to_hex())
}

/// First 8 characters of an already-rendered hex digest.
pub fn short_hex(hex: &str) -> String {
    hex.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_is_prefix_of_full_hex() {
        let h = hash_bytes(b"listings");
        let full = h.to_hex().to_string();
        assert_eq!(short_hash(&h).len(), 8);
        assert!(full.starts_with(&short_hash(&h)));
    }

    #[test]
    fn short_hex_tolerates_short_input() {
        assert_eq!(short_hex("abc"), "abc");
    }

    #[test]
    fn combine_named_depends_on_names() {
        let h = hash_bytes(b"same bytes");
        let a = combine_named([("a.csv", &h)]);
        let b = combine_named([("b.csv", &h)]);
        assert_ne!(a, b);
    }

    #[test]
    fn combine_named_no_boundary_ambiguity() {
        let h1 = hash_bytes(b"x");
        let h2 = hash_bytes(b"y");
        let a = combine_named([("ab", &h1), ("c", &h2)]);
        let b = combine_named([("a", &h1), ("bc", &h2)]);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        std::fs::write(&path, b"id,price\n1,50\n").unwrap();
        assert_eq!(hash_file(&path).unwrap(), hash_bytes(b"id,price\n1,50\n"));
    }
}
