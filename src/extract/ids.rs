//! Content-addressed identifiers.
//!
//! Ids are SHA-256 digests of the source path and the element's position, so
//! re-extracting the same file yields the same ids.

use sha2::{Digest, Sha256};
use std::path::Path;

fn digest(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Id of a document.
pub fn document_id(path: &Path) -> String {
    digest(&path_key(path))
}

/// Id of a page (0-indexed).
pub fn page_id(path: &Path, page: usize) -> String {
    digest(&format!("page_{}_{}", path_key(path), page))
}

/// Id of a line within a page.
pub fn line_id(path: &Path, page: usize, line: usize) -> String {
    digest(&format!("line_{}_{}_{}", path_key(path), page, line))
}

/// Id of a word within a line.
pub fn word_id(path: &Path, page: usize, line: usize, word: usize) -> String {
    digest(&format!("word_{}_{}_{}_{}", path_key(path), page, line, word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable_hex() {
        let path = Path::new("cv/jane.pdf");
        let id = document_id(path);
        assert_eq!(id.len(), 64);
        assert_eq!(id, document_id(path));
        assert_eq!(
            document_id(Path::new("abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_ids_distinguish_positions() {
        let path = Path::new("cv/jane.pdf");
        assert_ne!(word_id(path, 0, 1, 2), word_id(path, 0, 2, 1));
        assert_ne!(line_id(path, 0, 0), page_id(path, 0));
        assert_ne!(page_id(path, 0), page_id(Path::new("cv/john.pdf"), 0));
    }
}
