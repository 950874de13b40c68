//! Zip-wrapped model payloads

use std::io::{Cursor, Read};

use super::AssetError;

/// Bytes of the first `.glb` entry, in archive order
pub fn extract_first_glb(key: &str, archive_bytes: &[u8]) -> Result<Vec<u8>, AssetError> {
    let archive_error = |source| AssetError::Archive {
        key: key.to_string(),
        source,
    };
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).map_err(archive_error)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(archive_error)?;
        if entry.is_dir() || !entry.name().to_ascii_lowercase().ends_with(".glb") {
            continue;
        }
        log::debug!("Extracting '{}' from archive for '{}'", entry.name(), key);
        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut bytes).map_err(|source| AssetError::Io {
            path: format!("{}!{}", key, entry.name()),
            source,
        })?;
        return Ok(bytes);
    }

    Err(AssetError::MissingArchiveEntry { key: key.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::zip_with;

    #[test]
    fn test_first_glb_entry_wins() {
        let archive = zip_with(&[
            ("readme.txt", &b"hello"[..]),
            ("a.GLB", &b"first"[..]),
            ("b.glb", &b"second"[..]),
        ]);
        assert_eq!(extract_first_glb("robot", &archive).unwrap(), b"first");
    }

    #[test]
    fn test_archive_without_glb_fails() {
        let archive = zip_with(&[("readme.txt", &b"hello"[..])]);
        assert!(matches!(
            extract_first_glb("robot", &archive),
            Err(AssetError::MissingArchiveEntry { key }) if key == "robot"
        ));
    }

    #[test]
    fn test_garbage_is_not_an_archive() {
        assert!(matches!(extract_first_glb("robot", b"not a zip at all"), Err(AssetError::Archive { .. })));
    }
}
