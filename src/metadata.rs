//! Metadata document operations
//!
//! One JSON document per pack, stored as `<libraryRoot>/<fileId>.meta`.
//! Reading is tolerant: an unreadable or malformed document yields a default
//! (not valid) record instead of a structured parse error, and a folder scan
//! never aborts on one bad file.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::VaultResult;
use crate::models::PackMetadata;

pub const META_EXTENSION: &str = "meta";
pub const ARCHIVE_EXTENSION: &str = "upack";
pub const THUMBNAIL_EXTENSION: &str = "png";

/// Path of a pack's metadata document inside `dir`
pub fn meta_path(dir: &Path, file_id: &str) -> PathBuf {
    dir.join(format!("{file_id}.{META_EXTENSION}"))
}

/// Path of a pack's archive inside `dir`
pub fn archive_path(dir: &Path, file_id: &str) -> PathBuf {
    dir.join(format!("{file_id}.{ARCHIVE_EXTENSION}"))
}

/// Path of a pack's thumbnail inside `dir`
pub fn thumbnail_path(dir: &Path, file_id: &str) -> PathBuf {
    dir.join(format!("{file_id}.{THUMBNAIL_EXTENSION}"))
}

/// Read a single metadata document.
///
/// Missing file, unreadable file and malformed JSON all collapse to the same
/// default record, which fails `PackMetadata::is_valid`.
pub fn read_metadata(file: &Path) -> PackMetadata {
    let raw = match std::fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(_) => return PackMetadata::default(),
    };
    serde_json::from_str(&raw).unwrap_or_default()
}

/// Write a metadata document to `dir`, keyed by the record's file id.
///
/// Uses tempfile + rename so a crash mid-write never leaves a half-written
/// document in the library.
pub fn write_metadata(dir: &Path, metadata: &PackMetadata) -> VaultResult<PathBuf> {
    let target = meta_path(dir, &metadata.file_id);
    let json = serde_json::to_string_pretty(metadata)?;
    write_atomic(&target, json.as_bytes())?;
    Ok(target)
}

/// Enumerate every metadata document directly inside `folder`.
///
/// The scan is intentionally non-recursive: packs live flat in the library
/// root, keyed by file id. Documents that fail to parse come back as
/// default records; callers filter on `is_valid` where it matters.
pub fn scan_folder(folder: &Path) -> Vec<PackMetadata> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut records = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        if path.extension().is_some_and(|ext| ext == META_EXTENSION) {
            records.push(read_metadata(&path));
        }
    }
    records
}

/// Copy a pack's metadata document from `src_dir` into `dst_dir`, creating
/// the destination folder if needed.
pub fn copy_metadata_to(
    metadata: &PackMetadata,
    src_dir: &Path,
    dst_dir: &Path,
) -> VaultResult<PathBuf> {
    let src = meta_path(src_dir, &metadata.file_id);
    let dst = meta_path(dst_dir, &metadata.file_id);
    std::fs::create_dir_all(dst_dir)?;
    std::fs::copy(&src, &dst)?;
    Ok(dst)
}

/// Write content to a file atomically via tempfile + rename.
pub fn write_atomic(path: &Path, content: &[u8]) -> VaultResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
