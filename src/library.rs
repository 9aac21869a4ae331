//! Library index and version reconciliation
//!
//! The index is an explicit in-memory cache of the parsed metadata records
//! in one folder. It is invalidated and fully rebuilt (never incrementally
//! updated) before any operation that depends on uniqueness or lookup, which
//! keeps it honest against other writers on the shared filesystem.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::metadata::{self, scan_folder};
use crate::models::{AuthorFilterItem, PackMetadata, SortType, TagFilterItem};

/// Outcome of reconciling a library pack against its imported copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionState {
    /// Imported copy matches the library and the object file is present
    UpToDate,
    /// Library copy is strictly newer than the imported one
    NewerAvailable,
    /// Library copy is newer and the imported object file is gone
    NewerAvailableObjectMissing,
    /// Never imported into this project
    NotImported,
    /// Imported and current, but the object file is gone
    ObjectMissing,
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VersionState::UpToDate => "up to date",
            VersionState::NewerAvailable => "newer available",
            VersionState::NewerAvailableObjectMissing => "newer available, local object missing",
            VersionState::NotImported => "not imported",
            VersionState::ObjectMissing => "imported, local object missing",
        };
        f.write_str(label)
    }
}

/// Reconcile a library record against the project-local copy.
///
/// Comparator: the library copy counts as newer only when its LastModified
/// is strictly greater than the imported one; equal timestamps are up to
/// date. Callers match records by file id before calling.
pub fn check_version(
    local: Option<&PackMetadata>,
    remote: &PackMetadata,
    object_exists: bool,
) -> VersionState {
    let Some(local) = local else {
        return VersionState::NotImported;
    };

    let remote_is_newer = remote.last_modified > local.last_modified;
    match (remote_is_newer, object_exists) {
        (true, true) => VersionState::NewerAvailable,
        (true, false) => VersionState::NewerAvailableObjectMissing,
        (false, true) => VersionState::UpToDate,
        (false, false) => VersionState::ObjectMissing,
    }
}

/// Filter criteria for browsing the library
#[derive(Debug, Clone, Default)]
pub struct LibraryFilter {
    /// Keep packs carrying at least one of these tags
    pub tags: Vec<String>,
    /// Keep packs by any of these authors
    pub authors: Vec<String>,
    /// Free-text terms matched against pack name, description and tags
    pub search: Option<String>,
    /// Strict search requires every term to match; loose search any term
    pub strict_search: bool,
}

impl LibraryFilter {
    fn matches(&self, record: &PackMetadata) -> bool {
        if !self.tags.is_empty() && !self.tags.iter().any(|t| record.tags.contains(t)) {
            return false;
        }
        if !self.authors.is_empty() && !self.authors.iter().any(|a| *a == record.author) {
            return false;
        }
        if let Some(search) = &self.search {
            let haystack = format!(
                "{} {} {}",
                record.pack_name,
                record.description,
                record.tags.iter().cloned().collect::<Vec<_>>().join(" ")
            )
            .to_lowercase();
            let mut terms = search.split_whitespace().map(|t| t.to_lowercase());
            let matched = if self.strict_search {
                terms.all(|t| haystack.contains(&t))
            } else {
                terms.any(|t| haystack.contains(&t))
            };
            if !matched {
                return false;
            }
        }
        true
    }
}

/// In-memory index over one folder of metadata documents
#[derive(Debug, Clone)]
pub struct LibraryIndex {
    root: PathBuf,
    records: Vec<PackMetadata>,
}

impl LibraryIndex {
    /// Open an index over `root` without scanning yet.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            records: Vec::new(),
        }
    }

    /// Open and immediately scan.
    pub fn scan(root: impl Into<PathBuf>) -> Self {
        let mut index = Self::open(root);
        index.rebuild();
        index
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drop the cached records and rescan the folder. Records that fail
    /// validity (empty pack name or file id) are not indexed.
    pub fn rebuild(&mut self) {
        self.records = scan_folder(&self.root)
            .into_iter()
            .filter(PackMetadata::is_valid)
            .collect();
    }

    pub fn records(&self) -> &[PackMetadata] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_pack_name(&self, pack_name: &str) -> Option<&PackMetadata> {
        self.records.iter().find(|r| r.pack_name == pack_name)
    }

    pub fn find_by_file_id(&self, file_id: &str) -> Option<&PackMetadata> {
        self.records.iter().find(|r| r.file_id == file_id)
    }

    /// Pack lookup accepting either a pack name or a file id.
    pub fn find(&self, name_or_id: &str) -> Option<&PackMetadata> {
        self.find_by_pack_name(name_or_id)
            .or_else(|| self.find_by_file_id(name_or_id))
    }

    /// Generate a file id that is unique within this (freshly rebuilt)
    /// index. The id is the common basename of the pack's archive, metadata
    /// and thumbnail files.
    pub fn generate_file_id(
        &self,
        pack_name: &str,
        machine_id: &str,
        created: DateTime<Utc>,
    ) -> String {
        let mut salt: u32 = 0;
        loop {
            let mut hasher = Sha256::new();
            hasher.update(pack_name.as_bytes());
            hasher.update(machine_id.as_bytes());
            hasher.update(created.to_rfc3339().as_bytes());
            if salt > 0 {
                hasher.update(salt.to_le_bytes());
            }
            let digest = format!("{:x}", hasher.finalize());
            let candidate = format!("pack-{}", &digest[..12]);
            if self.find_by_file_id(&candidate).is_none() {
                return candidate;
            }
            salt += 1;
        }
    }

    /// Records passing `filter`, in `sort` order.
    pub fn browse(
        &self,
        filter: &LibraryFilter,
        sort: SortType,
        reverse: bool,
    ) -> Vec<&PackMetadata> {
        let mut selected: Vec<&PackMetadata> =
            self.records.iter().filter(|r| filter.matches(r)).collect();

        match sort {
            SortType::PackName => selected.sort_by(|a, b| a.pack_name.cmp(&b.pack_name)),
            SortType::CreationDate => selected.sort_by(|a, b| a.creation_date.cmp(&b.creation_date)),
            SortType::ModificationDate => {
                selected.sort_by(|a, b| a.last_modified.cmp(&b.last_modified))
            }
        }
        if reverse {
            selected.reverse();
        }
        selected
    }

    /// Every tag in use, with its use count.
    pub fn tag_cloud(&self) -> Vec<TagFilterItem> {
        let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
        for record in &self.records {
            for tag in &record.tags {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .map(|(tag, use_count)| TagFilterItem {
                tag: tag.clone(),
                use_count,
            })
            .collect()
    }

    /// Every author in use, with their pack count.
    pub fn author_cloud(&self) -> Vec<AuthorFilterItem> {
        let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
        for record in &self.records {
            if record.author.is_empty() {
                continue;
            }
            *counts.entry(&record.author).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(author, use_count)| AuthorFilterItem {
                author: author.clone(),
                use_count,
            })
            .collect()
    }

    /// Path of a pack's archive inside this library.
    pub fn archive_path(&self, record: &PackMetadata) -> PathBuf {
        metadata::archive_path(&self.root, &record.file_id)
    }
}
