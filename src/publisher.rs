//! Publish and update operations
//!
//! Publishing turns one root asset plus its dependency closure into three
//! library files sharing a file id: the archive (`.upack`), the metadata
//! document (`.meta`) and an optional thumbnail (`.png`). The steps run
//! blocking and attempt-once, in the same order the files hit disk:
//!
//! 1. write the newline-delimited, quoted file list for the pack tool
//! 2. run the pack tool
//! 3. write metadata, copy the thumbnail, merge new tags into the pool
//!
//! A pack-tool failure aborts between 2 and 3 and performs no cleanup; the
//! already-written list file is left behind for inspection.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::Utc;

use crate::error::{VaultError, VaultResult};
use crate::hierarchy::{AssetRegistry, HierarchyReport};
use crate::library::LibraryIndex;
use crate::metadata::{thumbnail_path, write_metadata};
use crate::models::{Category, PackMetadata};
use crate::pak::PakTool;
use crate::settings::{machine_id, VaultSettings};

/// Everything the user supplies for a publish
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Root asset identifier, e.g. `/Game/Vault/OakTrees/Oak_A`
    pub asset: String,
    pub pack_name: String,
    pub author: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub category: Category,
    /// Existing PNG to attach as the pack thumbnail
    pub thumbnail: Option<PathBuf>,
    /// Union the submitted tags into the shared pool
    pub merge_tags_into_pool: bool,
}

impl PublishRequest {
    /// Required-field validation: pack name, author, description and at
    /// least one tag.
    pub fn validate(&self) -> VaultResult<()> {
        for (field, empty) in [
            ("pack name", self.pack_name.is_empty()),
            ("author", self.author.is_empty()),
            ("description", self.description.is_empty()),
            ("tags", self.tags.is_empty()),
        ] {
            if empty {
                return Err(VaultError::MissingField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// What a publish produced, and which known gaps it hit
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub metadata: PackMetadata,
    pub archive_path: PathBuf,
    pub meta_path: PathBuf,
    pub file_list_path: PathBuf,
    /// False when `ClearPackageListOnSuccessfulPackage` deleted the list
    pub file_list_retained: bool,
    /// The configured package-list folder was unusable; the system temp
    /// directory was used instead
    pub list_dir_fell_back_to_temp: bool,
    pub thumbnail_path: Option<PathBuf>,
    /// Closure members the registry could not map to a source file; they
    /// are skipped, not fatal
    pub unresolved: Vec<String>,
}

/// Package the asset described by `request` into the shared library.
///
/// The caller is responsible for the two advisory gates (duplicate pack
/// name, nonzero hierarchy badness) before calling; `index` must be freshly
/// rebuilt so file-id generation sees every existing pack.
pub fn publish(
    settings: &VaultSettings,
    registry: &dyn AssetRegistry,
    index: &LibraryIndex,
    request: &PublishRequest,
    report: &HierarchyReport,
) -> VaultResult<PublishOutcome> {
    request.validate()?;

    let local = settings.load_local();
    let library_root = settings.library_root()?;
    std::fs::create_dir_all(&library_root)?;

    let now = Utc::now();
    let machine = machine_id();
    let file_id = index.generate_file_id(&request.pack_name, &machine, now);

    // Resolve the closure to absolute source files for the pack tool.
    let mut lines = Vec::new();
    let mut unresolved = Vec::new();
    for dependency in &report.dependencies {
        match registry.resolve_source_file(dependency) {
            Some(path) => lines.push(format!("\"{}\"", path.display())),
            None => unresolved.push(dependency.clone()),
        }
    }

    let configured_list_dir = &local.package_list_storage_path;
    let list_dir_fell_back_to_temp =
        configured_list_dir.as_os_str().is_empty() || !configured_list_dir.is_dir();
    let list_dir = if list_dir_fell_back_to_temp {
        std::env::temp_dir()
    } else {
        configured_list_dir.clone()
    };

    let list_filename = format!("VaultPackageList_{}.txt", now.format("%Y.%m.%d-%H.%M.%S"));
    let file_list_path = list_dir.join(list_filename);
    std::fs::write(&file_list_path, lines.join("\n") + "\n")?;

    let archive_path = crate::metadata::archive_path(&library_root, &file_id);
    let tool = PakTool::from_settings(&local)?;
    tool.create_archive(&archive_path, &file_list_path)?;

    let metadata = PackMetadata {
        author: request.author.clone(),
        pack_name: request.pack_name.clone(),
        file_id: file_id.clone(),
        description: request.description.clone(),
        tags: request.tags.clone(),
        category: request.category,
        creation_date: now,
        last_modified: now,
        machine_id: machine,
        hierarchy_badness: report.badness.score(),
        objects_in_pack: report.dependencies.clone(),
    };
    let meta_path = write_metadata(&library_root, &metadata)?;

    let written_thumbnail = match &request.thumbnail {
        Some(source) => {
            let target = thumbnail_path(&library_root, &file_id);
            std::fs::copy(source, &target)?;
            Some(target)
        }
        None => None,
    };

    if request.merge_tags_into_pool {
        settings.merge_tags(&request.tags)?;
    }

    let mut file_list_retained = true;
    if local.clear_package_list {
        std::fs::remove_file(&file_list_path)?;
        file_list_retained = false;
    }

    Ok(PublishOutcome {
        metadata,
        archive_path,
        meta_path,
        file_list_path,
        file_list_retained,
        list_dir_fell_back_to_temp,
        thumbnail_path: written_thumbnail,
        unresolved,
    })
}

/// Metadata-only edit of an existing pack
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub pack_name: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub category: Option<Category>,
    pub merge_tags_into_pool: bool,
}

/// Rewrite a pack's metadata without touching its archive.
///
/// Fields left `None` keep their current value; `LastModified` is always
/// refreshed, `CreationDate` and the file id never change.
pub fn update_metadata(
    settings: &VaultSettings,
    index: &LibraryIndex,
    request: &UpdateRequest,
) -> VaultResult<PackMetadata> {
    let mut metadata = index
        .find_by_pack_name(&request.pack_name)
        .ok_or_else(|| VaultError::PackNotFound {
            name: request.pack_name.clone(),
        })?
        .clone();

    if let Some(author) = &request.author {
        metadata.author = author.clone();
    }
    if let Some(description) = &request.description {
        metadata.description = description.clone();
    }
    if let Some(tags) = &request.tags {
        metadata.tags = tags.clone();
    }
    if let Some(category) = request.category {
        metadata.category = category;
    }

    for (field, empty) in [
        ("author", metadata.author.is_empty()),
        ("description", metadata.description.is_empty()),
        ("tags", metadata.tags.is_empty()),
    ] {
        if empty {
            return Err(VaultError::MissingField {
                field: field.to_string(),
            });
        }
    }

    metadata.last_modified = Utc::now();

    let library_root = settings.library_root()?;
    write_metadata(&library_root, &metadata)?;

    if request.merge_tags_into_pool {
        if let Some(tags) = &request.tags {
            settings.merge_tags(tags)?;
        }
    }

    Ok(metadata)
}
