//! Importing packs into a project
//!
//! An import copies a pack's metadata document and archive from the shared
//! library into the project's `Vault` folder, then extracts the archive into
//! the project content tree with the pack tool. The imported metadata copy
//! is what later version checks compare against the library.

use std::path::{Path, PathBuf};

use crate::error::{VaultError, VaultResult};
use crate::library::{check_version, LibraryIndex, VersionState};
use crate::metadata::{self, read_metadata};
use crate::models::PackMetadata;
use crate::pak::PakTool;
use crate::settings::{project_vault_folder, VaultSettings};

/// Map an engine object path to the project file that backs it:
/// `/Game/Vault/X` -> `<project>/Content/Vault/X` (extension-less).
///
/// Only `/Game` content is resolvable; plugin-mounted roots return `None`.
pub fn resolve_object_file(project_root: &Path, object: &str) -> Option<PathBuf> {
    let rest = object.strip_prefix("/Game/")?;
    Some(project_root.join("Content").join(rest))
}

/// Whether the object's backing file is present in the project, under
/// either the asset or the map extension.
pub fn object_file_exists(project_root: &Path, object: &str) -> bool {
    let Some(base) = resolve_object_file(project_root, object) else {
        return false;
    };
    base.with_extension("uasset").is_file() || base.with_extension("umap").is_file()
}

/// What an import produced
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub metadata: PackMetadata,
    pub meta_path: PathBuf,
    pub archive_path: PathBuf,
    pub extracted_to: PathBuf,
}

/// Copy the pack named `name_or_id` into the project and extract it.
pub fn import_pack(
    settings: &VaultSettings,
    index: &LibraryIndex,
    name_or_id: &str,
    project_root: &Path,
) -> VaultResult<ImportOutcome> {
    let record = index
        .find(name_or_id)
        .ok_or_else(|| VaultError::PackNotFound {
            name: name_or_id.to_string(),
        })?
        .clone();

    let project_vault = project_vault_folder(project_root);
    let meta_path = metadata::copy_metadata_to(&record, index.root(), &project_vault)?;

    let archive_src = index.archive_path(&record);
    let archive_path = metadata::archive_path(&project_vault, &record.file_id);
    std::fs::copy(&archive_src, &archive_path)?;

    let extracted_to = project_root.join("Content");
    std::fs::create_dir_all(&extracted_to)?;
    let tool = PakTool::from_settings(&settings.load_local())?;
    tool.extract_archive(&archive_path, &extracted_to)?;

    Ok(ImportOutcome {
        metadata: record,
        meta_path,
        archive_path,
        extracted_to,
    })
}

/// One library pack's reconciliation against the project
#[derive(Debug, Clone)]
pub struct PackStatus {
    pub metadata: PackMetadata,
    pub state: VersionState,
}

/// Reconcile every library pack against the project's imported copies.
///
/// The imported copy is matched by file id in the project `Vault` folder;
/// the on-disk check looks for the pack's primary object. A pack with no
/// recorded objects has nothing to go missing and checks as present.
pub fn status_report(index: &LibraryIndex, project_root: &Path) -> Vec<PackStatus> {
    let project_vault = project_vault_folder(project_root);

    index
        .records()
        .iter()
        .map(|remote| {
            let local_path = metadata::meta_path(&project_vault, &remote.file_id);
            let local = Some(read_metadata(&local_path)).filter(PackMetadata::is_valid);

            let object_exists = remote
                .primary_object()
                .map(|object| object_file_exists(project_root, object))
                .unwrap_or(true);

            PackStatus {
                metadata: remote.clone(),
                state: check_version(local.as_ref(), remote, object_exists),
            }
        })
        .collect()
}
