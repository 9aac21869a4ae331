//! Dependency-hierarchy classification
//!
//! Team policy keeps publishable assets inside the reserved `Vault` folder of
//! the content root, with each pack self-contained in its own subfolder. The
//! classifier walks an asset's filtered dependency closure and scores how far
//! the selection strays from that layout.
//!
//! Classification is a pure function over path strings: deterministic for a
//! given root and closure, case-sensitive throughout.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

/// Reserved content folder checked against path segment 0 of the root asset
/// (after its top-level folder is stripped).
pub const RESERVED_FOLDER: &str = "Vault";

/// Severity score for folder-placement policy violations.
///
/// The score encodes (root in Vault) x (dependencies in the same subfolder)
/// x (dependencies still inside Vault), from fully compliant (0) upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HierarchyBadness {
    /// Root in Vault, every dependency in the root's Vault subfolder
    Compliant,
    /// Root outside Vault, but the selection shares one top-level folder
    OutsideVault,
    /// Root in Vault, some dependency in a different Vault subfolder
    SplitInsideVault,
    /// Root in Vault, at least one dependency entirely outside Vault
    EscapesVault,
    /// Root outside Vault and dependencies split across top-level folders
    Scattered,
}

impl HierarchyBadness {
    pub fn score(self) -> u8 {
        match self {
            HierarchyBadness::Compliant => 0,
            HierarchyBadness::OutsideVault => 1,
            HierarchyBadness::SplitInsideVault => 2,
            HierarchyBadness::EscapesVault => 3,
            HierarchyBadness::Scattered => 4,
        }
    }

    /// Inverse of [`score`](Self::score) for values read back from metadata.
    /// Out-of-range scores clamp to the most severe state.
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => HierarchyBadness::Compliant,
            1 => HierarchyBadness::OutsideVault,
            2 => HierarchyBadness::SplitInsideVault,
            3 => HierarchyBadness::EscapesVault,
            _ => HierarchyBadness::Scattered,
        }
    }

    pub fn is_compliant(self) -> bool {
        self == HierarchyBadness::Compliant
    }
}

impl fmt::Display for HierarchyBadness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HierarchyBadness::Compliant => "compliant",
            HierarchyBadness::OutsideVault => "outside the Vault folder",
            HierarchyBadness::SplitInsideVault => "split across Vault subfolders",
            HierarchyBadness::EscapesVault => "dependencies escape the Vault folder",
            HierarchyBadness::Scattered => "scattered across top-level folders",
        };
        f.write_str(label)
    }
}

/// Result of classifying one root asset and its dependency closure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyReport {
    pub badness: HierarchyBadness,
    /// The filtered transitive closure, root included
    pub dependencies: BTreeSet<String>,
    /// Dependencies that broke the placement rule for this root
    pub offenders: BTreeSet<String>,
}

/// Dependency and source-file lookups consumed from the host engine.
///
/// The engine's asset registry is out of scope; its contract arrives as a
/// snapshot document exported alongside the project (see
/// [`RegistrySnapshot`]).
pub trait AssetRegistry {
    /// Direct (non-transitive) dependencies of an asset
    fn dependencies(&self, asset: &str) -> Vec<String>;

    /// Absolute path of the asset's source file on disk
    fn resolve_source_file(&self, asset: &str) -> Option<PathBuf>;

    fn contains(&self, asset: &str) -> bool;
}

/// Registry snapshot document: `{"Assets": {"/Game/X": {"Dependencies":
/// [...], "SourceFile": "..."}}}`, exported from the engine project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(rename = "Assets", default)]
    assets: std::collections::BTreeMap<String, AssetEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AssetEntry {
    #[serde(rename = "Dependencies", default)]
    dependencies: Vec<String>,

    #[serde(rename = "SourceFile", default)]
    source_file: Option<PathBuf>,
}

impl RegistrySnapshot {
    pub fn load(path: &Path) -> VaultResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| VaultError::InvalidRegistry {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn insert(&mut self, asset: &str, dependencies: &[&str], source_file: Option<PathBuf>) {
        self.assets.insert(
            asset.to_string(),
            AssetEntry {
                dependencies: dependencies.iter().map(|s| s.to_string()).collect(),
                source_file,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetRegistry for RegistrySnapshot {
    fn dependencies(&self, asset: &str) -> Vec<String> {
        self.assets
            .get(asset)
            .map(|entry| entry.dependencies.clone())
            .unwrap_or_default()
    }

    fn resolve_source_file(&self, asset: &str) -> Option<PathBuf> {
        self.assets.get(asset).and_then(|entry| entry.source_file.clone())
    }

    fn contains(&self, asset: &str) -> bool {
        self.assets.contains_key(asset)
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Top-level folder of a long package name: `/Game/Vault/X` -> `/Game`
pub fn top_level_root(asset: &str) -> String {
    match segments(asset).first() {
        Some(first) => format!("/{first}"),
        None => String::new(),
    }
}

/// Transitive dependency closure of `root`, root included.
///
/// Engine- and script-internal packages are skipped, as is anything outside
/// the root's top-level folder.
pub fn collect_dependencies(registry: &dyn AssetRegistry, root: &str) -> BTreeSet<String> {
    let original_root = top_level_root(root);
    let mut closure: BTreeSet<String> = BTreeSet::new();
    closure.insert(root.to_string());

    let mut pending = vec![root.to_string()];
    while let Some(current) = pending.pop() {
        for dependency in registry.dependencies(&current) {
            if closure.contains(&dependency) {
                continue;
            }
            let is_engine_package = dependency.starts_with("/Engine");
            let is_script_package = dependency.starts_with("/Script");
            let is_in_same_package = dependency.starts_with(&original_root);
            if !is_engine_package && !is_script_package && is_in_same_package {
                closure.insert(dependency.clone());
                pending.push(dependency);
            }
        }
    }

    closure
}

/// Classify a root asset against its dependency closure.
///
/// Returns the severity score and the set of dependencies that violated the
/// placement rule. Segment comparisons are case-sensitive; a missing segment
/// compares as a mismatch.
pub fn classify(root: &str, dependencies: &BTreeSet<String>) -> HierarchyReport {
    let root_segments = segments(root);
    // Segment 0 of root_folders is the first folder under the top-level
    // folder (e.g. "Vault" in "/Game/Vault/Props/Chair").
    let root_folders: &[&str] = if root_segments.is_empty() {
        &[]
    } else {
        &root_segments[1..]
    };
    let in_vault = root_folders.first() == Some(&RESERVED_FOLDER);

    let mut all_in_same_subfolder = true;
    let mut any_outside_vault = false;
    let mut offenders = BTreeSet::new();

    for dependency in dependencies {
        let dep_segments = segments(dependency);

        let matches = if in_vault {
            dep_segments.get(1) == root_folders.first()
                && dep_segments.get(2) == root_folders.get(1)
        } else {
            dep_segments.get(1) == root_folders.first()
        };

        if !matches {
            all_in_same_subfolder = false;
            offenders.insert(dependency.clone());
            if in_vault && dep_segments.get(1) != Some(&RESERVED_FOLDER) {
                any_outside_vault = true;
            }
        }
    }

    let badness = match (in_vault, all_in_same_subfolder) {
        (true, true) => HierarchyBadness::Compliant,
        (false, true) => HierarchyBadness::OutsideVault,
        (true, false) => {
            if any_outside_vault {
                HierarchyBadness::EscapesVault
            } else {
                HierarchyBadness::SplitInsideVault
            }
        }
        (false, false) => HierarchyBadness::Scattered,
    };

    HierarchyReport {
        badness,
        dependencies: dependencies.clone(),
        offenders,
    }
}

/// Collect the closure for `root` from the registry and classify it.
pub fn inspect_asset(registry: &dyn AssetRegistry, root: &str) -> VaultResult<HierarchyReport> {
    if !registry.contains(root) {
        return Err(VaultError::UnknownAsset {
            asset: root.to_string(),
        });
    }
    let dependencies = collect_dependencies(registry, root);
    Ok(classify(root, &dependencies))
}
