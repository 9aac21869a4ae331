//! Settings and tag-pool documents
//!
//! Three JSON documents back the tool:
//! - per-user local settings at `<home>/Vault/VaultLocalSettings.json`
//! - per-team global settings, reached via the local `GlobalSettingsPath`
//! - the shared tag pool, reached via the local `GlobalTagsPoolPath`
//!
//! All three are plain files on a shared filesystem, readable and writable
//! by any process. No locking is performed, so concurrent writers can race;
//! last write wins.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{VaultError, VaultResult};
use crate::metadata::write_atomic;

pub const SETTINGS_FOLDER: &str = "Vault";
pub const LOCAL_SETTINGS_FILENAME: &str = "VaultLocalSettings.json";
pub const GLOBAL_SETTINGS_FILENAME: &str = "VaultGlobalSettings.json";
pub const TAG_POOL_FILENAME: &str = "VaultTags.json";

/// Per-user settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    #[serde(rename = "Version")]
    pub version: String,

    #[serde(rename = "GlobalSettingsPath")]
    pub global_settings_path: PathBuf,

    #[serde(rename = "GlobalTagsPoolPath")]
    pub global_tags_pool_path: PathBuf,

    #[serde(rename = "DeveloperName")]
    pub developer_name: String,

    /// Delete the generated package-list file after a successful publish
    #[serde(rename = "ClearPackageListOnSuccessfulPackage")]
    pub clear_package_list: bool,

    #[serde(rename = "PackageListStoragePath")]
    pub package_list_storage_path: PathBuf,

    /// External packaging tool executable
    #[serde(rename = "PackToolPath")]
    pub pack_tool_path: Option<PathBuf>,

    #[serde(rename = "ThumbnailCachePath")]
    pub thumbnail_cache_path: PathBuf,
}

/// Per-team settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    #[serde(rename = "Version")]
    pub version: String,

    /// Root folder of the shared pack library
    #[serde(rename = "LibraryPath")]
    pub library_path: PathBuf,
}

/// Shared tag pool document: `{"TagLibrary": ["..."]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagPool {
    #[serde(rename = "TagLibrary")]
    pub tag_library: BTreeSet<String>,
}

/// What `initialize` had to create on first run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitReport {
    pub wrote_local: bool,
    pub wrote_global: bool,
    pub wrote_tags: bool,
}

/// Accessor for the settings documents, anchored at the per-user settings
/// folder.
#[derive(Debug, Clone)]
pub struct VaultSettings {
    settings_dir: PathBuf,
}

impl VaultSettings {
    /// Settings folder under the user's home directory.
    pub fn locate() -> VaultResult<Self> {
        let home = dirs::home_dir().ok_or(VaultError::NoHomeDirectory)?;
        Ok(Self::at(home.join(SETTINGS_FOLDER)))
    }

    /// Anchor at an explicit folder. Tests and non-standard setups use this.
    pub fn at(settings_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_dir: settings_dir.into(),
        }
    }

    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    pub fn local_settings_path(&self) -> PathBuf {
        self.settings_dir.join(LOCAL_SETTINGS_FILENAME)
    }

    /// Load the local settings, falling back to an empty document.
    pub fn load_local(&self) -> LocalSettings {
        read_json_or_default(&self.local_settings_path())
    }

    /// Resolve the global settings path, defaulting next to the local file
    /// when the local document does not name one.
    pub fn global_settings_path(&self, local: &LocalSettings) -> PathBuf {
        if local.global_settings_path.as_os_str().is_empty() {
            self.settings_dir.join(GLOBAL_SETTINGS_FILENAME)
        } else {
            local.global_settings_path.clone()
        }
    }

    pub fn load_global(&self, local: &LocalSettings) -> GlobalSettings {
        read_json_or_default(&self.global_settings_path(local))
    }

    pub fn tag_pool_path(&self, local: &LocalSettings) -> PathBuf {
        if local.global_tags_pool_path.as_os_str().is_empty() {
            self.settings_dir.join(TAG_POOL_FILENAME)
        } else {
            local.global_tags_pool_path.clone()
        }
    }

    /// First-run setup: generate any of the three documents that are
    /// missing or empty, with defaults. Existing documents are left alone.
    pub fn initialize(&self) -> VaultResult<InitReport> {
        let mut report = InitReport::default();

        let local_path = self.local_settings_path();
        if !document_present(&local_path) {
            let local = self.default_local_settings();
            write_json(&local_path, &local)?;
            report.wrote_local = true;
        }

        let local = self.load_local();

        let global_path = self.global_settings_path(&local);
        if !document_present(&global_path) {
            let global = GlobalSettings {
                version: env!("CARGO_PKG_VERSION").to_string(),
                library_path: self.settings_dir.join("Library"),
            };
            write_json(&global_path, &global)?;
            report.wrote_global = true;
        }

        let tags_path = self.tag_pool_path(&local);
        if !document_present(&tags_path) {
            let pool = TagPool {
                tag_library: ["Environment", "Prop", "Character"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            };
            write_json(&tags_path, &pool)?;
            report.wrote_tags = true;
        }

        Ok(report)
    }

    fn default_local_settings(&self) -> LocalSettings {
        LocalSettings {
            version: env!("CARGO_PKG_VERSION").to_string(),
            global_settings_path: self.settings_dir.join(GLOBAL_SETTINGS_FILENAME),
            global_tags_pool_path: self.settings_dir.join(TAG_POOL_FILENAME),
            developer_name: os_username(),
            clear_package_list: false,
            package_list_storage_path: std::env::temp_dir(),
            pack_tool_path: None,
            thumbnail_cache_path: self.settings_dir.join("ThumbnailCache"),
        }
    }

    pub fn save_local(&self, local: &LocalSettings) -> VaultResult<()> {
        write_json(&self.local_settings_path(), local)
    }

    /// Root of the shared pack library, from the global settings.
    pub fn library_root(&self) -> VaultResult<PathBuf> {
        let local = self.load_local();
        let global = self.load_global(&local);
        if global.library_path.as_os_str().is_empty() {
            return Err(VaultError::LibraryNotConfigured {
                file: self.global_settings_path(&local),
            });
        }
        Ok(global.library_path)
    }

    /// Library root is configured and reachable (exists, or could be
    /// created).
    pub fn check_connection(&self) -> bool {
        match self.library_root() {
            Ok(root) => root.is_dir() || std::fs::create_dir_all(&root).is_ok(),
            Err(_) => false,
        }
    }

    /// Read the shared tag pool. Missing or malformed pools read as empty.
    pub fn read_tags(&self) -> BTreeSet<String> {
        let local = self.load_local();
        let pool: TagPool = read_json_or_default(&self.tag_pool_path(&local));
        pool.tag_library
    }

    /// Union `new_tags` into the shared pool and write it back sorted.
    ///
    /// Pure set union: idempotent and order-independent, so concurrent
    /// publishes submitting overlapping tags converge on the same pool.
    pub fn merge_tags(&self, new_tags: &BTreeSet<String>) -> VaultResult<BTreeSet<String>> {
        let local = self.load_local();
        let path = self.tag_pool_path(&local);
        let mut pool: TagPool = read_json_or_default(&path);
        pool.tag_library.extend(new_tags.iter().cloned());
        write_json(&path, &pool)?;
        Ok(pool.tag_library)
    }

    /// Developer name for prefilled authorship, local settings first.
    pub fn developer_name(&self) -> String {
        let name = self.load_local().developer_name;
        if name.is_empty() {
            os_username()
        } else {
            name
        }
    }
}

/// Project-local folder that imported packs land in.
pub fn project_vault_folder(project_root: &Path) -> PathBuf {
    project_root.join("Vault")
}

/// Stable per-machine identifier stamped into published metadata.
pub fn machine_id() -> String {
    let user = os_username();
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(user.as_bytes());
    hasher.update(b"@");
    hasher.update(host.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

fn os_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

fn document_present(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

fn read_json_or_default<T: Default + serde::de::DeserializeOwned>(path: &Path) -> T {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return T::default(),
    };
    serde_json::from_str(&raw).unwrap_or_default()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> VaultResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, json.as_bytes())
}
