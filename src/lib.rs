//! Vault - asset pack publishing and shared library tool
//!
//! Vault lets game art teams bundle an asset and its dependency closure into
//! a distributable archive, attach metadata (author, tags, category,
//! description, thumbnail), and later browse, filter and import those packs
//! from a shared library location on the filesystem.

pub mod error;
pub mod hierarchy;
pub mod importer;
pub mod library;
pub mod metadata;
pub mod models;
pub mod pak;
pub mod publisher;
pub mod settings;

// Re-exports for convenience
pub use error::{VaultError, VaultResult};
pub use hierarchy::{
    classify, collect_dependencies, inspect_asset, AssetRegistry, HierarchyBadness,
    HierarchyReport, RegistrySnapshot,
};
pub use library::{check_version, LibraryFilter, LibraryIndex, VersionState};
pub use metadata::{read_metadata, scan_folder, write_metadata};
pub use models::{Category, PackMetadata, SortType};
pub use publisher::{publish, update_metadata, PublishOutcome, PublishRequest, UpdateRequest};
pub use settings::{machine_id, GlobalSettings, LocalSettings, TagPool, VaultSettings};
