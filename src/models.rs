//! Core data models for Vault
//!
//! Defines the fundamental data structures used throughout Vault:
//! - `PackMetadata`: the per-pack metadata record persisted as `<fileId>.meta`
//! - Supporting enums: `Category`, `SortType`
//! - Filter items used by the library browse surface

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed category set offered during publishing.
///
/// Unrecognized strings deserialize to `Unknown` rather than erroring, the
/// same way every other missing or unknown metadata field defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    Environment,
    Props,
    Characters,
    Weapons,
    Materials,
    Animations,
    Fx,
    Audio,
    #[default]
    Unknown,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Environment,
        Category::Props,
        Category::Characters,
        Category::Weapons,
        Category::Materials,
        Category::Animations,
        Category::Fx,
        Category::Audio,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Environment => "Environment",
            Category::Props => "Props",
            Category::Characters => "Characters",
            Category::Weapons => "Weapons",
            Category::Materials => "Materials",
            Category::Animations => "Animations",
            Category::Fx => "FX",
            Category::Audio => "Audio",
            Category::Unknown => "Unknown",
        }
    }

    /// Tolerant mapping used for metadata documents: anything unrecognized
    /// becomes `Unknown`.
    pub fn from_label(label: &str) -> Self {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(Category::Unknown)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parser used for CLI input, where a typo should be an error
/// instead of silently publishing an uncategorized pack.
impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("unknown") {
            return Ok(Category::Unknown);
        }
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let options: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown category '{s}' (expected one of: {})", options.join(", "))
            })
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Category::from_label(&label))
    }
}

/// Sort orders offered when listing the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortType {
    #[default]
    PackName,
    CreationDate,
    ModificationDate,
}

impl FromStr for SortType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" | "packname" => Ok(SortType::PackName),
            "created" | "creation" => Ok(SortType::CreationDate),
            "modified" | "modification" => Ok(SortType::ModificationDate),
            other => Err(format!(
                "unknown sort order '{other}' (expected one of: name, created, modified)"
            )),
        }
    }
}

/// The metadata record persisted next to each pack archive.
///
/// Serialized 1:1 to a JSON object with the historical field names. Missing
/// fields default to empty/zero values rather than erroring, so documents
/// written by older revisions stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackMetadata {
    #[serde(rename = "Author")]
    pub author: String,

    /// Visible pack name shown in the browser
    #[serde(rename = "PackName")]
    pub pack_name: String,

    /// Unique id used as the common basename for the pack's `.upack`,
    /// `.meta` and `.png` files
    #[serde(rename = "FileId")]
    pub file_id: String,

    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Tags")]
    pub tags: BTreeSet<String>,

    #[serde(rename = "Category")]
    pub category: Category,

    #[serde(rename = "CreationDate")]
    pub creation_date: DateTime<Utc>,

    #[serde(rename = "LastModified")]
    pub last_modified: DateTime<Utc>,

    #[serde(rename = "MachineID")]
    pub machine_id: String,

    /// Folder-placement severity score computed at publish time.
    /// Derived data: recomputed from the dependency closure on republish.
    #[serde(rename = "HierarchyBadness")]
    pub hierarchy_badness: u8,

    /// Engine object paths contained in the archive
    #[serde(rename = "ObjectsInPack")]
    pub objects_in_pack: BTreeSet<String>,
}

impl Default for PackMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            author: String::new(),
            pack_name: String::new(),
            file_id: String::new(),
            description: String::new(),
            tags: BTreeSet::new(),
            category: Category::Unknown,
            creation_date: now,
            last_modified: now,
            machine_id: String::new(),
            hierarchy_badness: 0,
            objects_in_pack: BTreeSet::new(),
        }
    }
}

impl PackMetadata {
    /// A record parsed from an empty or malformed document fails this check.
    pub fn is_valid(&self) -> bool {
        !self.pack_name.is_empty() && !self.file_id.is_empty()
    }

    /// The object whose on-disk presence decides the imported/missing
    /// version states.
    pub fn primary_object(&self) -> Option<&String> {
        self.objects_in_pack.iter().next()
    }
}

/// Tag entry with its use count, for the browse-side tag cloud
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilterItem {
    pub tag: String,
    pub use_count: usize,
}

/// Author entry with its use count, for the browse-side author cloud
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorFilterItem {
    pub author: String,
    pub use_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PackMetadata {
        PackMetadata {
            author: "dana".to_string(),
            pack_name: "OakTrees".to_string(),
            file_id: "pack-9f2c11aa03de".to_string(),
            description: "A set of oak trees with LODs".to_string(),
            tags: ["Environment", "Tree"].iter().map(|s| s.to_string()).collect(),
            category: Category::Environment,
            creation_date: "2024-03-01T10:00:00Z".parse().unwrap(),
            last_modified: "2024-03-02T09:30:00Z".parse().unwrap(),
            machine_id: "a1b2c3d4e5f60718".to_string(),
            hierarchy_badness: 0,
            objects_in_pack: ["/Game/Vault/OakTrees/Oak_A"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    #[test]
    fn test_metadata_roundtrip_full() {
        let meta = sample();
        let json = serde_json::to_string(&meta).unwrap();
        let back: PackMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn test_metadata_roundtrip_empty_sets() {
        let mut meta = sample();
        meta.tags.clear();
        meta.objects_in_pack.clear();
        let json = serde_json::to_string(&meta).unwrap();
        let back: PackMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn test_metadata_missing_fields_default() {
        let meta: PackMetadata =
            serde_json::from_str(r#"{"PackName": "Solo", "FileId": "pack-0011aabbccdd"}"#).unwrap();
        assert_eq!(meta.pack_name, "Solo");
        assert!(meta.author.is_empty());
        assert!(meta.tags.is_empty());
        assert_eq!(meta.category, Category::Unknown);
        assert_eq!(meta.hierarchy_badness, 0);
        assert!(meta.is_valid());
    }

    #[test]
    fn test_metadata_field_names_are_stable() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "Author",
            "PackName",
            "FileId",
            "Description",
            "Tags",
            "Category",
            "CreationDate",
            "LastModified",
            "MachineID",
            "HierarchyBadness",
            "ObjectsInPack",
        ] {
            assert!(obj.contains_key(key), "missing field {key}");
        }
    }

    #[test]
    fn test_metadata_validity() {
        assert!(!PackMetadata::default().is_valid());
        let mut meta = PackMetadata::default();
        meta.pack_name = "Named".to_string();
        assert!(!meta.is_valid());
        meta.file_id = "pack-000000000001".to_string();
        assert!(meta.is_valid());
    }

    #[test]
    fn test_category_unknown_label_is_tolerated() {
        assert_eq!(Category::from_label("Blueprints"), Category::Unknown);
        assert_eq!(Category::from_label("props"), Category::Props);
        assert_eq!(Category::from_label("FX"), Category::Fx);
    }

    #[test]
    fn test_category_strict_parse_rejects_typos() {
        assert!("Porps".parse::<Category>().is_err());
        assert_eq!("weapons".parse::<Category>().unwrap(), Category::Weapons);
        assert_eq!("Unknown".parse::<Category>().unwrap(), Category::Unknown);
    }

    #[test]
    fn test_category_serde_uses_display_labels() {
        let json = serde_json::to_string(&Category::Fx).unwrap();
        assert_eq!(json, "\"FX\"");
        let back: Category = serde_json::from_str("\"NotACategory\"").unwrap();
        assert_eq!(back, Category::Unknown);
    }

    #[test]
    fn test_sort_type_parse() {
        assert_eq!("name".parse::<SortType>().unwrap(), SortType::PackName);
        assert_eq!("created".parse::<SortType>().unwrap(), SortType::CreationDate);
        assert_eq!("modified".parse::<SortType>().unwrap(), SortType::ModificationDate);
        assert!("size".parse::<SortType>().is_err());
    }

    #[test]
    fn test_primary_object_is_lowest_path() {
        let mut meta = sample();
        meta.objects_in_pack.insert("/Game/Vault/AAA".to_string());
        assert_eq!(meta.primary_object().unwrap(), "/Game/Vault/AAA");
    }
}
