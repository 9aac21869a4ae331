//! Property tests for the pure cores: classifier, tag-pool merge and
//! metadata round-trips.

use std::collections::BTreeSet;

use chrono::DateTime;
use proptest::prelude::*;

use vault::hierarchy::{classify, HierarchyBadness};
use vault::models::{Category, PackMetadata};
use vault::settings::VaultSettings;

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,8}"
}

fn package_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|segs| format!("/{}", segs.join("/")))
}

proptest! {
    // Every member sharing the root's full prefix (to its folder depth)
    // classifies clean.
    #[test]
    fn compliant_closures_score_zero(
        sub in segment(),
        names in prop::collection::btree_set(segment(), 1..8),
    ) {
        let root = format!("/Game/Vault/{sub}/Root");
        let mut deps: BTreeSet<String> = names
            .iter()
            .map(|n| format!("/Game/Vault/{sub}/{n}"))
            .collect();
        deps.insert(root.clone());

        let report = classify(&root, &deps);
        prop_assert_eq!(report.badness, HierarchyBadness::Compliant);
        prop_assert!(report.offenders.is_empty());
    }

    // Moving the root out of the reserved folder while keeping the closure
    // in one top-level folder yields exactly badness 1.
    #[test]
    fn contained_closures_outside_vault_score_one(
        top in segment().prop_filter("not the reserved folder", |s| s != "Vault"),
        names in prop::collection::btree_set(segment(), 1..8),
    ) {
        let root = format!("/Game/{top}/Root");
        let mut deps: BTreeSet<String> = names
            .iter()
            .map(|n| format!("/Game/{top}/{n}"))
            .collect();
        deps.insert(root.clone());

        let report = classify(&root, &deps);
        prop_assert_eq!(report.badness, HierarchyBadness::OutsideVault);
    }

    // The classifier is a pure function: deterministic, bounded score,
    // offenders always drawn from the input closure, and a clean score
    // never carries offenders.
    #[test]
    fn classifier_is_deterministic_and_bounded(
        root in package_path(),
        deps in prop::collection::btree_set(package_path(), 0..10),
    ) {
        let first = classify(&root, &deps);
        let second = classify(&root, &deps);
        prop_assert_eq!(&first, &second);

        prop_assert!(first.badness.score() <= 4);
        prop_assert!(first.offenders.is_subset(&deps));
        if first.badness == HierarchyBadness::Compliant {
            prop_assert!(first.offenders.is_empty());
        }
    }

    // Tag-pool merge is a set union: idempotent and order-independent.
    #[test]
    fn tag_merge_is_idempotent(
        tags in prop::collection::btree_set("[A-Za-z][A-Za-z0-9 ]{0,12}", 1..10),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let settings = VaultSettings::at(dir.path());

        let once = settings.merge_tags(&tags).unwrap();
        let twice = settings.merge_tags(&tags).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(&once, &settings.read_tags());

        let reversed: BTreeSet<String> = tags.iter().rev().cloned().collect();
        let again = settings.merge_tags(&reversed).unwrap();
        prop_assert_eq!(&once, &again);
    }

    // Metadata serialization is lossless for every field combination,
    // including empty tag and object sets.
    #[test]
    fn metadata_roundtrips_exactly(
        author in any::<String>(),
        pack_name in any::<String>(),
        file_id in any::<String>(),
        description in any::<String>(),
        tags in prop::collection::btree_set(any::<String>(), 0..5),
        objects in prop::collection::btree_set(any::<String>(), 0..5),
        machine_id in any::<String>(),
        badness in 0u8..=4,
        created_secs in 0i64..4_000_000_000,
        modified_secs in 0i64..4_000_000_000,
        category_index in 0usize..Category::ALL.len(),
    ) {
        let meta = PackMetadata {
            author,
            pack_name,
            file_id,
            description,
            tags,
            category: Category::ALL[category_index],
            creation_date: DateTime::from_timestamp(created_secs, 0).unwrap(),
            last_modified: DateTime::from_timestamp(modified_secs, 123_456_789).unwrap(),
            machine_id,
            hierarchy_badness: badness,
            objects_in_pack: objects,
        };

        let json = serde_json::to_string(&meta).unwrap();
        let back: PackMetadata = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(meta, back);
    }
}
