#![cfg(unix)]

mod common;

use common::{publish_fixture, TestEnv};

#[test]
fn test_list_shows_published_packs() {
    let env = TestEnv::new();
    env.init();
    env.install_fake_pak();
    publish_fixture(&env, "OakTrees");
    publish_fixture(&env, "BirchTrees");

    let result = env.run(&["list"]);
    assert!(result.success, "{}", result.stderr);
    assert!(result.stdout.contains("OakTrees"));
    assert!(result.stdout.contains("BirchTrees"));
    assert!(result.stdout.contains("2 of 2 packs in library"));
}

#[test]
fn test_list_sorts_by_name_by_default() {
    let env = TestEnv::new();
    env.init();
    env.install_fake_pak();
    publish_fixture(&env, "OakTrees");
    publish_fixture(&env, "BirchTrees");

    let result = env.run(&["list"]);
    let birch = result.stdout.find("BirchTrees").unwrap();
    let oak = result.stdout.find("OakTrees").unwrap();
    assert!(birch < oak);

    let reversed = env.run(&["list", "--reverse"]);
    let birch = reversed.stdout.find("BirchTrees").unwrap();
    let oak = reversed.stdout.find("OakTrees").unwrap();
    assert!(oak < birch);
}

#[test]
fn test_list_filters_by_tag() {
    let env = TestEnv::new();
    env.init();
    env.install_fake_pak();
    publish_fixture(&env, "OakTrees");

    let result = env.run(&["list", "--tag", "Tree"]);
    assert!(result.stdout.contains("OakTrees"));
    assert!(result.stdout.contains("1 of 1 packs"));

    let result = env.run(&["list", "--tag", "Weapon"]);
    assert!(!result.stdout.contains("OakTrees"));
    assert!(result.stdout.contains("0 of 1 packs"));
}

#[test]
fn test_list_search_matches_description() {
    let env = TestEnv::new();
    env.init();
    env.install_fake_pak();
    publish_fixture(&env, "OakTrees");

    let result = env.run(&["list", "--search", "lods"]);
    assert!(result.stdout.contains("OakTrees"));

    let result = env.run(&["list", "--search", "granite boulders", "--strict"]);
    assert!(!result.stdout.contains("OakTrees"));
}

#[test]
fn test_list_json_is_full_metadata() {
    let env = TestEnv::new();
    env.init();
    env.install_fake_pak();
    publish_fixture(&env, "OakTrees");

    let result = env.run(&["list", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(result.stdout.trim()).unwrap();
    let records = parsed.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["PackName"], "OakTrees");
    assert_eq!(records[0]["Category"], "Environment");
    assert_eq!(records[0]["HierarchyBadness"], 0);
}

#[test]
fn test_list_empty_library() {
    let env = TestEnv::new();
    env.init();

    let result = env.run(&["list"]);
    assert!(result.success);
    assert!(result.stdout.contains("0 of 0 packs in library"));
}

#[test]
fn test_list_skips_malformed_documents() {
    let env = TestEnv::new();
    env.init();
    env.install_fake_pak();
    publish_fixture(&env, "OakTrees");
    std::fs::write(env.library_root().join("broken.meta"), "{ nope").unwrap();

    let result = env.run(&["list"]);
    assert!(result.success);
    assert!(result.stdout.contains("1 of 1 packs"));
}
