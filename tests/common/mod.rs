//! Common test utilities for Vault CLI tests.
//!
//! Provides `TestEnv`: an isolated environment with temp directories for
//! both the home (settings + library) and a project, plus helpers to run
//! the vault binary and to stand up a fake pack tool.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use vault::hierarchy::RegistrySnapshot;
use vault::settings::VaultSettings;

/// Result of running a vault CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    #[allow(dead_code)]
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated test environment with temp directories.
pub struct TestEnv {
    pub home: TempDir,
    pub project: TempDir,
    vault_bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().expect("create temp home"),
            project: TempDir::new().expect("create temp project"),
            vault_bin: PathBuf::from(env!("CARGO_BIN_EXE_vault")),
        }
    }

    /// Settings accessor anchored the same way the binary resolves it.
    pub fn settings(&self) -> VaultSettings {
        VaultSettings::at(self.home.path().join("Vault"))
    }

    /// Library root as configured by `vault init` defaults.
    pub fn library_root(&self) -> PathBuf {
        self.settings().library_root().expect("library root")
    }

    /// Run `vault init` and make the library root reachable.
    pub fn init(&self) {
        let result = self.run(&["init"]);
        assert!(result.success, "init failed: {}", result.stderr);
        std::fs::create_dir_all(self.library_root()).expect("create library root");
    }

    /// Install a fake pack tool into the local settings. The script creates
    /// the archive on `-create` and drops a marker file on `-extract`.
    #[cfg(unix)]
    pub fn install_fake_pak(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = self.home.path().join("fakepak.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             case \"$2\" in\n\
               -create=*) touch \"$1\" ;;\n\
               -extract=*) mkdir -p \"${2#-extract=}\" && touch \"${2#-extract=}/extracted.marker\" ;;\n\
             esac\n",
        )
        .expect("write fake pak script");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake pak script");

        let settings = self.settings();
        let mut local = settings.load_local();
        local.pack_tool_path = Some(script.clone());
        local.package_list_storage_path = self.home.path().join("lists");
        std::fs::create_dir_all(&local.package_list_storage_path).expect("create lists dir");
        settings.save_local(&local).expect("save local settings");
        script
    }

    /// Write a registry snapshot into the project root under the default
    /// filename the CLI looks for.
    pub fn write_registry(&self, registry: &RegistrySnapshot) -> PathBuf {
        let path = self.project.path().join("VaultRegistry.json");
        let json = serde_json::to_string_pretty(registry).expect("serialize registry");
        std::fs::write(&path, json).expect("write registry");
        path
    }

    /// A two-asset registry rooted at a compliant Vault location, with
    /// resolvable source files.
    pub fn compliant_registry(&self) -> RegistrySnapshot {
        let content = self.project.path().join("SourceContent");
        std::fs::create_dir_all(&content).expect("create source content");
        let oak = content.join("Oak_A.uasset");
        let bark = content.join("M_Bark.uasset");
        std::fs::write(&oak, "bin").unwrap();
        std::fs::write(&bark, "bin").unwrap();

        let mut registry = RegistrySnapshot::default();
        registry.insert(
            "/Game/Vault/OakTrees/Oak_A",
            &["/Game/Vault/OakTrees/Materials/M_Bark", "/Script/Engine.StaticMesh"],
            Some(oak),
        );
        registry.insert("/Game/Vault/OakTrees/Materials/M_Bark", &[], Some(bark));
        registry
    }

    /// Run vault from the project directory.
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_from(self.project.path(), args)
    }

    pub fn run_from(&self, cwd: &Path, args: &[&str]) -> TestResult {
        let output = Command::new(&self.vault_bin)
            .current_dir(cwd)
            .args(args)
            .env("HOME", self.home.path())
            .env("USERPROFILE", self.home.path())
            .output()
            .expect("failed to execute vault");
        self.output_to_result(output)
    }

    fn output_to_result(&self, output: Output) -> TestResult {
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Publish the fixture pack with the given name, asserting success.
#[cfg(unix)]
#[allow(dead_code)]
pub fn publish_fixture(env: &TestEnv, pack_name: &str) -> TestResult {
    let registry = env.compliant_registry();
    env.write_registry(&registry);
    let result = env.run(&[
        "publish",
        "/Game/Vault/OakTrees/Oak_A",
        "--name",
        pack_name,
        "--description",
        "Oak trees with LODs",
        "--tags",
        "Tree,Environment",
        "--category",
        "Environment",
        "--yes",
    ]);
    assert!(result.success, "publish failed: {}", result.combined_output());
    result
}
