//! External packaging tool invocation
//!
//! The archive format itself is owned by the engine's command-line pack
//! tool. Vault only shells out to it:
//!
//! - create: `<tool> <archive> -create=<fileListPath> -compress`
//! - extract: `<tool> <archive> -extract=<destDir>`
//!
//! The file list is a newline-delimited text file of quoted absolute source
//! paths, written by the publisher. Invocation is blocking and attempted
//! once; a failure is reported to the caller with no retry.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{VaultError, VaultResult};
use crate::settings::LocalSettings;

#[derive(Debug, Clone)]
pub struct PakTool {
    executable: PathBuf,
}

impl PakTool {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Resolve the tool from the local settings' `PackToolPath`.
    pub fn from_settings(local: &LocalSettings) -> VaultResult<Self> {
        match &local.pack_tool_path {
            Some(path) if !path.as_os_str().is_empty() => Ok(Self::new(path)),
            _ => Err(VaultError::PackToolNotConfigured),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Build `archive` from the file list document.
    pub fn create_archive(&self, archive: &Path, file_list: &Path) -> VaultResult<()> {
        self.run(archive, &format!("-create={}", file_list.display()), true)
    }

    /// Unpack `archive` into `destination`.
    pub fn extract_archive(&self, archive: &Path, destination: &Path) -> VaultResult<()> {
        self.run(archive, &format!("-extract={}", destination.display()), false)
    }

    fn run(&self, archive: &Path, operation: &str, compress: bool) -> VaultResult<()> {
        let mut command = Command::new(&self.executable);
        command.arg(archive).arg(operation);
        if compress {
            command.arg("-compress");
        }

        let status = command.status()?;
        if !status.success() {
            return Err(VaultError::PackToolFailed {
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
