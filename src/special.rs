//! Copy-based "special install" strategy
//!
//! Some packages are not installer executables at all but bulk file trees.
//! These are described in `special_config.json` as an ordered list of
//! entries keyed by package-name pattern; list order is significant because
//! substring matching takes the first hit. An entry either copies the whole
//! origin tree or an explicit list of subfolders, always with
//! delete-then-copy overwrite semantics, and may launch executables after
//! the copy.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::fs::replace_dir;
use crate::error::{Result, SilentPushError};
use crate::launch::{self, Identity};
use crate::reporter::Reporter;

/// Default special-install configuration file name.
pub const DEFAULT_SPECIAL_CONFIG_FILE: &str = "special_config.json";

/// Wall-clock limit for each post-copy executable.
const POST_COPY_TIMEOUT: Duration = Duration::from_secs(300);

/// How an entry deploys its files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialCopyMode {
    WholeTree,
    ExplicitFolders,
}

/// One special-install definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialEntry {
    /// Package-name pattern; exact match first, then case-insensitive
    /// substring match.
    pub name: String,
    #[serde(rename = "type")]
    pub mode: SpecialCopyMode,
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub post_copy_executables: Vec<String>,
}

/// Ordered special-install configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialConfig {
    #[serde(default)]
    pub special_installs: Vec<SpecialEntry>,
}

impl SpecialConfig {
    /// Load the configuration, treating a missing file as empty.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).map_err(|e| SilentPushError::ConfigParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        serde_json::from_str(&content).map_err(|e| SilentPushError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Find the entry for a package: exact name match first, then the
    /// first (in declaration order) case-insensitive substring match.
    pub fn find(&self, package_name: &str) -> Option<&SpecialEntry> {
        if let Some(entry) = self.special_installs.iter().find(|e| e.name == package_name) {
            return Some(entry);
        }
        let lowered = package_name.to_lowercase();
        self.special_installs
            .iter()
            .find(|e| lowered.contains(&e.name.to_lowercase()))
    }
}

/// Result contract of a special install.
#[derive(Debug, Clone)]
pub struct SpecialOutcome {
    pub success: bool,
    pub message: String,
}

impl SpecialOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Run the special-install strategy for a package, if one is configured.
///
/// Returns `None` when the package has no special configuration; the
/// caller must then use the standard installer flow.
pub fn try_special_install(
    config: &SpecialConfig,
    package_name: &str,
    reporter: &dyn Reporter,
) -> Option<SpecialOutcome> {
    let entry = config.find(package_name)?;
    Some(run_entry(entry, reporter))
}

fn run_entry(entry: &SpecialEntry, reporter: &dyn Reporter) -> SpecialOutcome {
    if !entry.source_root.exists() {
        return SpecialOutcome::fail(format!(
            "origin directory not found: {}",
            entry.source_root.display()
        ));
    }

    if let Err(e) = fs::create_dir_all(&entry.dest_root) {
        return SpecialOutcome::fail(format!(
            "could not create destination {}: {}",
            entry.dest_root.display(),
            e
        ));
    }

    let outcome = match entry.mode {
        SpecialCopyMode::WholeTree => copy_whole_tree(&entry.source_root, &entry.dest_root),
        SpecialCopyMode::ExplicitFolders => copy_explicit_folders(
            &entry.source_root,
            &entry.dest_root,
            &entry.folders,
            reporter,
        ),
    };

    if outcome.success && !entry.post_copy_executables.is_empty() {
        run_post_copy_executables(&entry.dest_root, &entry.post_copy_executables, reporter);
    }

    outcome
}

/// Copy every top-level entry of the origin into the destination.
///
/// Directories are fully replaced (old contents removed), files are
/// overwritten unconditionally.
fn copy_whole_tree(source: &Path, dest: &Path) -> SpecialOutcome {
    let entries = match fs::read_dir(source) {
        Ok(entries) => entries.flatten().collect::<Vec<_>>(),
        Err(e) => return SpecialOutcome::fail(format!("could not read origin: {}", e)),
    };

    if entries.is_empty() {
        return SpecialOutcome::fail("origin directory is empty");
    }

    let mut copied = 0usize;
    for entry in entries {
        let target = dest.join(entry.file_name());
        let result = if entry.path().is_dir() {
            replace_dir(entry.path(), &target)
        } else {
            fs::copy(entry.path(), &target).map(|_| ())
        };
        if let Err(e) = result {
            return SpecialOutcome::fail(format!(
                "copy failed for {}: {}",
                entry.path().display(),
                e
            ));
        }
        copied += 1;
    }

    SpecialOutcome::ok(format!("{} entries copied", copied))
}

/// Copy only the configured subfolders; missing origin folders are skipped
/// and reported, not fatal. The reported count is the configured count.
fn copy_explicit_folders(
    source: &Path,
    dest: &Path,
    folders: &[String],
    reporter: &dyn Reporter,
) -> SpecialOutcome {
    if folders.is_empty() {
        return SpecialOutcome::fail("no folders configured to copy");
    }

    for folder in folders {
        let origin = source.join(folder);
        if !origin.exists() {
            reporter.report_status(&format!("Folder not found, skipping: {}", origin.display()));
            continue;
        }
        if let Err(e) = replace_dir(&origin, dest.join(folder)) {
            return SpecialOutcome::fail(format!("copy failed for {}: {}", folder, e));
        }
    }

    SpecialOutcome::ok(format!("{} folders copied", folders.len()))
}

/// Launch each configured executable synchronously with a fixed timeout.
///
/// A timeout or launch error for one executable never aborts the rest or
/// the overall result; timed-out processes are killed by the launcher.
fn run_post_copy_executables(base: &Path, executables: &[String], reporter: &dyn Reporter) {
    for relative in executables {
        let path = base.join(relative);
        if !path.exists() {
            reporter.report_status(&format!("Executable not found, skipping: {}", path.display()));
            continue;
        }

        reporter.report_status(&format!("Running {}", path.display()));
        match launch::launch(&path, &[], &Identity::Current, POST_COPY_TIMEOUT) {
            Ok(outcome) => reporter.report_status(&format!(
                "{} exited with code {}",
                path.display(),
                outcome.code_or_failure()
            )),
            Err(e) => reporter.report_status(&format!("{}: {}", path.display(), e)),
        }
    }
}
