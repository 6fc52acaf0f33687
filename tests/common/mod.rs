//! Common test utilities for SilentPush integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// A test workspace holding a catalog and fake installers
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in the workspace
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Write a catalog mapping package names to installer paths
    pub fn write_catalog(&self, packages: &[(&str, &str)]) -> PathBuf {
        let entries: Vec<serde_json::Value> = packages
            .iter()
            .map(|(name, path)| serde_json::json!({ "name": name, "path": path }))
            .collect();
        let catalog = serde_json::json!({ "packages": entries });
        self.write_file(
            "config.json",
            &serde_json::to_string_pretty(&catalog).expect("Failed to serialize catalog"),
        )
    }

    /// Create an executable fake installer script that exits with `code`
    #[cfg(unix)]
    pub fn fake_installer(&self, name: &str, code: i32) -> PathBuf {
        self.fake_installer_script(name, &format!("exit {}", code))
    }

    /// Create an executable fake installer with an arbitrary script body
    #[cfg(unix)]
    pub fn fake_installer_script(&self, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write_file(name, &format!("#!/bin/sh\n{}\n", body));
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to set installer permissions");
        path
    }

    /// Check if a file exists in the workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
    }

    #[test]
    fn test_workspace_write_catalog() {
        let workspace = TestWorkspace::new();
        workspace.write_catalog(&[("VLC", "/tmp/vlc.sh")]);
        assert!(workspace.file_exists("config.json"));
    }
}
