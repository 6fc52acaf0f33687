//! Package catalog persistence
//!
//! The catalog is a JSON document (`config.json`) with a `packages`
//! collection of name/path pairs. Unknown top-level keys are tolerated and
//! preserved when the catalog is written back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SilentPushError};

/// Default catalog file name, looked up in the working directory.
pub const DEFAULT_CATALOG_FILE: &str = "config.json";

/// A software package known to the catalog.
///
/// Identity is `name`; `path` may be a local path or a UNC network path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub path: String,
}

/// The package catalog backed by a JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub packages: Vec<Package>,

    /// Top-level keys we do not interpret, preserved on save.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Catalog {
    /// Load the catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SilentPushError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| SilentPushError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| SilentPushError::ConfigParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load the catalog, treating a missing file as empty.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(catalog) => Ok(catalog),
            Err(SilentPushError::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Write the catalog back, keeping unknown top-level keys intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| SilentPushError::ConfigWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        fs::write(path, content).map_err(|e| SilentPushError::ConfigWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Look up a package by exact name.
    pub fn find(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Resolve a list of selected names to packages, in the given order.
    pub fn resolve_selection(&self, names: &[String]) -> Result<Vec<Package>> {
        names
            .iter()
            .map(|name| {
                self.find(name)
                    .cloned()
                    .ok_or_else(|| SilentPushError::UnknownPackage { name: name.clone() })
            })
            .collect()
    }

    /// Filter packages by a case-insensitive substring over name or path.
    /// An empty filter returns everything.
    pub fn filter(&self, pattern: &str) -> Vec<&Package> {
        let pattern = pattern.trim().to_lowercase();
        self.packages
            .iter()
            .filter(|p| {
                pattern.is_empty()
                    || p.name.to_lowercase().contains(&pattern)
                    || p.path.to_lowercase().contains(&pattern)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }
}

/// Resolve the catalog path from an optional CLI override.
pub fn catalog_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_FILE))
}
