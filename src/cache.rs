//! Local staging of network-hosted installers
//!
//! Installers launched straight off a network share are prone to mid-run
//! path failures, so network sources are copied to a local cache directory
//! first. A cached copy younger than the freshness window is reused.
//! Missing network paths are retried against a fixed list of alternate
//! share locations built from the installer's base name.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::Credential;
use crate::error::{Result, SilentPushError};
use crate::netshare;
use crate::reporter::Reporter;

/// Cache directory name under the system temp directory.
pub const CACHE_DIR_NAME: &str = "installers_cache";

/// Cached copies older than this are refreshed.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(3600);

/// Alternate share sub-paths probed (in order) when the primary network
/// path is missing. Relative to the source path's own server root.
const ALTERNATE_SHARE_DIRS: &[&str] = &[
    r"applications",
    r"d",
    r"applications\Polichequeos",
    r"applications\Polichequeos\installer",
    r"applications\Polichequeos\latest",
];

/// Local installer cache rooted at a directory.
pub struct InstallerCache {
    root: PathBuf,
    max_age: Duration,
}

impl InstallerCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_age: FRESHNESS_WINDOW,
        }
    }

    /// Cache under `<temp>/installers_cache`.
    pub fn in_temp() -> Self {
        Self::new(std::env::temp_dir().join(CACHE_DIR_NAME))
    }

    #[cfg(test)]
    fn with_max_age(root: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            root: root.into(),
            max_age,
        }
    }

    /// Ensure a local copy of `source` exists and return its path.
    ///
    /// Local paths are returned unchanged. Network paths are resolved
    /// (with alternate-location probing) and staged into the cache;
    /// `NotFound` means no candidate path was reachable.
    pub fn localize(
        &self,
        source: &str,
        domain: Option<&Credential>,
        reporter: &dyn Reporter,
    ) -> Result<PathBuf> {
        if !netshare::is_unc_path(source) {
            return Ok(PathBuf::from(source));
        }

        let resolved = resolve_network_source(source, reporter)?;
        self.stage(&resolved, domain, reporter)
    }

    /// Copy `source` into the cache, honoring the freshness window.
    ///
    /// A direct copy that hits a permission error is retried once through
    /// an authenticated share mapping.
    fn stage(
        &self,
        source: &Path,
        domain: Option<&Credential>,
        reporter: &dyn Reporter,
    ) -> Result<PathBuf> {
        let base_name = source
            .file_name()
            .ok_or_else(|| SilentPushError::NotFound {
                path: source.display().to_string(),
            })?;
        let dest = self.root.join(base_name);

        if is_fresh(&dest, self.max_age) {
            reporter.report_status(&format!(
                "Using cached copy of {}",
                base_name.to_string_lossy()
            ));
            return Ok(dest);
        }

        fs::create_dir_all(&self.root)?;
        reporter.report_status(&format!(
            "Staging {} to local cache",
            base_name.to_string_lossy()
        ));

        match fs::copy(source, &dest) {
            Ok(_) => Ok(dunce::simplified(&dest).to_path_buf()),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                self.stage_via_mapped_share(source, &dest, domain, reporter)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SilentPushError::NotFound {
                    path: source.display().to_string(),
                })
            }
            Err(e) => Err(SilentPushError::CopyFailed {
                path: source.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn stage_via_mapped_share(
        &self,
        source: &Path,
        dest: &Path,
        domain: Option<&Credential>,
        reporter: &dyn Reporter,
    ) -> Result<PathBuf> {
        reporter.report_status("Access denied, mapping network share with domain credentials");

        let Some(credential) = domain else {
            return Err(SilentPushError::CopyFailed {
                path: source.display().to_string(),
                reason: "access denied and no domain credential available".to_string(),
            });
        };

        let mapped = match netshare::map_share(&source.to_string_lossy(), credential) {
            Ok(mapped) => mapped,
            Err(e) => {
                // Soft failure: report and degrade to CopyFailed so the
                // caller can continue with its best-known path.
                reporter.report_status(&e.to_string());
                return Err(SilentPushError::CopyFailed {
                    path: source.display().to_string(),
                    reason: "share mapping failed".to_string(),
                });
            }
        };

        fs::copy(&mapped, dest).map_err(|e| SilentPushError::CopyFailed {
            path: source.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(dunce::simplified(dest).to_path_buf())
    }
}

/// Resolve a missing network path against the alternate share locations.
fn resolve_network_source(source: &str, reporter: &dyn Reporter) -> Result<PathBuf> {
    let source_path = PathBuf::from(source);
    if source_path.exists() {
        return Ok(source_path);
    }

    let Some((server, _, _)) = netshare::parse_unc(source) else {
        return Err(SilentPushError::NotFound {
            path: source.to_string(),
        });
    };
    let Some(base_name) = source_path.file_name() else {
        return Err(SilentPushError::NotFound {
            path: source.to_string(),
        });
    };

    for candidate in alternate_candidates(&server, &base_name.to_string_lossy()) {
        if candidate.exists() {
            reporter.report_status(&format!(
                "Found installer at alternate location: {}",
                candidate.display()
            ));
            return Ok(candidate);
        }
    }

    Err(SilentPushError::NotFound {
        path: source.to_string(),
    })
}

/// The ordered alternate locations probed for an installer base name.
fn alternate_candidates(server: &str, base_name: &str) -> Vec<PathBuf> {
    ALTERNATE_SHARE_DIRS
        .iter()
        .map(|share_dir| PathBuf::from(format!(r"\\{server}\{share_dir}\{base_name}")))
        .collect()
}

fn is_fresh(path: &Path, max_age: Duration) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    modified
        .elapsed()
        .map(|age| age < max_age)
        .unwrap_or(false)
}
