//! Authenticated network share mapping
//!
//! When direct UNC access is denied, a share can be remounted on a fixed
//! temporary drive letter with the session's domain credential. Mapping is
//! a soft operation: failures are reported and the caller continues with
//! the original path. Teardown is idempotent and always attempted before a
//! new mapping, so at most one mapping is ever outstanding.

use std::process::{Command, Stdio};

use crate::credentials::Credential;
use crate::error::{Result, SilentPushError};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Fixed temporary drive letter used for authenticated mounts.
pub const TEMP_DRIVE: &str = "T:";

/// Whether a path is a UNC-style network path (`\\server\share\...`).
pub fn is_unc_path(path: &str) -> bool {
    path.starts_with(r"\\")
}

/// Split a UNC path into (server, share, remainder-under-share).
pub fn parse_unc(path: &str) -> Option<(String, String, String)> {
    let trimmed = path.strip_prefix(r"\\")?;
    let mut segments = trimmed.split('\\').filter(|s| !s.is_empty());
    let server = segments.next()?.to_string();
    let share = segments.next()?.to_string();
    let remainder = segments.collect::<Vec<_>>().join(r"\");
    Some((server, share, remainder))
}

/// Rewrite a path under the temporary drive letter after a mount.
fn rewrite_under_drive(remainder: &str) -> String {
    if remainder.is_empty() {
        format!(r"{}\", TEMP_DRIVE)
    } else {
        format!(r"{}\{}", TEMP_DRIVE, remainder)
    }
}

fn quiet_command(program: &str) -> Command {
    let mut command = Command::new(program);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);
    command
}

/// Tear down any existing mapping on the temporary drive letter.
///
/// Errors are ignored: there may be nothing mapped, and a stale mapping is
/// replaced by the next mount anyway.
pub fn unmap_temp_drive() {
    let _ = quiet_command("net")
        .args(["use", TEMP_DRIVE, "/delete", "/y"])
        .output();
}

/// Mount the share backing `unc_path` on the temporary drive letter using
/// the domain credential, and return the path rewritten under that drive.
pub fn map_share(unc_path: &str, credential: &Credential) -> Result<String> {
    let (server, share, remainder) =
        parse_unc(unc_path).ok_or_else(|| SilentPushError::MappingFailed {
            path: unc_path.to_string(),
            reason: "not a UNC path".to_string(),
        })?;

    // Idempotent cleanup before remapping.
    unmap_temp_drive();

    let root_share = format!(r"\\{}\{}", server, share);
    let output = quiet_command("net")
        .args([
            "use",
            TEMP_DRIVE,
            &root_share,
            &format!("/user:{}", credential.user),
            &credential.password,
            "/persistent:no",
        ])
        .output()
        .map_err(|e| SilentPushError::MappingFailed {
            path: unc_path.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(SilentPushError::MappingFailed {
            path: unc_path.to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(rewrite_under_drive(&remainder))
}
