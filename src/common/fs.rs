//! Common file system operations with unified overwrite semantics

use std::fs;
use std::path::Path;

/// Copy a directory recursively, merging into the destination.
pub fn copy_dir_recursive<P1, P2>(src: P1, dst: P2) -> std::io::Result<()>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let src_ref = src.as_ref();
    let dst_ref = dst.as_ref();

    if !dst_ref.exists() {
        fs::create_dir_all(dst_ref)?;
    }

    for entry in fs::read_dir(src_ref)? {
        let entry = entry?;
        let entry_path = entry.path();
        let dst_path = dst_ref.join(entry.file_name());

        if entry_path.is_dir() {
            copy_dir_recursive(&entry_path, &dst_path)?;
        } else {
            fs::copy(&entry_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Replace the destination directory with a copy of the source.
///
/// Full overwrite: any existing destination of the same name is removed
/// first, so stale files never survive the copy (no merge).
pub fn replace_dir<P1, P2>(src: P1, dst: P2) -> std::io::Result<()>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
{
    let dst_ref = dst.as_ref();
    if dst_ref.exists() {
        fs::remove_dir_all(dst_ref)?;
    }
    copy_dir_recursive(src, dst_ref)
}
