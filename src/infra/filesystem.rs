//! Filesystem operations
//!
//! Handles file and directory operations, including the payload tree copy
//! that honors the symlink and permission preservation flags.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Mark a file executable (mode 0755)
pub fn make_executable(path: &Path) -> Result<(), FilesystemError> {
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
        FilesystemError::WriteFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        }
    })
}

/// Copy a payload tree into `dst`
///
/// With `preserve_symlinks` the links themselves are recreated; otherwise
/// they are followed and the link target's content is copied. With
/// `preserve_permissions` file and directory modes carry over; otherwise
/// copied files end up with mode 0644.
pub fn copy_tree(
    src: &Path,
    dst: &Path,
    preserve_symlinks: bool,
    preserve_permissions: bool,
) -> Result<(), FilesystemError> {
    create_dir_all(dst)?;

    for entry in WalkDir::new(src)
        .min_depth(1)
        .follow_links(!preserve_symlinks)
        .into_iter()
        .filter_map(Result::ok)
    {
        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target = dst.join(rel);

        if preserve_symlinks && entry.path_is_symlink() {
            let link = std::fs::read_link(entry.path()).map_err(|e| FilesystemError::ReadFile {
                path: entry.path().to_path_buf(),
                error: e.to_string(),
            })?;
            std::os::unix::fs::symlink(&link, &target).map_err(|e| FilesystemError::Copy {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                error: e.to_string(),
            })?;
        } else if entry.file_type().is_dir() {
            create_dir_all(&target)?;
            if preserve_permissions {
                if let Ok(meta) = entry.metadata() {
                    let _ = std::fs::set_permissions(&target, meta.permissions());
                }
            }
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| FilesystemError::Copy {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                error: e.to_string(),
            })?;
            if !preserve_permissions {
                let _ = std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o644));
            }
        }
    }

    Ok(())
}

/// Payload size in KiB, rounded up, as the Debian Installed-Size field wants
pub fn tree_size_kib(path: &Path) -> u64 {
    let bytes: u64 = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum();
    bytes.div_ceil(1024)
}
