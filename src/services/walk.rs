//! Deterministic enumeration of candidate log files
//!
//! The walk visits regular files in lexicographic path order, so day/hour
//! discovery order, and therefore manifest ordering, is reproducible across
//! runs on an unchanged tree. The root may be a directory or a single file.
//! Directory entries themselves are never classified; symlinks are never
//! followed.
//!
//! Unreadable files are recorded as walk errors and the scan continues. The
//! only fatal condition here is a root whose subtree contains no regular
//! files at all.

use crate::models::{LogFile, WalkError, WalkErrorKind};
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Enumerate every readable regular file beneath `root`.
///
/// Files that fail the read-permission probe are pushed onto `errors` and
/// excluded from the returned list. Returns [`Error::DirIsEmpty`] when the
/// subtree holds no regular files whatsoever, readable or not.
pub fn collect_files(root: &Path, errors: &mut Vec<WalkError>) -> Result<Vec<LogFile>> {
    let metadata = fs::symlink_metadata(root)?;

    let mut files = Vec::new();
    let mut seen: u64 = 0;

    if metadata.is_file() {
        // zero-deep: the root itself is the one candidate
        visit_file(root, &metadata, errors, &mut files, &mut seen);
    } else if metadata.is_dir() {
        walk_dir(root, errors, &mut files, &mut seen);
    }

    if seen == 0 {
        return Err(Error::DirIsEmpty(root.to_string_lossy().into_owned()));
    }

    log::debug!(
        "walk of {} found {} regular files ({} readable)",
        root.display(),
        seen,
        files.len()
    );

    Ok(files)
}

fn walk_dir(dir: &Path, errors: &mut Vec<WalkError>, files: &mut Vec<LogFile>, seen: &mut u64) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("cannot read directory {}: {e}", dir.display());
            errors.push(WalkError::new(
                dir.to_string_lossy(),
                WalkErrorKind::InsufficientReadPermissions,
            ));
            return;
        }
    };

    let mut children: Vec<_> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                log::warn!("error listing {}: {e}", dir.display());
                None
            }
        })
        .collect();
    children.sort();

    for child in children {
        let metadata = match fs::symlink_metadata(&child) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("cannot stat {}: {e}", child.display());
                errors.push(WalkError::new(
                    child.to_string_lossy(),
                    WalkErrorKind::InsufficientReadPermissions,
                ));
                continue;
            }
        };

        if metadata.is_file() {
            visit_file(&child, &metadata, errors, files, seen);
        } else if metadata.is_dir() {
            walk_dir(&child, errors, files, seen);
        }
        // symlinks and special files are ignored
    }
}

fn visit_file(
    path: &Path,
    metadata: &fs::Metadata,
    errors: &mut Vec<WalkError>,
    files: &mut Vec<LogFile>,
    seen: &mut u64,
) {
    *seen += 1;

    // read-permission probe; classification never touches file content, but
    // the importer will, so unreadable files are diagnosed up front
    if let Err(e) = fs::File::open(path) {
        log::warn!("cannot open {}: {e}", path.display());
        errors.push(WalkError::new(
            path.to_string_lossy(),
            WalkErrorKind::InsufficientReadPermissions,
        ));
        return;
    }

    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return,
    };

    files.push(LogFile {
        path: path.to_path_buf(),
        name,
        modified: metadata
            .modified()
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
        size_bytes: metadata.len(),
    });
}
