//! Logical-duplicate resolution for recompressed rotations
//!
//! A plain-text rotation that was later gzipped shows up twice: `x.log` and
//! `x.log.gz` at the same path prefix. Both represent the same rotation, so
//! only one may reach classification. The resolver keeps the strictly newer
//! file by modification time and records the loser as a skipped duplicate.
//! Equal modification times keep whichever candidate came first in walk
//! order; walk order is lexicographic, so the outcome is reproducible.
//!
//! Bookkeeping is scoped to one walk invocation: a map from base path (the
//! full path minus the compression suffix) to the currently kept candidate.

use crate::models::{LogFile, WalkError, WalkErrorKind};
use std::collections::HashMap;
use std::path::PathBuf;

pub struct DuplicateResolver {
    kept: HashMap<PathBuf, LogFile>,
    // base paths in first-seen order, so survivors come out deterministically
    order: Vec<PathBuf>,
}

impl DuplicateResolver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            kept: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Offer the next file in walk order. Returns the walk error for the
    /// candidate that lost, if this file collided with an earlier one.
    pub fn offer(&mut self, file: LogFile) -> Option<WalkError> {
        let base = base_path(&file.path);

        match self.kept.get_mut(&base) {
            None => {
                self.order.push(base.clone());
                self.kept.insert(base, file);
                None
            }
            Some(current) => {
                // strictly newer replaces; ties keep the first-seen candidate
                if file.modified > current.modified {
                    let loser = std::mem::replace(current, file);
                    log::debug!(
                        "skipping duplicate log {} (older than {})",
                        loser.path.display(),
                        current.path.display()
                    );
                    Some(WalkError::new(
                        loser.path.to_string_lossy(),
                        WalkErrorKind::SkippedDuplicateLog,
                    ))
                } else {
                    log::debug!(
                        "skipping duplicate log {} (not newer than {})",
                        file.path.display(),
                        current.path.display()
                    );
                    Some(WalkError::new(
                        file.path.to_string_lossy(),
                        WalkErrorKind::SkippedDuplicateLog,
                    ))
                }
            }
        }
    }

    /// Surviving files in first-seen base-path order.
    #[must_use]
    pub fn into_survivors(mut self) -> Vec<LogFile> {
        self.order
            .iter()
            .filter_map(|base| self.kept.remove(base))
            .collect()
    }
}

impl Default for DuplicateResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Full path with the compression suffix of a `.log.gz` name removed, so
/// `x.log` and `x.log.gz` collide. Only the `.log.gz` form pairs; other
/// `.gz` files are not rotations of anything.
fn base_path(path: &std::path::Path) -> PathBuf {
    let s = path.as_os_str().to_string_lossy();
    match s.strip_suffix(".log.gz") {
        Some(stem) => PathBuf::from(format!("{stem}.log")),
        None => path.to_path_buf(),
    }
}
