//! Day/hour manifest assembly
//!
//! Classified survivors arrive in walk order and are assigned to a day
//! bucket by the date-shaped components of their parent-directory lineage.
//! Sensor directories and hour-range directories never contribute to the
//! key, so multiple sensors feeding the same day share one bucket while
//! distinct day directories split, under either sensor-then-day or
//! day-then-sensor nesting. Flat trees share the single empty key.
//!
//! Day indices follow discovery order, not calendar order; the key is an
//! internal correlation handle, never a calendar identity.

use crate::models::{Classification, DayBucket, Manifest};
use std::collections::HashMap;
use std::path::Path;

/// Accumulates (path, classification) pairs into a [`Manifest`].
///
/// Scoped to one walk invocation, like the duplicate resolver.
pub struct ManifestBuilder {
    manifest: Manifest,
    // day key -> index into manifest.days, in first-seen order
    day_index: HashMap<String, usize>,
}

impl ManifestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            manifest: Manifest::default(),
            day_index: HashMap::new(),
        }
    }

    /// Place one classified file into its (day, hour, kind) slot.
    pub fn place(&mut self, path: &Path, classification: &Classification) {
        let key = day_key(path);
        let day_idx = match self.day_index.get(&key) {
            Some(idx) => *idx,
            None => {
                let idx = self.manifest.days.len();
                log::debug!("day bucket {idx} <- key {key:?}");
                self.manifest.days.push(DayBucket::new(key.clone()));
                self.day_index.insert(key, idx);
                idx
            }
        };

        self.manifest.days[day_idx].push(
            classification.hour_index(),
            classification.kind,
            path.to_path_buf(),
        );
    }

    #[must_use]
    pub fn finish(self) -> Manifest {
        self.manifest
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Day-grouping key for a file: the date-shaped components of its parent
/// lineage, joined with `/`.
///
/// The shape check (`NNNN-NN-NN`) only detects day directories; the value is
/// never parsed as a calendar date or sorted.
fn day_key(path: &Path) -> String {
    let Some(parent) = path.parent() else {
        return String::new();
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in parent.components() {
        if let Some(name) = component.as_os_str().to_str()
            && is_date_shaped(name)
        {
            parts.push(name);
        }
    }
    parts.join("/")
}

fn is_date_shaped(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit())
}
