//! Import metadata store
//!
//! A small JSON-file-backed table recording which source paths were imported
//! under which import identifier, per destination database, plus the
//! per-database rolling flag. The orchestrator writes it after every run;
//! callers read it back to verify what contributed to which destination
//! rows. This is provenance only, not an analytic store.

use crate::services::import::{BucketResult, ImportId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Name of this tool's own metadata database; reserved like the system ones.
pub const META_DATABASE: &str = "zingest_meta";

const RESERVED_NAMES: [&str; 4] = ["default", "system", "information_schema", META_DATABASE];

/// Boundary rule for destination database names: lowercase alphanumeric plus
/// underscore, must not start with a digit or underscore, must not end with
/// an underscore, no hyphens, no reserved names.
pub fn validate_database_name(name: &str) -> Result<()> {
    let fail = |reason: &str| {
        Err(Error::InvalidInput(format!(
            "invalid database name {name:?}: {reason}"
        )))
    };

    if name.is_empty() {
        return fail("empty");
    }
    if RESERVED_NAMES.contains(&name) {
        return fail("reserved");
    }

    let bytes = name.as_bytes();
    if bytes[0].is_ascii_digit() || bytes[0] == b'_' {
        return fail("must not start with a digit or underscore");
    }
    if bytes[bytes.len() - 1] == b'_' {
        return fail("must not end with an underscore");
    }
    for &b in bytes {
        if !(b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_') {
            return fail("only lowercase alphanumeric and underscore allowed");
        }
    }

    Ok(())
}

/// Per-database record. The rolling flag is set once at creation and read
/// thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseMeta {
    pub rolling: bool,
    pub created_at: String, // RFC3339
}

/// One import transaction's provenance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportEntry {
    pub import_id: String, // hex
    pub database: String,
    pub day: usize,
    pub hour: usize,
    pub paths: Vec<String>,
    pub records: u64,
    pub recorded_at: String, // RFC3339
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metastore {
    pub databases: BTreeMap<String, DatabaseMeta>,
    pub imports: Vec<ImportEntry>,
}

impl Metastore {
    /// Load from `path`; a missing file is an empty store.
    pub fn load(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, contents)
    }

    /// Create the database record if absent, validating the name. Returns
    /// the effective rolling flag; an existing database keeps the flag it
    /// was created with.
    pub fn ensure_database(&mut self, name: &str, rolling: bool) -> Result<bool> {
        validate_database_name(name)?;

        if let Some(existing) = self.databases.get(name) {
            if existing.rolling != rolling {
                log::warn!(
                    "database {name} already exists with rolling={}, ignoring requested rolling={rolling}",
                    existing.rolling
                );
            }
            return Ok(existing.rolling);
        }

        self.databases.insert(
            name.to_string(),
            DatabaseMeta {
                rolling,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        Ok(rolling)
    }

    /// Rolling flag for an existing database.
    #[must_use]
    pub fn rolling(&self, name: &str) -> Option<bool> {
        self.databases.get(name).map(|db| db.rolling)
    }

    /// Record one finished bucket transaction.
    pub fn record_import(&mut self, database: &str, result: &BucketResult) {
        self.imports.push(ImportEntry {
            import_id: result.import_id.to_hex(),
            database: database.to_string(),
            day: result.day,
            hour: result.hour,
            paths: result.paths.clone(),
            records: result.records,
            recorded_at: chrono::Utc::now().to_rfc3339(),
        });
    }

    /// Source paths imported under `import_id` (hex) into `database`.
    ///
    /// Malformed hex is rejected; an unknown id yields the empty set.
    pub fn paths_for_import(&self, import_id: &str, database: &str) -> Result<Vec<String>> {
        let id = ImportId::from_hex(import_id)?;
        let hex = id.to_hex();

        let mut paths: Vec<String> = self
            .imports
            .iter()
            .filter(|entry| entry.import_id == hex && entry.database == database)
            .flat_map(|entry| entry.paths.iter().cloned())
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}
