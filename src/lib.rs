//! Zeek Log Ingest Library
//!
//! This library turns an unconstrained directory tree of rotated,
//! optionally gzip-compressed sensor logs into a deterministic, validated
//! manifest: an ordered sequence of day buckets, each split into 24 hour
//! buckets mapping a log kind to the file paths that belong to it, plus a
//! parallel list of per-file diagnostics for anything that could not be
//! classified. The manifest feeds an import orchestrator that runs one
//! transaction per non-empty hour bucket.

pub mod cli;
pub mod io;
pub mod models;
pub mod services;

pub use models::{Classification, LogKind, Manifest, WalkError, WalkErrorKind};
pub use services::classify::{Classifier, KindTable};

use std::path::Path;
use std::result;

/// Whole-operation failures. Per-file problems are [`WalkError`]s instead;
/// they never abort the walk.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidInput(String),
    /// The root contains no regular files anywhere in its subtree.
    DirIsEmpty(String),
    /// The root contains files but none survived classification.
    NoValidFilesFound(String),
    /// The shared cancellation flag was set before the run finished.
    Cancelled,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Error::DirIsEmpty(root) => write!(f, "No log files found: {root} is empty"),
            Error::NoValidFilesFound(root) => {
                write!(f, "No valid log files found under {root}")
            }
            Error::Cancelled => write!(f, "Import cancelled"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Result of one walk: the manifest plus everything that could not be
/// placed in it.
#[derive(Debug)]
pub struct WalkSummary {
    pub root: String,
    pub manifest: Manifest,
    pub errors: Vec<WalkError>,
    pub started_at: std::time::SystemTime,
    pub finished_at: std::time::SystemTime,
}

/// Walk `root` and build the import manifest.
///
/// Control flow: enumerate candidate files in lexicographic order, resolve
/// logical duplicates (before classification, so a losing rotation only ever
/// surfaces as a skipped duplicate), classify the survivors, and bucket them
/// by day lineage and hour. Every input file ends up in exactly one of the
/// manifest or the error list.
pub fn walk_logs<P: AsRef<Path>>(root: P, classifier: &Classifier) -> Result<WalkSummary> {
    let root = root.as_ref();
    let root_display = root.to_string_lossy().into_owned();
    let started_at = std::time::SystemTime::now();

    let mut errors: Vec<WalkError> = Vec::new();
    let files = services::walk::collect_files(root, &mut errors)?;

    let mut resolver = services::dedupe::DuplicateResolver::new();
    for file in files {
        if let Some(skipped) = resolver.offer(file) {
            errors.push(skipped);
        }
    }

    let mut builder = services::bucket::ManifestBuilder::new();
    for file in resolver.into_survivors() {
        match classifier.classify(&file.name) {
            Ok(classification) => builder.place(&file.path, &classification),
            Err(e) => {
                log::debug!("{}: {e}", file.path.display());
                errors.push(WalkError::new(
                    file.path.to_string_lossy(),
                    e.walk_error_kind(),
                ));
            }
        }
    }

    let manifest = builder.finish();
    if manifest.is_empty() {
        // files existed but were entirely wrong-shaped; diagnostically
        // different from an empty tree
        return Err(Error::NoValidFilesFound(root_display));
    }

    let finished_at = std::time::SystemTime::now();

    Ok(WalkSummary {
        root: root_display,
        manifest,
        errors,
        started_at,
        finished_at,
    })
}
