//! Per-bucket import orchestration
//!
//! Hour buckets are independent of each other (disjoint file sets, disjoint
//! destination time ranges), so they fan out over a bounded worker pool, one
//! import identifier and one destination transaction per non-empty bucket.
//! Identifiers are only assigned after the manifest is fully built; a walk
//! still in progress could discover a duplicate that invalidates a bucket.
//!
//! The destination itself sits behind [`BucketImporter`], so tests run
//! against an in-memory importer and the CLI against a record-counting one.

use crate::io::reader::ConnReader;
use crate::models::{HourBucket, LogKind, Manifest};
use crate::{Error, Result};
use std::io::BufRead;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Unique token for one hour bucket's import transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImportId([u8; 16]);

impl ImportId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(*Uuid::new_v4().as_bytes())
    }

    /// Wire encoding used by the metadata store.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode the wire encoding; malformed hex is an invalid-input error.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| Error::InvalidInput(format!("malformed import id {s:?}: {e}")))?;
        let bytes: [u8; 16] = bytes
            .try_into()
            .map_err(|_| Error::InvalidInput(format!("import id {s:?} is not 16 bytes")))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for ImportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// One bucket transaction handed to a worker.
#[derive(Debug, Clone)]
pub struct BucketJob {
    pub import_id: ImportId,
    pub day: usize,
    pub hour: usize,
    pub bucket: HourBucket,
}

/// Outcome of one bucket transaction.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub import_id: ImportId,
    pub day: usize,
    pub hour: usize,
    pub paths: Vec<String>,
    pub records: u64,
}

/// Destination seam: writes one hour bucket under one import identifier.
pub trait BucketImporter: Sync {
    /// Import every file in the bucket. Returns the number of records (or
    /// lines) written.
    ///
    /// Implementations poll `cancel` between files and lines and return
    /// [`std::io::ErrorKind::Interrupted`] once it is set, so an aborted run
    /// stops in-flight bucket transactions, not just queued ones.
    fn import_bucket(&self, job: &BucketJob, cancel: &AtomicBool) -> std::io::Result<u64>;
}

fn interrupted() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Interrupted, "import cancelled")
}

/// Test importer that records the jobs it was handed.
#[derive(Debug, Default)]
pub struct MemoryImporter {
    jobs: Mutex<Vec<BucketJob>>,
}

impl MemoryImporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_jobs(self) -> Vec<BucketJob> {
        self.jobs.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl BucketImporter for MemoryImporter {
    fn import_bucket(&self, job: &BucketJob, cancel: &AtomicBool) -> std::io::Result<u64> {
        if cancel.load(Ordering::SeqCst) {
            return Err(interrupted());
        }
        let files = job.bucket.file_count() as u64;
        self.jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(job.clone());
        Ok(files)
    }
}

/// Importer used by the CLI: decodes connection records and counts lines of
/// every other kind, exercising the same read path a destination writer
/// would.
#[derive(Debug, Default)]
pub struct CountingImporter;

impl BucketImporter for CountingImporter {
    fn import_bucket(&self, job: &BucketJob, cancel: &AtomicBool) -> std::io::Result<u64> {
        let mut records: u64 = 0;
        for (kind, paths) in &job.bucket.kinds {
            for path in paths {
                if cancel.load(Ordering::SeqCst) {
                    return Err(interrupted());
                }
                match kind {
                    LogKind::Conn | LogKind::OpenConn => {
                        for decoded in ConnReader::open(path)? {
                            if cancel.load(Ordering::SeqCst) {
                                return Err(interrupted());
                            }
                            match decoded {
                                Ok(_) => records += 1,
                                Err(e) => {
                                    // skip undecodable lines, keep the file
                                    log::warn!("{}: {e}", path.display());
                                }
                            }
                        }
                    }
                    _ => {
                        let reader = crate::io::reader::open_log_lines(path)?;
                        for line in reader.lines() {
                            if cancel.load(Ordering::SeqCst) {
                                return Err(interrupted());
                            }
                            let line = line?;
                            let trimmed = line.trim();
                            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                                records += 1;
                            }
                        }
                    }
                }
            }
        }
        log::info!(
            "import {} day {} hour {}: {} records",
            job.import_id,
            job.day,
            job.hour,
            records
        );
        Ok(records)
    }
}

/// Options for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Worker pool bound; matches the destination's acceptable
    /// concurrent-write level.
    pub workers: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Assign one import id per non-empty hour bucket, in manifest order.
///
/// Callers must hand in a completed manifest; this is the point after which
/// bucket transactions may begin.
#[must_use]
pub fn assign_jobs(manifest: &Manifest) -> Vec<BucketJob> {
    manifest
        .hour_buckets()
        .map(|(day, hour, bucket)| BucketJob {
            import_id: ImportId::generate(),
            day,
            hour,
            bucket: bucket.clone(),
        })
        .collect()
}

/// Run every bucket job over a bounded worker pool.
///
/// `cancel` is shared with the caller and every worker; once set,
/// not-yet-started buckets are abandoned, in-flight buckets stop at their
/// next poll, and the run fails with [`Error::Cancelled`]. Results preserve
/// manifest bucket order regardless of worker scheduling.
pub fn run_import<I: BucketImporter>(
    jobs: &[BucketJob],
    importer: &I,
    opts: &ImportOptions,
    cancel: &AtomicBool,
) -> Result<Vec<BucketResult>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.workers.max(1))
        .build()
        .map_err(|e| Error::InvalidInput(format!("cannot build worker pool: {e}")))?;

    let results: Vec<std::io::Result<Option<BucketResult>>> = pool.install(|| {
        use rayon::prelude::*;
        jobs.par_iter()
            .map(|job| {
                if cancel.load(Ordering::SeqCst) {
                    return Ok(None);
                }
                let records = match importer.import_bucket(job, cancel) {
                    Ok(records) => records,
                    // an interrupted bucket is a cancellation, not a failure
                    Err(e)
                        if e.kind() == std::io::ErrorKind::Interrupted
                            && cancel.load(Ordering::SeqCst) =>
                    {
                        return Ok(None);
                    }
                    Err(e) => return Err(e),
                };
                Ok(Some(BucketResult {
                    import_id: job.import_id,
                    day: job.day,
                    hour: job.hour,
                    paths: job
                        .bucket
                        .kinds
                        .values()
                        .flatten()
                        .map(|p| p.to_string_lossy().into_owned())
                        .collect(),
                    records,
                }))
            })
            .collect()
    });

    let mut out = Vec::with_capacity(results.len());
    for result in results {
        match result? {
            Some(res) => out.push(res),
            None => return Err(Error::Cancelled),
        }
    }
    if cancel.load(Ordering::SeqCst) {
        return Err(Error::Cancelled);
    }
    Ok(out)
}
