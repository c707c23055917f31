//! Data models for classified log files, the day/hour manifest, and walk errors

pub mod conn;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::SystemTime;

/// A regular file found during the walk, before classification.
///
/// Owned by one walk pass; discarded once the file has been classified or
/// recorded as a walk error.
#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    pub name: String,
    pub modified: SystemTime,
    pub size_bytes: u64,
}

/// The seven recognized zeek log kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Conn,
    OpenConn,
    Dns,
    Http,
    OpenHttp,
    Ssl,
    OpenSsl,
}

impl LogKind {
    /// The filename token this kind is written as.
    #[must_use]
    pub fn as_token(&self) -> &'static str {
        match self {
            LogKind::Conn => "conn",
            LogKind::OpenConn => "open_conn",
            LogKind::Dns => "dns",
            LogKind::Http => "http",
            LogKind::OpenHttp => "open_http",
            LogKind::Ssl => "ssl",
            LogKind::OpenSsl => "open_ssl",
        }
    }
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

/// File extension accepted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    Plain,
    Gzip,
}

/// Result of classifying one filename. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: LogKind,
    /// Hour parsed from the embedded hour-range segment, absent when the
    /// filename carries no such segment.
    pub hour: Option<u8>,
    pub extension: Extension,
}

impl Classification {
    /// Hour-bucket index this file belongs to. Files without an hour
    /// segment land in hour 0.
    #[must_use]
    pub fn hour_index(&self) -> usize {
        usize::from(self.hour.unwrap_or(0))
    }
}

/// One hour's worth of files, grouped by log kind.
///
/// Path lists preserve discovery order; multiple sensors contributing to the
/// same hour append to the same kind's list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourBucket {
    pub kinds: BTreeMap<LogKind, Vec<PathBuf>>,
}

impl HourBucket {
    pub fn push(&mut self, kind: LogKind, path: PathBuf) {
        self.kinds.entry(kind).or_default().push(path);
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.kinds.values().map(Vec::len).sum()
    }
}

/// One day grouping: 24 hour buckets, indices 0-23.
///
/// Empty hours are `None`, never an empty mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayBucket {
    /// Correlation key this grouping was discovered under. Internal only;
    /// not a calendar identity.
    pub key: String,
    pub hours: [Option<HourBucket>; 24],
}

impl DayBucket {
    #[must_use]
    pub fn new(key: String) -> Self {
        Self {
            key,
            hours: std::array::from_fn(|_| None),
        }
    }

    pub fn push(&mut self, hour: usize, kind: LogKind, path: PathBuf) {
        debug_assert!(hour < 24);
        self.hours[hour]
            .get_or_insert_with(HourBucket::default)
            .push(kind, path);
    }
}

/// Ordered sequence of day buckets, in first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub days: Vec<DayBucket>,
}

impl Manifest {
    /// Iterate every non-empty hour bucket as (day index, hour index, bucket).
    pub fn hour_buckets(&self) -> impl Iterator<Item = (usize, usize, &HourBucket)> {
        self.days.iter().enumerate().flat_map(|(day_idx, day)| {
            day.hours
                .iter()
                .enumerate()
                .filter_map(move |(hour_idx, hour)| {
                    hour.as_ref().map(|bucket| (day_idx, hour_idx, bucket))
                })
        })
    }

    /// Total number of files placed in the manifest.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.hour_buckets()
            .map(|(_, _, bucket)| bucket.file_count())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hour_buckets().next().is_none()
    }
}

/// Why a file could not be placed in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WalkErrorKind {
    IncompatibleFileExtension,
    InvalidLogType,
    InvalidLogHourFormat,
    InvalidLogHourRange,
    InsufficientReadPermissions,
    SkippedDuplicateLog,
}

impl WalkErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WalkErrorKind::IncompatibleFileExtension => "incompatible_file_extension",
            WalkErrorKind::InvalidLogType => "invalid_log_type",
            WalkErrorKind::InvalidLogHourFormat => "invalid_log_hour_format",
            WalkErrorKind::InvalidLogHourRange => "invalid_log_hour_range",
            WalkErrorKind::InsufficientReadPermissions => "insufficient_read_permissions",
            WalkErrorKind::SkippedDuplicateLog => "skipped_duplicate_log",
        }
    }
}

impl std::fmt::Display for WalkErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One per-file, non-fatal diagnostic recorded during the walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkError {
    pub path: String,
    pub kind: WalkErrorKind,
}

impl WalkError {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: WalkErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
