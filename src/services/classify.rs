//! Filename classification: kind token, optional hour segment, extension
//!
//! Sensor deployments name their logs `kind[_color][.HH:MM:SS-HH:MM:SS].log[.gz]`.
//! The grammar is evaluated in three stages, each with its own typed failure,
//! so error attribution stays exact:
//!
//! 1. extension (`.log` / `.log.gz`)
//! 2. optional embedded hour-range segment
//! 3. kind token, with an ignored `_color` suffix
//!
//! Classification is a pure function of the filename; the same name always
//! yields the same result.

use crate::models::{Classification, Extension, LogKind, WalkErrorKind};

/// Typed failure for exactly one grammar stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyError {
    IncompatibleFileExtension,
    InvalidLogHourFormat,
    InvalidLogHourRange,
    InvalidLogType,
}

impl ClassifyError {
    #[must_use]
    pub fn walk_error_kind(&self) -> WalkErrorKind {
        match self {
            ClassifyError::IncompatibleFileExtension => WalkErrorKind::IncompatibleFileExtension,
            ClassifyError::InvalidLogHourFormat => WalkErrorKind::InvalidLogHourFormat,
            ClassifyError::InvalidLogHourRange => WalkErrorKind::InvalidLogHourRange,
            ClassifyError::InvalidLogType => WalkErrorKind::InvalidLogType,
        }
    }
}

impl std::fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ClassifyError::IncompatibleFileExtension => "incompatible file extension",
            ClassifyError::InvalidLogHourFormat => "invalid log hour format",
            ClassifyError::InvalidLogHourRange => "log hour out of range",
            ClassifyError::InvalidLogType => "invalid log type",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ClassifyError {}

/// Immutable table of recognized kind tokens.
///
/// Injected into the classifier at construction so alternative tables (e.g.
/// future log kinds) can coexist in tests; there is no global state.
#[derive(Debug, Clone)]
pub struct KindTable {
    kinds: Vec<LogKind>,
}

impl KindTable {
    /// The seven kinds the importer understands.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            kinds: vec![
                LogKind::Conn,
                LogKind::OpenConn,
                LogKind::Dns,
                LogKind::Http,
                LogKind::OpenHttp,
                LogKind::Ssl,
                LogKind::OpenSsl,
            ],
        }
    }

    #[must_use]
    pub fn with_kinds(kinds: Vec<LogKind>) -> Self {
        Self { kinds }
    }

    /// Match a leading token, tolerating an `_color` suffix after the kind.
    ///
    /// Longest token wins so `open_conn` is never mistaken for `conn` with a
    /// color suffix, and unsupported zeek logs that share a recognized
    /// prefix (`conn_summary`) never pass as the shorter kind.
    fn match_token(&self, token: &str) -> Option<LogKind> {
        let mut best: Option<LogKind> = None;
        for kind in &self.kinds {
            let prefix = kind.as_token();
            if prefix_matches(token, prefix)
                && best.is_none_or(|b| prefix.len() > b.as_token().len())
            {
                best = Some(*kind);
            }
        }

        let shadowed = best.is_some_and(|kind| {
            UNSUPPORTED_PREFIXED.iter().any(|name| {
                name.len() > kind.as_token().len() && prefix_matches(token, name)
            })
        });
        if shadowed { None } else { best }
    }
}

/// Zeek log names that begin with a recognized kind token but are a
/// different log entirely. A longer match here overrides the kind match, so
/// `conn_summary` is an invalid type rather than conn with a color
/// "summary".
const UNSUPPORTED_PREFIXED: &[&str] = &["conn_summary"];

/// Whether `token` is `prefix` itself or `prefix` followed by an `_`-joined
/// suffix.
fn prefix_matches(token: &str, prefix: &str) -> bool {
    token == prefix
        || (token.len() > prefix.len() + 1
            && token.starts_with(prefix)
            && token.as_bytes()[prefix.len()] == b'_')
}

/// Classifies one filename (not a full path) into a [`Classification`].
#[derive(Debug, Clone)]
pub struct Classifier {
    table: KindTable,
}

impl Classifier {
    #[must_use]
    pub fn new(table: KindTable) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::new(KindTable::standard())
    }

    /// Run the three grammar stages over `name`.
    pub fn classify(&self, name: &str) -> Result<Classification, ClassifyError> {
        let (stem, extension) = strip_extension(name)?;
        let (token, hour) = split_hour_segment(stem)?;
        let kind = self
            .table
            .match_token(token)
            .ok_or(ClassifyError::InvalidLogType)?;

        Ok(Classification {
            kind,
            hour,
            extension,
        })
    }
}

/// Stage 1: the name must end in `.log` or `.log.gz`.
fn strip_extension(name: &str) -> Result<(&str, Extension), ClassifyError> {
    if let Some(stem) = name.strip_suffix(".log.gz") {
        Ok((stem, Extension::Gzip))
    } else if let Some(stem) = name.strip_suffix(".log") {
        Ok((stem, Extension::Plain))
    } else {
        Err(ClassifyError::IncompatibleFileExtension)
    }
}

/// Stage 2: split an optional `HH:MM:SS-HH:MM:SS` segment off the stem.
///
/// Absence of a segment is valid; a segment that is present but malformed is
/// `InvalidLogHourFormat`, and a well-formed one with an hour of 24 or more
/// is `InvalidLogHourRange`.
fn split_hour_segment(stem: &str) -> Result<(&str, Option<u8>), ClassifyError> {
    match stem.split_once('.') {
        None => Ok((stem, None)),
        Some((token, segment)) => {
            let hour = parse_hour_range(segment)?;
            Ok((token, Some(hour)))
        }
    }
}

/// Validate `HH:MM:SS-HH:MM:SS` and return the start hour.
fn parse_hour_range(segment: &str) -> Result<u8, ClassifyError> {
    let bytes = segment.as_bytes();
    if bytes.len() != 17 {
        return Err(ClassifyError::InvalidLogHourFormat);
    }

    // exact separator layout: colons at 2,5,11,14 and a dash at 8
    for (idx, expected) in [(2, b':'), (5, b':'), (8, b'-'), (11, b':'), (14, b':')] {
        if bytes[idx] != expected {
            return Err(ClassifyError::InvalidLogHourFormat);
        }
    }

    for (idx, b) in bytes.iter().enumerate() {
        if matches!(idx, 2 | 5 | 8 | 11 | 14) {
            continue;
        }
        if !b.is_ascii_digit() {
            return Err(ClassifyError::InvalidLogHourFormat);
        }
    }

    let start_hour = two_digits(bytes[0], bytes[1]);
    let end_hour = two_digits(bytes[9], bytes[10]);
    if start_hour > 23 || end_hour > 23 {
        return Err(ClassifyError::InvalidLogHourRange);
    }

    Ok(start_hour)
}

fn two_digits(high: u8, low: u8) -> u8 {
    (high - b'0') * 10 + (low - b'0')
}
