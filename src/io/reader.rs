//! Line-oriented log reading for plain and gzip-compressed files
//!
//! Zeek writes conn.log in two wire shapes: one JSON object per line, or
//! tab-separated columns under a `#fields` header. [`ConnReader`] decodes
//! both; the TSV path is driven by the header, so column order and subset
//! are whatever the sensor emitted.

use crate::models::conn::ConnRecord;
use flate2::read::MultiGzDecoder;
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

/// Open a log file as a buffered line reader, transparently decompressing
/// `.gz` files.
pub fn open_log_lines(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;

    let is_gzip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));

    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Iterates decoded connection records from one log file.
///
/// Blank lines and `#`-prefixed metadata lines are skipped, except that a
/// `#fields` line arms the TSV decoder for the data lines that follow.
/// Lines opening with `{` decode as JSON regardless. Decode failures are
/// yielded per line; whether to skip the line or abort the file is the
/// caller's policy. Every record is stamped with the source path.
pub struct ConnReader {
    lines: Lines<Box<dyn BufRead + Send>>,
    path: String,
    fields: Option<Vec<String>>,
}

impl ConnReader {
    pub fn open(path: &Path) -> io::Result<Self> {
        let reader = open_log_lines(path)?;
        Ok(Self {
            lines: reader.lines(),
            path: path.to_string_lossy().into_owned(),
            fields: None,
        })
    }

    fn decode_tsv(&self, line: &str) -> io::Result<ConnRecord> {
        let Some(fields) = &self.fields else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "tab-separated line before any #fields header",
            ));
        };

        let mut object = Map::new();
        for (field, raw) in fields.iter().zip(line.split('\t')) {
            // zeek's unset and empty markers; absent columns take defaults
            if raw == "-" || raw == "(empty)" || raw.is_empty() {
                continue;
            }
            object.insert(field.clone(), tsv_value(field, raw));
        }

        serde_json::from_value(Value::Object(object))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Coerce one TSV column into the JSON shape its field deserializes from.
fn tsv_value(field: &str, raw: &str) -> Value {
    match field {
        "local_orig" | "local_resp" => Value::Bool(raw == "T"),
        // set-valued column, comma is zeek's set separator
        "tunnel_parents" => Value::Array(
            raw.split(',')
                .map(|s| Value::String(s.to_owned()))
                .collect(),
        ),
        _ => {
            if let Ok(n) = raw.parse::<i64>() {
                Value::Number(n.into())
            } else if let Ok(f) = raw.parse::<f64>()
                && let Some(n) = Number::from_f64(f)
            {
                Value::Number(n)
            } else {
                Value::String(raw.to_owned())
            }
        }
    }
}

impl Iterator for ConnReader {
    type Item = io::Result<ConnRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix('#') {
                if let Some(names) = rest.strip_prefix("fields") {
                    self.fields = Some(
                        names
                            .split('\t')
                            .filter(|name| !name.is_empty())
                            .map(str::to_owned)
                            .collect(),
                    );
                }
                continue;
            }

            let decoded = if trimmed.starts_with('{') {
                serde_json::from_str::<ConnRecord>(trimmed)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            } else {
                self.decode_tsv(trimmed)
            };

            return Some(decoded.map(|mut record| {
                record.set_log_path(self.path.clone());
                record
            }));
        }
    }
}
