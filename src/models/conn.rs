//! Connection record schema and flexible zeek timestamp decoding
//!
//! Zeek writes `ts` fields in several shapes depending on sensor
//! configuration: integer epoch, float epoch with fractional seconds, an
//! RFC-3339 string, or a numeric string holding an epoch value. `Timestamp`
//! accepts all four; every other shape is a decode failure that carries the
//! underlying parse error.

use chrono::DateTime;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Seconds since the unix epoch, at second resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    #[must_use]
    pub fn as_secs(&self) -> i64 {
        self.0
    }
}

struct TimestampVisitor;

impl Visitor<'_> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a unix epoch number, numeric string, or RFC-3339 string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Timestamp, E> {
        Ok(Timestamp(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Timestamp, E> {
        i64::try_from(v)
            .map(Timestamp)
            .map_err(|e| E::custom(format!("invalid zeek timestamp: {e}")))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Timestamp, E> {
        if v.is_finite() {
            // fractional seconds are dropped
            Ok(Timestamp(v as i64))
        } else {
            Err(E::custom("invalid zeek timestamp: non-finite epoch"))
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Timestamp, E> {
        // ex: 2019-11-13T09:00:01.932360Z
        if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
            return Ok(Timestamp(dt.timestamp()));
        }

        match v.trim().parse::<f64>() {
            Ok(epoch) if epoch.is_finite() => Ok(Timestamp(epoch as i64)),
            Ok(_) => Err(E::custom("invalid zeek timestamp: non-finite epoch")),
            Err(e) => Err(E::custom(format!("invalid zeek timestamp: {e}"))),
        }
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

/// One decoded zeek connection record.
///
/// Field names mirror zeek's conn.log output, which carries the same names
/// whether the sensor writes JSON or tab-separated columns. Sensors differ
/// in which columns they emit, so every field except `ts` defaults when
/// absent. Immutable once built, apart from the caller-stamped source path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnRecord {
    pub ts: Timestamp,
    #[serde(default)]
    pub uid: String,
    #[serde(default, rename = "id.orig_h")]
    pub source: String,
    #[serde(default, rename = "id.orig_p")]
    pub source_port: u16,
    #[serde(default, rename = "id.resp_h")]
    pub destination: String,
    #[serde(default, rename = "id.resp_p")]
    pub destination_port: u16,
    #[serde(default)]
    pub proto: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub orig_bytes: i64,
    #[serde(default)]
    pub resp_bytes: i64,
    #[serde(default)]
    pub conn_state: String,
    #[serde(default)]
    pub local_orig: bool,
    #[serde(default)]
    pub local_resp: bool,
    #[serde(default)]
    pub missed_bytes: i64,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub orig_pkts: i64,
    #[serde(default)]
    pub orig_ip_bytes: i64,
    #[serde(default)]
    pub resp_pkts: i64,
    #[serde(default)]
    pub resp_ip_bytes: i64,
    #[serde(default)]
    pub tunnel_parents: Vec<String>,
    /// Which sensor recorded this event. Only set when combining logs from
    /// multiple sensors.
    #[serde(default)]
    pub agent_hostname: String,
    #[serde(default)]
    pub agent_uuid: String,
    /// Path of the log file containing this record. Stamped by the reader
    /// after decoding, never derived from line content.
    #[serde(skip)]
    pub log_path: String,
}

impl ConnRecord {
    pub fn set_log_path(&mut self, path: impl Into<String>) {
        self.log_path = path.into();
    }
}
