// MIT License - Copyright (c) 2026 Peter Wright
// Area status reported by user/status.xml

use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot of the panel's single area, as reported by `status.xml`.
///
/// A fresh value is produced by every status fetch; it is never patched in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Area bank index
    #[serde(rename(deserialize = "abank"))]
    pub bank: u32,
    /// Change sequence number; bumps whenever the area state changes
    #[serde(rename(deserialize = "aseq"))]
    pub seq: u32,
    #[serde(rename(deserialize = "stat0"), deserialize_with = "flag")]
    pub away: bool,
    #[serde(rename(deserialize = "stat1"), deserialize_with = "flag")]
    pub stay: bool,
    #[serde(rename(deserialize = "stat2"), deserialize_with = "flag")]
    pub ready: bool,
    #[serde(rename(deserialize = "stat3"), deserialize_with = "flag")]
    pub fire_alarm: bool,
    #[serde(rename(deserialize = "stat4"), deserialize_with = "flag")]
    pub intrusion_alarm: bool,
    #[serde(rename(deserialize = "stat7"), deserialize_with = "flag")]
    pub exit_delay: bool,
    #[serde(rename(deserialize = "stat9"), deserialize_with = "flag")]
    pub entry_delay: bool,
    #[serde(rename(deserialize = "stat10"), deserialize_with = "flag")]
    pub bypass_on: bool,
    #[serde(rename(deserialize = "stat15"), deserialize_with = "flag")]
    pub chime_on: bool,
    /// Free-text system fault message
    #[serde(rename(deserialize = "sysflt"), default)]
    pub message: String,
}

impl SystemStatus {
    pub fn is_armed(&self) -> bool {
        self.away || self.stay
    }

    pub fn is_alarm(&self) -> bool {
        self.fire_alarm || self.intrusion_alarm
    }
}

/// Panel flags come as `0`/`1`, occasionally as other integers, and in some
/// firmware as `true`/`false`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "" => Ok(false),
        s if s.eq_ignore_ascii_case("true") => Ok(true),
        s if s.eq_ignore_ascii_case("false") => Ok(false),
        s => s
            .parse::<i64>()
            .map(|v| v != 0)
            .map_err(|_| serde::de::Error::custom(format!("invalid flag value: {s}"))),
    }
}
