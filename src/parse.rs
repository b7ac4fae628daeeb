// MIT License - Copyright (c) 2026 Peter Wright
// Scraping and decoding of panel responses
//
// Every pattern the panel firmware dictates lives in this file.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::constants::{
    LOGIN_FORM_MARKER, SEQUENCE_PATH, STATUS_PATH, ZONE_CHUNKS, ZONE_NAMES_PATH, ZONE_STATE_PATH,
};
use crate::devices::system::SystemStatus;
use crate::devices::zone::ZoneRow;
use crate::error::{NxError, Result};

static SESSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?si)function getSession\(\)\s*\{\s*return\s+"(\S.*?)"\s*;\s*\}"#)
        .expect("invalid session token pattern")
});

static ZONE_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)var zoneNames = new\sArray\((.*)\);").expect("invalid zone names pattern")
});

/// Reply of `user/seq.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SequenceReply {
    pub areas: u32,
    /// One comma-separated token per zone-state row.
    pub zones: String,
}

impl SequenceReply {
    /// Number of zone-state rows the panel exposes.
    pub fn zone_rows(&self) -> usize {
        if self.zones.trim().is_empty() {
            0
        } else {
            self.zones.split(',').count()
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawZoneState {
    zstate: usize,
    #[serde(default)]
    zseq: u32,
    zdat: String,
}

/// Reply of `user/zstate.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneStateReply {
    /// Row slot the data belongs to, as echoed by the panel.
    pub slot: usize,
    pub seq: u32,
    pub row: ZoneRow,
}

/// Whether the body is the panel's login page, which it serves (even with a
/// 200 status) once a session has expired.
pub fn is_login_form(body: &[u8]) -> bool {
    String::from_utf8_lossy(body).contains(LOGIN_FORM_MARKER)
}

/// Session token embedded in the login reply as
/// `function getSession(){return "<token>";}`. The last match wins; an absent
/// pattern yields `None`.
pub fn session_token(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    SESSION_TOKEN
        .captures_iter(&text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|t| !t.is_empty())
        .last()
}

/// Zone names from `var zoneNames = new Array(...);` in `zones.htm`.
///
/// Elements are unquoted and percent-decoded; an element that does not
/// decode to UTF-8 is kept as-is.
pub fn zone_names(body: &[u8]) -> Result<Vec<String>> {
    let text = String::from_utf8_lossy(body);
    let list = ZONE_NAMES
        .captures_iter(&text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .last()
        .ok_or_else(|| NxError::decode(ZONE_NAMES_PATH, "zoneNames array not found"))?;

    if list.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(list
        .split(',')
        .map(|item| {
            let item = unquote(item.trim());
            percent_unescape(item).unwrap_or_else(|| item.to_string())
        })
        .collect())
}

pub fn system_status(body: &[u8]) -> Result<SystemStatus> {
    from_xml(STATUS_PATH, body)
}

pub fn sequence(body: &[u8]) -> Result<SequenceReply> {
    from_xml(SEQUENCE_PATH, body)
}

/// Parse a zone-state reply. `zdat` must hold at most four integers; fewer
/// are zero-padded.
pub fn zone_state(body: &[u8]) -> Result<ZoneStateReply> {
    let raw: RawZoneState = from_xml(ZONE_STATE_PATH, body)?;
    let mut row = [0u32; ZONE_CHUNKS];

    let values: Vec<&str> = raw
        .zdat
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    if values.len() > ZONE_CHUNKS {
        return Err(NxError::decode(
            ZONE_STATE_PATH,
            format!("zdat has {} values, expected {}", values.len(), ZONE_CHUNKS),
        ));
    }
    for (chunk, value) in values.into_iter().enumerate() {
        row[chunk] = value.parse().map_err(|_| {
            NxError::decode(ZONE_STATE_PATH, format!("zdat value is not a number: {value}"))
        })?;
    }

    Ok(ZoneStateReply {
        slot: raw.zstate,
        seq: raw.zseq,
        row,
    })
}

fn from_xml<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(body)
        .map_err(|e| NxError::decode(path, format!("body is not UTF-8: {e}")))?;
    quick_xml::de::from_str(text).map_err(|e| NxError::decode(path, e.to_string()))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

/// Decode `%XX` escapes. `+` is left alone. Returns `None` when the decoded
/// bytes are not UTF-8; a `%` not followed by two hex digits is kept as-is.
fn percent_unescape(s: &str) -> Option<String> {
    percent_decode_str(s)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}
