//! Conversion from provider catalog entries to OpenAI model objects.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::protocol::{Model, UpstreamModel};

/// Provider marker for "no release date, use the current time".
const CURRENT_VERSION_MARKER: &str = "1";

const UNKNOWN_OWNER: &str = "unknown";

/// Normalize one catalog entry. `now` is the epoch-seconds fallback for `created`.
pub fn normalize(model: UpstreamModel, now: i64) -> Model {
    let created = created_from_version(model.version.as_deref(), now);
    let owned_by = model
        .publisher
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| UNKNOWN_OWNER.to_string());

    Model {
        id: model.id,
        object: "model".to_string(),
        created,
        owned_by,
    }
}

/// Derive the `created` timestamp from a catalog version string.
pub fn created_from_version(version: Option<&str>, now: i64) -> i64 {
    match version {
        Some(CURRENT_VERSION_MARKER) | None => now,
        Some(v) => parse_version_date(v).unwrap_or(now),
    }
}

/// Owner for a bare model id: the `publisher/` prefix if there is one.
pub fn owner_from_id(id: &str) -> String {
    match id.split_once('/') {
        Some((owner, _)) if !owner.is_empty() => owner.to_string(),
        _ => UNKNOWN_OWNER.to_string(),
    }
}

/// Parse RFC 3339, naive datetime, or plain `YYYY-MM-DD` (UTC midnight).
fn parse_version_date(version: &str) -> Option<i64> {
    let v = version.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
        return Some(dt.timestamp());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(v, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}
