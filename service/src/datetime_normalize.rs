use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use crate::ServiceError;

/// Seconds east of UTC for the canonical local zone (UTC+7).
const UTC7_OFFSET_SECONDS: i64 = 7 * 3600;

/// Normalizes the heterogeneous timestamp formats of the upstream service
/// into the canonical local time zone (UTC+7).
///
/// Accepted grammars, tried in order:
/// 1. all-digit string: Unix epoch seconds
/// 2. trailing `Z`: UTC timestamp, shifted by seven hours
/// 3. `yyyy-MM-dd HH:mm:ss`: already local, space instead of `T`
/// 4. `yyyy-MM-ddTHH:mm:ss[.frac]`: already local, fraction truncated
/// 5. `dd/MM/yyyy HH:mm:ss`: already local, day first
///
/// Sub-second precision is always truncated; the domain has no sub-second
/// semantics. Anything else fails with [`ServiceError::UnparsableTimestamp`],
/// never a sentinel date.
pub fn normalize(raw: &str) -> Result<PrimitiveDateTime, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(unparsable(raw));
    }
    if trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return from_epoch_seconds(trimmed).ok_or_else(|| unparsable(raw));
    }
    if let Some(utc_part) = trimmed.strip_suffix('Z') {
        return from_utc(utc_part).ok_or_else(|| unparsable(raw));
    }
    from_local(trimmed).ok_or_else(|| unparsable(raw))
}

fn unparsable(raw: &str) -> ServiceError {
    ServiceError::UnparsableTimestamp(raw.into())
}

fn from_epoch_seconds(digits: &str) -> Option<PrimitiveDateTime> {
    let seconds: i64 = digits.parse().ok()?;
    let local_seconds = seconds.checked_add(UTC7_OFFSET_SECONDS)?;
    let shifted = OffsetDateTime::from_unix_timestamp(local_seconds).ok()?;
    Some(PrimitiveDateTime::new(shifted.date(), shifted.time()))
}

fn from_utc(timestamp: &str) -> Option<PrimitiveDateTime> {
    let parsed = parse_iso_local(strip_fraction(timestamp))?;
    parsed.checked_add(Duration::seconds(UTC7_OFFSET_SECONDS))
}

fn from_local(timestamp: &str) -> Option<PrimitiveDateTime> {
    if timestamp.contains('/') {
        let day_first = format_description!("[day]/[month]/[year] [hour]:[minute]:[second]");
        return PrimitiveDateTime::parse(timestamp, day_first).ok();
    }
    let cleaned = strip_fraction(timestamp);
    if cleaned.contains(' ') {
        return parse_iso_local(&cleaned.replacen(' ', "T", 1));
    }
    parse_iso_local(cleaned)
}

fn parse_iso_local(timestamp: &str) -> Option<PrimitiveDateTime> {
    let iso = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(timestamp, iso).ok()
}

fn strip_fraction(timestamp: &str) -> &str {
    timestamp.split('.').next().unwrap_or(timestamp)
}
