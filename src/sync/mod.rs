pub mod box_score;
pub mod teams;
pub mod upcoming;
pub mod weekly;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Last regular-season week
pub const MAX_REGULAR_SEASON_WEEK: u32 = 18;

/// Format used for every DateTime column written to the warehouse
pub const WAREHOUSE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// NFL season a date belongs to: September onward is the current year,
/// January through August the previous one.
pub fn nfl_season(now: NaiveDateTime) -> i32 {
    if now.month() >= 9 {
        now.year()
    } else {
        now.year() - 1
    }
}

fn season_start(season: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(season, 9, 5)
        .unwrap_or_default()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
}

/// Season and approximate week, counting partial weeks from Sept 5.
/// Not clamped; late-season dates run past week 18.
pub fn upcoming_season_week(now: NaiveDateTime) -> (i32, u32) {
    let season = nfl_season(now);
    let elapsed_ms = (now - season_start(season)).num_milliseconds() as f64;
    let week_ms = 7.0 * 24.0 * 60.0 * 60.0 * 1000.0;
    let week = (elapsed_ms / week_ms).ceil().max(1.0) as u32;
    (season, week)
}

/// Season and regular-season week from whole days since Sept 5, clamped to 1..=18
pub fn current_season_week(now: NaiveDateTime) -> (i32, u32) {
    let season = nfl_season(now);
    let days = (now - season_start(season)).num_days();
    let week = (days as f64 / 7.0).ceil() as i64;
    (season, week.clamp(1, MAX_REGULAR_SEASON_WEEK as i64) as u32)
}

/// Season and week for a weekly sync. An override applies only when both
/// parts are given, otherwise both come from `now`.
pub fn resolve_season_week(
    season: Option<i32>,
    week: Option<u32>,
    now: NaiveDateTime,
) -> (i32, u32) {
    match (season, week) {
        (Some(season), Some(week)) => (season, week),
        _ => current_season_week(now),
    }
}

pub fn warehouse_time(at: DateTime<Utc>) -> String {
    at.format(WAREHOUSE_TIME_FORMAT).to_string()
}

/// Convert an ISO timestamp ("2025-10-12T17:00Z", "2025-10-12T17:00:00Z")
/// to the warehouse format. Unknown shapes are passed through with the
/// `T` and `Z` stripped.
pub fn warehouse_time_from_iso(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return warehouse_time(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ") {
        return parsed.format(WAREHOUSE_TIME_FORMAT).to_string();
    }
    raw.replace('T', " ").replace('Z', "")
}
