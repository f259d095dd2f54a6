use crate::models::Game;
use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Offset applied to the provider's Eastern wall-clock times to reach UTC
const EASTERN_TO_UTC_HOURS: i64 = 5;

pub const TBD_LABEL: &str = "TBD";

/// Canonical schedule entry used by snapshots and widgets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedGameSchedule {
    pub game_id: String,
    pub sport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<i32>,
    pub status: String,
    pub start_time_utc: DateTime<Utc>,
    pub start_time_label: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
}

/// Parse a provider timestamp into UTC and a display label.
///
/// The provider sends Eastern times with a `Z` suffix, so "2025-11-16T13:00:00Z"
/// is 1:00 PM ET. Anything that does not start with `YYYY-MM-DDTHH:MM:SS`
/// yields the current time and a "TBD" label.
pub fn normalize_trendline_date(raw: &str) -> (DateTime<Utc>, String) {
    let parsed = raw
        .trim()
        .get(..19)
        .and_then(|prefix| NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S").ok());

    let Some(eastern) = parsed else {
        warn!("Unparseable game date {:?}, using current time", raw);
        return (Utc::now(), TBD_LABEL.to_string());
    };

    let (is_pm, hour12) = eastern.hour12();
    let label = format!(
        "{}:{:02} {} ET",
        hour12,
        eastern.minute(),
        if is_pm { "PM" } else { "AM" }
    );

    let utc = (eastern + Duration::hours(EASTERN_TO_UTC_HOURS)).and_utc();
    (utc, label)
}

/// Last whitespace-delimited token of a full team name.
/// "Kansas City Chiefs" -> "Chiefs"; multi-word nicknames ("Red Sox") lose a word.
pub fn team_nickname(name: &str) -> String {
    name.split_whitespace().last().unwrap_or_default().to_string()
}

pub fn map_schedule_from_trendline(game: &Game, sport: &str) -> NormalizedGameSchedule {
    let (start_time_utc, start_time_label) = normalize_trendline_date(&game.game_date);

    NormalizedGameSchedule {
        game_id: game.game_id.clone(),
        sport: sport.to_string(),
        season: game.season,
        status: game
            .game_status
            .as_ref()
            .and_then(|s| s.game_status.clone())
            .unwrap_or_else(|| "scheduled".to_string()),
        start_time_utc,
        start_time_label,
        home_team: team_nickname(&game.home_team),
        away_team: team_nickname(&game.away_team),
        venue: game.game_location.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalize_afternoon_game() {
        let (utc, label) = normalize_trendline_date("2025-11-16T13:00:00Z");
        assert_eq!(label, "1:00 PM ET");
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 11, 16, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_normalize_midnight_and_noon() {
        let (_, label) = normalize_trendline_date("2025-11-16T00:05:00Z");
        assert_eq!(label, "12:05 AM ET");

        let (_, label) = normalize_trendline_date("2025-11-16T12:30:00Z");
        assert_eq!(label, "12:30 PM ET");
    }

    #[test]
    fn test_late_game_rolls_into_next_utc_day() {
        let (utc, label) = normalize_trendline_date("2025-11-16T20:15:00.000Z");
        assert_eq!(label, "8:15 PM ET");
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 11, 17, 1, 15, 0).unwrap());
    }

    #[test]
    fn test_unparseable_date_falls_back_to_now() {
        let before = Utc::now();
        let (utc, label) = normalize_trendline_date("next sunday");
        let after = Utc::now();

        assert_eq!(label, "TBD");
        assert!(utc >= before && utc <= after);
        // Always serializes to a valid ISO-8601 string
        assert!(DateTime::parse_from_rfc3339(&utc.to_rfc3339()).is_ok());

        let (_, label) = normalize_trendline_date("");
        assert_eq!(label, "TBD");
    }

    #[test]
    fn test_team_nickname() {
        assert_eq!(team_nickname("Kansas City Chiefs"), "Chiefs");
        assert_eq!(team_nickname("  Boston Red Sox "), "Sox");
        assert_eq!(team_nickname("Lakers"), "Lakers");
        assert_eq!(team_nickname(""), "");
    }

    #[test]
    fn test_map_schedule_from_trendline() {
        let game: Game = serde_json::from_value(serde_json::json!({
            "game_id": "g-1",
            "game_date": "2025-10-05T16:25:00Z",
            "home_team": "Seattle Seahawks",
            "away_team": "Los Angeles Rams",
            "season": 2025,
            "game_location": "Lumen Field"
        }))
        .unwrap();

        let schedule = map_schedule_from_trendline(&game, "nfl");
        assert_eq!(schedule.game_id, "g-1");
        assert_eq!(schedule.status, "scheduled");
        assert_eq!(schedule.home_team, "Seahawks");
        assert_eq!(schedule.away_team, "Rams");
        assert_eq!(schedule.start_time_label, "4:25 PM ET");
        assert_eq!(schedule.venue.as_deref(), Some("Lumen Field"));

        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["startTimeUtc"], "2025-10-05T21:25:00Z");
    }
}
