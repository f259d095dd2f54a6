use crate::models::League;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;

const WIDGET_LINK_BASE_URL: &str = "https://app.thebettinginsider.com";

/// After this local hour the widgets look at tomorrow's slate
const ROLLOVER_HOUR: u32 = 22;

/// Which league to try first on a given day, and the order to fall back in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SportPriority {
    pub primary: League,
    pub fallbacks: Vec<League>,
}

impl SportPriority {
    /// Primary followed by fallbacks
    pub fn leagues(&self) -> Vec<League> {
        std::iter::once(self.primary)
            .chain(self.fallbacks.iter().copied())
            .collect()
    }
}

pub fn sport_priority(day: Weekday) -> SportPriority {
    use League::*;

    let (primary, fallbacks) = match day {
        Weekday::Sun | Weekday::Mon | Weekday::Thu => (Nfl, vec![Nba, Mlb, Nhl]),
        Weekday::Tue | Weekday::Wed => (Nba, vec![Mlb, Nhl, Nfl]),
        Weekday::Fri | Weekday::Sat => (Cfb, vec![Nba, Mlb, Nhl, Nfl]),
    };

    SportPriority { primary, fallbacks }
}

/// Inclusive date window passed to the games endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn from_param(&self) -> String {
        self.from.format("%Y-%m-%d").to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format("%Y-%m-%d").to_string()
    }
}

/// Days to step back from `day` to reach the most recent `target` (0 if same day)
fn days_since(day: Weekday, target: Weekday) -> i64 {
    let diff = day.num_days_from_sunday() as i64 - target.num_days_from_sunday() as i64;
    diff.rem_euclid(7)
}

/// Date window for a league relative to `now` (local wall-clock time).
///
/// - NFL: the most recent Thursday through the following Monday
/// - CFB: the most recent Friday through Sunday
/// - everything else: today plus two days
pub fn date_range_for_sport(league: League, now: NaiveDateTime) -> DateRange {
    let today = if now.hour() >= ROLLOVER_HOUR {
        now.date() + Duration::days(1)
    } else {
        now.date()
    };
    let weekday = today.weekday();

    match league {
        League::Nfl => {
            let from = today - Duration::days(days_since(weekday, Weekday::Thu));
            DateRange {
                from,
                to: from + Duration::days(4),
            }
        }
        League::Cfb => {
            let from = today - Duration::days(days_since(weekday, Weekday::Fri));
            DateRange {
                from,
                to: from + Duration::days(2),
            }
        }
        League::Nba | League::Mlb | League::Nhl | League::Cbb => DateRange {
            from: today,
            to: today + Duration::days(2),
        },
    }
}

/// Deep links into the partner app for a league
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetLinks {
    pub public_betting: String,
    pub referee_trends: String,
    pub player_props: String,
}

pub fn widget_links(league: League) -> WidgetLinks {
    let header_state = match league {
        League::Nfl => "NFL",
        League::Nba => "NBA",
        League::Mlb => "MLB",
        League::Nhl => "NHL",
        League::Cfb => "NCAAF",
        League::Cbb => "NCAAB",
    };
    // The partner app has no college public-betting view
    let public_state = match league {
        League::Cfb | League::Cbb => "NBA",
        _ => header_state,
    };

    WidgetLinks {
        public_betting: format!(
            "{}/?headerState={}&view=big_money",
            WIDGET_LINK_BASE_URL, public_state
        ),
        referee_trends: format!(
            "{}/?headerState={}&view=ref_trends",
            WIDGET_LINK_BASE_URL, header_state
        ),
        player_props: format!(
            "{}/?headerState={}&view=player_props",
            WIDGET_LINK_BASE_URL, header_state
        ),
    }
}
