use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leagues served by the stats provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Nfl,
    Nba,
    Mlb,
    Nhl,
    Cfb,
    Cbb,
}

impl League {
    /// Path segment used by the provider ("nfl", "cfb", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            League::Nfl => "nfl",
            League::Nba => "nba",
            League::Mlb => "mlb",
            League::Nhl => "nhl",
            League::Cfb => "cfb",
            League::Cbb => "cbb",
        }
    }

    /// Upper-case code shown in widgets ("NFL")
    pub fn code(&self) -> String {
        self.as_str().to_uppercase()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            League::Nfl => "NFL",
            League::Nba => "NBA",
            League::Mlb => "MLB",
            League::Nhl => "NHL",
            League::Cfb => "College Football",
            League::Cbb => "College Basketball",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLeague(pub String);

impl fmt::Display for UnknownLeague {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown league: {}", self.0)
    }
}

impl std::error::Error for UnknownLeague {}

impl FromStr for League {
    type Err = UnknownLeague;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nfl" => Ok(League::Nfl),
            "nba" => Ok(League::Nba),
            "mlb" => Ok(League::Mlb),
            "nhl" => Ok(League::Nhl),
            "cfb" => Ok(League::Cfb),
            "cbb" => Ok(League::Cbb),
            other => Err(UnknownLeague(other.to_string())),
        }
    }
}

/// A scheduled game as returned by the stats provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Game {
    #[serde(deserialize_with = "lenient_string")]
    pub game_id: String,
    pub name: String,
    /// Provider-local timestamp, e.g. "2025-11-16T13:00:00Z" meaning 1 PM Eastern
    pub game_date: String,
    pub away_team: String,
    pub home_team: String,
    pub away_team_logo: String,
    pub home_team_logo: String,
    pub referee_name: Option<String>,
    pub referee_id: Option<i64>,
    pub odds: GameOdds,
    pub season: Option<i32>,
    pub game_location: Option<String>,
    pub game_status: Option<GameStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStatus {
    pub game_status: Option<String>,
}

/// Current odds snapshot attached to a game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOdds {
    #[serde(deserialize_with = "lenient_f64")]
    pub over_under: f64,
    /// Home-team point spread
    #[serde(deserialize_with = "lenient_f64")]
    pub spread: f64,
    pub away_team_odds: TeamOdds,
    pub home_team_odds: TeamOdds,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamOdds {
    #[serde(deserialize_with = "lenient_f64")]
    pub moneyline: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub spread_odds: f64,
}

/// Sharp-money indicator from the public money endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpMoneyIndicator {
    pub bet_type: String,
    pub sharpness_level: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub stake_pct: f64,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub difference: Option<f64>,
    #[serde(deserialize_with = "lenient_opt_f64")]
    pub sharpness_level_value: Option<f64>,
}

/// Reverse-line-movement indicator from the public money endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RlmIndicator {
    pub bet_type: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub rlm_strength: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub line_movement: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub rlm_strength_normalized: f64,
    /// Already on a 0-100 scale
    #[serde(deserialize_with = "lenient_f64")]
    pub percentage: f64,
}

/// Bet-count and stake percentages per market side for one game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicMoneyData {
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_ml_away_bets_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_ml_away_stake_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_ml_home_bets_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_ml_home_stake_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_spread_away_bets_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_spread_away_stake_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_spread_home_bets_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_spread_home_stake_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_over_bets_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_over_stake_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_under_bets_pct: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub public_money_under_stake_pct: f64,
    #[serde(deserialize_with = "lenient_vec")]
    pub sharp_money_stats: Vec<SharpMoneyIndicator>,
    #[serde(deserialize_with = "lenient_vec")]
    pub rlm_stats: Vec<RlmIndicator>,
    #[serde(deserialize_with = "lenient_f64")]
    pub away_team_ml: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub home_team_ml: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub away_team_point_spread: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub home_team_point_spread: f64,
}

impl PublicMoneyData {
    /// Copy the game's moneylines and spread onto the public money record
    pub fn with_game_odds(mut self, game: &Game) -> Self {
        self.away_team_ml = game.odds.away_team_odds.moneyline;
        self.home_team_ml = game.odds.home_team_odds.moneyline;
        self.home_team_point_spread = game.odds.spread;
        self.away_team_point_spread = if game.odds.spread == 0.0 {
            0.0
        } else {
            -game.odds.spread
        };
        self
    }
}

/// Win/loss counts for one referee bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(deserialize_with = "lenient_u32")]
    pub wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub losses: u32,
}

impl Record {
    pub fn new(wins: u32, losses: u32) -> Self {
        Self { wins, losses }
    }

    pub fn sample(&self) -> u32 {
        self.wins + self.losses
    }

    /// Win rate on a 0-100 scale, 0 for an empty record
    pub fn win_pct(&self) -> f64 {
        match self.sample() {
            0 => 0.0,
            n => self.wins as f64 / n as f64 * 100.0,
        }
    }
}

/// Totals record for a referee. `home_favorite` and `home_underdog` split the
/// over record by which side was favored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverUnderCounts {
    #[serde(deserialize_with = "lenient_u32")]
    pub over_hits: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub under_hits: u32,
    #[serde(deserialize_with = "lenient_f64")]
    pub over_percentage: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub under_percentage: f64,
    pub home_favorite: Record,
    pub home_underdog: Record,
}

impl OverUnderCounts {
    pub fn from_hits(over_hits: u32, under_hits: u32) -> Self {
        let total = over_hits + under_hits;
        let pct = |hits: u32| {
            if total == 0 {
                0.0
            } else {
                (hits as f64 / total as f64 * 100.0).round()
            }
        };
        Self {
            over_hits,
            under_hits,
            over_percentage: pct(over_hits),
            under_percentage: pct(under_hits),
            ..Self::default()
        }
    }

    pub fn over_record(&self) -> Record {
        Record::new(self.over_hits, self.under_hits)
    }

    pub fn under_record(&self) -> Record {
        Record::new(self.under_hits, self.over_hits)
    }
}

/// Over record for the total band the referee's current game falls in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverUnderRange {
    #[serde(deserialize_with = "lenient_string")]
    pub ou_range: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub ou_range_wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub ou_range_losses: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverUnderStats {
    pub over_under: OverUnderCounts,
    pub over_under_range: OverUnderRange,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadCounts {
    #[serde(deserialize_with = "lenient_u32")]
    pub ats_wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub ats_losses: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub home_favorite_wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub home_favorite_losses: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub home_underdog_wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub home_underdog_losses: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub away_favorite_wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub away_favorite_losses: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub away_underdog_wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub away_underdog_losses: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadStats {
    pub spread: SpreadCounts,
}

/// Straight-up results from the home side's point of view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoneylineCounts {
    #[serde(deserialize_with = "lenient_u32")]
    pub home_ml_wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub home_ml_losses: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub home_favorite_wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub home_favorite_losses: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub home_underdog_wins: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub home_underdog_losses: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoneylineStats {
    pub ml: MoneylineCounts,
}

/// Aggregate referee record, computed by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefereeStats {
    pub referee_id: Option<i64>,
    pub referee_name: Option<String>,
    pub over_under: OverUnderStats,
    pub spread: SpreadStats,
    pub moneyline: MoneylineStats,
    #[serde(deserialize_with = "lenient_u32")]
    pub total_games: u32,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_f64(deserializer)?.unwrap_or(0.0))
}

/// Accepts numbers, numeric strings and null
fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_opt_f64(deserializer)?.unwrap_or(0.0);
    Ok(if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Null or a non-array becomes an empty list; malformed entries are dropped
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
