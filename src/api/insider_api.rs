use crate::config::Config;
use crate::error::SyncError;
use crate::models::{Game, League, OverUnderCounts, PublicMoneyData, RefereeStats};
use crate::utils::sport_selector::DateRange;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

const SERVICE: &str = "Insider API";
const API_KEY_HEADER: &str = "insider-api-key";
/// Sharp and RLM lists are cut to this many entries
const MAX_INDICATORS: usize = 5;
/// NBA-style referee histories with fewer decided games are ignored
const MIN_DECIDED_GAMES: u32 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GamesResponse {
    games: Option<Vec<Game>>,
}

/// One game from an NBA-style referee history
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RefereeGameDetail {
    game_ou: Option<f64>,
    total_score: Option<f64>,
}

/// Client for the sports-data provider (games, public money, referee stats).
///
/// Every fetch degrades to an empty result on failure; the widget pages
/// render whatever subset came back.
pub struct InsiderApiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl InsiderApiClient {
    pub fn new(api_key: String, base_url: String, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        Ok(Self::new(
            config.require_insider_key()?.to_string(),
            config.insider_base_url.clone(),
            config.http_client(),
        ))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::UpstreamStatus {
                service: SERVICE,
                status: response.status(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SyncError::decode(SERVICE, e))
    }

    /// Games for a league between two dates (inclusive)
    pub async fn fetch_games(&self, league: League, range: &DateRange) -> Vec<Game> {
        let path = format!("/api/{}/games", league.as_str());
        let query = [("from", range.from_param()), ("to", range.to_param())];

        match self.get_json::<GamesResponse>(&path, &query).await {
            Ok(body) => {
                let games = body.games.unwrap_or_default();
                info!(
                    "Found {} {} games ({} to {})",
                    games.len(),
                    league.code(),
                    range.from_param(),
                    range.to_param()
                );
                games
            }
            Err(e) => {
                warn!("Failed to fetch {} games: {}", league.code(), e);
                Vec::new()
            }
        }
    }

    /// Current public money split for one game. The odds fields are left at
    /// zero; callers copy them from the game.
    pub async fn fetch_public_money(&self, league: League, game_id: &str) -> Option<PublicMoneyData> {
        let path = format!("/api/{}/games/{}/public-money", league.as_str(), game_id);

        match self.get_json::<PublicMoneyData>(&path, &[]).await {
            Ok(mut data) => {
                data.sharp_money_stats.truncate(MAX_INDICATORS);
                data.rlm_stats.truncate(MAX_INDICATORS);
                data.away_team_ml = 0.0;
                data.home_team_ml = 0.0;
                data.away_team_point_spread = 0.0;
                data.home_team_point_spread = 0.0;
                Some(data)
            }
            Err(e) => {
                warn!("Failed to fetch public money for {}: {}", game_id, e);
                None
            }
        }
    }

    /// Referee record for the official assigned to a game
    pub async fn fetch_referee_stats(&self, league: League, game_id: &str) -> Option<RefereeStats> {
        let path = format!("/api/{}/games/{}/referee-stats", league.as_str(), game_id);

        let raw = match self.get_json::<Value>(&path, &[]).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to fetch referee stats for {}: {}", game_id, e);
                return None;
            }
        };

        let stats = parse_referee_stats(raw);
        if stats.is_none() {
            debug!("No usable referee stats for {}", game_id);
        }
        stats
    }
}

/// Accept either the aggregated shape (`over_under.over_under`) or a per-game
/// history under `referee_odds.game_details.game_details`.
fn parse_referee_stats(raw: Value) -> Option<RefereeStats> {
    if raw
        .pointer("/over_under/over_under")
        .is_some_and(|v| v.is_object())
    {
        return match serde_json::from_value::<RefereeStats>(raw) {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("Malformed referee stats: {}", e);
                None
            }
        };
    }

    let history = raw
        .pointer("/referee_odds/game_details/game_details")
        .and_then(Value::as_array)?;

    let (mut over_hits, mut under_hits) = (0u32, 0u32);
    for entry in history {
        let Ok(detail) = serde_json::from_value::<RefereeGameDetail>(entry.clone()) else {
            continue;
        };
        let (Some(line), Some(total)) = (detail.game_ou, detail.total_score) else {
            continue;
        };
        if line == 0.0 {
            continue;
        }
        if total > line {
            over_hits += 1;
        } else if total < line {
            under_hits += 1;
        }
    }

    let decided = over_hits + under_hits;
    if decided < MIN_DECIDED_GAMES {
        debug!("Referee history too short ({} decided games)", decided);
        return None;
    }

    let mut stats = RefereeStats {
        referee_id: raw.get("referee_id").and_then(Value::as_i64),
        referee_name: raw
            .get("referee_name")
            .and_then(Value::as_str)
            .map(str::to_string),
        total_games: decided,
        ..Default::default()
    };
    stats.over_under.over_under = OverUnderCounts::from_hits(over_hits, under_hits);
    Some(stats)
}
