use crate::config::Config;
use crate::error::SyncError;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

const SERVICE: &str = "ESPN";
/// Competition status type id for a final score
const STATUS_FINAL: &str = "3";
/// Regular season
const SEASON_TYPE: &str = "2";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Scoreboard {
    events: Vec<ScoreboardEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScoreboardEvent {
    id: String,
    date: String,
    competitions: Vec<Competition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Competition {
    status: Option<CompetitionStatus>,
    competitors: Vec<Competitor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompetitionStatus {
    #[serde(rename = "type")]
    kind: Option<StatusType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusType {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Competitor {
    home_away: String,
    team: CompetitorTeam,
    score: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CompetitorTeam {
    id: Value,
    abbreviation: String,
}

/// A final regular-season game from the scoreboard
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedGame {
    pub espn_game_id: String,
    /// ISO timestamp as sent by ESPN ("2025-10-12T17:00Z")
    pub game_time: String,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_team_abbr: String,
    pub away_team_abbr: String,
    pub home_score: i64,
    pub away_score: i64,
    pub season: i32,
    pub week: u32,
}

impl CompletedGame {
    /// "NYJ @ BUF"
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_team_abbr, self.home_team_abbr)
    }
}

/// Game summary; only the box score is read
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GameSummary {
    pub boxscore: Option<BoxScore>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BoxScore {
    pub players: Vec<TeamBoxScore>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeamBoxScore {
    pub team: Option<TeamRef>,
    pub statistics: Vec<StatCategory>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeamRef {
    pub id: Value,
}

/// One stat table ("passing", "rushing", "receiving", ...)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatCategory {
    pub name: String,
    pub athletes: Vec<AthleteLine>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AthleteLine {
    pub athlete: Option<Athlete>,
    pub stats: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Athlete {
    pub id: Value,
    pub display_name: String,
    pub position: Option<Position>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Position {
    pub abbreviation: String,
}

/// ESPN sends ids and scores as either strings or numbers
pub fn value_to_i64(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

pub struct EspnClient {
    base_url: String,
    client: reqwest::Client,
}

impl EspnClient {
    pub fn new(base_url: String, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.espn_base_url.clone(), config.http_client())
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;

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

    /// Final scores for one regular-season week
    pub async fn fetch_completed_games(
        &self,
        season: i32,
        week: u32,
    ) -> Result<Vec<CompletedGame>, SyncError> {
        let url = format!("{}/football/nfl/scoreboard", self.base_url);
        let scoreboard: Scoreboard = self
            .get(
                &url,
                &[
                    ("seasontype", SEASON_TYPE.to_string()),
                    ("week", week.to_string()),
                    ("dates", season.to_string()),
                ],
            )
            .await?;

        let total = scoreboard.events.len();
        let games: Vec<CompletedGame> = scoreboard
            .events
            .into_iter()
            .filter_map(|event| completed_game(event, season, week))
            .collect();

        info!(
            "ESPN scoreboard {} week {}: {} of {} games final",
            season,
            week,
            games.len(),
            total
        );
        Ok(games)
    }

    pub async fn fetch_summary(&self, event_id: &str) -> Result<GameSummary, SyncError> {
        let url = format!("{}/football/nfl/summary", self.base_url);
        self.get(&url, &[("event", event_id.to_string())]).await
    }
}

fn completed_game(event: ScoreboardEvent, season: i32, week: u32) -> Option<CompletedGame> {
    let competition = event.competitions.into_iter().next()?;

    let is_final = competition
        .status
        .as_ref()
        .and_then(|s| s.kind.as_ref())
        .is_some_and(|t| t.id == STATUS_FINAL);
    if !is_final {
        return None;
    }

    let home = competition.competitors.iter().find(|c| c.home_away == "home")?;
    let away = competition.competitors.iter().find(|c| c.home_away == "away")?;

    Some(CompletedGame {
        espn_game_id: event.id,
        game_time: event.date,
        home_team_id: value_to_i64(&home.team.id),
        away_team_id: value_to_i64(&away.team.id),
        home_team_abbr: home.team.abbreviation.clone(),
        away_team_abbr: away.team.abbreviation.clone(),
        home_score: value_to_i64(&home.score),
        away_score: value_to_i64(&away.score),
        season,
        week,
    })
}
