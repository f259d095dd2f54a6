use crate::api::espn_api::{CompletedGame, EspnClient};
use crate::api::warehouse::{Params, Table, WarehouseClient};
use crate::error::SyncError;
use crate::sync::box_score::build_box_scores;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const EXISTING_GAMES_SQL: &str = "
    SELECT DISTINCT game_id
    FROM nfl_games
    WHERE season = {season:Int32} AND week = {week:UInt32} AND home_score > 0";

const UPDATE_SCORES_SQL: &str = "
    ALTER TABLE nfl_games UPDATE
        home_score = {home_score:Int64},
        away_score = {away_score:Int64}
    WHERE game_id = {game_id:String}";

const CLEANUP_UPCOMING_SQL: &str =
    "ALTER TABLE nfl_upcoming_games DELETE WHERE game_id IN {game_ids:Array(String)}";

#[derive(Debug, Deserialize)]
struct GameIdRow {
    game_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WeeklySyncReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub season: i32,
    pub week: u32,
    pub completed_games_found: usize,
    pub new_games_processed: usize,
    pub players_ingested: usize,
    pub games_cleaned_from_upcoming: usize,
    /// "AWY @ HOM" for every game whose ingest failed
    pub errors: Vec<String>,
    pub duration_ms: u128,
}

/// Where to ask for a rankings recalculation once new games land
#[derive(Debug, Clone)]
pub struct RankingsTrigger {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl RankingsTrigger {
    /// Fire and forget; the sync does not wait for the recalculation
    pub fn spawn(&self, season: i32, week: u32) -> tokio::task::JoinHandle<()> {
        let url = format!(
            "{}/api/clickhouse/calculate-nfl-rankings",
            self.base_url.trim_end_matches('/')
        );
        let client = self.client.clone();

        tokio::spawn(async move {
            let result = client
                .get(&url)
                .query(&[("season", season.to_string()), ("week", week.to_string())])
                .send()
                .await;
            match result {
                Ok(response) if response.status().is_success() => {
                    info!("Rankings updated for {} week {}", season, week)
                }
                Ok(response) => warn!("Rankings update returned {}", response.status()),
                Err(e) => error!("Rankings update failed: {}", e),
            }
        })
    }
}

async fn existing_game_ids(
    warehouse: &WarehouseClient,
    season: i32,
    week: u32,
) -> Result<HashSet<String>, SyncError> {
    let rows: Vec<GameIdRow> = warehouse
        .query(
            EXISTING_GAMES_SQL,
            Params::new().bind("season", season).bind("week", week),
        )
        .await?;
    Ok(rows.into_iter().map(|r| r.game_id).collect())
}

/// Box score rows and the final score for one game. Returns the number of
/// players written.
async fn ingest_game(
    espn: &EspnClient,
    warehouse: &WarehouseClient,
    game: &CompletedGame,
) -> Result<usize, SyncError> {
    let summary = espn.fetch_summary(&game.espn_game_id).await?;
    let rows = build_box_scores(game, &summary);
    let written = warehouse.insert(Table::NflBoxScores, &rows).await?;

    warehouse
        .command(
            UPDATE_SCORES_SQL,
            Params::new()
                .bind("home_score", game.home_score)
                .bind("away_score", game.away_score)
                .bind("game_id", &game.espn_game_id),
        )
        .await?;

    Ok(written)
}

/// Ingest box scores for newly completed games of one week, then drop
/// completed games from `nfl_upcoming_games`.
pub async fn weekly_sync(
    espn: &EspnClient,
    warehouse: &WarehouseClient,
    rankings: Option<&RankingsTrigger>,
    season: i32,
    week: u32,
    delay: Duration,
) -> Result<WeeklySyncReport, SyncError> {
    let started = Instant::now();
    info!("Starting weekly sync for {} week {}", season, week);

    let completed = espn.fetch_completed_games(season, week).await?;
    if completed.is_empty() {
        return Ok(WeeklySyncReport {
            success: true,
            message: Some("No completed games to process".to_string()),
            season,
            week,
            duration_ms: started.elapsed().as_millis(),
            ..Default::default()
        });
    }

    let existing = existing_game_ids(warehouse, season, week).await?;
    let new_games: Vec<&CompletedGame> = completed
        .iter()
        .filter(|g| !existing.contains(&g.espn_game_id))
        .collect();
    info!("{} new games to ingest", new_games.len());

    let mut report = WeeklySyncReport {
        success: true,
        season,
        week,
        completed_games_found: completed.len(),
        ..Default::default()
    };

    for (i, game) in new_games.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        info!("Processing {}", game.matchup());
        match ingest_game(espn, warehouse, game).await {
            Ok(players) => {
                report.new_games_processed += 1;
                report.players_ingested += players;
            }
            Err(e) => {
                error!("Error ingesting box score for {}: {}", game.espn_game_id, e);
                report.errors.push(game.matchup());
            }
        }
    }

    let completed_ids: Vec<&str> = completed.iter().map(|g| g.espn_game_id.as_str()).collect();
    warehouse
        .command(
            CLEANUP_UPCOMING_SQL,
            Params::new().bind_strings("game_ids", &completed_ids),
        )
        .await?;
    report.games_cleaned_from_upcoming = completed_ids.len();

    if report.new_games_processed > 0 {
        if let Some(trigger) = rankings {
            info!("Triggering rankings recalculation");
            trigger.spawn(season, week);
        }
    }

    report.duration_ms = started.elapsed().as_millis();
    Ok(report)
}
