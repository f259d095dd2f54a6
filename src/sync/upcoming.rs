use crate::api::odds_api::{ApiQuota, OddsApiClient, OddsBookmaker, OddsEvent};
use crate::api::warehouse::{Params, Table, WarehouseClient};
use crate::error::SyncError;
use crate::sync::teams::{is_conference_game, is_division_game, team_by_name, NflTeam};
use crate::sync::{upcoming_season_week, warehouse_time};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How many recent scored games feed the streak calculation
const MOMENTUM_GAME_LIMIT: u32 = 320;

const RANKINGS_SQL: &str = "
    SELECT
        team_id,
        rank_total_yards_per_game AS offense_rank,
        rank_points_per_game AS points_rank,
        rank_passing_yards_per_game AS pass_offense_rank,
        rank_rushing_yards_per_game AS rush_offense_rank,
        rank_points_allowed_per_game AS defense_rank,
        rank_passing_yards_allowed_per_game AS pass_defense_rank,
        rank_rushing_yards_allowed_per_game AS rush_defense_rank,
        wins,
        losses,
        win_pct,
        rank_yards_allowed_to_wr AS rank_vs_wr,
        rank_yards_allowed_to_te AS rank_vs_te,
        rank_yards_allowed_to_rb AS rank_vs_rb,
        rank_wr_yards_produced AS rank_wr_prod,
        rank_te_yards_produced AS rank_te_prod,
        rank_rb_yards_produced AS rank_rb_prod
    FROM nfl_team_rankings
    WHERE (season, week) = (
        SELECT season, max(week) FROM nfl_team_rankings GROUP BY season ORDER BY season DESC LIMIT 1
    )";

const MOMENTUM_SQL: &str = "
    SELECT home_team_id, away_team_id, home_score, away_score, toString(game_time) AS game_time
    FROM nfl_games
    WHERE home_score > 0 AND away_score > 0
    ORDER BY game_time DESC
    LIMIT {limit:UInt32}";

const OPENING_LINES_SQL: &str =
    "SELECT DISTINCT game_id FROM nfl_line_snapshots WHERE is_opening = 1";

/// Latest ranking row for one team; missing columns read as 0
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamRanking {
    pub team_id: i64,
    pub offense_rank: u32,
    pub points_rank: u32,
    pub pass_offense_rank: u32,
    pub rush_offense_rank: u32,
    pub defense_rank: u32,
    pub pass_defense_rank: u32,
    pub rush_defense_rank: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
    pub rank_vs_wr: u32,
    pub rank_vs_te: u32,
    pub rank_vs_rb: u32,
    pub rank_wr_prod: u32,
    pub rank_te_prod: u32,
    pub rank_rb_prod: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoredGame {
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_score: i64,
    pub away_score: i64,
    pub game_time: String,
}

#[derive(Debug, Deserialize)]
struct GameIdRow {
    game_id: String,
}

/// Current streak (+wins / -losses) and the margin of the last game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Momentum {
    pub streak: i32,
    pub prev_margin: i64,
}

/// Streak and previous margin per team from scored games, newest first
pub fn compute_momentum(games: &[ScoredGame]) -> HashMap<i64, Momentum> {
    let mut results: HashMap<i64, Vec<(bool, i64, &str)>> = HashMap::new();

    for game in games {
        let home_won = game.home_score > game.away_score;
        let margin = game.home_score - game.away_score;
        results
            .entry(game.home_team_id)
            .or_default()
            .push((home_won, margin, &game.game_time));
        results
            .entry(game.away_team_id)
            .or_default()
            .push((!home_won, -margin, &game.game_time));
    }

    results
        .into_iter()
        .map(|(team_id, mut team_games)| {
            team_games.sort_by(|a, b| b.2.cmp(a.2));

            let mut momentum = Momentum::default();
            if let Some(&(last_won, last_margin, _)) = team_games.first() {
                momentum.prev_margin = last_margin;
                for (won, _, _) in &team_games {
                    if *won != last_won {
                        break;
                    }
                    momentum.streak += if last_won { 1 } else { -1 };
                }
            }
            (team_id, momentum)
        })
        .collect()
}

/// Row in `nfl_upcoming_games`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingGameRow {
    pub game_id: String,
    pub game_time: String,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_team_name: String,
    pub away_team_name: String,
    pub home_team_abbr: String,
    pub away_team_abbr: String,
    pub is_division_game: u8,
    pub is_conference_game: u8,
    pub season: i32,
    pub week: u32,
    pub season_type: String,
    pub home_offense_rank: u32,
    pub home_defense_rank: u32,
    pub home_pass_offense_rank: u32,
    pub home_rush_offense_rank: u32,
    pub home_pass_defense_rank: u32,
    pub home_rush_defense_rank: u32,
    pub away_offense_rank: u32,
    pub away_defense_rank: u32,
    pub away_pass_offense_rank: u32,
    pub away_rush_offense_rank: u32,
    pub away_pass_defense_rank: u32,
    pub away_rush_defense_rank: u32,
    pub home_streak: i32,
    pub away_streak: i32,
    pub home_prev_margin: i64,
    pub away_prev_margin: i64,
    pub home_win_pct: f64,
    pub away_win_pct: f64,
    pub home_wins: u32,
    pub home_losses: u32,
    pub away_wins: u32,
    pub away_losses: u32,
    pub home_rank_vs_wr: u32,
    pub home_rank_vs_te: u32,
    pub home_rank_vs_rb: u32,
    pub away_rank_vs_wr: u32,
    pub away_rank_vs_te: u32,
    pub away_rank_vs_rb: u32,
    pub home_rank_wr_prod: u32,
    pub home_rank_te_prod: u32,
    pub home_rank_rb_prod: u32,
    pub away_rank_wr_prod: u32,
    pub away_rank_te_prod: u32,
    pub away_rank_rb_prod: u32,
    pub created_at: String,
    pub updated_at: String,
}

/// Row in `nfl_line_snapshots`; markets a bookmaker did not post stay 0
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineSnapshotRow {
    pub game_id: String,
    pub snapshot_time: String,
    pub bookmaker: String,
    pub bookmaker_title: String,
    pub home_spread: f64,
    pub home_spread_odds: f64,
    pub away_spread: f64,
    pub away_spread_odds: f64,
    pub total_line: f64,
    pub over_odds: f64,
    pub under_odds: f64,
    pub home_ml: f64,
    pub away_ml: f64,
    pub is_opening: u8,
}

/// Row in `nfl_prop_line_snapshots`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PropSnapshotRow {
    pub game_id: String,
    pub snapshot_time: String,
    pub player_name: String,
    pub player_id: i64,
    pub team_name: String,
    pub bookmaker: String,
    pub bookmaker_title: String,
    pub prop_type: String,
    pub line: f64,
    pub over_odds: f64,
    pub under_odds: f64,
    pub is_opening: u8,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpcomingSyncReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub games_synced: usize,
    pub line_snapshots: usize,
    pub props_synced: usize,
    pub new_games: usize,
    pub duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_quota: Option<ApiQuota>,
}

/// Context shared by every row of one sync run
pub struct UpcomingContext {
    pub rankings: HashMap<i64, TeamRanking>,
    pub momentum: HashMap<i64, Momentum>,
    pub existing_openings: HashSet<String>,
    pub season: i32,
    pub week: u32,
    pub snapshot_time: String,
}

pub fn build_upcoming_game(
    event: &OddsEvent,
    home: &NflTeam,
    away: &NflTeam,
    ctx: &UpcomingContext,
) -> UpcomingGameRow {
    let empty = TeamRanking::default();
    let hr = ctx.rankings.get(&home.id).unwrap_or(&empty);
    let ar = ctx.rankings.get(&away.id).unwrap_or(&empty);
    let hm = ctx.momentum.get(&home.id).copied().unwrap_or_default();
    let am = ctx.momentum.get(&away.id).copied().unwrap_or_default();

    UpcomingGameRow {
        game_id: event.id.clone(),
        game_time: warehouse_time(event.commence_time),
        home_team_id: home.id,
        away_team_id: away.id,
        home_team_name: event.home_team.clone(),
        away_team_name: event.away_team.clone(),
        home_team_abbr: home.abbr.to_string(),
        away_team_abbr: away.abbr.to_string(),
        is_division_game: u8::from(is_division_game(home, away)),
        is_conference_game: u8::from(is_conference_game(home, away)),
        season: ctx.season,
        week: ctx.week,
        season_type: "regular".to_string(),
        home_offense_rank: hr.offense_rank,
        home_defense_rank: hr.defense_rank,
        home_pass_offense_rank: hr.pass_offense_rank,
        home_rush_offense_rank: hr.rush_offense_rank,
        home_pass_defense_rank: hr.pass_defense_rank,
        home_rush_defense_rank: hr.rush_defense_rank,
        away_offense_rank: ar.offense_rank,
        away_defense_rank: ar.defense_rank,
        away_pass_offense_rank: ar.pass_offense_rank,
        away_rush_offense_rank: ar.rush_offense_rank,
        away_pass_defense_rank: ar.pass_defense_rank,
        away_rush_defense_rank: ar.rush_defense_rank,
        home_streak: hm.streak,
        away_streak: am.streak,
        home_prev_margin: hm.prev_margin,
        away_prev_margin: am.prev_margin,
        home_win_pct: hr.win_pct,
        away_win_pct: ar.win_pct,
        home_wins: hr.wins,
        home_losses: hr.losses,
        away_wins: ar.wins,
        away_losses: ar.losses,
        home_rank_vs_wr: hr.rank_vs_wr,
        home_rank_vs_te: hr.rank_vs_te,
        home_rank_vs_rb: hr.rank_vs_rb,
        away_rank_vs_wr: ar.rank_vs_wr,
        away_rank_vs_te: ar.rank_vs_te,
        away_rank_vs_rb: ar.rank_vs_rb,
        home_rank_wr_prod: hr.rank_wr_prod,
        home_rank_te_prod: hr.rank_te_prod,
        home_rank_rb_prod: hr.rank_rb_prod,
        away_rank_wr_prod: ar.rank_wr_prod,
        away_rank_te_prod: ar.rank_te_prod,
        away_rank_rb_prod: ar.rank_rb_prod,
        created_at: ctx.snapshot_time.clone(),
        updated_at: ctx.snapshot_time.clone(),
    }
}

/// Flatten one bookmaker's h2h, spreads and totals markets into a snapshot
pub fn build_line_snapshot(
    event: &OddsEvent,
    bookmaker: &OddsBookmaker,
    snapshot_time: &str,
    is_opening: bool,
) -> LineSnapshotRow {
    let mut row = LineSnapshotRow {
        game_id: event.id.clone(),
        snapshot_time: snapshot_time.to_string(),
        bookmaker: bookmaker.key.clone(),
        bookmaker_title: bookmaker.title.clone(),
        is_opening: u8::from(is_opening),
        ..Default::default()
    };

    for market in &bookmaker.markets {
        for outcome in &market.outcomes {
            let point = outcome.point.unwrap_or(0.0);
            match market.key.as_str() {
                "h2h" => {
                    if outcome.name == event.home_team {
                        row.home_ml = outcome.price;
                    } else if outcome.name == event.away_team {
                        row.away_ml = outcome.price;
                    }
                }
                "spreads" => {
                    if outcome.name == event.home_team {
                        row.home_spread = point;
                        row.home_spread_odds = outcome.price;
                    } else if outcome.name == event.away_team {
                        row.away_spread = point;
                        row.away_spread_odds = outcome.price;
                    }
                }
                "totals" => {
                    row.total_line = point;
                    match outcome.name.as_str() {
                        "Over" => row.over_odds = outcome.price,
                        "Under" => row.under_odds = outcome.price,
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    row
}

/// One row per (bookmaker, market, player), pairing the Over and Under prices
pub fn build_prop_snapshots(
    game_id: &str,
    event: &OddsEvent,
    snapshot_time: &str,
    is_opening: bool,
) -> Vec<PropSnapshotRow> {
    let mut rows = Vec::new();

    for bookmaker in &event.bookmakers {
        for market in &bookmaker.markets {
            let mut players: Vec<PropSnapshotRow> = Vec::new();
            let mut index: HashMap<&str, usize> = HashMap::new();

            for outcome in &market.outcomes {
                let Some(player) = outcome.description.as_deref().filter(|p| !p.is_empty()) else {
                    continue;
                };

                let slot = *index.entry(player).or_insert_with(|| {
                    players.push(PropSnapshotRow {
                        game_id: game_id.to_string(),
                        snapshot_time: snapshot_time.to_string(),
                        player_name: player.to_string(),
                        bookmaker: bookmaker.key.clone(),
                        bookmaker_title: bookmaker.title.clone(),
                        prop_type: market.key.clone(),
                        line: outcome.point.unwrap_or(0.0),
                        is_opening: u8::from(is_opening),
                        ..Default::default()
                    });
                    players.len() - 1
                });

                match outcome.name.as_str() {
                    "Over" => players[slot].over_odds = outcome.price,
                    "Under" => players[slot].under_odds = outcome.price,
                    _ => {}
                }
            }

            rows.extend(players);
        }
    }

    rows
}

async fn load_rankings(warehouse: &WarehouseClient) -> Result<HashMap<i64, TeamRanking>, SyncError> {
    let rows: Vec<TeamRanking> = warehouse.query(RANKINGS_SQL, Params::new()).await?;
    Ok(rows.into_iter().map(|r| (r.team_id, r)).collect())
}

async fn load_momentum(warehouse: &WarehouseClient) -> Result<HashMap<i64, Momentum>, SyncError> {
    let games: Vec<ScoredGame> = warehouse
        .query(MOMENTUM_SQL, Params::new().bind("limit", MOMENTUM_GAME_LIMIT))
        .await?;
    Ok(compute_momentum(&games))
}

async fn load_opening_lines(warehouse: &WarehouseClient) -> Result<HashSet<String>, SyncError> {
    let rows: Vec<GameIdRow> = warehouse.query(OPENING_LINES_SQL, Params::new()).await?;
    Ok(rows.into_iter().map(|r| r.game_id).collect())
}

/// Pull upcoming NFL odds, replace `nfl_upcoming_games` and append line
/// (and optionally prop) snapshots.
pub async fn sync_upcoming_games(
    odds: &OddsApiClient,
    warehouse: &WarehouseClient,
    include_props: bool,
    prop_delay: Duration,
    now: DateTime<Utc>,
) -> Result<UpcomingSyncReport, SyncError> {
    let started = Instant::now();
    info!("Starting upcoming games sync (props: {})", include_props);

    let (events, quota) = odds.fetch_upcoming_nfl().await?;
    if events.is_empty() {
        return Ok(UpcomingSyncReport {
            success: true,
            message: Some("No upcoming games found".to_string()),
            ..Default::default()
        });
    }

    let (rankings, momentum, existing_openings) = tokio::try_join!(
        load_rankings(warehouse),
        load_momentum(warehouse),
        load_opening_lines(warehouse),
    )?;

    let (season, week) = upcoming_season_week(now.naive_utc());
    let ctx = UpcomingContext {
        rankings,
        momentum,
        existing_openings,
        season,
        week,
        snapshot_time: warehouse_time(now),
    };

    let mut upcoming = Vec::new();
    let mut lines = Vec::new();

    for event in &events {
        let (Some(home), Some(away)) = (team_by_name(&event.home_team), team_by_name(&event.away_team))
        else {
            warn!("Unknown team: {} vs {}", event.home_team, event.away_team);
            continue;
        };

        let is_opening = !ctx.existing_openings.contains(&event.id);
        upcoming.push(build_upcoming_game(event, home, away, &ctx));
        lines.extend(
            event
                .bookmakers
                .iter()
                .map(|b| build_line_snapshot(event, b, &ctx.snapshot_time, is_opening)),
        );
    }

    info!(
        "Inserting {} games and {} line snapshots",
        upcoming.len(),
        lines.len()
    );
    warehouse.truncate(Table::NflUpcomingGames).await?;
    warehouse.insert(Table::NflUpcomingGames, &upcoming).await?;
    warehouse.insert(Table::NflLineSnapshots, &lines).await?;

    let props_synced = if include_props {
        let game_ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        sync_prop_lines(odds, warehouse, &game_ids, &ctx, prop_delay).await
    } else {
        0
    };

    let new_games = upcoming
        .iter()
        .filter(|g| !ctx.existing_openings.contains(&g.game_id))
        .count();

    Ok(UpcomingSyncReport {
        success: true,
        message: None,
        games_synced: upcoming.len(),
        line_snapshots: lines.len(),
        props_synced,
        new_games,
        duration_ms: started.elapsed().as_millis(),
        api_quota: Some(quota),
    })
}

/// Fetch and store props one game at a time. A failing game is logged and
/// skipped.
async fn sync_prop_lines(
    odds: &OddsApiClient,
    warehouse: &WarehouseClient,
    game_ids: &[&str],
    ctx: &UpcomingContext,
    delay: Duration,
) -> usize {
    let mut total = 0;

    for (i, game_id) in game_ids.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let event = match odds.fetch_event_props(game_id).await {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to fetch props for game {}: {}", game_id, e);
                continue;
            }
        };

        let is_opening = !ctx.existing_openings.contains(*game_id);
        let rows = build_prop_snapshots(game_id, &event, &ctx.snapshot_time, is_opening);

        match warehouse.insert(Table::NflPropLineSnapshots, &rows).await {
            Ok(written) => total += written,
            Err(e) => warn!("Failed to store props for game {}: {}", game_id, e),
        }
    }

    info!("Synced {} prop lines", total);
    total
}
