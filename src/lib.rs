pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod sync;
pub mod utils;
pub mod widgets;

pub use api::*;
pub use models::*;
pub use utils::*;

use api::espn_api::EspnClient;
use api::insider_api::InsiderApiClient;
use api::odds_api::OddsApiClient;
use api::warehouse::WarehouseClient;
use chrono::{NaiveDateTime, Utc};
use config::Config;
use error::SyncError;
use serde::Serialize;
use sync::upcoming::{sync_upcoming_games, UpcomingSyncReport};
use sync::weekly::{weekly_sync, RankingsTrigger, WeeklySyncReport};
use widgets::{MatchupWidgetData, StatsWidgetData, WidgetAggregator};

/// Both widgets, built from one set of games fetches
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPageData {
    pub stats: StatsWidgetData,
    pub matchup: MatchupWidgetData,
}

/// Build both widget payloads for local time `now`
pub async fn fetch_widget_data(client: &InsiderApiClient, now: NaiveDateTime) -> WidgetPageData {
    let mut aggregator = WidgetAggregator::new(client, now);
    let stats = aggregator.stats_widget_data().await;
    let matchup = aggregator.matchup_widget_data().await;
    WidgetPageData { stats, matchup }
}

/// Run the upcoming-games sync with clients built from `config`
pub async fn run_upcoming_sync(
    config: &Config,
    include_props: bool,
) -> Result<UpcomingSyncReport, SyncError> {
    let odds = OddsApiClient::from_config(config)?;
    let warehouse = WarehouseClient::from_config(config)?;

    sync_upcoming_games(
        &odds,
        &warehouse,
        include_props,
        config.prop_request_delay,
        Utc::now(),
    )
    .await
}

/// Run the weekly box score sync. Missing season/week default to the
/// current NFL week.
pub async fn run_weekly_sync(
    config: &Config,
    season: Option<i32>,
    week: Option<u32>,
) -> Result<WeeklySyncReport, SyncError> {
    let warehouse = WarehouseClient::from_config(config)?;
    let espn = EspnClient::from_config(config);
    let rankings = RankingsTrigger {
        base_url: config.rankings_base_url.clone(),
        client: config.http_client(),
    };

    let (season, week) = sync::resolve_season_week(season, week, Utc::now().naive_utc());

    weekly_sync(
        &espn,
        &warehouse,
        Some(&rankings),
        season,
        week,
        config.box_score_delay,
    )
    .await
}
