use crate::api::insider_api::InsiderApiClient;
use crate::models::{Game, League, PublicMoneyData, RefereeStats};
use crate::utils::analyzer::{
    find_most_public_bets, find_top_referee_trends, find_top_trends, BetType, MostPublicBet,
    RefereeTrend, TopTrend, TrendKind,
};
use crate::utils::normalize::{
    map_schedule_from_trendline, normalize_trendline_date, NormalizedGameSchedule,
};
use crate::utils::sport_selector::{
    date_range_for_sport, sport_priority, widget_links, DateRange, WidgetLinks,
};
use chrono::{Datelike, NaiveDateTime};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Games fetched per league for the public-money phase
pub const STATS_GAME_LIMIT: usize = 10;
/// Games fetched per league for the referee phase
pub const REFEREE_GAME_LIMIT: usize = 3;
pub const WIDGET_ITEM_LIMIT: usize = 2;
pub const PUBLIC_BETTING_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsWidgetData {
    pub most_public: Vec<MostPublicBet>,
    pub top_trends: Vec<TopTrend>,
    pub league: String,
    pub links: WidgetLinks,
    /// True when no league had data and the sample set is shown
    pub is_sample: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTrend {
    pub description: String,
    pub matchup: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupWidgetData {
    pub referee_trends: Vec<RefereeTrend>,
    pub team_trends: Vec<TeamTrend>,
    pub league: String,
    pub links: WidgetLinks,
    pub is_sample: bool,
}

/// Full public-betting board for one sport
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicBettingData {
    pub most_public: Vec<MostPublicBet>,
    pub sharp_money: Vec<TopTrend>,
    pub vegas_backed: Vec<TopTrend>,
    pub sport: String,
    pub total_games: usize,
    pub date_range: DateRange,
    /// Games that had public money, earliest first
    pub games: Vec<NormalizedGameSchedule>,
}

/// Team trends are not computed yet; the widget always shows these two
pub fn placeholder_team_trends() -> Vec<TeamTrend> {
    vec![
        TeamTrend {
            description: "Eagles rush offense".to_string(),
            matchup: "#1 vs #28 defense".to_string(),
        },
        TeamTrend {
            description: "Ravens home favorite".to_string(),
            matchup: "9-1 ATS L10".to_string(),
        },
    ]
}

pub fn sample_stats_widget() -> StatsWidgetData {
    StatsWidgetData {
        most_public: vec![
            MostPublicBet {
                bet_type: BetType::MoneylineHome,
                label: "Cowboys ML".to_string(),
                bets_pct: 75,
                dollars_pct: 80,
            },
            MostPublicBet {
                bet_type: BetType::SpreadHome,
                label: "Bills -7.5".to_string(),
                bets_pct: 80,
                dollars_pct: 90,
            },
        ],
        top_trends: vec![
            TopTrend {
                kind: TrendKind::VegasBacked,
                label: "Jets +3.5".to_string(),
                value: "80% value".to_string(),
            },
            TopTrend {
                kind: TrendKind::SharpMoney,
                label: "Giants ML".to_string(),
                value: "+65% difference".to_string(),
            },
        ],
        league: League::Nfl.code(),
        links: widget_links(League::Nfl),
        is_sample: true,
    }
}

pub fn sample_matchup_widget() -> MatchupWidgetData {
    MatchupWidgetData {
        referee_trends: vec![
            RefereeTrend {
                game: "LAR/SEA".to_string(),
                referee: "Johnson".to_string(),
                trend: "Under 8-2 L10".to_string(),
                percentage: 80,
            },
            RefereeTrend {
                game: "KC/BUF".to_string(),
                referee: "Smith".to_string(),
                trend: "Over 7-3 L10".to_string(),
                percentage: 70,
            },
        ],
        team_trends: placeholder_team_trends(),
        league: League::Nfl.code(),
        links: widget_links(League::Nfl),
        is_sample: true,
    }
}

/// Games ordered by kickoff, earliest first
fn by_kickoff<'a>(games: impl Iterator<Item = &'a Game>) -> Vec<&'a Game> {
    let mut keyed: Vec<_> = games
        .map(|g| (normalize_trendline_date(&g.game_date).0, g))
        .collect();
    keyed.sort_by_key(|(start, _)| *start);
    keyed.into_iter().map(|(_, g)| g).collect()
}

/// Builds widget payloads for one request.
///
/// Games are fetched at most once per league; the stats and matchup phases
/// share the fetch.
pub struct WidgetAggregator<'a> {
    client: &'a InsiderApiClient,
    now: NaiveDateTime,
    games: HashMap<League, Vec<Game>>,
}

impl<'a> WidgetAggregator<'a> {
    /// `now` is local wall-clock time; it picks the sport order and date windows
    pub fn new(client: &'a InsiderApiClient, now: NaiveDateTime) -> Self {
        Self {
            client,
            now,
            games: HashMap::new(),
        }
    }

    async fn games(&mut self, league: League) -> &[Game] {
        if !self.games.contains_key(&league) {
            let range = date_range_for_sport(league, self.now);
            let games = self.client.fetch_games(league, &range).await;
            self.games.insert(league, games);
        } else {
            debug!("Using cached {} games", league.code());
        }
        self.games.get(&league).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Public money for each game, concurrently, with the game odds merged in.
    /// Games without data are dropped.
    async fn public_money_for(
        &self,
        league: League,
        games: Vec<Game>,
    ) -> Vec<(Game, PublicMoneyData)> {
        let client = self.client;
        let fetches = games.into_iter().map(|game| async move {
            let pm = client.fetch_public_money(league, &game.game_id).await?;
            let pm = pm.with_game_odds(&game);
            Some((game, pm))
        });
        join_all(fetches).await.into_iter().flatten().collect()
    }

    async fn referee_stats_for(
        &self,
        league: League,
        games: Vec<Game>,
    ) -> Vec<(Game, Option<RefereeStats>)> {
        let client = self.client;
        let fetches = games.into_iter().map(|game| async move {
            let stats = client.fetch_referee_stats(league, &game.game_id).await;
            (game, stats)
        });
        join_all(fetches).await
    }

    pub async fn stats_widget_data(&mut self) -> StatsWidgetData {
        let leagues = sport_priority(self.now.weekday()).leagues();

        for league in leagues {
            let soonest: Vec<Game> = by_kickoff(self.games(league).await.iter())
                .into_iter()
                .take(STATS_GAME_LIMIT)
                .cloned()
                .collect();
            if soonest.is_empty() {
                continue;
            }

            let with_data = self.public_money_for(league, soonest).await;

            let mut most_public: Vec<MostPublicBet> = Vec::new();
            let mut trends: Vec<TopTrend> = Vec::new();
            for (game, pm) in &with_data {
                most_public.extend(find_most_public_bets(game, pm));
                trends.extend(find_top_trends(game, pm));
            }

            if most_public.is_empty() && trends.is_empty() {
                debug!("No public betting signals for {}", league.code());
                continue;
            }

            most_public.sort_by(|a, b| b.bets_pct.cmp(&a.bets_pct));
            most_public.truncate(WIDGET_ITEM_LIMIT);
            trends.truncate(WIDGET_ITEM_LIMIT);

            info!("Stats widget using {}", league.code());
            return StatsWidgetData {
                most_public,
                top_trends: trends,
                league: league.code(),
                links: widget_links(league),
                is_sample: false,
            };
        }

        info!("No league had public betting data, using sample");
        sample_stats_widget()
    }

    pub async fn matchup_widget_data(&mut self) -> MatchupWidgetData {
        let leagues = sport_priority(self.now.weekday()).leagues();

        for league in leagues {
            let soonest: Vec<Game> = by_kickoff(
                self.games(league)
                    .await
                    .iter()
                    .filter(|g| g.referee_id.is_some_and(|id| id != 0)),
            )
            .into_iter()
            .take(REFEREE_GAME_LIMIT)
            .cloned()
            .collect();
            if soonest.is_empty() {
                continue;
            }

            let with_stats = self.referee_stats_for(league, soonest).await;
            let referee_trends = find_top_referee_trends(&with_stats);
            if referee_trends.is_empty() {
                debug!("No referee trends for {}", league.code());
                continue;
            }

            info!("Matchup widget using {}", league.code());
            return MatchupWidgetData {
                referee_trends,
                team_trends: placeholder_team_trends(),
                league: league.code(),
                links: widget_links(league),
                is_sample: false,
            };
        }

        info!("No league had referee trends, using sample");
        sample_matchup_widget()
    }

    /// Every game in the league's window, analysed in one pass
    pub async fn public_betting(&mut self, league: League) -> PublicBettingData {
        let date_range = date_range_for_sport(league, self.now);
        let games: Vec<Game> = by_kickoff(self.games(league).await.iter())
            .into_iter()
            .cloned()
            .collect();

        let with_data = self.public_money_for(league, games).await;
        info!(
            "Fetched public money for {} {} games",
            with_data.len(),
            league.code()
        );

        let mut most_public = Vec::new();
        let mut trends = Vec::new();
        for (game, pm) in &with_data {
            most_public.extend(find_most_public_bets(game, pm));
            trends.extend(find_top_trends(game, pm));
        }
        most_public.sort_by(|a, b| b.bets_pct.cmp(&a.bets_pct));
        most_public.truncate(PUBLIC_BETTING_LIMIT);

        let of_kind = |kind: TrendKind| -> Vec<TopTrend> {
            trends
                .iter()
                .filter(|t| t.kind == kind)
                .take(PUBLIC_BETTING_LIMIT)
                .cloned()
                .collect()
        };

        PublicBettingData {
            most_public,
            sharp_money: of_kind(TrendKind::SharpMoney),
            vegas_backed: of_kind(TrendKind::VegasBacked),
            sport: league.code(),
            total_games: with_data.len(),
            date_range,
            games: with_data
                .iter()
                .map(|(game, _)| map_schedule_from_trendline(game, league.as_str()))
                .collect(),
        }
    }
}
