use crate::models::{Game, PublicMoneyData, Record, RefereeStats};
use crate::utils::normalize::team_nickname;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A side needs strictly more than this share of bets to count as "public"
pub const PUBLIC_BET_THRESHOLD: f64 = 55.0;
pub const MAX_PUBLIC_BETS: usize = 2;
/// RLM entries at or below this percentage are noise
pub const RLM_THRESHOLD: f64 = 30.0;
pub const MAX_TRENDS: usize = 2;
pub const MIN_REFEREE_GAMES: u32 = 10;
pub const MIN_BUCKET_SAMPLE: u32 = 10;
pub const REFEREE_TREND_PCT: f64 = 60.0;
pub const MAX_REFEREE_TRENDS: usize = 2;

/// One side of one market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    MoneylineAway,
    MoneylineHome,
    SpreadAway,
    SpreadHome,
    Over,
    Under,
}

impl BetType {
    pub const ALL: [BetType; 6] = [
        BetType::MoneylineAway,
        BetType::MoneylineHome,
        BetType::SpreadAway,
        BetType::SpreadHome,
        BetType::Over,
        BetType::Under,
    ];

    /// Parse the provider's `bet_type` strings ("moneyline_home", "spread_away", "over", ...)
    pub fn parse(raw: &str) -> Option<BetType> {
        let raw = raw.trim().to_lowercase();
        let home = raw.contains("home");

        if raw.contains("moneyline") {
            Some(if home {
                BetType::MoneylineHome
            } else {
                BetType::MoneylineAway
            })
        } else if raw.contains("spread") {
            Some(if home {
                BetType::SpreadHome
            } else {
                BetType::SpreadAway
            })
        } else if raw == "over" {
            Some(BetType::Over)
        } else if raw == "under" {
            Some(BetType::Under)
        } else {
            None
        }
    }

    /// (bets %, stake %) for this side
    pub fn percentages(&self, pm: &PublicMoneyData) -> (f64, f64) {
        match self {
            BetType::MoneylineAway => (
                pm.public_money_ml_away_bets_pct,
                pm.public_money_ml_away_stake_pct,
            ),
            BetType::MoneylineHome => (
                pm.public_money_ml_home_bets_pct,
                pm.public_money_ml_home_stake_pct,
            ),
            BetType::SpreadAway => (
                pm.public_money_spread_away_bets_pct,
                pm.public_money_spread_away_stake_pct,
            ),
            BetType::SpreadHome => (
                pm.public_money_spread_home_bets_pct,
                pm.public_money_spread_home_stake_pct,
            ),
            BetType::Over => (pm.public_money_over_bets_pct, pm.public_money_over_stake_pct),
            BetType::Under => (
                pm.public_money_under_bets_pct,
                pm.public_money_under_stake_pct,
            ),
        }
    }

    /// Display label: "Chiefs ML", "Bills -7.5", "Jets @ Bills Over"
    pub fn label(&self, game: &Game, pm: &PublicMoneyData) -> String {
        match self {
            BetType::MoneylineAway => format!("{} ML", game.away_team),
            BetType::MoneylineHome => format!("{} ML", game.home_team),
            BetType::SpreadAway => {
                format!("{} {}", game.away_team, spread_label(pm.away_team_point_spread))
            }
            BetType::SpreadHome => {
                format!("{} {}", game.home_team, spread_label(pm.home_team_point_spread))
            }
            BetType::Over => format!("{} Over", game.name),
            BetType::Under => format!("{} Under", game.name),
        }
    }
}

fn spread_label(spread: f64) -> String {
    if spread > 0.0 {
        format!("+{}", spread)
    } else {
        spread.to_string()
    }
}

/// Label for a raw provider bet type; unknown types are shown as-is
fn bet_label(game: &Game, raw_bet_type: &str, pm: &PublicMoneyData) -> String {
    match BetType::parse(raw_bet_type) {
        Some(bet_type) => bet_type.label(game, pm),
        None => raw_bet_type.to_string(),
    }
}

fn round_pct(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// A market side carrying a lopsided share of public bets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MostPublicBet {
    pub bet_type: BetType,
    pub label: String,
    pub bets_pct: u32,
    pub dollars_pct: u32,
}

impl MostPublicBet {
    pub fn format(&self) -> String {
        format!(
            "{} | Bets: {}% | Money: {}%",
            self.label, self.bets_pct, self.dollars_pct
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendKind {
    SharpMoney,
    VegasBacked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTrend {
    #[serde(rename = "type")]
    pub kind: TrendKind,
    pub label: String,
    pub value: String,
}

impl TopTrend {
    pub fn format(&self) -> String {
        let kind = match self.kind {
            TrendKind::SharpMoney => "Sharp money",
            TrendKind::VegasBacked => "Vegas backed",
        };
        format!("{}: {} ({})", kind, self.label, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefereeTrend {
    pub game: String,
    pub referee: String,
    pub trend: String,
    pub percentage: u32,
}

impl RefereeTrend {
    pub fn format(&self) -> String {
        format!(
            "{} | Ref {} | {} ({}%)",
            self.game, self.referee, self.trend, self.percentage
        )
    }
}

/// Sides with more than 55% of bets, highest first, at most two
pub fn find_most_public_bets(game: &Game, pm: &PublicMoneyData) -> Vec<MostPublicBet> {
    let mut candidates: Vec<(BetType, f64, f64)> = BetType::ALL
        .iter()
        .map(|bet_type| {
            let (bets, dollars) = bet_type.percentages(pm);
            (*bet_type, bets, dollars)
        })
        .filter(|(_, bets, _)| *bets > PUBLIC_BET_THRESHOLD)
        .collect();

    candidates.sort_by(|a, b| descending(a.1, b.1));

    candidates
        .into_iter()
        .take(MAX_PUBLIC_BETS)
        .map(|(bet_type, bets, dollars)| MostPublicBet {
            bet_type,
            label: bet_type.label(game, pm),
            bets_pct: round_pct(bets),
            dollars_pct: round_pct(dollars),
        })
        .collect()
}

/// Strongest sharp-money signal and strongest RLM signal for a game
pub fn find_top_trends(game: &Game, pm: &PublicMoneyData) -> Vec<TopTrend> {
    let mut trends = Vec::new();

    let sharp_value = |value: Option<f64>, difference: Option<f64>| {
        value
            .filter(|v| *v != 0.0)
            .or(difference.filter(|d| *d != 0.0))
            .unwrap_or(0.0)
    };

    let mut sharp_bets: Vec<_> = pm
        .sharp_money_stats
        .iter()
        .filter(|stat| {
            let level = stat.sharpness_level.to_lowercase();
            level.contains("sharp") || level.contains("big bettor")
        })
        .collect();
    sharp_bets.sort_by(|a, b| {
        descending(
            sharp_value(a.sharpness_level_value, a.difference),
            sharp_value(b.sharpness_level_value, b.difference),
        )
    });

    if let Some(top) = sharp_bets.first() {
        let value = match top.sharpness_level_value.filter(|v| *v != 0.0) {
            Some(v) => format!("{:.1}% value", v),
            None => top.sharpness_level.clone(),
        };
        trends.push(TopTrend {
            kind: TrendKind::SharpMoney,
            label: bet_label(game, &top.bet_type, pm),
            value,
        });
    }

    let mut rlm_bets: Vec<_> = pm
        .rlm_stats
        .iter()
        .filter(|stat| stat.percentage > RLM_THRESHOLD)
        .collect();
    rlm_bets.sort_by(|a, b| descending(a.percentage, b.percentage));

    if let Some(top) = rlm_bets.first() {
        trends.push(TopTrend {
            kind: TrendKind::VegasBacked,
            label: bet_label(game, &top.bet_type, pm),
            value: format!("RLM {:.1}%", top.percentage),
        });
    }

    trends.truncate(MAX_TRENDS);
    trends
}

/// Calendar day of a game in the provider's local time
fn game_day(game: &Game) -> Option<NaiveDate> {
    game.game_date
        .trim()
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

/// Named win/loss buckets checked for each referee
fn referee_buckets(stats: &RefereeStats) -> Vec<(String, Record)> {
    let ou = &stats.over_under.over_under;
    let range = &stats.over_under.over_under_range;
    let spread = &stats.spread.spread;
    let ml = &stats.moneyline.ml;

    let mut buckets = vec![
        ("Over", ou.over_record()),
        ("Under", ou.under_record()),
        ("Over if Home Fav", ou.home_favorite),
        ("Over if Home Dog", ou.home_underdog),
        ("ATS", Record::new(spread.ats_wins, spread.ats_losses)),
        (
            "Home Fav ATS",
            Record::new(spread.home_favorite_wins, spread.home_favorite_losses),
        ),
        (
            "Home Dog ATS",
            Record::new(spread.home_underdog_wins, spread.home_underdog_losses),
        ),
        (
            "Away Fav ATS",
            Record::new(spread.away_favorite_wins, spread.away_favorite_losses),
        ),
        (
            "Away Dog ATS",
            Record::new(spread.away_underdog_wins, spread.away_underdog_losses),
        ),
        ("Home ML", Record::new(ml.home_ml_wins, ml.home_ml_losses)),
        (
            "Home Fav ML",
            Record::new(ml.home_favorite_wins, ml.home_favorite_losses),
        ),
        (
            "Home Dog ML",
            Record::new(ml.home_underdog_wins, ml.home_underdog_losses),
        ),
    ]
    .into_iter()
    .map(|(name, record)| (name.to_string(), record))
    .collect::<Vec<_>>();

    let band = range.ou_range.trim();
    if !band.is_empty() {
        buckets.push((
            format!("Over {}", band),
            Record::new(range.ou_range_wins, range.ou_range_losses),
        ));
    }

    buckets
}

/// Referee buckets hitting at least 60% over at least 10 games, for the
/// earliest slate in `games`. Returns the two strongest.
pub fn find_top_referee_trends(games: &[(Game, Option<RefereeStats>)]) -> Vec<RefereeTrend> {
    let Some(earliest) = games.iter().filter_map(|(game, _)| game_day(game)).min() else {
        return Vec::new();
    };

    let mut trends = Vec::new();

    for (game, stats) in games {
        let Some(stats) = stats else { continue };
        if game_day(game) != Some(earliest) {
            continue;
        }
        if stats.total_games < MIN_REFEREE_GAMES {
            continue;
        }

        let matchup = format!(
            "{}/{}",
            team_nickname(&game.away_team),
            team_nickname(&game.home_team)
        );
        let referee = stats
            .referee_name
            .as_deref()
            .or(game.referee_name.as_deref())
            .map(team_nickname)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        for (name, record) in referee_buckets(stats) {
            if record.sample() < MIN_BUCKET_SAMPLE || record.win_pct() < REFEREE_TREND_PCT {
                continue;
            }
            trends.push((
                record.win_pct(),
                RefereeTrend {
                    game: matchup.clone(),
                    referee: referee.clone(),
                    trend: format!(
                        "{} {}-{} L{}",
                        name,
                        record.wins,
                        record.losses,
                        record.sample()
                    ),
                    percentage: round_pct(record.win_pct()),
                },
            ));
        }
    }

    // Rank on the unrounded rate, two buckets can round to the same percentage
    trends.sort_by(|a, b| descending(a.0, b.0));
    trends
        .into_iter()
        .take(MAX_REFEREE_TRENDS)
        .map(|(_, trend)| trend)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OverUnderCounts, RlmIndicator, SharpMoneyIndicator};
    use serde_json::json;

    fn game() -> Game {
        Game {
            game_id: "g1".to_string(),
            name: "Jets @ Bills".to_string(),
            game_date: "2025-10-01T13:00:00Z".to_string(),
            away_team: "New York Jets".to_string(),
            home_team: "Buffalo Bills".to_string(),
            ..Default::default()
        }
    }

    fn game_on(date: &str, away: &str, home: &str) -> Game {
        Game {
            game_date: format!("{}T20:15:00Z", date),
            away_team: away.to_string(),
            home_team: home.to_string(),
            ..Default::default()
        }
    }

    fn flat_public_money(pct: f64) -> PublicMoneyData {
        PublicMoneyData {
            public_money_ml_away_bets_pct: pct,
            public_money_ml_home_bets_pct: pct,
            public_money_spread_away_bets_pct: pct,
            public_money_spread_home_bets_pct: pct,
            public_money_over_bets_pct: pct,
            public_money_under_bets_pct: pct,
            ..Default::default()
        }
    }

    fn referee(name: &str, total_games: u32, over: u32, under: u32) -> RefereeStats {
        let mut stats = RefereeStats {
            referee_name: Some(name.to_string()),
            total_games,
            ..Default::default()
        };
        stats.over_under.over_under = OverUnderCounts::from_hits(over, under);
        stats
    }

    #[test]
    fn test_no_public_bets_at_or_below_threshold() {
        let pm = flat_public_money(55.0);
        assert!(find_most_public_bets(&game(), &pm).is_empty());

        let pm = flat_public_money(40.0);
        assert!(find_most_public_bets(&game(), &pm).is_empty());
    }

    #[test]
    fn test_most_public_example() {
        let mut pm = flat_public_money(50.0);
        pm.public_money_spread_home_bets_pct = 72.0;
        pm.public_money_spread_home_stake_pct = 80.4;
        pm.public_money_ml_away_bets_pct = 61.0;
        pm.home_team_point_spread = -7.5;

        let bets = find_most_public_bets(&game(), &pm);
        assert_eq!(bets.len(), 2);
        assert_eq!(bets[0].bet_type, BetType::SpreadHome);
        assert_eq!(bets[0].bets_pct, 72);
        assert_eq!(bets[0].dollars_pct, 80);
        assert_eq!(bets[0].label, "Buffalo Bills -7.5");
        assert_eq!(bets[1].bet_type, BetType::MoneylineAway);
        assert_eq!(bets[1].bets_pct, 61);
        assert_eq!(bets[1].label, "New York Jets ML");
    }

    #[test]
    fn test_most_public_capped_and_sorted() {
        let mut pm = flat_public_money(56.0);
        pm.public_money_over_bets_pct = 90.0;
        pm.public_money_under_bets_pct = 70.0;

        let bets = find_most_public_bets(&game(), &pm);
        assert_eq!(bets.len(), 2);
        assert!(bets[0].bets_pct >= bets[1].bets_pct);
        assert_eq!(bets[0].label, "Jets @ Bills Over");
        assert_eq!(bets[1].label, "Jets @ Bills Under");
    }

    #[test]
    fn test_spread_labels() {
        let mut pm = PublicMoneyData::default();
        pm.away_team_point_spread = 3.0;
        assert_eq!(BetType::SpreadAway.label(&game(), &pm), "New York Jets +3");
        pm.away_team_point_spread = 0.0;
        assert_eq!(BetType::SpreadAway.label(&game(), &pm), "New York Jets 0");
    }

    #[test]
    fn test_bet_type_parse() {
        assert_eq!(BetType::parse("moneyline_home"), Some(BetType::MoneylineHome));
        assert_eq!(BetType::parse("Spread_Away"), Some(BetType::SpreadAway));
        assert_eq!(BetType::parse("over"), Some(BetType::Over));
        assert_eq!(BetType::parse("team_total"), None);
    }

    #[test]
    fn test_rlm_below_threshold_never_appears() {
        let pm = PublicMoneyData {
            rlm_stats: vec![
                RlmIndicator {
                    bet_type: "over".to_string(),
                    percentage: 30.0,
                    ..Default::default()
                },
                RlmIndicator {
                    bet_type: "under".to_string(),
                    percentage: 12.0,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert!(find_top_trends(&game(), &pm).is_empty());
    }

    #[test]
    fn test_top_trends_pick_strongest_of_each_kind() {
        let pm = PublicMoneyData {
            home_team_point_spread: -3.5,
            sharp_money_stats: vec![
                SharpMoneyIndicator {
                    bet_type: "moneyline_away".to_string(),
                    sharpness_level: "Big Bettor".to_string(),
                    difference: Some(20.0),
                    ..Default::default()
                },
                SharpMoneyIndicator {
                    bet_type: "spread_home".to_string(),
                    sharpness_level: "Very SHARP".to_string(),
                    sharpness_level_value: Some(34.26),
                    ..Default::default()
                },
                SharpMoneyIndicator {
                    bet_type: "over".to_string(),
                    sharpness_level: "Square".to_string(),
                    sharpness_level_value: Some(99.0),
                    ..Default::default()
                },
            ],
            rlm_stats: vec![
                RlmIndicator {
                    bet_type: "under".to_string(),
                    percentage: 41.26,
                    ..Default::default()
                },
                RlmIndicator {
                    bet_type: "over".to_string(),
                    percentage: 64.0,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let trends = find_top_trends(&game(), &pm);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].kind, TrendKind::SharpMoney);
        assert_eq!(trends[0].label, "Buffalo Bills -3.5");
        assert_eq!(trends[0].value, "34.3% value");
        assert_eq!(trends[1].kind, TrendKind::VegasBacked);
        assert_eq!(trends[1].label, "Jets @ Bills Over");
        assert_eq!(trends[1].value, "RLM 64.0%");
    }

    #[test]
    fn test_sharp_without_value_uses_level_text() {
        let pm = PublicMoneyData {
            sharp_money_stats: vec![SharpMoneyIndicator {
                bet_type: "moneyline_home".to_string(),
                sharpness_level: "Big bettor".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let trends = find_top_trends(&game(), &pm);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].value, "Big bettor");
        assert_eq!(trends[0].label, "Buffalo Bills ML");
    }

    #[test]
    fn test_referee_with_small_sample_never_appears() {
        let games = vec![(
            game_on("2025-10-01", "Los Angeles Rams", "Seattle Seahawks"),
            Some(referee("Bill Vinovich", 9, 9, 0)),
        )];
        assert!(find_top_referee_trends(&games).is_empty());
    }

    #[test]
    fn test_referee_below_sixty_percent_never_appears() {
        let games = vec![(
            game_on("2025-10-01", "Los Angeles Rams", "Seattle Seahawks"),
            Some(referee("Bill Vinovich", 20, 11, 9)),
        )];
        assert!(find_top_referee_trends(&games).is_empty());
    }

    #[test]
    fn test_referee_over_trend() {
        let games = vec![(
            game_on("2025-10-01", "Los Angeles Rams", "Seattle Seahawks"),
            Some(referee("Bill Vinovich", 12, 8, 2)),
        )];
        let trends = find_top_referee_trends(&games);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].game, "Rams/Seahawks");
        assert_eq!(trends[0].referee, "Vinovich");
        assert_eq!(trends[0].trend, "Over 8-2 L10");
        assert_eq!(trends[0].percentage, 80);
    }

    #[test]
    fn test_referee_bucket_needs_its_own_sample() {
        let mut stats = referee("Shawn Smith", 40, 5, 5);
        // 8-1 ATS is 89% but only nine games
        stats.spread.spread.ats_wins = 8;
        stats.spread.spread.ats_losses = 1;
        stats.moneyline.ml.home_ml_wins = 13;
        stats.moneyline.ml.home_ml_losses = 7;

        let games = vec![(game_on("2025-10-01", "A Jets", "B Bills"), Some(stats))];
        let trends = find_top_referee_trends(&games);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].trend, "Home ML 13-7 L20");
        assert_eq!(trends[0].percentage, 65);
    }

    #[test]
    fn test_referee_only_earliest_date_counts() {
        let games = vec![
            (
                game_on("2025-10-01", "Kansas City Chiefs", "Buffalo Bills"),
                Some(referee("Carl Cheffers", 15, 6, 6)),
            ),
            (
                game_on("2025-10-03", "Los Angeles Rams", "Seattle Seahawks"),
                Some(referee("Brad Allen", 20, 18, 2)),
            ),
        ];
        assert!(find_top_referee_trends(&games).is_empty());
    }

    #[test]
    fn test_referee_trends_pooled_and_capped() {
        let mut public_split = referee("Alex Kemp", 30, 7, 3);
        public_split.over_under.over_under.home_underdog = Record::new(10, 2);

        let games = vec![
            (
                game_on("2025-10-01", "Kansas City Chiefs", "Buffalo Bills"),
                Some(referee("Carl Cheffers", 15, 6, 6)),
            ),
            (
                game_on("2025-10-01", "Los Angeles Rams", "Seattle Seahawks"),
                Some(public_split),
            ),
            (
                game_on("2025-10-01", "New York Jets", "Miami Dolphins"),
                Some(referee("Brad Allen", 20, 3, 13)),
            ),
            (game_on("2025-10-01", "Detroit Lions", "Chicago Bears"), None),
        ];

        let trends = find_top_referee_trends(&games);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].trend, "Over if Home Dog 10-2 L12");
        assert_eq!(trends[0].percentage, 83);
        assert_eq!(trends[1].trend, "Under 13-3 L16");
        assert_eq!(trends[1].referee, "Allen");
    }

    #[test]
    fn test_referee_trends_rank_on_unrounded_rate() {
        let mut stats = referee("Scott Novak", 100, 5, 5);
        // 61-32 is 65.6% and 83-42 is 66.4%, both shown as 66
        stats.spread.spread.ats_wins = 61;
        stats.spread.spread.ats_losses = 32;
        stats.moneyline.ml.home_ml_wins = 83;
        stats.moneyline.ml.home_ml_losses = 42;

        let games = vec![(game_on("2025-10-01", "A Jets", "B Bills"), Some(stats))];
        let trends = find_top_referee_trends(&games);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].trend, "Home ML 83-42 L125");
        assert_eq!(trends[1].trend, "ATS 61-32 L93");
        assert_eq!(trends[0].percentage, 66);
        assert_eq!(trends[1].percentage, 66);
    }

    #[test]
    fn test_referee_trends_from_provider_payload() {
        let stats: RefereeStats = serde_json::from_value(json!({
            "referee_id": 8,
            "referee_name": "Clete Blakeman",
            "total_games": 40,
            "over_under": {
                "over_under": {
                    "over_hits": 19,
                    "under_hits": 21,
                    "over_percentage": 47.5,
                    "under_percentage": 52.5,
                    "home_favorite": { "wins": 12, "losses": 14 },
                    "home_underdog": { "wins": 7, "losses": 7 }
                },
                "over_under_range": {
                    "ou_range": "44-47.5",
                    "ou_range_wins": 10,
                    "ou_range_losses": 4
                }
            },
            "spread": {
                "spread": {
                    "ats_wins": 20,
                    "ats_losses": 19,
                    "home_favorite_wins": 13,
                    "home_favorite_losses": 12,
                    "home_underdog_wins": 7,
                    "home_underdog_losses": 7
                },
                "spread_range": {
                    "home_spread_range": "-3 to -6.5",
                    "home_spread_range_wins": 6,
                    "home_spread_range_losses": 6
                }
            },
            "moneyline": {
                "ml": {
                    "home_ml_wins": "30",
                    "home_ml_losses": 10,
                    "home_favorite_wins": 24,
                    "home_favorite_losses": 6,
                    "home_underdog_wins": 5,
                    "home_underdog_losses": 5
                },
                "ml_range": {
                    "home_ml_range": "-150 to -200",
                    "home_ml_range_wins": 8,
                    "home_ml_range_losses": 3
                }
            }
        }))
        .unwrap();

        let games = vec![(
            game_on("2025-10-05", "Dallas Cowboys", "Green Bay Packers"),
            Some(stats),
        )];
        let trends = find_top_referee_trends(&games);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].game, "Cowboys/Packers");
        assert_eq!(trends[0].referee, "Blakeman");
        assert_eq!(trends[0].trend, "Home Fav ML 24-6 L30");
        assert_eq!(trends[0].percentage, 80);
        assert_eq!(trends[1].trend, "Home ML 30-10 L40");
        assert_eq!(trends[1].percentage, 75);
    }

    #[test]
    fn test_referee_over_splits_from_provider_payload() {
        let stats: RefereeStats = serde_json::from_value(json!({
            "referee_name": "Land Clark",
            "total_games": 28,
            "over_under": {
                "over_under": {
                    "over_hits": 14,
                    "under_hits": 14,
                    "home_favorite": { "wins": 3, "losses": 11 },
                    "home_underdog": { "wins": 11, "losses": 3 }
                },
                "over_under_range": {
                    "ou_range": "40-43.5",
                    "ou_range_wins": 10,
                    "ou_range_losses": 4
                }
            },
            "spread": { "spread": { "ats_wins": 14, "ats_losses": 14 } },
            "moneyline": { "ml": {} }
        }))
        .unwrap();

        let games = vec![(
            game_on("2025-10-05", "Denver Broncos", "New York Giants"),
            Some(stats),
        )];
        let trends = find_top_referee_trends(&games);
        let names: Vec<&str> = trends.iter().map(|t| t.trend.as_str()).collect();
        assert_eq!(
            names,
            vec!["Over if Home Dog 11-3 L14", "Over 40-43.5 10-4 L14"]
        );
        assert_eq!(trends[0].percentage, 79);
        assert_eq!(trends[1].percentage, 71);
    }
}
