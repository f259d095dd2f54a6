use crate::api::espn_api::{value_to_i64, CompletedGame, GameSummary};
use crate::sync::warehouse_time_from_iso;
use serde::Serialize;
use std::collections::HashMap;

/// Per-player counting stats across passing, rushing and receiving
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatLine {
    pub pass_attempts: i64,
    pub pass_completions: i64,
    pub pass_yards: i64,
    pub pass_tds: i64,
    pub interceptions: i64,
    pub passer_rating: f64,
    pub rush_attempts: i64,
    pub rush_yards: i64,
    pub rush_tds: i64,
    pub longest_rush: i64,
    pub targets: i64,
    pub receptions: i64,
    pub receiving_yards: i64,
    pub receiving_tds: i64,
    pub longest_reception: i64,
}

impl StatLine {
    /// Keep the larger of each positive stat
    pub fn merge_max(&mut self, other: &StatLine) {
        fn take(dst: &mut i64, src: i64) {
            if src > 0 && src > *dst {
                *dst = src;
            }
        }

        take(&mut self.pass_attempts, other.pass_attempts);
        take(&mut self.pass_completions, other.pass_completions);
        take(&mut self.pass_yards, other.pass_yards);
        take(&mut self.pass_tds, other.pass_tds);
        take(&mut self.interceptions, other.interceptions);
        if other.passer_rating > 0.0 && other.passer_rating > self.passer_rating {
            self.passer_rating = other.passer_rating;
        }
        take(&mut self.rush_attempts, other.rush_attempts);
        take(&mut self.rush_yards, other.rush_yards);
        take(&mut self.rush_tds, other.rush_tds);
        take(&mut self.longest_rush, other.longest_rush);
        take(&mut self.targets, other.targets);
        take(&mut self.receptions, other.receptions);
        take(&mut self.receiving_yards, other.receiving_yards);
        take(&mut self.receiving_tds, other.receiving_tds);
        take(&mut self.longest_reception, other.longest_reception);
    }
}

/// Row in `nfl_box_scores_v2`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxScoreRow {
    pub game_id: String,
    pub season: i32,
    pub week: u32,
    pub game_time: String,
    pub player_id: i64,
    pub player_name: String,
    pub position: String,
    pub team_id: i64,
    pub is_home: u8,
    pub opponent_id: i64,
    #[serde(flatten)]
    pub stats: StatLine,
}

/// Leading integer of a stat cell: "22/31" -> 22, "1-7" -> 1, "--" -> 0
fn leading_int(cell: &str) -> i64 {
    let cell = cell.trim();
    let end = cell
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(cell.len());
    cell[..end].parse().unwrap_or(0)
}

fn leading_float(cell: &str) -> f64 {
    let cell = cell.trim();
    let end = cell
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(cell.len());
    cell[..end].parse().unwrap_or(0.0)
}

fn cell(stats: &[String], index: usize) -> &str {
    stats.get(index).map(String::as_str).unwrap_or("")
}

/// Parse one athlete's row from a box score table.
///
/// - passing: C/ATT, YDS, AVG, TD, INT, SACKS, QBR, RTG
/// - rushing: CAR, YDS, AVG, TD, LONG
/// - receiving: REC, YDS, AVG, TD, LONG, TGTS
///
/// Other tables contribute nothing.
pub fn parse_player_stats(category: &str, stats: &[String]) -> StatLine {
    let mut line = StatLine::default();

    match category {
        "passing" => {
            let mut split = cell(stats, 0).splitn(2, '/');
            line.pass_completions = leading_int(split.next().unwrap_or(""));
            line.pass_attempts = leading_int(split.next().unwrap_or(""));
            line.pass_yards = leading_int(cell(stats, 1));
            line.pass_tds = leading_int(cell(stats, 3));
            line.interceptions = leading_int(cell(stats, 4));
            line.passer_rating = leading_float(cell(stats, 7));
        }
        "rushing" => {
            line.rush_attempts = leading_int(cell(stats, 0));
            line.rush_yards = leading_int(cell(stats, 1));
            line.rush_tds = leading_int(cell(stats, 3));
            line.longest_rush = leading_int(cell(stats, 4));
        }
        "receiving" => {
            line.receptions = leading_int(cell(stats, 0));
            line.receiving_yards = leading_int(cell(stats, 1));
            line.receiving_tds = leading_int(cell(stats, 3));
            line.longest_reception = leading_int(cell(stats, 4));
            line.targets = leading_int(cell(stats, 5));
        }
        _ => {}
    }

    line
}

/// One row per player, merging the player's lines across stat tables.
/// Athletes without an id or name are skipped.
pub fn build_box_scores(game: &CompletedGame, summary: &GameSummary) -> Vec<BoxScoreRow> {
    let mut rows: Vec<BoxScoreRow> = Vec::new();
    let mut by_player: HashMap<i64, usize> = HashMap::new();

    let Some(boxscore) = &summary.boxscore else {
        return rows;
    };
    let game_time = warehouse_time_from_iso(&game.game_time);

    for team in &boxscore.players {
        let team_id = team.team.as_ref().map(|t| value_to_i64(&t.id)).unwrap_or(0);
        let is_home = team_id == game.home_team_id;

        for category in &team.statistics {
            for entry in &category.athletes {
                let Some(athlete) = &entry.athlete else {
                    continue;
                };
                let player_id = value_to_i64(&athlete.id);
                if player_id == 0 || athlete.display_name.is_empty() {
                    continue;
                }

                let stats = parse_player_stats(&category.name, &entry.stats);

                if let Some(&index) = by_player.get(&player_id) {
                    rows[index].stats.merge_max(&stats);
                    continue;
                }

                by_player.insert(player_id, rows.len());
                rows.push(BoxScoreRow {
                    game_id: game.espn_game_id.clone(),
                    season: game.season,
                    week: game.week,
                    game_time: game_time.clone(),
                    player_id,
                    player_name: athlete.display_name.clone(),
                    position: athlete
                        .position
                        .as_ref()
                        .map(|p| p.abbreviation.clone())
                        .unwrap_or_default(),
                    team_id,
                    is_home: u8::from(is_home),
                    opponent_id: if is_home {
                        game.away_team_id
                    } else {
                        game.home_team_id
                    },
                    stats,
                });
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn game() -> CompletedGame {
        CompletedGame {
            espn_game_id: "401".to_string(),
            game_time: "2025-10-12T17:00Z".to_string(),
            home_team_id: 2,
            away_team_id: 20,
            home_team_abbr: "BUF".to_string(),
            away_team_abbr: "NYJ".to_string(),
            home_score: 24,
            away_score: 17,
            season: 2025,
            week: 6,
        }
    }

    #[test]
    fn test_parse_passing() {
        let line = parse_player_stats(
            "passing",
            &strings(&["22/31", "263", "8.5", "2", "1", "1-7", "71.2", "118.4"]),
        );
        assert_eq!(line.pass_completions, 22);
        assert_eq!(line.pass_attempts, 31);
        assert_eq!(line.pass_yards, 263);
        assert_eq!(line.pass_tds, 2);
        assert_eq!(line.interceptions, 1);
        assert_eq!(line.passer_rating, 118.4);
    }

    #[test]
    fn test_parse_rushing_and_receiving() {
        let rush = parse_player_stats("rushing", &strings(&["18", "-3", "-0.2", "1", "12"]));
        assert_eq!(rush.rush_attempts, 18);
        assert_eq!(rush.rush_yards, -3);
        assert_eq!(rush.rush_tds, 1);
        assert_eq!(rush.longest_rush, 12);

        let rec = parse_player_stats("receiving", &strings(&["7", "88", "12.6", "0", "31", "10"]));
        assert_eq!(rec.receptions, 7);
        assert_eq!(rec.receiving_yards, 88);
        assert_eq!(rec.longest_reception, 31);
        assert_eq!(rec.targets, 10);
    }

    #[test]
    fn test_parse_short_and_garbage_rows() {
        let line = parse_player_stats("passing", &strings(&["--"]));
        assert_eq!(line, StatLine::default());

        let line = parse_player_stats("kicking", &strings(&["3/3", "50"]));
        assert_eq!(line, StatLine::default());
    }

    #[test]
    fn test_build_box_scores_merges_players() {
        let summary: GameSummary = serde_json::from_value(json!({
            "boxscore": { "players": [
                {
                    "team": { "id": "2" },
                    "statistics": [
                        { "name": "passing", "athletes": [{
                            "athlete": { "id": "100", "displayName": "Josh Allen", "position": { "abbreviation": "QB" } },
                            "stats": ["22/31", "263", "8.5", "2", "0", "1-7", "71.2", "118.4"]
                        }]},
                        { "name": "rushing", "athletes": [
                            {
                                "athlete": { "id": "100", "displayName": "Josh Allen" },
                                "stats": ["8", "45", "5.6", "1", "17"]
                            },
                            {
                                "athlete": { "id": "", "displayName": "Team" },
                                "stats": ["1", "-2", "-2.0", "0", "0"]
                            }
                        ]}
                    ]
                },
                {
                    "team": { "id": 20 },
                    "statistics": [
                        { "name": "receiving", "athletes": [{
                            "athlete": { "id": 200, "displayName": "Garrett Wilson", "position": { "abbreviation": "WR" } },
                            "stats": ["7", "88", "12.6", "0", "31", "10"]
                        }]}
                    ]
                }
            ]}
        }))
        .unwrap();

        let rows = build_box_scores(&game(), &summary);
        assert_eq!(rows.len(), 2);

        let allen = &rows[0];
        assert_eq!(allen.player_name, "Josh Allen");
        assert_eq!(allen.position, "QB");
        assert_eq!(allen.is_home, 1);
        assert_eq!(allen.opponent_id, 20);
        assert_eq!(allen.game_time, "2025-10-12 17:00:00");
        assert_eq!(allen.stats.pass_yards, 263);
        assert_eq!(allen.stats.rush_yards, 45);
        assert_eq!(allen.stats.rush_tds, 1);

        let wilson = &rows[1];
        assert_eq!(wilson.team_id, 20);
        assert_eq!(wilson.is_home, 0);
        assert_eq!(wilson.opponent_id, 2);
        assert_eq!(wilson.stats.targets, 10);

        let json = serde_json::to_value(allen).unwrap();
        assert_eq!(json["rush_yards"], 45);
        assert_eq!(json["player_id"], 100);
    }

    #[test]
    fn test_no_boxscore_is_empty() {
        assert!(build_box_scores(&game(), &GameSummary::default()).is_empty());
    }
}
