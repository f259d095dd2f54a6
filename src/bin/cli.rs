use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use insider_sync::api::insider_api::InsiderApiClient;
use insider_sync::config::Config;
use insider_sync::widgets::{PublicBettingData, WidgetAggregator};
use insider_sync::{fetch_widget_data, logging, run_upcoming_sync, run_weekly_sync, League};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "cli", about = "Betting insider widgets and warehouse sync")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the stats and matchup widgets for today's slate
    Widgets,
    /// Print the full public-betting board for one sport
    PublicBetting {
        /// nfl, nba, mlb, nhl, cfb or cbb
        sport: String,
        /// Also write every row to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Refresh upcoming NFL games and line snapshots
    SyncUpcoming {
        /// Skip player prop snapshots
        #[arg(long)]
        no_props: bool,
    },
    /// Ingest box scores for a completed NFL week
    WeeklySync {
        #[arg(long)]
        season: Option<i32>,
        #[arg(long)]
        week: Option<u32>,
    },
}

/// One line of the public-betting CSV export
#[derive(Debug, Serialize)]
struct BoardRow<'a> {
    sport: &'a str,
    section: &'static str,
    label: &'a str,
    bets_pct: Option<u32>,
    dollars_pct: Option<u32>,
    value: Option<&'a str>,
}

fn board_rows(board: &PublicBettingData) -> Vec<BoardRow<'_>> {
    let mut rows: Vec<BoardRow> = board
        .most_public
        .iter()
        .map(|bet| BoardRow {
            sport: &board.sport,
            section: "most_public",
            label: &bet.label,
            bets_pct: Some(bet.bets_pct),
            dollars_pct: Some(bet.dollars_pct),
            value: None,
        })
        .collect();

    for (section, trends) in [
        ("sharp_money", &board.sharp_money),
        ("vegas_backed", &board.vegas_backed),
    ] {
        rows.extend(trends.iter().map(|trend| BoardRow {
            sport: &board.sport,
            section,
            label: &trend.label,
            bets_pct: None,
            dollars_pct: None,
            value: Some(trend.value.as_str()),
        }));
    }

    rows
}

fn save_board_to_csv(board: &PublicBettingData, path: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
    let rows = board_rows(board);
    for row in &rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV file")?;
    Ok(rows.len())
}

async fn print_widgets(config: &Config) -> Result<()> {
    let client = InsiderApiClient::from_config(config)?;
    let data = fetch_widget_data(&client, Local::now().naive_local()).await;

    let sample = |is_sample: bool| if is_sample { " (sample data)" } else { "" };

    println!("PUBLIC BETTING - {}{}\n", data.stats.league, sample(data.stats.is_sample));
    println!("MOST PUBLIC\n");
    for (i, bet) in data.stats.most_public.iter().enumerate() {
        println!("{}. {}", i + 1, bet.format());
    }
    println!("\nTOP TRENDS\n");
    for (i, trend) in data.stats.top_trends.iter().enumerate() {
        println!("{}. {}", i + 1, trend.format());
    }

    println!(
        "\nMATCHUP TRENDS - {}{}\n",
        data.matchup.league,
        sample(data.matchup.is_sample)
    );
    for (i, trend) in data.matchup.referee_trends.iter().enumerate() {
        println!("{}. {}", i + 1, trend.format());
    }
    for trend in &data.matchup.team_trends {
        println!("   {} ({})", trend.description, trend.matchup);
    }

    Ok(())
}

async fn print_public_betting(config: &Config, sport: &str, csv: Option<&Path>) -> Result<()> {
    let league: League = sport.parse()?;
    let client = InsiderApiClient::from_config(config)?;
    let board = WidgetAggregator::new(&client, Local::now().naive_local())
        .public_betting(league)
        .await;

    println!(
        "{} PUBLIC BETTING ({} to {}, {} games with data)\n",
        board.sport,
        board.date_range.from_param(),
        board.date_range.to_param(),
        board.total_games
    );

    for game in &board.games {
        println!("  {} @ {} ({})", game.away_team, game.home_team, game.start_time_label);
    }

    println!("\nMOST PUBLIC\n");
    if board.most_public.is_empty() {
        println!("No lopsided public bets found.");
    }
    for (i, bet) in board.most_public.iter().enumerate() {
        println!("{}. {}", i + 1, bet.format());
    }

    for (title, trends) in [
        ("SHARP MONEY", &board.sharp_money),
        ("VEGAS BACKED", &board.vegas_backed),
    ] {
        println!("\n{}\n", title);
        if trends.is_empty() {
            println!("None.");
        }
        for (i, trend) in trends.iter().enumerate() {
            println!("{}. {} ({})", i + 1, trend.label, trend.value);
        }
    }

    if let Some(path) = csv {
        let written = save_board_to_csv(&board, path)?;
        println!("\nSaved {} rows to {}", written, path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    logging::init();

    match cli.command {
        Command::Widgets => print_widgets(&config).await?,
        Command::PublicBetting { sport, csv } => {
            print_public_betting(&config, &sport, csv.as_deref()).await?
        }
        Command::SyncUpcoming { no_props } => {
            let report = run_upcoming_sync(&config, !no_props)
                .await
                .context("Upcoming games sync failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::WeeklySync { season, week } => {
            let report = run_weekly_sync(&config, season, week)
                .await
                .context("Weekly sync failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insider_sync::utils::analyzer::{BetType, MostPublicBet, TopTrend, TrendKind};
    use insider_sync::utils::sport_selector::DateRange;

    fn board() -> PublicBettingData {
        PublicBettingData {
            most_public: vec![MostPublicBet {
                bet_type: BetType::SpreadHome,
                label: "Buffalo Bills -7.5".to_string(),
                bets_pct: 72,
                dollars_pct: 80,
            }],
            sharp_money: vec![TopTrend {
                kind: TrendKind::SharpMoney,
                label: "New York Jets ML".to_string(),
                value: "34.3% value".to_string(),
            }],
            vegas_backed: vec![],
            sport: "NFL".to_string(),
            total_games: 1,
            date_range: DateRange {
                from: NaiveDate::from_ymd_opt(2025, 10, 9).unwrap(),
                to: NaiveDate::from_ymd_opt(2025, 10, 13).unwrap(),
            },
            games: vec![],
        }
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["cli", "public-betting", "nba", "--csv", "out.csv"]);
        match cli.command {
            Command::PublicBetting { sport, csv } => {
                assert_eq!(sport, "nba");
                assert_eq!(csv, Some(PathBuf::from("out.csv")));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from(["cli", "weekly-sync", "--season", "2025", "--week", "6"]);
        assert!(matches!(
            cli.command,
            Command::WeeklySync {
                season: Some(2025),
                week: Some(6)
            }
        ));

        let cli = Cli::parse_from(["cli", "sync-upcoming", "--no-props"]);
        assert!(matches!(cli.command, Command::SyncUpcoming { no_props: true }));
    }

    #[test]
    fn test_board_csv_export() {
        let path = std::env::temp_dir().join(format!("board-{}.csv", std::process::id()));
        let written = save_board_to_csv(&board(), &path).unwrap();
        assert_eq!(written, 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("sport,section,label,bets_pct,dollars_pct,value")
        );
        assert_eq!(lines.next(), Some("NFL,most_public,Buffalo Bills -7.5,72,80,"));
        assert_eq!(
            lines.next(),
            Some("NFL,sharp_money,New York Jets ML,,,34.3% value")
        );
    }
}
