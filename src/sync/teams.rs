#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conference {
    Afc,
    Nfc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Division {
    AfcEast,
    AfcNorth,
    AfcSouth,
    AfcWest,
    NfcEast,
    NfcNorth,
    NfcSouth,
    NfcWest,
}

impl Division {
    pub fn conference(&self) -> Conference {
        match self {
            Division::AfcEast | Division::AfcNorth | Division::AfcSouth | Division::AfcWest => {
                Conference::Afc
            }
            Division::NfcEast | Division::NfcNorth | Division::NfcSouth | Division::NfcWest => {
                Conference::Nfc
            }
        }
    }
}

/// An NFL franchise keyed by its ESPN team id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NflTeam {
    pub id: i64,
    /// Full name as the odds feed spells it
    pub name: &'static str,
    pub abbr: &'static str,
    pub division: Division,
}

const fn team(id: i64, name: &'static str, abbr: &'static str, division: Division) -> NflTeam {
    NflTeam {
        id,
        name,
        abbr,
        division,
    }
}

use Division::*;

pub const NFL_TEAMS: [NflTeam; 32] = [
    team(2, "Buffalo Bills", "BUF", AfcEast),
    team(15, "Miami Dolphins", "MIA", AfcEast),
    team(17, "New England Patriots", "NE", AfcEast),
    team(20, "New York Jets", "NYJ", AfcEast),
    team(33, "Baltimore Ravens", "BAL", AfcNorth),
    team(4, "Cincinnati Bengals", "CIN", AfcNorth),
    team(5, "Cleveland Browns", "CLE", AfcNorth),
    team(23, "Pittsburgh Steelers", "PIT", AfcNorth),
    team(34, "Houston Texans", "HOU", AfcSouth),
    team(11, "Indianapolis Colts", "IND", AfcSouth),
    team(30, "Jacksonville Jaguars", "JAX", AfcSouth),
    team(10, "Tennessee Titans", "TEN", AfcSouth),
    team(7, "Denver Broncos", "DEN", AfcWest),
    team(12, "Kansas City Chiefs", "KC", AfcWest),
    team(24, "Los Angeles Chargers", "LAC", AfcWest),
    team(13, "Las Vegas Raiders", "LV", AfcWest),
    team(6, "Dallas Cowboys", "DAL", NfcEast),
    team(19, "New York Giants", "NYG", NfcEast),
    team(21, "Philadelphia Eagles", "PHI", NfcEast),
    team(28, "Washington Commanders", "WAS", NfcEast),
    team(3, "Chicago Bears", "CHI", NfcNorth),
    team(8, "Detroit Lions", "DET", NfcNorth),
    team(9, "Green Bay Packers", "GB", NfcNorth),
    team(16, "Minnesota Vikings", "MIN", NfcNorth),
    team(1, "Atlanta Falcons", "ATL", NfcSouth),
    team(29, "Carolina Panthers", "CAR", NfcSouth),
    team(18, "New Orleans Saints", "NO", NfcSouth),
    team(27, "Tampa Bay Buccaneers", "TB", NfcSouth),
    team(22, "Arizona Cardinals", "ARI", NfcWest),
    team(14, "Los Angeles Rams", "LAR", NfcWest),
    team(25, "San Francisco 49ers", "SF", NfcWest),
    team(26, "Seattle Seahawks", "SEA", NfcWest),
];

pub fn team_by_name(name: &str) -> Option<&'static NflTeam> {
    NFL_TEAMS.iter().find(|t| t.name == name)
}

pub fn team_by_id(id: i64) -> Option<&'static NflTeam> {
    NFL_TEAMS.iter().find(|t| t.id == id)
}

pub fn is_division_game(home: &NflTeam, away: &NflTeam) -> bool {
    home.division == away.division
}

pub fn is_conference_game(home: &NflTeam, away: &NflTeam) -> bool {
    home.division.conference() == away.division.conference()
}
