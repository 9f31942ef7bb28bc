#![allow(dead_code)]

use chrono::{Duration, NaiveDate};

use fbref_features::raw_table::RawTable;
use fbref_features::stats::Stat;

pub const BASE_HEADERS: &[&str] = &[
    "Date", "Time", "Comp", "Round", "Day", "Venue", "Result", "GF", "GA", "Opponent", "xG",
    "xGA", "Poss", "Attendance", "Captain", "Formation", "Referee", "Match Report", "Notes",
    "Team",
];

pub fn empty_table() -> RawTable {
    RawTable::new(
        BASE_HEADERS
            .iter()
            .map(|c| c.to_string())
            .chain(Stat::ALL.iter().map(|s| s.column_name().to_string())),
    )
}

/// One played match between `home` and `away`.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub date: String,
    pub round: String,
    pub home: String,
    pub away: String,
    pub score: Option<(i32, i32)>,
    pub home_shots: Option<f64>,
    pub away_shots: Option<f64>,
}

impl Fixture {
    pub fn played(date: &str, round: u32, home: &str, away: &str, score: (i32, i32)) -> Self {
        Self {
            date: date.to_string(),
            round: format!("Matchweek {round}"),
            home: home.to_string(),
            away: away.to_string(),
            score: Some(score),
            home_shots: None,
            away_shots: None,
        }
    }

    pub fn upcoming(date: &str, round: u32, home: &str, away: &str) -> Self {
        Self {
            score: None,
            ..Self::played(date, round, home, away, (0, 0))
        }
    }

    pub fn shots(mut self, home: f64, away: f64) -> Self {
        self.home_shots = Some(home);
        self.away_shots = Some(away);
        self
    }
}

fn result_code(gf: i32, ga: i32) -> &'static str {
    if gf > ga {
        "W"
    } else if gf < ga {
        "L"
    } else {
        "D"
    }
}

pub fn push_side(table: &mut RawTable, fixture: &Fixture, home_side: bool) {
    let (team, opponent, shots) = if home_side {
        (&fixture.home, &fixture.away, fixture.home_shots)
    } else {
        (&fixture.away, &fixture.home, fixture.away_shots)
    };
    let score = fixture
        .score
        .map(|(h, a)| if home_side { (h, a) } else { (a, h) });
    let gf = score.map(|(gf, _)| gf.to_string()).unwrap_or_default();
    let ga = score.map(|(_, ga)| ga.to_string()).unwrap_or_default();
    let result = score
        .map(|(gf, ga)| result_code(gf, ga))
        .unwrap_or_default();
    let shots = shots.map(|s| s.to_string()).unwrap_or_default();
    let report = format!("/matches/{}-{}-{}", fixture.date, fixture.home, fixture.away);
    table.push_record(&[
        ("Date", fixture.date.as_str()),
        ("Time", "15:00"),
        ("Comp", "Premier League"),
        ("Round", fixture.round.as_str()),
        ("Day", "Sat"),
        ("Venue", if home_side { "Home" } else { "Away" }),
        ("Result", result),
        ("GF", gf.as_str()),
        ("GA", ga.as_str()),
        ("Opponent", opponent.as_str()),
        ("Team", team.as_str()),
        ("Attendance", "40,000"),
        ("Referee", "Anthony Taylor"),
        ("Match Report", report.as_str()),
        ("Formation", "4-3-3◆"),
        ("Total Shots", shots.as_str()),
    ]);
}

pub fn push_fixture(table: &mut RawTable, fixture: &Fixture) {
    push_side(table, fixture, true);
    push_side(table, fixture, false);
}

pub fn table_of(fixtures: &[Fixture]) -> RawTable {
    let mut table = empty_table();
    for fixture in fixtures {
        push_fixture(&mut table, fixture);
    }
    table
}

/// Deterministic single round robin (circle method) over `teams`, one
/// round per week from `start`. Scores and shot counts vary by round.
pub fn round_robin(teams: &[&str], rounds: u32, start: NaiveDate) -> Vec<Fixture> {
    let n = teams.len();
    assert!(n >= 2 && n % 2 == 0, "even team count expected");
    let mut out = Vec::new();
    for r in 0..rounds as usize {
        let date = (start + Duration::days(7 * r as i64))
            .format("%Y-%m-%d")
            .to_string();
        let rotated = (0..n - 1)
            .map(|k| 1 + (k + r) % (n - 1))
            .collect::<Vec<_>>();
        let mut pairs = vec![(0, rotated[0])];
        for i in 1..n / 2 {
            pairs.push((rotated[i], rotated[n - 1 - i]));
        }
        for (slot, (a, b)) in pairs.into_iter().enumerate() {
            let (home, away) = if (r + slot) % 2 == 0 { (a, b) } else { (b, a) };
            let hg = ((r * 3 + slot + home) % 4) as i32;
            let ag = ((r + slot * 2 + away) % 3) as i32;
            out.push(
                Fixture::played(&date, r as u32 + 1, teams[home], teams[away], (hg, ag))
                    .shots(
                        (8 + (r * 5 + home) % 11) as f64,
                        (6 + (r * 7 + away) % 9) as f64,
                    ),
            );
        }
    }
    out
}

pub fn season_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 8, 12).expect("valid date")
}
