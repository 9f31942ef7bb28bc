use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::SchemaError;
use crate::raw_table::RawTable;
use crate::stats::{Stat, StatLine};

static MATCHWEEK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Matchweek\D*(\d+)").expect("static matchweek pattern"));

const FORMATION_MARKER: char = '◆';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Home" => Some(Venue::Home),
            "Away" => Some(Venue::Away),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Venue::Home => "Home",
            Venue::Away => "Away",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim() {
            "W" => Some(MatchResult::Win),
            "D" => Some(MatchResult::Draw),
            "L" => Some(MatchResult::Loss),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            MatchResult::Win => "W",
            MatchResult::Draw => "D",
            MatchResult::Loss => "L",
        }
    }

    pub fn points(self) -> u32 {
        match self {
            MatchResult::Win => 3,
            MatchResult::Draw => 1,
            MatchResult::Loss => 0,
        }
    }
}

/// Where a row came from: the played-match history or the fixture list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RowOrigin {
    #[default]
    History,
    Fixture,
}

/// "Under N.5 total goals" flags; all `None` when the score is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GoalThresholds {
    pub under_1_5: Option<bool>,
    pub under_2_5: Option<bool>,
    pub under_3_5: Option<bool>,
}

impl GoalThresholds {
    pub fn from_total(total_goals: Option<i32>) -> Self {
        let Some(total) = total_goals else {
            return Self::default();
        };
        Self {
            under_1_5: Some(total <= 1),
            under_2_5: Some(total <= 2),
            under_3_5: Some(total <= 3),
        }
    }
}

/// One team's perspective of one league match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchTeamRow {
    pub datetime: NaiveDateTime,
    pub competition: String,
    pub season: String,
    pub round: u32,
    pub day: Option<String>,
    pub venue: Option<Venue>,
    pub result: Option<MatchResult>,
    pub goals_for: Option<i32>,
    pub goals_against: Option<i32>,
    pub team: String,
    pub opponent: String,
    pub xg: Option<f64>,
    pub xga: Option<f64>,
    pub possession: Option<f64>,
    pub attendance: Option<u32>,
    pub captain: Option<String>,
    pub formation: Option<String>,
    pub referee: Option<String>,
    pub match_report: Option<String>,
    pub notes: Option<String>,
    pub stats: StatLine,
    pub goal_difference: Option<i32>,
    pub total_goals: Option<i32>,
    pub points: Option<u32>,
    pub thresholds: GoalThresholds,
    pub origin: RowOrigin,
}

/// Season label: leagues start in August, so a match in month >= 8 opens
/// the `{Y}-{Y+1}` season.
pub fn season_label(datetime: &NaiveDateTime) -> String {
    let year = datetime.year();
    if datetime.month() >= 8 {
        format!("{}-{}", year, year + 1)
    } else {
        format!("{}-{}", year - 1, year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundLabel {
    Matchweek(u32),
    /// Cup, play-off or any other round outside the league calendar.
    Other,
    Malformed,
}

pub fn parse_round(raw: &str) -> RoundLabel {
    let raw = raw.trim();
    if !raw.starts_with("Matchweek") {
        return RoundLabel::Other;
    }
    MATCHWEEK_RE
        .captures(raw)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map_or(RoundLabel::Malformed, RoundLabel::Matchweek)
}

pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    // Scraped times can carry the viewer's local time in parentheses.
    let time = time.split_whitespace().next()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()?;
    Some(date.and_time(time))
}

pub fn strip_formation_marker(raw: &str) -> String {
    raw.replace(FORMATION_MARKER, "")
}

/// Normalizes played-match history.
pub fn normalize(raw: &RawTable) -> Result<Vec<MatchTeamRow>, SchemaError> {
    normalize_with_origin(raw, RowOrigin::History)
}

/// Normalizes the fixture list. Fixtures have no result or score, so
/// points, goal difference and the goal thresholds stay `None`.
pub fn normalize_fixtures(raw: &RawTable) -> Result<Vec<MatchTeamRow>, SchemaError> {
    normalize_with_origin(raw, RowOrigin::Fixture)
}

struct Columns {
    date: usize,
    time: usize,
    round: usize,
    venue: usize,
    team: usize,
    opponent: usize,
    comp: Option<usize>,
    day: Option<usize>,
    result: Option<usize>,
    gf: Option<usize>,
    ga: Option<usize>,
    xg: Option<usize>,
    xga: Option<usize>,
    poss: Option<usize>,
    attendance: Option<usize>,
    captain: Option<usize>,
    formation: Option<usize>,
    referee: Option<usize>,
    match_report: Option<usize>,
    notes: Option<usize>,
    stats: Vec<(Stat, usize)>,
}

impl Columns {
    fn resolve(raw: &RawTable) -> Result<Self, SchemaError> {
        let stats = Stat::ALL
            .iter()
            .filter_map(|stat| raw.column_index(stat.column_name()).map(|idx| (*stat, idx)))
            .collect::<Vec<_>>();
        Ok(Self {
            date: raw.require_column("Date")?,
            time: raw.require_column("Time")?,
            round: raw.require_column("Round")?,
            venue: raw.require_column("Venue")?,
            team: raw.require_column("Team")?,
            opponent: raw.require_column("Opponent")?,
            comp: raw.column_index("Comp"),
            day: raw.column_index("Day"),
            result: raw.column_index("Result"),
            gf: raw.column_index("GF"),
            ga: raw.column_index("GA"),
            xg: raw.column_index("xG"),
            xga: raw.column_index("xGA"),
            poss: raw.column_index("Poss"),
            attendance: raw.column_index("Attendance"),
            captain: raw.column_index("Captain"),
            formation: raw.column_index("Formation"),
            referee: raw.column_index("Referee"),
            match_report: raw.column_index("Match Report"),
            notes: raw.column_index("Notes"),
            stats,
        })
    }
}

fn normalize_with_origin(
    raw: &RawTable,
    origin: RowOrigin,
) -> Result<Vec<MatchTeamRow>, SchemaError> {
    let cols = Columns::resolve(raw)?;
    if cols.stats.len() < Stat::ALL.len() {
        debug!(
            present = cols.stats.len(),
            expected = Stat::ALL.len(),
            "raw table lacks some stat columns; they will be null"
        );
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut skipped_rounds = 0usize;
    for row in 0..raw.len() {
        let round_raw = raw.cell(row, cols.round).unwrap_or_default();
        let round = match parse_round(round_raw) {
            RoundLabel::Other => {
                skipped_rounds += 1;
                continue;
            }
            RoundLabel::Malformed => {
                return Err(SchemaError::InvalidRound {
                    row,
                    value: round_raw.to_string(),
                });
            }
            RoundLabel::Matchweek(round) => round,
        };

        let date = raw.cell(row, cols.date).unwrap_or_default();
        let time = raw.cell(row, cols.time).unwrap_or_default();
        let datetime =
            parse_timestamp(date, time).ok_or_else(|| SchemaError::InvalidTimestamp {
                row,
                value: format!("{date} {time}"),
            })?;

        let text = |col: Option<usize>| col.and_then(|c| raw.cell(row, c)).map(str::to_string);
        let number = |col: Option<usize>, name: &str| -> Result<Option<f64>, SchemaError> {
            let Some(value) = col.and_then(|c| raw.cell(row, c)) else {
                return Ok(None);
            };
            parse_number(value).map(Some).ok_or_else(|| SchemaError::InvalidNumber {
                row,
                column: name.to_string(),
                value: value.to_string(),
            })
        };

        let goals_for = number(cols.gf, "GF")?.map(|v| v as i32);
        let goals_against = number(cols.ga, "GA")?.map(|v| v as i32);
        let (goal_difference, total_goals) = match (goals_for, goals_against) {
            (Some(gf), Some(ga)) => (Some(gf - ga), Some(gf + ga)),
            _ => (None, None),
        };
        let result = match cols.result.and_then(|c| raw.cell(row, c)) {
            Some(code) => Some(MatchResult::from_code(code).ok_or_else(|| {
                SchemaError::InvalidResult {
                    row,
                    value: code.to_string(),
                }
            })?),
            None => None,
        };

        let mut stats = StatLine::empty();
        for (stat, idx) in &cols.stats {
            stats.set(*stat, number(Some(*idx), stat.column_name())?);
        }

        out.push(MatchTeamRow {
            datetime,
            competition: text(cols.comp).unwrap_or_default(),
            season: season_label(&datetime),
            round,
            day: text(cols.day),
            venue: raw.cell(row, cols.venue).and_then(Venue::parse),
            result,
            goals_for,
            goals_against,
            team: raw.cell(row, cols.team).unwrap_or_default().to_string(),
            opponent: raw.cell(row, cols.opponent).unwrap_or_default().to_string(),
            xg: number(cols.xg, "xG")?,
            xga: number(cols.xga, "xGA")?,
            possession: number(cols.poss, "Poss")?,
            attendance: number(cols.attendance, "Attendance")?.map(|v| v as u32),
            captain: text(cols.captain),
            formation: text(cols.formation).map(|f| strip_formation_marker(&f)),
            referee: text(cols.referee),
            match_report: text(cols.match_report),
            notes: text(cols.notes),
            stats,
            goal_difference,
            total_goals,
            points: result.map(MatchResult::points),
            thresholds: GoalThresholds::from_total(total_goals),
            origin,
        });
    }

    debug!(
        kept = out.len(),
        skipped_rounds,
        ?origin,
        "normalized match rows"
    );
    Ok(out)
}

/// Parses scraped numeric cells: thousands separators and a trailing `%`
/// are tolerated, anything else is rejected.
fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_end_matches('%').replace(',', "");
    // Scores of shoot-out matches read like "1 (4)".
    let s = s.split_whitespace().next()?;
    let v = s.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_boundary_is_august() {
        let july = parse_timestamp("2023-07-31", "20:00").unwrap();
        let august = parse_timestamp("2023-08-01", "20:00").unwrap();
        assert_eq!(season_label(&july), "2022-2023");
        assert_eq!(season_label(&august), "2023-2024");
    }

    #[test]
    fn round_parsing_filters_non_league_rounds() {
        assert_eq!(parse_round("Matchweek 12"), RoundLabel::Matchweek(12));
        assert_eq!(parse_round("Round of 16"), RoundLabel::Other);
        assert_eq!(parse_round("Matchweek"), RoundLabel::Malformed);
    }

    #[test]
    fn timestamp_ignores_local_time_suffix() {
        let ts = parse_timestamp("2024-01-13", "17:30 (18:30)").unwrap();
        assert_eq!(ts.to_string(), "2024-01-13 17:30:00");
        assert!(parse_timestamp("13/01/2024", "17:30").is_none());
    }

    #[test]
    fn numbers_tolerate_separators() {
        assert_eq!(parse_number("60,123"), Some(60123.0));
        assert_eq!(parse_number("45.5%"), Some(45.5));
        assert_eq!(parse_number("2.0"), Some(2.0));
        assert_eq!(parse_number("1 (4)"), Some(1.0));
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn formation_marker_is_stripped() {
        assert_eq!(strip_formation_marker("4-2-3-1◆"), "4-2-3-1");
        assert_eq!(strip_formation_marker("4-4-2"), "4-4-2");
    }
}
