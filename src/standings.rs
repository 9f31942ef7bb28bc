use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::normalize::MatchTeamRow;

/// Running league-table values for a team, as of (and including) a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Standings {
    pub points_cum: Option<i32>,
    pub goal_diff_cum: Option<i32>,
    pub goals_for_cum: Option<i32>,
    pub goals_against_cum: Option<i32>,
    /// 1-based position within the season-round table.
    pub ranking: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsRow {
    pub row: MatchTeamRow,
    pub standings: Standings,
}

impl StandingsRow {
    /// A row that never went through the standings pass (future fixtures).
    pub fn without_standings(row: MatchTeamRow) -> Self {
        Self {
            row,
            standings: Standings::default(),
        }
    }
}

/// Series order: season, history before fixtures, round, team, kickoff.
pub fn series_order(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    a.row
        .season
        .cmp(&b.row.season)
        .then(a.row.origin.cmp(&b.row.origin))
        .then(a.row.round.cmp(&b.row.round))
        .then_with(|| a.row.team.cmp(&b.row.team))
        .then(a.row.datetime.cmp(&b.row.datetime))
}

/// League-table order: season, history before fixtures, round, then
/// points and goal difference descending (nulls last), then team name.
pub fn table_order(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    a.row
        .season
        .cmp(&b.row.season)
        .then(a.row.origin.cmp(&b.row.origin))
        .then(a.row.round.cmp(&b.row.round))
        .then(desc_nulls_last(
            a.standings.points_cum,
            b.standings.points_cum,
        ))
        .then(desc_nulls_last(
            a.standings.goal_diff_cum,
            b.standings.goal_diff_cum,
        ))
        .then_with(|| a.row.team.cmp(&b.row.team))
        .then(a.row.datetime.cmp(&b.row.datetime))
}

fn desc_nulls_last(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy)]
struct Running {
    points: Option<i32>,
    goal_diff: Option<i32>,
    goals_for: Option<i32>,
    goals_against: Option<i32>,
}

impl Running {
    fn start() -> Self {
        Self {
            points: Some(0),
            goal_diff: Some(0),
            goals_for: Some(0),
            goals_against: Some(0),
        }
    }

    // Once a value is unknown the running total stays unknown.
    fn add(total: Option<i32>, value: Option<i32>) -> Option<i32> {
        Some(total? + value?)
    }

    fn push(&mut self, row: &MatchTeamRow) {
        self.points = Self::add(self.points, row.points.map(|p| p as i32));
        self.goal_diff = Self::add(self.goal_diff, row.goal_difference);
        self.goals_for = Self::add(self.goals_for, row.goals_for);
        self.goals_against = Self::add(self.goals_against, row.goals_against);
    }
}

/// Attaches cumulative standings and the per-round ranking.
///
/// Totals are prefix sums over each (season, team) series in round order,
/// inclusive of the current match. The returned rows are in league-table
/// order.
pub fn compute_standings(rows: Vec<MatchTeamRow>) -> Vec<StandingsRow> {
    let mut out = rows
        .into_iter()
        .map(StandingsRow::without_standings)
        .collect::<Vec<_>>();
    out.sort_by(series_order);

    let mut running: HashMap<(String, String), Running> = HashMap::new();
    for item in &mut out {
        let acc = running
            .entry((item.row.season.clone(), item.row.team.clone()))
            .or_insert_with(Running::start);
        acc.push(&item.row);
        item.standings.points_cum = acc.points;
        item.standings.goal_diff_cum = acc.goal_diff;
        item.standings.goals_for_cum = acc.goals_for;
        item.standings.goals_against_cum = acc.goals_against;
    }

    assign_rankings(&mut out);
    debug!(
        rows = out.len(),
        series = running.len(),
        "computed cumulative standings"
    );
    out
}

/// Sorts into table order and numbers each (season, round) group from 1.
pub fn assign_rankings(rows: &mut [StandingsRow]) {
    rows.sort_by(table_order);
    let mut position = 0u32;
    let mut prev_key: Option<(String, u32)> = None;
    for item in rows.iter_mut() {
        let same_group = prev_key
            .as_ref()
            .is_some_and(|(season, round)| *season == item.row.season && *round == item.row.round);
        if same_group {
            position += 1;
        } else {
            position = 1;
            prev_key = Some((item.row.season.clone(), item.row.round));
        }
        item.standings.ranking = Some(position);
    }
}
