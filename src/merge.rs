use std::collections::{HashMap, VecDeque};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::normalize::{GoalThresholds, MatchResult, RowOrigin, Venue};
use crate::window_features::{FeatureSet, WindowedFeatureRow};

/// Columns shared by both halves of a match. Two halves pair only when
/// every field agrees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchContext {
    pub datetime: NaiveDateTime,
    pub competition: String,
    pub round: u32,
    pub day: Option<String>,
    pub match_id: String,
    pub season: String,
    pub attendance: Option<u32>,
    pub referee: Option<String>,
    pub match_report: Option<String>,
    pub notes: Option<String>,
    pub thresholds: GoalThresholds,
}

/// Team-perspective columns kept for the model: identity, the result
/// label and the already-offset features. Raw per-match stats and
/// current standings are not carried.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSide {
    pub team: String,
    pub opponent: String,
    pub venue: Option<Venue>,
    pub result: Option<MatchResult>,
    pub goals_for: Option<i32>,
    pub goals_against: Option<i32>,
    pub xg: Option<f64>,
    pub xga: Option<f64>,
    pub possession: Option<f64>,
    pub captain: Option<String>,
    pub formation: Option<String>,
    pub origin: RowOrigin,
    pub features: FeatureSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRow {
    pub context: MatchContext,
    pub side: TeamSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOutcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl MatchOutcome {
    pub fn label(self) -> &'static str {
        match self {
            MatchOutcome::HomeWin => "W_Home",
            MatchOutcome::AwayWin => "W_Away",
            MatchOutcome::Draw => "D",
        }
    }

    pub fn from_sides(home: Option<MatchResult>, away: Option<MatchResult>) -> Option<Self> {
        if home == Some(MatchResult::Win) {
            Some(MatchOutcome::HomeWin)
        } else if away == Some(MatchResult::Win) {
            Some(MatchOutcome::AwayWin)
        } else if away == Some(MatchResult::Draw) {
            Some(MatchOutcome::Draw)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedMatch {
    pub context: MatchContext,
    pub home: TeamSide,
    pub away: TeamSide,
    pub result: Option<MatchOutcome>,
}

/// `{kickoff}-{a}-vs-{b}` with the two team names sorted, so both halves
/// of a match share the id whichever side is at home.
pub fn match_id(datetime: &NaiveDateTime, team: &str, opponent: &str) -> String {
    let (a, b) = if team <= opponent {
        (team, opponent)
    } else {
        (opponent, team)
    };
    format!("{}-{a}-vs-{b}", datetime.format("%Y-%m-%d %H:%M:%S"))
}

/// Keeps the context columns, team identity and the generated features.
pub fn restrict_to_model_columns(rows: Vec<WindowedFeatureRow>) -> Vec<ModelRow> {
    rows.into_iter()
        .map(|item| {
            let row = item.row;
            ModelRow {
                context: MatchContext {
                    match_id: match_id(&row.datetime, &row.team, &row.opponent),
                    datetime: row.datetime,
                    competition: row.competition,
                    round: row.round,
                    day: row.day,
                    season: row.season,
                    attendance: row.attendance,
                    referee: row.referee,
                    match_report: row.match_report,
                    notes: row.notes,
                    thresholds: row.thresholds,
                },
                side: TeamSide {
                    team: row.team,
                    opponent: row.opponent,
                    venue: row.venue,
                    result: row.result,
                    goals_for: row.goals_for,
                    goals_against: row.goals_against,
                    xg: row.xg,
                    xga: row.xga,
                    possession: row.possession,
                    captain: row.captain,
                    formation: row.formation,
                    origin: row.origin,
                    features: item.features,
                },
            }
        })
        .collect()
}

/// Inner-joins home and away halves on the full context. Output follows
/// the order of the home rows; halves without a partner are dropped.
pub fn merge_sides(rows: Vec<ModelRow>) -> Vec<MergedMatch> {
    let mut homes = Vec::new();
    let mut aways: HashMap<MatchContext, VecDeque<TeamSide>> = HashMap::new();
    let mut away_rows = 0usize;
    for row in rows {
        match row.side.venue {
            Some(Venue::Home) => homes.push(row),
            Some(Venue::Away) => {
                away_rows += 1;
                aways.entry(row.context).or_default().push_back(row.side);
            }
            None => {}
        }
    }

    let home_rows = homes.len();
    let mut out = Vec::with_capacity(home_rows.min(away_rows));
    for ModelRow { context, side } in homes {
        let Some(away) = aways.get_mut(&context).and_then(|q| q.pop_front()) else {
            continue;
        };
        let result = MatchOutcome::from_sides(side.result, away.result);
        out.push(MergedMatch {
            context,
            home: side,
            away,
            result,
        });
    }

    let unmatched = home_rows + away_rows - 2 * out.len();
    debug!(
        merged = out.len(),
        home_rows,
        away_rows,
        unmatched,
        "merged team halves into matches"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::parse_timestamp;

    #[test]
    fn match_id_ignores_side_order() {
        let ts = parse_timestamp("2023-09-02", "15:00").unwrap();
        let a = match_id(&ts, "Liverpool", "Aston Villa");
        let b = match_id(&ts, "Aston Villa", "Liverpool");
        assert_eq!(a, b);
        assert_eq!(a, "2023-09-02 15:00:00-Aston Villa-vs-Liverpool");
    }

    #[test]
    fn outcome_prefers_home_win_then_away() {
        use MatchResult::*;
        assert_eq!(
            MatchOutcome::from_sides(Some(Win), Some(Loss)),
            Some(MatchOutcome::HomeWin)
        );
        assert_eq!(
            MatchOutcome::from_sides(Some(Loss), Some(Win)),
            Some(MatchOutcome::AwayWin)
        );
        assert_eq!(
            MatchOutcome::from_sides(Some(Draw), Some(Draw)),
            Some(MatchOutcome::Draw)
        );
        assert_eq!(MatchOutcome::from_sides(None, None), None);
        assert_eq!(MatchOutcome::from_sides(Some(Loss), Some(Loss)), None);
    }
}
