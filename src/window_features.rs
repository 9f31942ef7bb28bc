//! Leakage-free per-team features.
//!
//! Every value attached to a match is computed from the team's strictly
//! earlier matches: lags read the previous row of the series, windows and
//! expanding means are taken over the series shifted by one match.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::{MatchResult, MatchTeamRow, RowOrigin};
use crate::standings::{Standings, StandingsRow, series_order, table_order};
use crate::stats::{Stat, StatLine};

pub const DEFAULT_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonAverageScaling {
    #[default]
    None,
    /// Min-max rescale across all teams of the same (season, round),
    /// history and fixtures kept apart.
    MinMaxPerRound,
}

impl SeasonAverageScaling {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(SeasonAverageScaling::None),
            "minmax" | "min_max" | "min_max_per_round" => {
                Some(SeasonAverageScaling::MinMaxPerRound)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Trailing window for rolling stats and form counts.
    pub window: usize,
    pub season_average_scaling: SeasonAverageScaling,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            season_average_scaling: SeasonAverageScaling::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandingColumn {
    PointsCum,
    GoalDiffCum,
    GoalsForCum,
    GoalsAgainstCum,
    Ranking,
}

impl StandingColumn {
    pub const ALL: [StandingColumn; 5] = [
        StandingColumn::PointsCum,
        StandingColumn::GoalDiffCum,
        StandingColumn::GoalsForCum,
        StandingColumn::GoalsAgainstCum,
        StandingColumn::Ranking,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            StandingColumn::PointsCum => "Points_Cum",
            StandingColumn::GoalDiffCum => "GD_Cum",
            StandingColumn::GoalsForCum => "GF_Cum",
            StandingColumn::GoalsAgainstCum => "GA_Cum",
            StandingColumn::Ranking => "Ranking",
        }
    }

    pub fn value(self, standings: &Standings) -> Option<f64> {
        match self {
            StandingColumn::PointsCum => standings.points_cum.map(f64::from),
            StandingColumn::GoalDiffCum => standings.goal_diff_cum.map(f64::from),
            StandingColumn::GoalsForCum => standings.goals_for_cum.map(f64::from),
            StandingColumn::GoalsAgainstCum => standings.goals_against_cum.map(f64::from),
            StandingColumn::Ranking => standings.ranking.map(f64::from),
        }
    }
}

/// Category tag of a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Lag,
    WindowMean,
    WindowSum,
    WindowStd,
    FormWins,
    FormLosses,
    SeasonAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureSource {
    Standing(StandingColumn),
    Stat(Stat),
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureColumn {
    pub source: FeatureSource,
    pub kind: FeatureKind,
}

impl FeatureColumn {
    pub fn name(&self, window: usize) -> String {
        let source = match self.source {
            FeatureSource::Standing(col) => col.column_name(),
            FeatureSource::Stat(stat) => stat.column_name(),
            FeatureSource::Results => "",
        };
        match self.kind {
            FeatureKind::Lag => format!("{source}_Lag"),
            FeatureKind::WindowMean => format!("{source}_{window}_Last_Matches_Average"),
            FeatureKind::WindowSum => format!("{source}_{window}_Last_Matches_Sum"),
            FeatureKind::WindowStd => format!("{source}_{window}_Last_Matches_Std"),
            FeatureKind::FormWins => format!("{window}_Last_Matches_Win"),
            FeatureKind::FormLosses => format!("{window}_Last_Matches_Loose"),
            FeatureKind::SeasonAverage => format!("{source}_Scaled_Season_Average"),
        }
    }
}

/// The generated feature schema, in output column order.
pub fn feature_columns() -> Vec<FeatureColumn> {
    let mut out = Vec::with_capacity(StandingColumn::ALL.len() + 4 * Stat::ALL.len() + 2);
    for col in StandingColumn::ALL {
        out.push(FeatureColumn {
            source: FeatureSource::Standing(col),
            kind: FeatureKind::Lag,
        });
    }
    for kind in [
        FeatureKind::WindowMean,
        FeatureKind::WindowSum,
        FeatureKind::WindowStd,
    ] {
        for stat in Stat::ALL {
            out.push(FeatureColumn {
                source: FeatureSource::Stat(stat),
                kind,
            });
        }
    }
    for kind in [FeatureKind::FormWins, FeatureKind::FormLosses] {
        out.push(FeatureColumn {
            source: FeatureSource::Results,
            kind,
        });
    }
    for stat in Stat::ALL {
        out.push(FeatureColumn {
            source: FeatureSource::Stat(stat),
            kind: FeatureKind::SeasonAverage,
        });
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub window: usize,
    /// Standings as of the team's previous match.
    pub lag: Standings,
    pub window_mean: StatLine,
    pub window_sum: StatLine,
    pub window_std: StatLine,
    /// Counted over up to `window` prior matches; zero, never null, when
    /// the team has no earlier match this season.
    pub form_wins: u32,
    pub form_losses: u32,
    pub season_average: StatLine,
}

impl FeatureSet {
    pub fn value(&self, column: &FeatureColumn) -> Option<f64> {
        match (column.source, column.kind) {
            (FeatureSource::Standing(col), FeatureKind::Lag) => col.value(&self.lag),
            (FeatureSource::Stat(stat), FeatureKind::WindowMean) => self.window_mean.get(stat),
            (FeatureSource::Stat(stat), FeatureKind::WindowSum) => self.window_sum.get(stat),
            (FeatureSource::Stat(stat), FeatureKind::WindowStd) => self.window_std.get(stat),
            (FeatureSource::Stat(stat), FeatureKind::SeasonAverage) => {
                self.season_average.get(stat)
            }
            (FeatureSource::Results, FeatureKind::FormWins) => Some(f64::from(self.form_wins)),
            (FeatureSource::Results, FeatureKind::FormLosses) => {
                Some(f64::from(self.form_losses))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowedFeatureRow {
    pub row: MatchTeamRow,
    pub standings: Standings,
    pub features: FeatureSet,
}

#[derive(Debug, Clone)]
struct SeriesFeatures {
    window_mean: StatLine,
    window_sum: StatLine,
    window_std: StatLine,
    form_wins: u32,
    form_losses: u32,
    season_average: StatLine,
}

/// Attaches lag, rolling-window, form and season-average features.
///
/// Lags are taken in series order; everything else in league-table order.
/// Output rows are in league-table order.
pub fn compute_window_features(
    rows: Vec<StandingsRow>,
    config: &FeatureConfig,
) -> Vec<WindowedFeatureRow> {
    let mut rows = rows;
    rows.sort_by(series_order);
    let lags = lagged_standings(&rows);

    let mut rows = rows.into_iter().zip(lags).collect::<Vec<_>>();
    rows.sort_by(|a, b| table_order(&a.0, &b.0));

    let groups = series_groups(rows.iter().map(|(r, _)| &r.row));
    let window = config.window;
    let mut computed: Vec<Option<SeriesFeatures>> = vec![None; rows.len()];
    let per_group = groups
        .par_iter()
        .map(|idxs| {
            let series = idxs.iter().map(|&i| &rows[i].0.row).collect::<Vec<_>>();
            idxs.iter()
                .copied()
                .zip(series_features(&series, window))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    for (idx, features) in per_group.into_iter().flatten() {
        computed[idx] = Some(features);
    }

    let short_history = groups
        .iter()
        .map(|idxs| idxs.len().min(window))
        .sum::<usize>();
    debug!(
        rows = rows.len(),
        series = groups.len(),
        window,
        short_history,
        "computed window features"
    );

    let mut out = rows
        .into_iter()
        .zip(computed)
        .map(|((item, lag), features)| {
            let features = features.unwrap_or_else(SeriesFeatures::empty);
            WindowedFeatureRow {
                row: item.row,
                standings: item.standings,
                features: FeatureSet {
                    window,
                    lag,
                    window_mean: features.window_mean,
                    window_sum: features.window_sum,
                    window_std: features.window_std,
                    form_wins: features.form_wins,
                    form_losses: features.form_losses,
                    season_average: features.season_average,
                },
            }
        })
        .collect::<Vec<_>>();

    if config.season_average_scaling == SeasonAverageScaling::MinMaxPerRound {
        scale_season_average(&mut out);
    }
    out
}

/// Previous-row standings: cumulative columns within (season, team),
/// ranking within team across seasons. `rows` must be in series order.
fn lagged_standings(rows: &[StandingsRow]) -> Vec<Standings> {
    let mut prev_cum: HashMap<(&str, &str), Standings> = HashMap::new();
    let mut prev_rank: HashMap<&str, Option<u32>> = HashMap::new();
    rows.iter()
        .map(|item| {
            let key = (item.row.season.as_str(), item.row.team.as_str());
            let mut lag = prev_cum.insert(key, item.standings).unwrap_or_default();
            lag.ranking = prev_rank
                .insert(item.row.team.as_str(), item.standings.ranking)
                .flatten();
            lag
        })
        .collect()
}

/// Row indices of each (season, team) series, in input order.
fn series_groups<'a>(rows: impl Iterator<Item = &'a MatchTeamRow>) -> Vec<Vec<usize>> {
    let mut slot: HashMap<(&str, &str), usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let next = groups.len();
        let g = *slot
            .entry((row.season.as_str(), row.team.as_str()))
            .or_insert(next);
        if g == next {
            groups.push(Vec::new());
        }
        groups[g].push(idx);
    }
    groups
}

impl SeriesFeatures {
    fn empty() -> Self {
        Self {
            window_mean: StatLine::empty(),
            window_sum: StatLine::empty(),
            window_std: StatLine::empty(),
            form_wins: 0,
            form_losses: 0,
            season_average: StatLine::empty(),
        }
    }
}

/// Features for one ordered (season, team) series.
fn series_features(series: &[&MatchTeamRow], window: usize) -> Vec<SeriesFeatures> {
    let mut out = vec![SeriesFeatures::empty(); series.len()];

    for stat in Stat::ALL {
        let values = series.iter().map(|r| r.stats.get(stat)).collect::<Vec<_>>();
        let mut prior_sum = 0.0;
        let mut prior_count = 0usize;
        for (i, slot) in out.iter_mut().enumerate() {
            if let Some(prior) = trailing_window(&values, i, window) {
                let sum = prior.iter().sum::<f64>();
                slot.window_sum.set(stat, Some(sum));
                slot.window_mean.set(stat, Some(sum / prior.len() as f64));
                slot.window_std.set(stat, sample_std(&prior));
            }
            if prior_count > 0 {
                slot.season_average
                    .set(stat, Some(prior_sum / prior_count as f64));
            }
            if let Some(v) = values[i] {
                prior_sum += v;
                prior_count += 1;
            }
        }
    }

    for (i, slot) in out.iter_mut().enumerate() {
        let start = i.saturating_sub(window);
        let prior = &series[start..i];
        slot.form_wins = count_results(prior, MatchResult::Win);
        slot.form_losses = count_results(prior, MatchResult::Loss);
    }
    out
}

/// The `window` values strictly before `i`, only when all are present.
fn trailing_window(values: &[Option<f64>], i: usize, window: usize) -> Option<Vec<f64>> {
    if window == 0 || i < window {
        return None;
    }
    values[i - window..i].iter().copied().collect()
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / (n - 1.0);
    Some(var.sqrt())
}

fn count_results(rows: &[&MatchTeamRow], wanted: MatchResult) -> u32 {
    rows.iter().filter(|r| r.result == Some(wanted)).count() as u32
}

fn scale_season_average(rows: &mut [WindowedFeatureRow]) {
    // Fixtures form their own groups so they never move history values.
    let mut bounds: HashMap<(String, RowOrigin, u32, Stat), (f64, f64)> = HashMap::new();
    for item in rows.iter() {
        for (stat, value) in item.features.season_average.iter() {
            let Some(v) = value else { continue };
            let key = (item.row.season.clone(), item.row.origin, item.row.round, stat);
            let entry = bounds.entry(key).or_insert((v, v));
            entry.0 = entry.0.min(v);
            entry.1 = entry.1.max(v);
        }
    }
    for item in rows.iter_mut() {
        for stat in Stat::ALL {
            let Some(v) = item.features.season_average.get(stat) else {
                continue;
            };
            let key = (item.row.season.clone(), item.row.origin, item.row.round, stat);
            let scaled = bounds.get(&key).and_then(|(lo, hi)| {
                let span = hi - lo;
                (span > 1e-12).then(|| (v - lo) / span)
            });
            item.features.season_average.set(stat, scaled);
        }
    }
}
