use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::merge::{MatchContext, MergedMatch, TeamSide};
use crate::normalize::{GoalThresholds, MatchTeamRow};
use crate::raw_table;
use crate::standings::{Standings, StandingsRow};
use crate::stats::Stat;
use crate::window_features::{FeatureColumn, FeatureSet, WindowedFeatureRow, feature_columns};

/// A product table flattened to named string columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl FlatTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        raw_table::write_csv(path, &self.columns, &self.rows)
    }

    pub fn write_xlsx(&self, path: &Path, sheet_name: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(sheet_name)?;
            write_rows(sheet, std::iter::once(&self.columns).chain(self.rows.iter()))?;
        }
        workbook
            .save(path)
            .with_context(|| format!("failed writing workbook to {}", path.display()))?;
        Ok(())
    }
}

const ROW_COLUMNS: &[&str] = &[
    "DateTime", "Comp", "Season", "Round", "Day", "Venue", "Result", "GF", "GA", "Opponent",
    "xG", "xGA", "Poss", "Attendance", "Captain", "Formation", "Referee", "Match Report",
    "Notes", "Team",
];

const DERIVED_COLUMNS: &[&str] = &[
    "GD",
    "Total_Goals",
    "Points",
    "Points_Cum",
    "GD_Cum",
    "GF_Cum",
    "GA_Cum",
    "Ranking",
    "Minus 1.5 Goals",
    "Minus 2.5 Goals",
    "Minus 3.5 Goals",
];

const CONTEXT_COLUMNS: &[&str] = &[
    "DateTime",
    "Comp",
    "Round",
    "Day",
    "MatchID",
    "Season",
    "Attendance",
    "Referee",
    "Match Report",
    "Notes",
    "Minus 1.5 Goals",
    "Minus 2.5 Goals",
    "Minus 3.5 Goals",
];

const SIDE_COLUMNS: &[&str] = &[
    "Venue", "Result", "GF", "GA", "Opponent", "xG", "xGA", "Poss", "Captain", "Formation",
    "Team",
];

fn base_columns() -> Vec<String> {
    ROW_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(Stat::ALL.iter().map(|s| s.column_name().to_string()))
        .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

fn base_cells(row: &MatchTeamRow, standings: &Standings) -> Vec<String> {
    let mut out = vec![
        row.datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        row.competition.clone(),
        row.season.clone(),
        row.round.to_string(),
        opt_str(&row.day),
        row.venue.map(|v| v.label().to_string()).unwrap_or_default(),
        row.result.map(|r| r.code().to_string()).unwrap_or_default(),
        opt_to_string(row.goals_for),
        opt_to_string(row.goals_against),
        row.opponent.clone(),
        opt_to_string(row.xg),
        opt_to_string(row.xga),
        opt_to_string(row.possession),
        opt_to_string(row.attendance),
        opt_str(&row.captain),
        opt_str(&row.formation),
        opt_str(&row.referee),
        opt_str(&row.match_report),
        opt_str(&row.notes),
        row.team.clone(),
    ];
    out.extend(row.stats.iter().map(|(_, v)| opt_to_string(v)));
    out.extend([
        opt_to_string(row.goal_difference),
        opt_to_string(row.total_goals),
        opt_to_string(row.points),
        opt_to_string(standings.points_cum),
        opt_to_string(standings.goal_diff_cum),
        opt_to_string(standings.goals_for_cum),
        opt_to_string(standings.goals_against_cum),
        opt_to_string(standings.ranking),
    ]);
    out.extend(threshold_cells(&row.thresholds));
    out
}

fn threshold_cells(t: &GoalThresholds) -> [String; 3] {
    [
        flag(t.under_1_5),
        flag(t.under_2_5),
        flag(t.under_3_5),
    ]
}

fn feature_cells<'a>(
    features: &'a FeatureSet,
    schema: &'a [FeatureColumn],
) -> impl Iterator<Item = String> + 'a {
    schema.iter().map(|col| opt_to_string(features.value(col)))
}

pub fn base_table(rows: &[StandingsRow]) -> FlatTable {
    FlatTable {
        columns: base_columns(),
        rows: rows
            .iter()
            .map(|r| base_cells(&r.row, &r.standings))
            .collect(),
    }
}

pub fn enriched_table(rows: &[WindowedFeatureRow], window: usize) -> FlatTable {
    let schema = feature_columns();
    let mut columns = base_columns();
    columns.extend(schema.iter().map(|c| c.name(window)));
    FlatTable {
        columns,
        rows: rows
            .iter()
            .map(|r| {
                let mut cells = base_cells(&r.row, &r.standings);
                cells.extend(feature_cells(&r.features, &schema));
                cells
            })
            .collect(),
    }
}

fn side_columns(schema: &[FeatureColumn], window: usize, suffix: &str) -> Vec<String> {
    SIDE_COLUMNS
        .iter()
        .map(|c| {
            // Team names read "Team Home" / "Team Away" in the model table.
            if *c == "Team" {
                format!("Team {suffix}")
            } else {
                format!("{c}_{suffix}")
            }
        })
        .chain(schema.iter().map(|c| format!("{}_{suffix}", c.name(window))))
        .collect()
}

fn context_cells(ctx: &MatchContext) -> Vec<String> {
    let mut out = vec![
        ctx.datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        ctx.competition.clone(),
        ctx.round.to_string(),
        opt_str(&ctx.day),
        ctx.match_id.clone(),
        ctx.season.clone(),
        opt_to_string(ctx.attendance),
        opt_str(&ctx.referee),
        opt_str(&ctx.match_report),
        opt_str(&ctx.notes),
    ];
    out.extend(threshold_cells(&ctx.thresholds));
    out
}

fn side_cells(side: &TeamSide, schema: &[FeatureColumn]) -> Vec<String> {
    let mut out = vec![
        side.venue.map(|v| v.label().to_string()).unwrap_or_default(),
        side.result.map(|r| r.code().to_string()).unwrap_or_default(),
        opt_to_string(side.goals_for),
        opt_to_string(side.goals_against),
        side.opponent.clone(),
        opt_to_string(side.xg),
        opt_to_string(side.xga),
        opt_to_string(side.possession),
        opt_str(&side.captain),
        opt_str(&side.formation),
        side.team.clone(),
    ];
    out.extend(feature_cells(&side.features, schema));
    out
}

pub fn merged_table(rows: &[MergedMatch], window: usize) -> FlatTable {
    let schema = feature_columns();
    let mut columns = CONTEXT_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>();
    columns.extend(side_columns(&schema, window, "Home"));
    columns.extend(side_columns(&schema, window, "Away"));
    columns.push("Result".to_string());

    FlatTable {
        columns,
        rows: rows
            .iter()
            .map(|m| {
                let mut cells = context_cells(&m.context);
                cells.extend(side_cells(&m.home, &schema));
                cells.extend(side_cells(&m.away, &schema));
                cells.push(m.result.map(|r| r.label().to_string()).unwrap_or_default());
                cells
            })
            .collect(),
    }
}

fn write_rows<'a>(
    worksheet: &mut Worksheet,
    rows: impl Iterator<Item = &'a Vec<String>>,
) -> Result<()> {
    for (row_idx, row) in rows.enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            match value.parse::<f64>() {
                Ok(number) => worksheet.write_number(row_idx as u32, col_idx as u16, number),
                Err(_) => worksheet.write_string(row_idx as u32, col_idx as u16, value),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn flag(value: Option<bool>) -> String {
    value.map(|b| if b { "1" } else { "0" }.to_string()).unwrap_or_default()
}
