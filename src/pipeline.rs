//! Product compositions over in-memory tables.
//!
//! `base = normalize -> standings`, `enriched = base -> window features`,
//! `prediction = enriched -> column restriction -> merge`. The future
//! variant appends normalized fixtures to the standings-augmented history
//! before the window pass, then keeps only the fixtures' matches.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::SchemaError;
use crate::merge::{MergedMatch, match_id, merge_sides, restrict_to_model_columns};
use crate::normalize::{RowOrigin, normalize, normalize_fixtures};
use crate::raw_table::RawTable;
use crate::standings::{StandingsRow, compute_standings};
use crate::window_features::{FeatureConfig, WindowedFeatureRow, compute_window_features};

pub fn base(raw: &RawTable) -> Result<Vec<StandingsRow>, SchemaError> {
    let rows = normalize(raw)?;
    Ok(compute_standings(rows))
}

pub fn enriched(
    raw: &RawTable,
    config: &FeatureConfig,
) -> Result<Vec<WindowedFeatureRow>, SchemaError> {
    let rows = base(raw)?;
    Ok(compute_window_features(rows, config))
}

pub fn prediction_ready(
    raw: &RawTable,
    config: &FeatureConfig,
) -> Result<Vec<MergedMatch>, SchemaError> {
    let rows = enriched(raw, config)?;
    let merged = merge_sides(restrict_to_model_columns(rows));
    info!(matches = merged.len(), "prediction table ready");
    Ok(merged)
}

/// History and fixtures through the same window pass.
///
/// Fixtures get no standings of their own; their lag and window values
/// come from the team's played matches only. History rows come out exactly
/// as [`enriched`] computes them.
pub fn future_enriched(
    history: &RawTable,
    fixtures: &RawTable,
    config: &FeatureConfig,
) -> Result<Vec<WindowedFeatureRow>, SchemaError> {
    let mut rows = base(history)?;
    let played = rows
        .iter()
        .map(|r| match_id(&r.row.datetime, &r.row.team, &r.row.opponent))
        .collect::<HashSet<_>>();
    let mut upcoming = normalize_fixtures(fixtures)?;
    let listed = upcoming.len();
    // A stale fixture list can still name matches the history already holds.
    upcoming.retain(|r| !played.contains(&match_id(&r.datetime, &r.team, &r.opponent)));
    debug!(
        history = rows.len(),
        fixtures = upcoming.len(),
        already_played = listed - upcoming.len(),
        "appending fixtures after history"
    );
    rows.extend(upcoming.into_iter().map(StandingsRow::without_standings));
    Ok(compute_window_features(rows, config))
}

/// Merged feature vectors for not-yet-played fixtures. `Result` is `None`.
pub fn future_prediction_ready(
    history: &RawTable,
    fixtures: &RawTable,
    config: &FeatureConfig,
) -> Result<Vec<MergedMatch>, SchemaError> {
    let model_rows = restrict_to_model_columns(future_enriched(history, fixtures, config)?);
    let fixture_rows = model_rows
        .iter()
        .filter(|r| r.side.origin == RowOrigin::Fixture)
        .count();

    let merged = merge_sides(model_rows)
        .into_iter()
        .filter(|m| m.home.origin == RowOrigin::Fixture && m.away.origin == RowOrigin::Fixture)
        .collect::<Vec<_>>();
    info!(
        fixture_rows,
        matches = merged.len(),
        "future prediction table ready"
    );
    Ok(merged)
}
