mod common;

use std::collections::HashSet;

use fbref_features::merge::{MatchOutcome, match_id, merge_sides, restrict_to_model_columns};
use fbref_features::normalize::Venue;
use fbref_features::pipeline;
use fbref_features::window_features::FeatureConfig;

use common::{Fixture, empty_table, push_side, round_robin, season_start, table_of};

const TEAMS: &[&str] = &["Arsenal", "Brentford", "Chelsea", "Everton"];

#[test]
fn merge_is_an_inner_join() {
    let fixtures = round_robin(TEAMS, 5, season_start());
    assert_eq!(fixtures.len(), 10);

    let mut raw = empty_table();
    for (idx, fixture) in fixtures.iter().enumerate() {
        push_side(&mut raw, fixture, true);
        if idx % 5 != 4 {
            push_side(&mut raw, fixture, false);
        }
    }

    let merged = pipeline::prediction_ready(&raw, &FeatureConfig::default()).expect("merged");
    assert_eq!(merged.len(), 8);
    let ids = merged
        .iter()
        .map(|m| m.context.match_id.as_str())
        .collect::<HashSet<_>>();
    assert_eq!(ids.len(), 8);
    for m in &merged {
        assert_eq!(m.home.venue, Some(Venue::Home));
        assert_eq!(m.away.venue, Some(Venue::Away));
        assert_eq!(m.home.opponent, m.away.team);
        assert_eq!(m.away.opponent, m.home.team);
    }
}

#[test]
fn both_halves_share_a_match_id() {
    let raw = table_of(&round_robin(TEAMS, 3, season_start()));
    let windowed = pipeline::enriched(&raw, &FeatureConfig::default()).expect("enriched");
    let model_rows = restrict_to_model_columns(windowed);
    assert_eq!(model_rows.len(), 12);

    let ids = model_rows
        .iter()
        .map(|r| r.context.match_id.clone())
        .collect::<HashSet<_>>();
    assert_eq!(ids.len(), 6);
    for row in &model_rows {
        assert_eq!(
            row.context.match_id,
            match_id(&row.context.datetime, &row.side.opponent, &row.side.team)
        );
    }
    assert_eq!(merge_sides(model_rows).len(), 6);
}

#[test]
fn outcome_label_comes_from_both_sides() {
    let raw = table_of(&[
        Fixture::played("2023-08-12", 1, "Arsenal", "Chelsea", (2, 1)),
        Fixture::played("2023-08-12", 1, "Everton", "Fulham", (0, 1)),
        Fixture::played("2023-08-13", 1, "Brentford", "Wolves", (1, 1)),
    ]);
    let merged = pipeline::prediction_ready(&raw, &FeatureConfig::default()).expect("merged");
    let labels = merged
        .iter()
        .map(|m| (m.home.team.as_str(), m.result.map(MatchOutcome::label)))
        .collect::<HashSet<_>>();
    assert_eq!(
        labels,
        HashSet::from([
            ("Arsenal", Some("W_Home")),
            ("Everton", Some("W_Away")),
            ("Brentford", Some("D")),
        ])
    );
}

#[test]
fn context_disagreement_blocks_pairing() {
    let fixture = Fixture::played("2023-08-12", 1, "Arsenal", "Chelsea", (2, 1));
    let mut raw = empty_table();
    push_side(&mut raw, &fixture, true);
    let mut away = fixture.clone();
    away.round = "Matchweek 2".to_string();
    push_side(&mut raw, &away, false);

    let merged = pipeline::prediction_ready(&raw, &FeatureConfig::default()).expect("merged");
    assert!(merged.is_empty());
}

#[test]
fn merged_rows_carry_goal_thresholds_once() {
    let raw = table_of(&[Fixture::played("2023-08-12", 1, "Arsenal", "Chelsea", (2, 1))]);
    let merged = pipeline::prediction_ready(&raw, &FeatureConfig::default()).expect("merged");
    let thresholds = merged[0].context.thresholds;
    assert_eq!(thresholds.under_1_5, Some(false));
    assert_eq!(thresholds.under_2_5, Some(false));
    assert_eq!(thresholds.under_3_5, Some(true));
}
