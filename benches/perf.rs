use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fbref_features::feature_export::merged_table;
use fbref_features::normalize::normalize;
use fbref_features::pipeline;
use fbref_features::raw_table::RawTable;
use fbref_features::standings::compute_standings;
use fbref_features::stats::Stat;
use fbref_features::window_features::FeatureConfig;

const TEAMS: usize = 20;
const SEASONS: usize = 3;

/// Twenty teams, a full double round robin per season, every stat filled.
fn synthetic_league() -> RawTable {
    let mut columns = vec![
        "Date", "Time", "Comp", "Round", "Day", "Venue", "Result", "GF", "GA", "Opponent",
        "Team", "Attendance", "Referee",
    ]
    .into_iter()
    .map(String::from)
    .collect::<Vec<_>>();
    columns.extend(Stat::ALL.iter().map(|s| s.column_name().to_string()));
    let mut table = RawTable::new(columns);

    let teams = (0..TEAMS).map(|i| format!("Team {i:02}")).collect::<Vec<_>>();
    let start = chrono::NaiveDate::from_ymd_opt(2020, 8, 15).expect("valid date");
    for season in 0..SEASONS {
        for round in 0..2 * (TEAMS - 1) {
            let date = start + chrono::Duration::days(365 * season as i64 + 7 * round as i64);
            let date = date.format("%Y-%m-%d").to_string();
            let rotated = (0..TEAMS - 1)
                .map(|k| 1 + (k + round) % (TEAMS - 1))
                .collect::<Vec<_>>();
            let mut pairs = vec![(0, rotated[0])];
            for i in 1..TEAMS / 2 {
                pairs.push((rotated[i], rotated[TEAMS - 1 - i]));
            }
            for (home, away) in pairs {
                let (home, away) = if round < TEAMS - 1 { (home, away) } else { (away, home) };
                let hg = (home + round + season) % 4;
                let ag = (away * 3 + round) % 3;
                for (team, opp, gf, ga, venue) in [
                    (home, away, hg, ag, "Home"),
                    (away, home, ag, hg, "Away"),
                ] {
                    let result = match gf.cmp(&ga) {
                        std::cmp::Ordering::Greater => "W",
                        std::cmp::Ordering::Less => "L",
                        std::cmp::Ordering::Equal => "D",
                    };
                    let mut row = vec![
                        date.clone(),
                        "20:00".to_string(),
                        "League".to_string(),
                        format!("Matchweek {}", round + 1),
                        "Sat".to_string(),
                        venue.to_string(),
                        result.to_string(),
                        gf.to_string(),
                        ga.to_string(),
                        teams[opp].clone(),
                        teams[team].clone(),
                        "30000".to_string(),
                        "Ref".to_string(),
                    ];
                    row.extend(
                        Stat::ALL
                            .iter()
                            .map(|s| ((s.index() * 7 + team * 3 + round) % 50).to_string()),
                    );
                    table.push_row(row);
                }
            }
        }
    }
    table
}

fn bench_standings(c: &mut Criterion) {
    let raw = synthetic_league();
    let rows = normalize(&raw).expect("synthetic rows normalize");
    c.bench_function("standings_compute", |b| {
        b.iter(|| {
            let out = compute_standings(black_box(rows.clone()));
            black_box(out.len());
        })
    });
}

fn bench_enriched(c: &mut Criterion) {
    let raw = synthetic_league();
    let config = FeatureConfig::default();
    c.bench_function("enriched_pipeline", |b| {
        b.iter(|| {
            let out = pipeline::enriched(black_box(&raw), &config).expect("enriched");
            black_box(out.len());
        })
    });
}

fn bench_prediction_export(c: &mut Criterion) {
    let raw = synthetic_league();
    let config = FeatureConfig::default();
    c.bench_function("prediction_table_flatten", |b| {
        b.iter(|| {
            let merged = pipeline::prediction_ready(black_box(&raw), &config).expect("merged");
            let table = merged_table(&merged, config.window);
            black_box(table.rows.len());
        })
    });
}

criterion_group!(benches, bench_standings, bench_enriched, bench_prediction_export);
criterion_main!(benches);
