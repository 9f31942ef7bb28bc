use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use fbref_features::config::{PipelineConfig, Product};
use fbref_features::dataset::{LeagueDataset, OutputFormat};
use fbref_features::leagues::{builtin_leagues, find_league};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut config = PipelineConfig::from_env();
    if let Some(storage) = arg_value(&args, "storage") {
        config.storage_root = PathBuf::from(storage);
    }

    let product = match arg_value(&args, "product") {
        Some(raw) => Product::parse(&raw).ok_or_else(|| anyhow!("unknown product {raw:?}"))?,
        None => Product::Prediction,
    };
    let format = match arg_value(&args, "format") {
        Some(raw) => OutputFormat::parse(&raw).ok_or_else(|| anyhow!("unknown format {raw:?}"))?,
        None => OutputFormat::Csv,
    };

    let leagues = match arg_value(&args, "league") {
        Some(name) => vec![find_league(&name).with_context(|| {
            let known = builtin_leagues()
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>();
            format!("unknown league {name:?}; expected one of {known:?}")
        })?],
        None => builtin_leagues().iter().collect(),
    };

    let mut failures = 0usize;
    for league in leagues {
        let dataset = LeagueDataset::open(config.clone(), league)?;
        match dataset.export(product, format) {
            Ok(path) => println!("{}: {}", league.name, path.display()),
            Err(err) => {
                failures += 1;
                println!("{}: failed: {err:#}", league.name);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{failures} league(s) failed"));
    }
    Ok(())
}

/// Accepts both `--name=value` and `--name value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}
