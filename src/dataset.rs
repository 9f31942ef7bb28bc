use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use crate::config::{PipelineConfig, Product};
use crate::feature_export::{self, FlatTable};
use crate::leagues::{LeagueConfig, alias_mismatches, load_alias_overrides};
use crate::merge::MergedMatch;
use crate::pipeline;
use crate::raw_table::{RawTable, load_column_mapping, read_csv};
use crate::standings::StandingsRow;
use crate::window_features::WindowedFeatureRow;

/// A league's stored match logs plus the configuration to process them.
#[derive(Debug, Clone)]
pub struct LeagueDataset {
    pub config: PipelineConfig,
    pub league: LeagueConfig,
    /// Scraped header -> canonical header, applied before anything else.
    pub column_mapping: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Xlsx,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "xlsx" | "excel" => Some(OutputFormat::Xlsx),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
        }
    }
}

impl LeagueDataset {
    /// Builds the dataset, folding in the league's entry from the alias
    /// overrides file and the header mapping when they exist under the
    /// storage root.
    pub fn open(config: PipelineConfig, league: &LeagueConfig) -> Result<Self> {
        let overrides_path = config.alias_overrides_path();
        let league = if overrides_path.exists() {
            let overrides = load_alias_overrides(&overrides_path)?;
            match overrides.get(&league.name) {
                Some(extra) => league.clone().with_extra_aliases(extra),
                None => league.clone(),
            }
        } else {
            league.clone()
        };
        let mapping_path = config.column_mapping_path();
        let column_mapping = if mapping_path.exists() {
            load_column_mapping(&mapping_path)?
        } else {
            HashMap::new()
        };
        Ok(Self {
            config,
            league,
            column_mapping,
        })
    }

    fn load_table(&self, path: &Path) -> Result<RawTable> {
        let mut table = read_csv(path)?;
        let renamed = table.rename_columns(&self.column_mapping);
        if renamed > 0 {
            debug!(renamed, path = %path.display(), "renamed scraped headers");
        }
        self.league.canonicalize(&mut table);
        let report = alias_mismatches(&table);
        if !report.is_clean() {
            warn!(
                league = %self.league.name,
                only_as_team = ?report.only_as_team,
                only_as_opponent = ?report.only_as_opponent,
                "team names differ between Team and Opponent"
            );
        }
        Ok(table)
    }

    pub fn history(&self) -> Result<RawTable> {
        self.load_table(&self.config.history_path(&self.league))
    }

    pub fn fixtures(&self) -> Result<RawTable> {
        self.load_table(&self.config.fixtures_path(&self.league))
    }

    pub fn get_data(&self) -> Result<Vec<StandingsRow>> {
        let raw = self.history()?;
        pipeline::base(&raw).with_context(|| format!("base table for {}", self.league.name))
    }

    pub fn get_data_with_features(&self) -> Result<Vec<WindowedFeatureRow>> {
        let raw = self.history()?;
        pipeline::enriched(&raw, &self.config.features)
            .with_context(|| format!("feature table for {}", self.league.name))
    }

    pub fn get_data_for_prediction(&self) -> Result<Vec<MergedMatch>> {
        let raw = self.history()?;
        pipeline::prediction_ready(&raw, &self.config.features)
            .with_context(|| format!("prediction table for {}", self.league.name))
    }

    pub fn get_data_for_future_prediction(&self) -> Result<Vec<MergedMatch>> {
        let history = self.history()?;
        let fixtures = self.fixtures()?;
        pipeline::future_prediction_ready(&history, &fixtures, &self.config.features)
            .with_context(|| format!("future prediction table for {}", self.league.name))
    }

    pub fn product_table(&self, product: Product) -> Result<FlatTable> {
        let window = self.config.features.window;
        Ok(match product {
            Product::Base => feature_export::base_table(&self.get_data()?),
            Product::Features => {
                feature_export::enriched_table(&self.get_data_with_features()?, window)
            }
            Product::Prediction => {
                feature_export::merged_table(&self.get_data_for_prediction()?, window)
            }
            Product::FuturePrediction => {
                feature_export::merged_table(&self.get_data_for_future_prediction()?, window)
            }
        })
    }

    /// Writes one product under `{storage}/processed/` and returns the path.
    pub fn export(&self, product: Product, format: OutputFormat) -> Result<PathBuf> {
        let table = self.product_table(product)?;
        if table.rows.is_empty() {
            return Err(anyhow!(
                "{} produced no rows for {}",
                product.key(),
                self.league.name
            ));
        }
        let path = self
            .config
            .output_path(&self.league, product, format.extension());
        match format {
            OutputFormat::Csv => table.write_csv(&path)?,
            OutputFormat::Xlsx => table.write_xlsx(&path, product.key())?,
        }
        info!(
            league = %self.league.name,
            product = product.key(),
            rows = table.rows.len(),
            path = %path.display(),
            "exported product"
        );
        Ok(path)
    }
}
