use std::path::PathBuf;

use crate::leagues::LeagueConfig;
use crate::window_features::{DEFAULT_WINDOW, FeatureConfig, SeasonAverageScaling};

const DEFAULT_STORAGE_DIR: &str = "storage";

/// Output products, one per public pipeline entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Base,
    Features,
    Prediction,
    FuturePrediction,
}

impl Product {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "base" | "data" => Some(Product::Base),
            "features" | "enriched" => Some(Product::Features),
            "prediction" => Some(Product::Prediction),
            "future" | "future_prediction" => Some(Product::FuturePrediction),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Product::Base => "base",
            Product::Features => "features",
            Product::Prediction => "prediction",
            Product::FuturePrediction => "future_prediction",
        }
    }
}

/// Where the tables live and how features are generated. The pipeline
/// functions themselves take tables; only the dataset front reads paths.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub storage_root: PathBuf,
    pub features: FeatureConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_DIR),
            features: FeatureConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads `FBREF_STORAGE_DIR`, `FBREF_WINDOW` and
    /// `FBREF_SEASON_AVG_SCALING`, after loading `.env.local` and `.env`.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let storage_root = std::env::var("FBREF_STORAGE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));
        let window = std::env::var("FBREF_WINDOW")
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_WINDOW);
        let season_average_scaling = std::env::var("FBREF_SEASON_AVG_SCALING")
            .ok()
            .and_then(|val| SeasonAverageScaling::parse(&val))
            .unwrap_or_default();

        Self {
            storage_root,
            features: FeatureConfig {
                window,
                season_average_scaling,
            },
        }
    }

    pub fn history_path(&self, league: &LeagueConfig) -> PathBuf {
        self.storage_root
            .join("data")
            .join(format!("{}_data.csv", league.name))
    }

    pub fn fixtures_path(&self, league: &LeagueConfig) -> PathBuf {
        self.storage_root
            .join("future_matches")
            .join(format!("{}_future_data.csv", league.name))
    }

    pub fn alias_overrides_path(&self) -> PathBuf {
        self.storage_root.join("mapping_team.json")
    }

    /// Optional scraped-header renames, `{"Columns": {..}}`.
    pub fn column_mapping_path(&self) -> PathBuf {
        self.storage_root.join("mapping_columns.json")
    }

    pub fn output_path(&self, league: &LeagueConfig, product: Product, extension: &str) -> PathBuf {
        self.storage_root
            .join("processed")
            .join(format!("{}_{}.{extension}", league.slug(), product.key()))
    }
}
