pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_export;
pub mod leagues;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod raw_table;
pub mod standings;
pub mod stats;
pub mod window_features;

pub use config::{PipelineConfig, Product};
pub use dataset::{LeagueDataset, OutputFormat};
pub use error::SchemaError;
pub use raw_table::RawTable;
