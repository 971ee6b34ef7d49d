pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::HttpImageService, storage::LocalStorage};
pub use config::{catalog_file::CatalogFile, GeneratorConfig};
pub use core::generator::{watch_interrupts, BatchAssetGenerator};
pub use domain::catalog::CatalogPreset;
pub use domain::model::{
    AssetJob, DelayPolicy, GenerationParams, JobCatalog, OutputLayout, RunTally,
};
pub use utils::error::{AssetError, Result};
