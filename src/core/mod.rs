pub mod generator;

pub use crate::domain::model::{AssetJob, JobCatalog, OutputLayout, RunTally};
pub use crate::domain::ports::{ConfigProvider, ImageService, Storage};
pub use crate::utils::error::Result;
