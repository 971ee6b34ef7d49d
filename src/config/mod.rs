pub mod catalog_file;

#[cfg(feature = "cli")]
mod cli;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::domain::model::{DelayPolicy, GenerationParams, OutputLayout, STANDARD_CATEGORIES};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_OUTPUT_DIR: &str = "Assets/GeneratedAssets";
pub const DEFAULT_DELAY_SECS: u64 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// 生成器的完整設定，於建構時傳入而非全域狀態
#[derive(Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub token: String,
    pub output_dir: PathBuf,
    pub delay: DelayPolicy,
    pub request_timeout: Duration,
    pub download_timeout: Duration,
    pub params: GenerationParams,
}

impl GeneratorConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delay: DelayPolicy::from_secs(DEFAULT_DELAY_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            params: GenerationParams::default(),
        }
    }

    pub fn from_provider(provider: &impl ConfigProvider, params: GenerationParams) -> Self {
        Self {
            base_url: provider.base_url().to_string(),
            token: provider.token().to_string(),
            output_dir: provider.output_dir().to_path_buf(),
            delay: provider.delay_policy(),
            request_timeout: provider.request_timeout(),
            download_timeout: provider.download_timeout(),
            params,
        }
    }

    /// 輸出根目錄下的四個標準分類目錄
    pub fn standard_layout(&self) -> OutputLayout {
        OutputLayout::under_root(&self.output_dir, STANDARD_CATEGORIES)
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_delay(mut self, delay: DelayPolicy) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeouts(mut self, request: Duration, download: Duration) -> Self {
        self.request_timeout = request;
        self.download_timeout = download;
        self
    }
}

impl fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("output_dir", &self.output_dir)
            .field("delay", &self.delay)
            .field("request_timeout", &self.request_timeout)
            .field("download_timeout", &self.download_timeout)
            .field("params", &self.params)
            .finish()
    }
}

impl ConfigProvider for GeneratorConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token(&self) -> &str {
        &self.token
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn delay_policy(&self) -> DelayPolicy {
        self.delay
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn download_timeout(&self) -> Duration {
        self.download_timeout
    }
}

impl Validate for GeneratorConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_non_empty_string("token", &self.token)?;
        validation::validate_path("output_dir", &self.output_dir.to_string_lossy())?;
        validation::validate_positive_number(
            "request_timeout_secs",
            self.request_timeout.as_secs(),
            1,
        )?;
        validation::validate_positive_number(
            "download_timeout_secs",
            self.download_timeout.as_secs(),
            1,
        )?;
        validation::validate_non_empty_string("generation.model", &self.params.model)?;
        validation::validate_non_empty_string("generation.size", &self.params.size)?;
        Ok(())
    }
}
