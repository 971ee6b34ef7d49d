use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_DELAY_SECS, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_OUTPUT_DIR,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::domain::catalog::CatalogPreset;
use crate::domain::model::DelayPolicy;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Parser)]
#[command(name = "game-asset-gen")]
#[command(about = "Generate categorized game art assets through a local image-generation API")]
pub struct CliConfig {
    /// Base URL of the image-generation service
    #[arg(long, env = "ASSET_GEN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Session token, sent as bearer token and as `sessionid`
    #[arg(long, env = "ASSET_GEN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Root directory for the category folders
    #[arg(long, env = "ASSET_GEN_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Seconds to wait between jobs (0 disables the delay)
    #[arg(long, env = "ASSET_GEN_DELAY_SECS", default_value_t = DEFAULT_DELAY_SECS)]
    pub delay_secs: u64,

    #[arg(long, env = "ASSET_GEN_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "ASSET_GEN_DOWNLOAD_TIMEOUT_SECS", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
    pub download_timeout_secs: u64,

    /// TOML catalog file; takes precedence over --preset
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Built-in catalog to run when no catalog file is given
    #[arg(long, value_enum, default_value_t = CatalogPreset::Full)]
    pub preset: CatalogPreset,

    /// Only run these categories (repeatable)
    #[arg(long = "only", value_name = "CATEGORY")]
    pub only: Vec<String>,

    /// Show the plan without contacting the service or writing files
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn token_value(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }
}

// token 不可出現在 verbose 日誌中
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("output_dir", &self.output_dir)
            .field("delay_secs", &self.delay_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("catalog", &self.catalog)
            .field("preset", &self.preset)
            .field("only", &self.only)
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn token(&self) -> &str {
        self.token_value()
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn delay_policy(&self) -> DelayPolicy {
        DelayPolicy::from_secs(self.delay_secs)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        // dry run 不會呼叫服務，不需要 token
        if !self.dry_run {
            let token = validation::validate_required_field("token", &self.token)?;
            validation::validate_non_empty_string("token", token)?;
        }
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_path("output_dir", &self.output_dir.to_string_lossy())?;
        validation::validate_positive_number("request_timeout_secs", self.request_timeout_secs, 1)?;
        validation::validate_positive_number("download_timeout_secs", self.download_timeout_secs, 1)?;
        Ok(())
    }
}
