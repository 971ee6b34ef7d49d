use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("Malformed response: {0}")]
    ResponseFormatError(#[from] serde_json::Error),

    #[error("No usable result: {message}")]
    ContentError { message: String },

    #[error("Filesystem error at {}: {source}", .path.display())]
    FilesystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Category '{category}' has no output directory")]
    UnmappedCategoryError { category: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類，對應批次流程中的失敗來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    ResponseFormat,
    Content,
    Filesystem,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AssetError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FilesystemError {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TransportError(_) | Self::HttpStatusError { .. } => ErrorCategory::Transport,
            Self::ResponseFormatError(_) => ErrorCategory::ResponseFormat,
            Self::ContentError { .. } => ErrorCategory::Content,
            Self::FilesystemError { .. } => ErrorCategory::Filesystem,
            Self::ConfigError { .. }
            | Self::UnmappedCategoryError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Content => ErrorSeverity::Low,
            ErrorCategory::Transport | ErrorCategory::ResponseFormat => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Filesystem => ErrorSeverity::Critical,
        }
    }

    /// 對應 CLI 的結束碼；1 保留給「部分素材失敗」
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Filesystem => 3,
            _ => 1,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::TransportError(e) if e.is_timeout() => {
                "The service took too long; raise the request or download timeout"
            }
            Self::TransportError(_) => {
                "Check that the generation service is running and reachable at the base URL"
            }
            Self::HttpStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check that ASSET_GEN_TOKEN holds a valid session token"
            }
            Self::HttpStatusError { status, .. } if *status == 429 => {
                "The service is rate limiting; increase the delay between jobs"
            }
            Self::HttpStatusError { .. } => "Inspect the generation service logs for this request",
            Self::ResponseFormatError(_) => {
                "The service answered with an unexpected body; verify the base URL points at the image API"
            }
            Self::ContentError { .. } => {
                "The prompt produced no image; re-run the job or adjust the prompt"
            }
            Self::FilesystemError { .. } => {
                "Make sure the output directory is writable and not shadowed by a regular file"
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
            Self::UnmappedCategoryError { .. } => {
                "Add the category to the output layout or remove its jobs from the catalog"
            }
            Self::MissingConfigError { .. } => {
                "Provide the value on the command line or through its ASSET_GEN_* environment variable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::TransportError(e) if e.is_timeout() => "Request timed out".to_string(),
            Self::TransportError(_) => "Could not reach the generation service".to_string(),
            Self::HttpStatusError { status, .. } => {
                format!("Generation service rejected the request (HTTP {})", status)
            }
            Self::ResponseFormatError(_) => {
                "Generation service returned an unreadable response".to_string()
            }
            Self::ContentError { .. } => "Generation service returned no image".to_string(),
            Self::FilesystemError { path, .. } => {
                format!("Cannot write to {}", path.display())
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssetError>;
