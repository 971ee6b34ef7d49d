use crate::domain::model::GenerationParams;
use crate::domain::ports::{ConfigProvider, ImageService};
use crate::utils::error::{AssetError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GENERATIONS_PATH: &str = "/v1/images/generations";

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    sessionid: &'a str,
    size: &'a str,
    style: &'a str,
    quality: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Option<Vec<GeneratedImage>>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: String,
}

/// 圖像生成服務的 HTTP 實作
///
/// `session` 帶著授權標頭並在所有生成請求間共用連線；圖片下載走不帶授權的
/// `downloader`，內容主機不需要 token。
pub struct HttpImageService {
    endpoint: String,
    token: String,
    session: Client,
    downloader: Client,
}

impl HttpImageService {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            AssetError::InvalidConfigValueError {
                field: "token".to_string(),
                value: String::new(),
                reason: format!("Token is not a valid header value: {}", e),
            }
        })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let session = Client::builder().default_headers(headers).build()?;
        let downloader = Client::builder().build()?;

        Ok(Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATIONS_PATH),
            token: token.to_string(),
            session,
            downloader,
        })
    }

    pub fn from_config(config: &impl ConfigProvider) -> Result<Self> {
        Self::new(config.base_url(), config.token())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageService for HttpImageService {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        timeout: Duration,
    ) -> Result<String> {
        let payload = GenerationRequest {
            model: &params.model,
            prompt,
            sessionid: &self.token,
            size: &params.size,
            style: &params.style,
            quality: &params.quality,
        };

        tracing::debug!("POST {}", self.endpoint);
        let response = self
            .session
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Generation response status: {}", status);
        if !status.is_success() {
            return Err(AssetError::HttpStatusError {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        // 先取原始內容再解析，讓 JSON 錯誤與傳輸錯誤分開
        let body = response.bytes().await?;
        let parsed: GenerationResponse = serde_json::from_slice(&body)?;

        parsed
            .data
            .and_then(|images| images.into_iter().next())
            .map(|image| image.url)
            .ok_or_else(|| AssetError::ContentError {
                message: format!(
                    "response has no image data: {}",
                    String::from_utf8_lossy(&body)
                ),
            })
    }

    async fn download(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let response = self.downloader.get(url).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::HttpStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
