use crate::domain::model::{DelayPolicy, GenerationParams};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 外部圖像生成服務：送出提示詞取得圖片網址，再下載圖片內容
#[async_trait]
pub trait ImageService: Send + Sync {
    /// 回傳第一個結果的圖片網址
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        timeout: Duration,
    ) -> Result<String>;

    async fn download(&self, url: &str, timeout: Duration) -> Result<Vec<u8>>;
}

pub trait Storage: Send + Sync {
    fn create_dir_all(&self, dir: &Path) -> impl std::future::Future<Output = Result<()>> + Send;

    /// 建立或覆寫檔案，回傳前確保已寫入磁碟
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn list_files(
        &self,
        dir: &Path,
        extension: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PathBuf>>> + Send;
}

/// 行程層級設定，生成器於建構時取得
pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn token(&self) -> &str;
    fn output_dir(&self) -> &Path;
    fn delay_policy(&self) -> DelayPolicy;
    fn request_timeout(&self) -> Duration;
    fn download_timeout(&self) -> Duration;
}
