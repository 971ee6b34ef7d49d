use crate::config::GeneratorConfig;
use crate::domain::model::{AssetJob, DelayPolicy, GenerationParams, JobCatalog, OutputLayout, RunTally};
use crate::domain::ports::{ImageService, Storage};
use crate::utils::error::Result;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 依序執行素材清單：生成、下載、寫入分類目錄
pub struct BatchAssetGenerator<S: ImageService, St: Storage> {
    service: S,
    storage: St,
    params: GenerationParams,
    request_timeout: Duration,
    download_timeout: Duration,
    delay: DelayPolicy,
    stop: Arc<AtomicBool>,
}

impl<S: ImageService, St: Storage> BatchAssetGenerator<S, St> {
    pub fn new(service: S, storage: St, config: &GeneratorConfig) -> Self {
        Self {
            service,
            storage,
            params: config.params.clone(),
            request_timeout: config.request_timeout,
            download_timeout: config.download_timeout,
            delay: config.delay,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 設定後，批次會在下一個素材開始前停止；進行中的素材不會被中斷
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub async fn prepare_output_layout(&self, layout: &OutputLayout) -> Result<()> {
        for (category, dir) in layout.dirs() {
            self.storage.create_dir_all(dir).await?;
            tracing::info!("📁 Output folder ready: {} -> {}", category, dir.display());
        }
        Ok(())
    }

    /// 成功時回傳寫入的檔案路徑
    pub async fn generate_one(
        &self,
        job: &AssetJob,
        layout: &OutputLayout,
        timeout_request: Duration,
        timeout_download: Duration,
    ) -> Result<PathBuf> {
        let target = layout.target_path(job)?;

        tracing::info!("🎨 Generating {}/{}", job.category, job.filename);
        tracing::info!("📝 Prompt: {}", job.prompt_preview());

        let image_url = self
            .service
            .generate(&job.prompt, &self.params, timeout_request)
            .await?;
        tracing::debug!("Image URL for {}: {}", job.name, image_url);

        tracing::info!("📥 Downloading...");
        let bytes = self.service.download(&image_url, timeout_download).await?;

        self.storage.write_file(&target, &bytes).await?;
        Ok(target)
    }

    /// 每個素材恰好嘗試一次；單一失敗只記入統計，不會中止批次
    pub async fn run_all(
        &self,
        catalog: &JobCatalog,
        layout: &OutputLayout,
        delay: DelayPolicy,
    ) -> Result<RunTally> {
        layout.ensure_covers(catalog)?;

        let total = catalog.len();
        let mut tally = RunTally::default();

        for (category, jobs) in catalog.groups() {
            tracing::info!("🎨 Category {} ({} assets)", category, jobs.len());

            for job in jobs {
                if tally.attempted > 0 {
                    if let Some(pause) = delay.duration() {
                        tracing::info!("⏳ Waiting {:?}...", pause);
                        tokio::time::sleep(pause).await;
                    }
                }

                if self.stop.load(Ordering::SeqCst) {
                    tracing::warn!(
                        "⏹️ Run stopped before {}/{}; {} of {} assets attempted",
                        job.category,
                        job.filename,
                        tally.attempted,
                        total
                    );
                    return Ok(tally);
                }

                tracing::info!("📍 [{}/{}] {}", tally.attempted + 1, total, job.name);

                match self
                    .generate_one(job, layout, self.request_timeout, self.download_timeout)
                    .await
                {
                    Ok(path) => {
                        tally.record(true);
                        tracing::info!("✅ Saved {}/{} to {}", job.category, job.filename, path.display());
                    }
                    Err(e) => {
                        tally.record(false);
                        tracing::error!(
                            "❌ Failed {}/{} (prompt: {}): {} (Category: {:?})",
                            job.category,
                            job.filename,
                            job.prompt_preview(),
                            e,
                            e.category()
                        );
                        tracing::debug!("💡 {}", e.recovery_suggestion());
                    }
                }
            }
        }

        tracing::info!("🎯 Generation finished: {}/{} succeeded", tally.succeeded, tally.attempted);
        Ok(tally)
    }

    /// 檢查分類、建立輸出目錄後執行整批；只有這兩步的錯誤會向外傳遞
    pub async fn execute(&self, catalog: &JobCatalog, layout: &OutputLayout) -> Result<RunTally> {
        layout.ensure_covers(catalog)?;
        self.prepare_output_layout(layout).await?;
        self.run_all(catalog, layout, self.delay).await
    }

    /// 每個分類目錄下目前的 PNG 檔
    pub async fn layout_summary(&self, layout: &OutputLayout) -> Vec<(String, Vec<PathBuf>)> {
        let mut summary = Vec::new();
        for (category, dir) in layout.dirs() {
            let files = match self.storage.list_files(dir, "png").await {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!("Cannot list {}: {}", dir.display(), e);
                    Vec::new()
                }
            };
            summary.push((category.to_string(), files));
        }
        summary
    }
}

/// 第一次訊號設定停止旗標；第二次訊號回傳 true，由呼叫端立即結束程序
pub async fn watch_interrupts<F, Fut>(stop: Arc<AtomicBool>, mut next_signal: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    tracing::warn!("⏹️ Interrupt received, stopping after the current asset (Ctrl-C again to quit now)");
    stop.store(true, Ordering::SeqCst);

    if next_signal().await.is_err() {
        return false;
    }
    tracing::warn!("⏹️ Second interrupt, exiting immediately");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::STANDARD_CATEGORIES;
    use crate::utils::error::AssetError;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio::time::Instant;

    /// 記錄呼叫順序；提示詞含 "fail" 的回傳空結果
    #[derive(Default)]
    struct MockService {
        prompts: Mutex<Vec<String>>,
    }

    impl MockService {
        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ImageService for MockService {
        async fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
            _timeout: Duration,
        ) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if prompt.contains("fail") {
                return Err(AssetError::ContentError {
                    message: "empty data".to_string(),
                });
            }
            Ok(format!("mock://{}", prompt))
        }

        async fn download(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>> {
            Ok(url.trim_start_matches("mock://").as_bytes().to_vec())
        }
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig::new("http://localhost:8000", "token").with_delay(DelayPolicy::None)
    }

    fn catalog() -> JobCatalog {
        JobCatalog::new()
            .with_job(AssetJob::new("weapons", "sword", "sword prompt", "sword.png"))
            .with_job(AssetJob::new("effects", "trail", "trail fail prompt", "trail.png"))
            .with_job(AssetJob::new("weapons", "energy", "energy prompt", "energy.png"))
    }

    #[tokio::test]
    async fn test_run_all_attempts_every_job_in_catalog_order() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::under_root(temp_dir.path(), STANDARD_CATEGORIES);
        let generator = BatchAssetGenerator::new(MockService::default(), LocalStorage::new(), &config());

        let tally = generator.execute(&catalog(), &layout).await.unwrap();

        assert_eq!(
            generator.service.prompts(),
            vec!["sword prompt", "energy prompt", "trail fail prompt"]
        );
        assert_eq!(tally, RunTally { attempted: 3, succeeded: 2 });
        assert!(!tally.all_succeeded());

        let sword = std::fs::read(temp_dir.path().join("weapons").join("sword.png")).unwrap();
        assert_eq!(sword, b"sword prompt");
        assert!(!temp_dir.path().join("effects").join("trail.png").exists());
    }

    #[tokio::test]
    async fn test_unmapped_category_aborts_before_any_job() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::under_root(temp_dir.path(), ["weapons"]);
        let generator = BatchAssetGenerator::new(MockService::default(), LocalStorage::new(), &config());

        let err = generator.execute(&catalog(), &layout).await.unwrap_err();

        assert!(matches!(err, AssetError::UnmappedCategoryError { .. }));
        assert!(generator.service.prompts().is_empty());
        assert!(!temp_dir.path().join("weapons").exists());
    }

    /// 只存在記憶體中的儲存，避免檔案 I/O 影響暫停時鐘
    #[derive(Clone, Default)]
    struct MemoryStorage {
        files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    }

    impl Storage for MemoryStorage {
        async fn create_dir_all(&self, _dir: &Path) -> Result<()> {
            Ok(())
        }

        async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
            self.files.lock().unwrap().insert(path.to_path_buf(), data.to_vec());
            Ok(())
        }

        async fn list_files(&self, _dir: &Path, _extension: &str) -> Result<Vec<PathBuf>> {
            Ok(self.files.lock().unwrap().keys().cloned().collect())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_jobs() {
        let layout = OutputLayout::under_root("out", STANDARD_CATEGORIES);
        let storage = MemoryStorage::default();
        let generator = BatchAssetGenerator::new(MockService::default(), storage.clone(), &config());
        let delay = Duration::from_millis(100);

        let started = Instant::now();
        let tally = generator
            .run_all(&catalog(), &layout, DelayPolicy::Fixed(delay))
            .await
            .unwrap();

        assert_eq!(tally.attempted, 3);
        assert_eq!(started.elapsed(), delay * 2);
        assert_eq!(storage.files.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_job_has_no_delay() {
        let layout = OutputLayout::under_root("out", STANDARD_CATEGORIES);
        let generator =
            BatchAssetGenerator::new(MockService::default(), MemoryStorage::default(), &config());
        let catalog = JobCatalog::new()
            .with_job(AssetJob::new("weapons", "sword", "sword prompt", "sword.png"));

        let started = Instant::now();
        let tally = generator
            .run_all(&catalog, &layout, DelayPolicy::Fixed(Duration::from_secs(3)))
            .await
            .unwrap();

        assert_eq!(tally, RunTally { attempted: 1, succeeded: 1 });
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_stop_handle_halts_between_jobs() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::under_root(temp_dir.path(), STANDARD_CATEGORIES);
        let generator = BatchAssetGenerator::new(MockService::default(), LocalStorage::new(), &config());

        generator.stop_handle().store(true, Ordering::SeqCst);
        let tally = generator.execute(&catalog(), &layout).await.unwrap();

        assert_eq!(tally.attempted, 0);
        assert!(generator.service.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_layout_summary_lists_pngs() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::under_root(temp_dir.path(), STANDARD_CATEGORIES);
        let generator = BatchAssetGenerator::new(MockService::default(), LocalStorage::new(), &config());
        generator.execute(&catalog(), &layout).await.unwrap();

        let summary = generator.layout_summary(&layout).await;
        let weapons = summary.iter().find(|(c, _)| c == "weapons").unwrap();
        assert_eq!(weapons.1.len(), 2);
        let effects = summary.iter().find(|(c, _)| c == "effects").unwrap();
        assert!(effects.1.is_empty());
    }

    #[tokio::test]
    async fn test_layout_summary_lists_earlier_files_after_failed_run() {
        let temp_dir = TempDir::new().unwrap();
        let layout = OutputLayout::under_root(temp_dir.path(), STANDARD_CATEGORIES);
        let generator = BatchAssetGenerator::new(MockService::default(), LocalStorage::new(), &config());
        let catalog = JobCatalog::new()
            .with_job(AssetJob::new("effects", "trail", "trail fail prompt", "trail.png"));

        std::fs::create_dir_all(temp_dir.path().join("weapons")).unwrap();
        std::fs::write(temp_dir.path().join("weapons").join("old.png"), b"png").unwrap();

        let tally = generator.execute(&catalog, &layout).await.unwrap();
        assert_eq!(tally.succeeded, 0);

        let summary = generator.layout_summary(&layout).await;
        let weapons = summary.iter().find(|(c, _)| c == "weapons").unwrap();
        assert_eq!(weapons.1, vec![temp_dir.path().join("weapons").join("old.png")]);
    }

    fn signals(count: usize) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<()>();
        for _ in 0..count {
            tx.send(()).unwrap();
        }
        drop(tx);
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        move || {
            let rx = Arc::clone(&rx);
            Box::pin(async move {
                rx.lock()
                    .await
                    .recv()
                    .await
                    .ok_or_else(|| std::io::Error::other("signal stream closed"))
            })
        }
    }

    #[tokio::test]
    async fn test_first_interrupt_only_sets_stop_flag() {
        let stop = Arc::new(AtomicBool::new(false));

        let exit_now = watch_interrupts(Arc::clone(&stop), signals(1)).await;

        assert!(!exit_now);
        assert!(stop.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_second_interrupt_requests_immediate_exit() {
        let stop = Arc::new(AtomicBool::new(false));

        let exit_now = watch_interrupts(Arc::clone(&stop), signals(2)).await;

        assert!(exit_now);
        assert!(stop.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_no_interrupt_leaves_run_alone() {
        let stop = Arc::new(AtomicBool::new(false));

        assert!(!watch_interrupts(Arc::clone(&stop), signals(0)).await);
        assert!(!stop.load(Ordering::SeqCst));
    }
}
