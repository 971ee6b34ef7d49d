use crate::domain::ports::Storage;
use crate::utils::error::{AssetError, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    async fn create_dir_all(&self, dir: &Path) -> Result<()> {
        // 已存在的目錄不算錯誤；同名的一般檔案會讓 create_dir_all 失敗
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AssetError::filesystem(dir, e))
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| AssetError::filesystem(path, e))?;
        file.write_all(data)
            .await
            .map_err(|e| AssetError::filesystem(path, e))?;
        file.sync_all()
            .await
            .map_err(|e| AssetError::filesystem(path, e))?;
        Ok(())
    }

    async fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| AssetError::filesystem(dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AssetError::filesystem(dir, e))?
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(extension) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}
