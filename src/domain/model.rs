use crate::utils::error::{AssetError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 遊戲素材分類，對應輸出目錄下的固定子資料夾
pub const CATEGORY_CHARACTERS: &str = "characters";
pub const CATEGORY_WEAPONS: &str = "weapons";
pub const CATEGORY_EFFECTS: &str = "effects";
pub const CATEGORY_UI_ELEMENTS: &str = "ui_elements";

pub const STANDARD_CATEGORIES: [&str; 4] = [
    CATEGORY_CHARACTERS,
    CATEGORY_WEAPONS,
    CATEGORY_EFFECTS,
    CATEGORY_UI_ELEMENTS,
];

/// 一次「生成 → 下載 → 存檔」的工作單位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetJob {
    pub category: String,
    pub name: String,
    pub prompt: String,
    pub filename: String,
}

impl AssetJob {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        prompt: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            prompt: prompt.into(),
            filename: filename.into(),
        }
    }

    /// 日誌用的提示詞摘要
    pub fn prompt_preview(&self) -> String {
        truncate_prompt(&self.prompt, PROMPT_PREVIEW_CHARS)
    }
}

pub const PROMPT_PREVIEW_CHARS: usize = 80;

pub fn truncate_prompt(prompt: &str, max_chars: usize) -> String {
    match prompt.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &prompt[..idx]),
        None => prompt.to_string(),
    }
}

/// 依分類分組的素材清單；分類順序與分類內的插入順序即為執行順序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobCatalog {
    groups: Vec<(String, Vec<AssetJob>)>,
}

impl JobCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: AssetJob) {
        match self.groups.iter_mut().find(|(name, _)| *name == job.category) {
            Some((_, jobs)) => jobs.push(job),
            None => self.groups.push((job.category.clone(), vec![job])),
        }
    }

    pub fn with_job(mut self, job: AssetJob) -> Self {
        self.push(job);
        self
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[AssetJob])> {
        self.groups
            .iter()
            .map(|(name, jobs)| (name.as_str(), jobs.as_slice()))
    }

    /// 依執行順序攤平的素材
    pub fn jobs(&self) -> impl Iterator<Item = &AssetJob> {
        self.groups.iter().flat_map(|(_, jobs)| jobs.iter())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, jobs)| jobs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 只保留指定分類，順序不變
    pub fn retain_categories(&mut self, keep: &[String]) {
        self.groups.retain(|(name, _)| keep.iter().any(|k| k == name));
    }
}

impl FromIterator<AssetJob> for JobCatalog {
    fn from_iter<I: IntoIterator<Item = AssetJob>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for job in iter {
            catalog.push(job);
        }
        catalog
    }
}

/// 分類 → 輸出目錄
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputLayout {
    dirs: BTreeMap<String, PathBuf>,
}

impl OutputLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{root}/{category}` for every category name given.
    pub fn under_root<'a>(root: impl AsRef<Path>, categories: impl IntoIterator<Item = &'a str>) -> Self {
        let root = root.as_ref();
        let dirs = categories
            .into_iter()
            .map(|category| (category.to_string(), root.join(category)))
            .collect();
        Self { dirs }
    }

    pub fn insert(&mut self, category: impl Into<String>, dir: impl Into<PathBuf>) {
        self.dirs.insert(category.into(), dir.into());
    }

    pub fn dir_for(&self, category: &str) -> Result<&Path> {
        self.dirs
            .get(category)
            .map(PathBuf::as_path)
            .ok_or_else(|| AssetError::UnmappedCategoryError {
                category: category.to_string(),
            })
    }

    pub fn target_path(&self, job: &AssetJob) -> Result<PathBuf> {
        Ok(self.dir_for(&job.category)?.join(&job.filename))
    }

    pub fn dirs(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.dirs
            .iter()
            .map(|(category, dir)| (category.as_str(), dir.as_path()))
    }

    /// 執行前檢查：每個素材的分類都必須有對應目錄
    pub fn ensure_covers(&self, catalog: &JobCatalog) -> Result<()> {
        for category in catalog.categories() {
            self.dir_for(category)?;
        }
        Ok(())
    }
}

/// 整批共用的生成參數，不隨素材變動
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub model: String,
    pub size: String,
    pub style: String,
    pub quality: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "jimeng".to_string(),
            size: "1024x1024".to_string(),
            style: "realistic".to_string(),
            quality: "standard".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    None,
    Fixed(Duration),
}

impl DelayPolicy {
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            Self::None
        } else {
            Self::Fixed(Duration::from_secs(secs))
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fixed(d) => Some(*d),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub attempted: usize,
    pub succeeded: usize,
}

impl RunTally {
    pub fn record(&mut self, success: bool) {
        self.attempted += 1;
        if success {
            self.succeeded += 1;
        }
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.attempted
    }
}
