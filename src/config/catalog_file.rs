use crate::domain::model::{AssetJob, GenerationParams, JobCatalog, OutputLayout};
use crate::utils::error::{AssetError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML 素材清單檔
///
/// ```toml
/// [generation]
/// style = "anime"
///
/// [[categories]]
/// name = "weapons"
///
/// [[categories.assets]]
/// name = "flying_sword"
/// prompt = "elegant chinese flying sword, ..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub generation: Option<GenerationOverrides>,
    #[serde(default)]
    pub categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOverrides {
    pub model: Option<String>,
    pub size: Option<String>,
    pub style: Option<String>,
    pub quality: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    /// 相對於輸出根目錄；未設定時使用分類名稱
    pub dir: Option<String>,
    #[serde(default)]
    pub assets: Vec<AssetDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDefinition {
    pub name: String,
    pub prompt: String,
    /// 預設為 `{name}.png`
    pub filename: Option<String>,
}

impl CategoryDefinition {
    pub fn resolved_dir(&self) -> &str {
        self.dir.as_deref().unwrap_or(&self.name)
    }
}

impl AssetDefinition {
    pub fn filename(&self) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| format!("{}.png", self.name))
    }
}

impl CatalogFile {
    /// 從 TOML 檔案載入素材清單
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| AssetError::filesystem(path.as_ref(), e))?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AssetError::InvalidConfigValueError {
            field: "catalog".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ASSET_STYLE})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| AssetError::config(format!("Invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn generation_params(&self) -> GenerationParams {
        let mut params = GenerationParams::default();
        if let Some(overrides) = &self.generation {
            if let Some(model) = &overrides.model {
                params.model = model.clone();
            }
            if let Some(size) = &overrides.size {
                params.size = size.clone();
            }
            if let Some(style) = &overrides.style {
                params.style = style.clone();
            }
            if let Some(quality) = &overrides.quality {
                params.quality = quality.clone();
            }
        }
        params
    }

    pub fn to_catalog(&self) -> JobCatalog {
        self.categories
            .iter()
            .flat_map(|category| {
                category.assets.iter().map(move |asset| {
                    AssetJob::new(
                        category.name.as_str(),
                        asset.name.as_str(),
                        asset.prompt.as_str(),
                        asset.filename(),
                    )
                })
            })
            .collect()
    }

    pub fn to_layout(&self, output_root: &Path) -> OutputLayout {
        let mut layout = OutputLayout::new();
        for category in &self.categories {
            layout.insert(category.name.as_str(), output_root.join(category.resolved_dir()));
        }
        layout
    }
}

impl Validate for CatalogFile {
    fn validate(&self) -> Result<()> {
        if self.categories.iter().all(|c| c.assets.is_empty()) {
            return Err(AssetError::config("Catalog contains no assets"));
        }

        validation::validate_unique(
            "categories.name",
            self.categories.iter().map(|c| c.name.as_str()),
        )?;

        for category in &self.categories {
            validation::validate_non_empty_string("categories.name", &category.name)?;
            validation::validate_relative_dir("categories.dir", category.resolved_dir())?;

            let filenames: Vec<String> = category.assets.iter().map(|a| a.filename()).collect();
            for (asset, filename) in category.assets.iter().zip(&filenames) {
                validation::validate_non_empty_string("categories.assets.name", &asset.name)?;
                validation::validate_non_empty_string("categories.assets.prompt", &asset.prompt)?;
                validation::validate_filename("categories.assets.filename", filename)?;
            }
            validation::validate_unique(
                "categories.assets.filename",
                filenames.iter().map(String::as_str),
            )?;
        }

        // 兩個分類寫入同一目錄時，同名檔案會互相覆蓋
        let dirs: Vec<String> = self
            .categories
            .iter()
            .map(|c| {
                Path::new(c.resolved_dir())
                    .components()
                    .map(|part| part.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect();
        validation::validate_unique("categories.dir", dirs.iter().map(String::as_str))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[generation]
style = "anime"

[[categories]]
name = "weapons"

[[categories.assets]]
name = "flying_sword"
prompt = "elegant chinese flying sword"

[[categories.assets]]
name = "sword_energy"
prompt = "blue sword energy"
filename = "energy.png"

[[categories]]
name = "effects"
dir = "fx"

[[categories.assets]]
name = "hit_effect"
prompt = "golden sparks"
"#;

    #[test]
    fn test_parse_catalog_keeps_order() {
        let file = CatalogFile::from_toml_str(BASIC).unwrap();
        assert!(file.validate().is_ok());

        let catalog = file.to_catalog();
        let filenames: Vec<&str> = catalog.jobs().map(|j| j.filename.as_str()).collect();
        assert_eq!(filenames, vec!["flying_sword.png", "energy.png", "hit_effect.png"]);
        assert_eq!(catalog.categories().collect::<Vec<_>>(), vec!["weapons", "effects"]);
    }

    #[test]
    fn test_generation_overrides_merge_with_defaults() {
        let file = CatalogFile::from_toml_str(BASIC).unwrap();
        let params = file.generation_params();

        assert_eq!(params.style, "anime");
        assert_eq!(params.model, "jimeng");
        assert_eq!(params.size, "1024x1024");
    }

    #[test]
    fn test_layout_uses_custom_dir() {
        let file = CatalogFile::from_toml_str(BASIC).unwrap();
        let layout = file.to_layout(Path::new("out"));

        assert_eq!(layout.dir_for("weapons").unwrap(), Path::new("out").join("weapons"));
        assert_eq!(layout.dir_for("effects").unwrap(), Path::new("out").join("fx"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_CATALOG_STYLE", "pixel-art");

        let toml_content = r#"
[generation]
style = "${TEST_CATALOG_STYLE}"

[[categories]]
name = "ui_elements"

[[categories.assets]]
name = "sword_icon"
prompt = "small sword icon"
"#;

        let file = CatalogFile::from_toml_str(toml_content).unwrap();
        assert_eq!(file.generation_params().style, "pixel-art");

        std::env::remove_var("TEST_CATALOG_STYLE");
    }

    #[test]
    fn test_duplicate_filename_rejected() {
        let toml_content = r#"
[[categories]]
name = "weapons"

[[categories.assets]]
name = "sword"
prompt = "a"

[[categories.assets]]
name = "other"
prompt = "b"
filename = "sword.png"
"#;

        let file = CatalogFile::from_toml_str(toml_content).unwrap();
        assert!(file.validate().is_err());
    }

    fn catalog_with_dirs(first_dir: &str, second: &str) -> String {
        format!(
            r#"
[[categories]]
name = "weapons"
{first_dir}

[[categories.assets]]
name = "sword"
prompt = "a"

[[categories]]
{second}

[[categories.assets]]
name = "spark"
prompt = "b"
"#
        )
    }

    #[test]
    fn test_dir_outside_output_root_rejected() {
        for dir in ["/tmp/weapons", "../weapons", "art/../../weapons"] {
            let content = catalog_with_dirs(&format!("dir = \"{}\"", dir), "name = \"effects\"");
            let file = CatalogFile::from_toml_str(&content).unwrap();

            let err = file.validate().unwrap_err();
            assert!(matches!(err, AssetError::InvalidConfigValueError { ref field, .. } if field == "categories.dir"));
        }
    }

    #[test]
    fn test_category_name_used_as_dir_must_be_relative() {
        let content = catalog_with_dirs("", "name = \"../effects\"");
        let file = CatalogFile::from_toml_str(&content).unwrap();
        assert!(file.validate().is_err());
    }

    #[test]
    fn test_shared_dir_between_categories_rejected() {
        // 明確指定相同目錄
        let content = catalog_with_dirs("dir = \"art\"", "name = \"effects\"\ndir = \"art\"");
        let file = CatalogFile::from_toml_str(&content).unwrap();
        assert!(file.validate().is_err());

        // dir 與另一分類的預設目錄相同
        let content = catalog_with_dirs("", "name = \"effects\"\ndir = \"weapons/\"");
        let file = CatalogFile::from_toml_str(&content).unwrap();
        let err = file.validate().unwrap_err();
        assert!(err.to_string().contains("weapons"));

        let content = catalog_with_dirs("dir = \"art/weapons\"", "name = \"effects\"\ndir = \"art/effects\"");
        assert!(CatalogFile::from_toml_str(&content).unwrap().validate().is_ok());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let file = CatalogFile::from_toml_str("").unwrap();
        assert!(file.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let err = CatalogFile::from_toml_str("[[categories]\nname=").unwrap_err();
        assert!(err.to_string().contains("TOML parsing error"));
    }

    #[test]
    fn test_catalog_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let file = CatalogFile::from_file(temp_file.path()).unwrap();
        assert_eq!(file.to_catalog().len(), 3);
    }
}
