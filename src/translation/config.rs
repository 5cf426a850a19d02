//! 双语渲染配置
//!
//! 加载顺序：默认值 -> `CONFIG_PATHS` 中第一个存在的文件 -> `BILINGUAL_*` 环境变量。

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::translation::error::{BilingualError, BilingualResult};
use crate::translation::storage::DEFAULT_STORAGE_KEY;

/// 配置常量
pub mod constants {
    pub const CONFIG_PATHS: &[&str] = &["bilingual.toml", ".bilingual.toml", "bilingual.json"];

    pub const DEFAULT_STORAGE_PATH: &str = ".bilingual/translations.redb";
}

/// 容器初始显示的视图
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultView {
    #[default]
    Translation,
    Original,
}

impl FromStr for DefaultView {
    type Err = BilingualError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "translation" => Ok(DefaultView::Translation),
            "original" => Ok(DefaultView::Original),
            other => Err(BilingualError::ConfigError(format!("未知的视图: {}", other))),
        }
    }
}

impl fmt::Display for DefaultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultView::Translation => write!(f, "translation"),
            DefaultView::Original => write!(f, "original"),
        }
    }
}

/// 单个非标题元素的渲染方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SingleElementMode {
    /// 按原元素的标签与属性重新构造
    #[default]
    Reconstruct,
    /// 深拷贝原元素后替换其中的文本
    CloneReplace,
}

impl FromStr for SingleElementMode {
    type Err = BilingualError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "reconstruct" => Ok(SingleElementMode::Reconstruct),
            "clone-replace" | "clone_replace" | "clone" => Ok(SingleElementMode::CloneReplace),
            other => Err(BilingualError::ConfigError(format!("未知的渲染方式: {}", other))),
        }
    }
}

impl fmt::Display for SingleElementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SingleElementMode::Reconstruct => write!(f, "reconstruct"),
            SingleElementMode::CloneReplace => write!(f, "clone-replace"),
        }
    }
}

/// 双语引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BilingualConfig {
    /// 快照存储键
    pub storage_key: String,
    /// 磁盘快照数据库路径（命令行使用）
    pub storage_path: PathBuf,
    pub default_view: DefaultView,
    pub single_element_mode: SingleElementMode,
    /// 向文档注入切换样式与脚本
    pub inject_assets: bool,
    /// 区块处理完成后执行通用文本替换
    pub process_common: bool,
}

impl Default for BilingualConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_path: PathBuf::from(constants::DEFAULT_STORAGE_PATH),
            default_view: DefaultView::default(),
            single_element_mode: SingleElementMode::default(),
            inject_assets: true,
            process_common: true,
        }
    }
}

impl BilingualConfig {
    /// 按完整顺序加载配置并验证
    pub fn load() -> BilingualResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> BilingualResult<()> {
        if self.storage_key.trim().is_empty() {
            return Err(BilingualError::ConfigError("存储键不能为空".to_string()));
        }

        if self.storage_path.as_os_str().is_empty() {
            return Err(BilingualError::ConfigError("存储路径不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    ///
    /// 未设置的变量保持原值；无法解析的变量记录警告后忽略。
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{render, storage, EnvVar};

        match storage::Key::get_optional() {
            Ok(Some(key)) => self.storage_key = key,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match storage::Path::get_optional() {
            Ok(Some(path)) => {
                tracing::info!("环境变量覆盖存储路径: {}", path.display());
                self.storage_path = path;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match render::DefaultView::get_optional() {
            Ok(Some(view)) => self.default_view = view,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match render::SingleElementMode::get_optional() {
            Ok(Some(mode)) => self.single_element_mode = mode,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match render::InjectAssets::get_optional() {
            Ok(Some(inject)) => self.inject_assets = inject,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }

        match render::ProcessCommon::get_optional() {
            Ok(Some(process)) => self.process_common = process,
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }
    }

    fn load_config() -> BilingualResult<Self> {
        for path in constants::CONFIG_PATHS {
            if Path::new(path).exists() {
                tracing::info!("加载配置文件: {}", path);
                return Self::load_from_file(path);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(Self::default())
    }

    /// 从指定文件加载配置，`.json` 结尾按 JSON 解析，其余按 TOML 解析
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> BilingualResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BilingualError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        let is_json = path
            .extension()
            .map(|extension| extension.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            serde_json::from_str(&content)
                .map_err(|e| BilingualError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| BilingualError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> BilingualResult<()> {
        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| BilingualError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| BilingualError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BilingualConfig::default();
        assert_eq!(config.storage_key, "immersive_bilingual_translations");
        assert_eq!(config.default_view, DefaultView::Translation);
        assert_eq!(config.single_element_mode, SingleElementMode::Reconstruct);
        assert!(config.inject_assets);
        assert!(config.process_common);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let config = BilingualConfig {
            storage_key: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(BilingualError::ConfigError(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bilingual.toml");
        std::fs::write(
            &path,
            "default_view = \"original\"\nsingle_element_mode = \"clone-replace\"\n",
        )
        .unwrap();

        let config = BilingualConfig::load_from_file(&path).unwrap();
        assert_eq!(config.default_view, DefaultView::Original);
        assert_eq!(config.single_element_mode, SingleElementMode::CloneReplace);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert!(config.inject_assets);
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bilingual.json");
        std::fs::write(&path, r#"{"storage_key": "site", "inject_assets": false}"#).unwrap();

        let config = BilingualConfig::load_from_file(&path).unwrap();
        assert_eq!(config.storage_key, "site");
        assert!(!config.inject_assets);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bilingual.toml");
        std::fs::write(&path, "default_view = \"sideways\"").unwrap();

        assert!(matches!(
            BilingualConfig::load_from_file(&path),
            Err(BilingualError::ConfigError(_))
        ));
    }

    #[test]
    fn test_example_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("example.toml");
        BilingualConfig::generate_example_config(&path).unwrap();
        assert_eq!(
            BilingualConfig::load_from_file(&path).unwrap(),
            BilingualConfig::default()
        );
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("Original".parse::<DefaultView>().unwrap(), DefaultView::Original);
        assert_eq!(
            "clone_replace".parse::<SingleElementMode>().unwrap(),
            SingleElementMode::CloneReplace
        );
        assert!("nope".parse::<SingleElementMode>().is_err());
        assert_eq!(SingleElementMode::CloneReplace.to_string(), "clone-replace");
    }
}
