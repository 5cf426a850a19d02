//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，所有变量都以 `BILINGUAL_` 为前缀（`NO_COLOR` 除外）。

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::translation::config::{DefaultView as DefaultViewValue, SingleElementMode as ModeValue};

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 未设置时返回 `Ok(None)`，设置了但无法解析时返回错误
    fn get_optional() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "BILINGUAL_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何非空值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 存储相关环境变量
pub mod storage {
    use super::*;

    /// 快照数据库路径
    pub struct Path;
    impl EnvVar<PathBuf> for Path {
        const NAME: &'static str = "BILINGUAL_STORAGE_PATH";
        const DEFAULT: Option<PathBuf> = None;
        const DESCRIPTION: &'static str = "Path of the on-disk translation snapshot database";

        fn parse(value: &str) -> EnvResult<PathBuf> {
            let path = value.trim();
            if path.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Storage path cannot be empty".to_string(),
                });
            }
            Ok(PathBuf::from(path))
        }
    }

    /// 快照存储键
    pub struct Key;
    impl EnvVar<String> for Key {
        const NAME: &'static str = "BILINGUAL_STORAGE_KEY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Key under which the translation snapshot is stored";

        fn parse(value: &str) -> EnvResult<String> {
            let key = value.trim();
            if key.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Storage key cannot be empty".to_string(),
                });
            }
            Ok(key.to_string())
        }
    }
}

/// 渲染相关环境变量
pub mod render {
    use super::*;

    /// 容器初始显示的视图
    pub struct DefaultView;
    impl EnvVar<DefaultViewValue> for DefaultView {
        const NAME: &'static str = "BILINGUAL_DEFAULT_VIEW";
        const DEFAULT: Option<DefaultViewValue> = Some(DefaultViewValue::Translation);
        const DESCRIPTION: &'static str = "Initially visible view: translation, original";

        fn parse(value: &str) -> EnvResult<DefaultViewValue> {
            value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Invalid view '{}'. Use: translation, original", value),
            })
        }
    }

    /// 单元素区块的渲染方式
    pub struct SingleElementMode;
    impl EnvVar<ModeValue> for SingleElementMode {
        const NAME: &'static str = "BILINGUAL_SINGLE_ELEMENT_MODE";
        const DEFAULT: Option<ModeValue> = Some(ModeValue::Reconstruct);
        const DESCRIPTION: &'static str = "Single element rendering: reconstruct, clone-replace";

        fn parse(value: &str) -> EnvResult<ModeValue> {
            value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Invalid mode '{}'. Use: reconstruct, clone-replace", value),
            })
        }
    }

    /// 注入切换样式与脚本
    pub struct InjectAssets;
    impl EnvVar<bool> for InjectAssets {
        const NAME: &'static str = "BILINGUAL_INJECT_ASSETS";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Inject toggle stylesheet and script into processed documents";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 处理通用文本
    pub struct ProcessCommon;
    impl EnvVar<bool> for ProcessCommon {
        const NAME: &'static str = "BILINGUAL_PROCESS_COMMON";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Replace known common texts after block processing";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("Environment variables:\n");

    let entries: [(&str, &str); 8] = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION),
        (storage::Path::NAME, storage::Path::DESCRIPTION),
        (storage::Key::NAME, storage::Key::DESCRIPTION),
        (render::DefaultView::NAME, render::DefaultView::DESCRIPTION),
        (render::SingleElementMode::NAME, render::SingleElementMode::DESCRIPTION),
        (render::InjectAssets::NAME, render::InjectAssets::DESCRIPTION),
        (render::ProcessCommon::NAME, render::ProcessCommon::DESCRIPTION),
    ];
    for (name, description) in entries {
        docs.push_str(&format!("  {:<32} {}\n", name, description));
    }

    docs
}
