//! 双语模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 双语渲染错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BilingualError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 存储错误（快照读写失败）
    #[error("存储错误: {0}")]
    StorageError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// DOM 结构错误
    #[error("DOM 错误: {0}")]
    DomError(String),

    /// 文件读写错误
    #[error("IO 错误: {0}")]
    IoError(String),
}

impl BilingualError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BilingualError::ConfigError(_) => ErrorSeverity::Critical,
            BilingualError::StorageError(_) => ErrorSeverity::Warning,
            BilingualError::SerializationError(_) => ErrorSeverity::Error,
            BilingualError::ParseError(_) => ErrorSeverity::Info,
            BilingualError::DomError(_) => ErrorSeverity::Error,
            BilingualError::IoError(_) => ErrorSeverity::Error,
        }
    }

    /// 是否属于“跳过即可”的输入问题
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BilingualError::ParseError(_) | BilingualError::StorageError(_)
        )
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let new_msg = |msg: String| format!("{} (上下文: {})", msg, context);

        match self {
            BilingualError::ConfigError(msg) => BilingualError::ConfigError(new_msg(msg)),
            BilingualError::StorageError(msg) => BilingualError::StorageError(new_msg(msg)),
            BilingualError::SerializationError(msg) => {
                BilingualError::SerializationError(new_msg(msg))
            }
            BilingualError::ParseError(msg) => BilingualError::ParseError(new_msg(msg)),
            BilingualError::DomError(msg) => BilingualError::DomError(new_msg(msg)),
            BilingualError::IoError(msg) => BilingualError::IoError(new_msg(msg)),
        }
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    /// 对应的日志级别
    pub fn level(self) -> tracing::Level {
        match self {
            ErrorSeverity::Info => tracing::Level::INFO,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Error | ErrorSeverity::Critical => tracing::Level::ERROR,
        }
    }
}

impl From<std::io::Error> for BilingualError {
    fn from(error: std::io::Error) -> Self {
        BilingualError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for BilingualError {
    fn from(error: serde_json::Error) -> Self {
        if error.is_data() || error.is_syntax() || error.is_eof() {
            BilingualError::ParseError(error.to_string())
        } else {
            BilingualError::SerializationError(error.to_string())
        }
    }
}

impl From<toml::de::Error> for BilingualError {
    fn from(error: toml::de::Error) -> Self {
        BilingualError::ConfigError(format!("解析TOML配置失败: {}", error))
    }
}

impl From<redb::Error> for BilingualError {
    fn from(error: redb::Error) -> Self {
        BilingualError::StorageError(error.to_string())
    }
}

impl From<crate::env::EnvError> for BilingualError {
    fn from(error: crate::env::EnvError) -> Self {
        BilingualError::ConfigError(error.to_string())
    }
}

/// 结果类型别名
pub type BilingualResult<T> = Result<T, BilingualError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BilingualError::DomError("标记节点没有父节点".to_string());
        assert_eq!(error.to_string(), "DOM 错误: 标记节点没有父节点");
    }

    #[test]
    fn test_with_context() {
        let error = BilingualError::StorageError("写入失败".to_string()).with_context("greet");
        assert_eq!(error.to_string(), "存储错误: 写入失败 (上下文: greet)");
    }

    #[test]
    fn test_json_errors_are_parse_errors() {
        let error: BilingualError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(error, BilingualError::ParseError(_)));
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(
            BilingualError::ConfigError(String::new()).severity()
                > BilingualError::ParseError(String::new()).severity()
        );
    }

    #[test]
    fn test_severity_level() {
        assert_eq!(
            BilingualError::StorageError(String::new()).severity().level(),
            tracing::Level::WARN
        );
        assert_eq!(
            BilingualError::ParseError(String::new()).severity().level(),
            tracing::Level::INFO
        );
        assert_eq!(ErrorSeverity::Critical.level(), tracing::Level::ERROR);
        assert_eq!(ErrorSeverity::Error.level(), tracing::Level::ERROR);
    }
}
