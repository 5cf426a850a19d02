//! # Immersive Bilingual
//!
//! 在 HTML 文档中把 `<!-- trans:id -->...<!-- trans_end:id -->` 标记的区块渲染成
//! 可点击切换的双语容器，并管理以路由为键的翻译数据。
//!
//! ## 模块组织
//!
//! - `core` - 双语引擎：翻译表管理与文档处理流程
//! - `env` - 类型安全的环境变量
//! - `parsers` - HTML 解析、DOM 操作、序列化、资源注入
//! - `translation` - 标记扫描、区块提取、译文渲染、容器替换、通用文本匹配、存储

pub mod core;
pub mod env;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use crate::core::{BilingualEngine, EncodingProcessor, ProcessReport};
pub use translation::{
    BilingualConfig, BilingualError, BilingualResult, DefaultView, RouteTranslationTable,
    SingleElementMode, TranslationMap, VisibleView,
};
