//! 双语翻译模块
//!
//! 在已解析的 HTML 文档上查找 `<!-- trans:id -->...<!-- trans_end:id -->`
//! 标记的区块，用当前路由的译文生成可切换的双语容器：
//! - **scanner**: 起始标记扫描
//! - **extractor**: 标记区块内容提取
//! - **renderer**: 结构分类与译文渲染
//! - **swapper**: 双语容器替换与视图切换
//! - **common**: 通用文本匹配替换
//! - **routes**: 路由规范化与路由翻译表
//! - **storage**: 翻译数据快照存储
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use bilingual::translation::storage::memory::MemoryStore;
//! use bilingual::{BilingualConfig, BilingualEngine};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = BilingualEngine::new(BilingualConfig::default(), Box::new(MemoryStore::new()))?;
//! engine.set_route("/x/");
//! engine.add_translation("greet", "你好");
//!
//! let html = engine.process_html(b"<div><!--trans:greet--><p>Hello</p><!--trans_end:greet--></div>")?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod extractor;
pub mod renderer;
pub mod routes;
pub mod scanner;
pub mod storage;
pub mod swapper;

/// 双语容器
pub const CONTAINER_CLASS: &str = "bilingual-container";
/// 译文视图
pub const TRANSLATION_CLASS: &str = "bilingual-translation";
/// 原文视图
pub const ORIGINAL_CLASS: &str = "bilingual-original";
/// 容器上存在此 class 时显示原文
pub const SHOW_ORIGINAL_CLASS: &str = "show-original";
/// 容器上记录区块 ID 的属性
pub const TRANS_ID_ATTR: &str = "data-trans-id";
/// 已做过通用文本替换的元素
pub const COMMON_ATTR: &str = "data-bilingual-common";

pub use common::{CommonMatch, CommonTextMatcher, MatchKind};
pub use config::{BilingualConfig, DefaultView, SingleElementMode};
pub use error::{BilingualError, BilingualResult, ErrorSeverity};
pub use extractor::{extract_block, find_end_marker, BlockContent};
pub use renderer::{classify, render_translation, RenderStrategy};
pub use routes::{normalize_route, route_from_url, RouteTranslationTable, TranslationMap};
pub use scanner::{Marker, MarkerScanner};
pub use storage::{SnapshotStore, DEFAULT_STORAGE_KEY};
pub use swapper::{
    find_container, find_containers, swap_region, toggle_view, unwrap_container, visible_view,
    VisibleView,
};
