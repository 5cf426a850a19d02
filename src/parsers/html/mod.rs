//! HTML解析和处理模块
//!
//! - `utils`: 基础常量和工具函数
//! - `assets`: 切换样式与脚本注入
//! - `dom`: 基础DOM操作（解析、遍历、插入、摘除、深拷贝）
//! - `metadata`: 文档元数据（字符集）
//! - `serializer`: 序列化功能

pub mod assets;
pub mod dom;
pub mod metadata;
pub mod serializer;
pub mod utils;

pub use assets::inject_assets;
pub use dom::{
    find_nodes, get_child_node_by_name, get_node_attr, get_node_name, get_parent_node, html_to_dom,
    parse_fragment, set_node_attr,
};
pub use metadata::get_charset;
pub use serializer::{inner_html, outer_html, serialize_document};
pub use utils::{is_heading, is_inline_style_tag, HEADING_TAGS, INLINE_STYLE_TAGS, WHITESPACES};
