//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作、序列化

pub mod html;

pub use html::{html_to_dom, inner_html, outer_html, parse_fragment, serialize_document};
