//! 块内容提取器
//!
//! 从起始标记开始向后扫描兄弟节点（不深入子节点），找到匹配的
//! `<!-- trans_end:id -->`，并收集两者之间的内容。

use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use crate::parsers::html::dom::{comment_text, next_sibling, text_content, trim_html};
use crate::parsers::html::utils::trim_unicode;
use crate::parsers::html::serializer::outer_html;
use crate::translation::error::{BilingualError, BilingualResult};

/// 起始与结束标记之间的内容
#[derive(Debug, Clone)]
pub struct BlockContent {
    /// 元素节点（按顺序）
    pub elements: Vec<Handle>,
    /// 去除首尾空白后拼接的文本
    pub text_content: String,
    /// 元素节点的 outerHTML 拼接
    pub html_content: String,
}

impl BlockContent {
    /// 至少包含一个元素时才可渲染
    pub fn is_renderable(&self) -> bool {
        !self.elements.is_empty()
    }
}

/// 构造结束标记模式，ID 中的正则元字符按字面量处理
pub fn end_marker_pattern(id: &str) -> BilingualResult<Regex> {
    Regex::new(&format!("^trans_end:{}$", regex::escape(id)))
        .map_err(|e| BilingualError::ParseError(format!("结束标记模式无效 '{}': {}", id, e)))
}

/// 查找与起始标记配对的结束标记
///
/// 只检查后续兄弟节点；找不到时返回 `None`，调用方直接跳过该标记。
pub fn find_end_marker(start: &Handle, id: &str) -> BilingualResult<Option<Handle>> {
    let pattern = end_marker_pattern(id)?;
    let mut node = next_sibling(start);

    while let Some(candidate) = node {
        if let Some(text) = comment_text(&candidate) {
            if pattern.is_match(trim_unicode(text)) {
                return Ok(Some(candidate));
            }
        }
        node = next_sibling(&candidate);
    }

    Ok(None)
}

/// 收集起始与结束标记之间的内容
pub fn extract_block(start: &Handle, end: &Handle) -> BlockContent {
    let mut elements = Vec::new();
    let mut texts: Vec<String> = Vec::new();
    let mut node = next_sibling(start);

    while let Some(current) = node {
        if Rc::ptr_eq(&current, end) {
            break;
        }

        match &current.data {
            NodeData::Element { .. } => {
                texts.push(trim_html(&text_content(&current)).to_string());
                elements.push(current.clone());
            }
            NodeData::Text { contents } => {
                let text = trim_html(&contents.borrow()).to_string();
                if !text.is_empty() {
                    texts.push(text);
                }
            }
            _ => {}
        }

        node = next_sibling(&current);
    }

    let html_content = elements.iter().map(outer_html).collect::<String>();

    BlockContent {
        elements,
        text_content: trim_html(&texts.join(" ")).to_string(),
        html_content,
    }
}
