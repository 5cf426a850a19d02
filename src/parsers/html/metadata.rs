//! HTML 元数据读取
//!
//! 处理文档前需要知道文档自身声明的字符集，才能正确地重新解析与输出。

use markup5ever_rcdom::Handle;

use super::dom::{find_nodes, get_node_attr, trim_html};

/// 从 `Content-Type` 值中取出 charset，例如 `text/html; charset="utf-8"` -> `utf-8`
pub fn parse_content_type_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(trim_html)
        .find_map(|part| {
            let (name, value) = part.split_once('=')?;
            if trim_html(name).eq_ignore_ascii_case("charset") {
                Some(trim_html(value).trim_matches('"').to_string())
            } else {
                None
            }
        })
        .filter(|charset| !charset.is_empty())
}

/// 获取文档声明的字符集
///
/// 支持 `<meta charset="...">` 与
/// `<meta http-equiv="content-type" content="text/html; charset=...">` 两种写法。
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, vec!["html", "head", "meta"]).iter() {
        if let Some(charset) = get_node_attr(meta_node, "charset") {
            return Some(charset);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = get_node_attr(meta_node, "content") {
                return parse_content_type_charset(&content);
            }
        }
    }

    None
}
