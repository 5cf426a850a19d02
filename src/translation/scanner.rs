//! 翻译标记扫描器
//!
//! 在文档中查找 `<!-- trans:id -->` 起始注释。扫描是只读的，
//! 按文档顺序（深度优先、兄弟顺序）产出标记，不会进入已经渲染过的双语容器。

use markup5ever_rcdom::Handle;
use regex::Regex;

use crate::parsers::html::dom::{comment_text, has_class};
use crate::parsers::html::utils::trim_unicode;
use crate::translation::error::{BilingualError, BilingualResult};

use super::CONTAINER_CLASS;

/// 起始标记
#[derive(Debug, Clone)]
pub struct Marker {
    /// 注释节点
    pub node: Handle,
    /// 标记 ID（已去除首尾空白）
    pub id: String,
}

/// 标记扫描器
pub struct MarkerScanner {
    start_pattern: Regex,
}

impl MarkerScanner {
    pub fn new() -> BilingualResult<Self> {
        let start_pattern = Regex::new(r"^trans:(.+)$")
            .map_err(|e| BilingualError::ParseError(format!("正则表达式编译失败: {}", e)))?;
        Ok(Self { start_pattern })
    }

    /// 如果注释是起始标记，返回其 ID
    pub fn match_start(&self, node: &Handle) -> Option<String> {
        let text = trim_unicode(comment_text(node)?);
        let captures = self.start_pattern.captures(text)?;
        let id = trim_unicode(captures.get(1)?.as_str());
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }

    /// 惰性遍历 `root` 下的所有起始标记
    pub fn iter<'a>(&'a self, root: &Handle) -> MarkerIter<'a> {
        MarkerIter {
            scanner: self,
            stack: vec![root.clone()],
        }
    }

    /// 完整收集所有起始标记
    ///
    /// 在修改 DOM 之前必须先调用此函数，把标记列表全部物化。
    pub fn collect(&self, root: &Handle) -> Vec<Marker> {
        self.iter(root).collect()
    }
}

/// 起始标记迭代器
pub struct MarkerIter<'a> {
    scanner: &'a MarkerScanner,
    stack: Vec<Handle>,
}

impl Iterator for MarkerIter<'_> {
    type Item = Marker;

    fn next(&mut self) -> Option<Marker> {
        while let Some(node) = self.stack.pop() {
            if let Some(id) = self.scanner.match_start(&node) {
                return Some(Marker { node, id });
            }

            if has_class(&node, CONTAINER_CLASS) {
                continue;
            }

            // 逆序入栈，保证按兄弟顺序出栈
            for child in node.children.borrow().iter().rev() {
                self.stack.push(child.clone());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    fn scan(html: &str) -> Vec<String> {
        let dom = html_to_dom(html.as_bytes(), "utf-8").unwrap();
        MarkerScanner::new()
            .unwrap()
            .collect(&dom.document)
            .into_iter()
            .map(|marker| marker.id)
            .collect()
    }

    #[test]
    fn test_document_order() {
        let ids = scan(
            "<div><!--trans:a--><p>A</p><section><!-- trans:b --></section></div><!--trans:c-->",
        );
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ignores_end_markers_and_other_comments() {
        let ids = scan("<!--trans_end:a--><!-- note --><!--trans:--><!--translate:x-->");
        assert!(ids.is_empty());
    }

    #[test]
    fn test_id_is_trimmed() {
        assert_eq!(scan("<p><!--trans:  spaced id  --></p>"), vec!["spaced id"]);
        assert_eq!(scan("<p><!--trans:greet\u{3000}--><!--\u{a0}trans:x--></p>"), vec!["greet", "x"]);
    }

    #[test]
    fn test_skips_rendered_containers() {
        let ids = scan(
            r#"<div class="bilingual-container"><!--trans:inner--></div><!--trans:outer-->"#,
        );
        assert_eq!(ids, vec!["outer"]);
    }

    #[test]
    fn test_iter_is_lazy() {
        let dom = html_to_dom(b"<!--trans:a--><!--trans:b-->", "utf-8").unwrap();
        let scanner = MarkerScanner::new().unwrap();
        let mut iter = scanner.iter(&dom.document);
        assert_eq!(iter.next().map(|marker| marker.id).as_deref(), Some("a"));
        assert_eq!(iter.next().map(|marker| marker.id).as_deref(), Some("b"));
        assert!(iter.next().is_none());
    }
}
