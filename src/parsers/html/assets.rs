//! 双语切换资源注入
//!
//! 向文档注入一段 `<style>`（放在 `<head>` 末尾）和一段 `<script>`（放在 `<body>` 末尾）：
//! - 两个视图同时只显示一个：默认显示译文，容器带 `show-original` 时改为显示原文
//! - 脚本为每个容器绑定点击事件，阻止冒泡并切换 `show-original`
//!
//! 两个节点都带有 `data-bilingual-assets` 属性，同一文档只注入一次。

use markup5ever_rcdom::{Handle, RcDom};

use crate::parsers::html::dom::{
    append_child, find_nodes, get_node_attr, html_attr, new_element, set_text_content,
};

/// 注入节点上的标记属性
pub const ASSETS_ATTR: &str = "data-bilingual-assets";

pub const BILINGUAL_STYLES: &str = r#"
.bilingual-container {
  display: block;
  cursor: pointer;
  position: relative;
  transition: background-color 0.2s ease;
}
.bilingual-container:hover {
  background-color: rgba(197, 61, 86, 0.05);
  border-radius: 4px;
}
.bilingual-translation {
  display: block;
}
.bilingual-translation > * {
  color: inherit !important;
  line-height: inherit !important;
}
.bilingual-translation > p {
  margin-top: 0 !important;
  margin-bottom: 1em !important;
}
.bilingual-original {
  display: none;
  color: #666;
  font-size: 0.9em;
  margin: 8px 0 16px 0;
  padding: 8px 0 12px 0;
  border-top: 1px dashed #ccc;
}
.bilingual-container.show-original .bilingual-translation {
  display: none;
}
.bilingual-container.show-original .bilingual-original {
  display: block;
}
"#;

pub const BILINGUAL_SCRIPT: &str = r#"
(function () {
  function bind(container) {
    if (container.dataset.bilingualBound) {
      return;
    }
    container.dataset.bilingualBound = "true";
    container.addEventListener("click", function (event) {
      event.stopPropagation();
      container.classList.toggle("show-original");
    });
  }
  function init() {
    document.querySelectorAll(".bilingual-container").forEach(bind);
  }
  if (document.readyState === "loading") {
    document.addEventListener("DOMContentLoaded", init);
  } else {
    init();
  }
})();
"#;

fn has_injected(node: &Handle) -> bool {
    if get_node_attr(node, ASSETS_ATTR).is_some() {
        return true;
    }
    node.children.borrow().iter().any(has_injected)
}

/// 注入样式与切换脚本；文档中已存在时不重复注入，返回是否发生了注入
pub fn inject_assets(dom: &RcDom) -> bool {
    if has_injected(&dom.document) {
        tracing::debug!("双语资源已存在，跳过注入");
        return false;
    }

    let mut injected = false;

    if let Some(head) = find_nodes(&dom.document, vec!["html", "head"]).first() {
        let style = new_element(dom, "style", vec![html_attr(ASSETS_ATTR, "style")]);
        set_text_content(&style, BILINGUAL_STYLES);
        append_child(head, style);
        injected = true;
    }

    if let Some(body) = find_nodes(&dom.document, vec!["html", "body"]).first() {
        let script = new_element(dom, "script", vec![html_attr(ASSETS_ATTR, "script")]);
        set_text_content(&script, BILINGUAL_SCRIPT);
        append_child(body, script);
        injected = true;
    }

    injected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;
    use crate::parsers::html::serializer::serialize_document;

    #[test]
    fn test_injects_once() {
        let dom = html_to_dom(b"<html><head><title>t</title></head><body><p>x</p></body></html>", "utf-8")
            .unwrap();

        assert!(inject_assets(&dom));
        assert!(!inject_assets(&dom));

        let html = String::from_utf8(serialize_document(&dom, "utf-8").unwrap()).unwrap();
        assert_eq!(html.matches(ASSETS_ATTR).count(), 2);
        assert!(html.contains(r#"<style data-bilingual-assets="style">"#));
        assert!(html.contains(r#"<p>x</p><script data-bilingual-assets="script">"#));
        assert!(html.contains(".bilingual-container.show-original .bilingual-original"));
    }

    #[test]
    fn test_views_are_exclusive() {
        let compact: String = BILINGUAL_STYLES.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(compact.contains(".bilingual-original { display: none;"));
        assert!(compact.contains(
            ".bilingual-container.show-original .bilingual-translation { display: none; }"
        ));
        assert!(compact.contains(
            ".bilingual-container.show-original .bilingual-original { display: block; }"
        ));
    }

    #[test]
    fn test_script_is_not_escaped() {
        let dom = html_to_dom(b"<p>x</p>", "utf-8").unwrap();
        inject_assets(&dom);

        let html = String::from_utf8(serialize_document(&dom, "utf-8").unwrap()).unwrap();
        assert!(html.contains(r#"classList.toggle("show-original")"#));
        assert!(html.contains("rgba(197, 61, 86, 0.05)"));
    }
}
