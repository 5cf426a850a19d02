//! 双语容器替换与视图切换
//!
//! 容器结构：
//!
//! ```html
//! <div class="bilingual-container" data-trans-id="id">
//!   <div class="bilingual-translation">...</div>
//!   <div class="bilingual-original">...</div>
//! </div>
//! ```
//!
//! 容器上的 `show-original` class 就是视图状态，点击切换只翻转这个 class。
//! 两个视图任何时候只显示一个。

use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};

use crate::parsers::html::dom::{
    append_child, detach, get_node_attr, has_class, html_attr, insert_before, new_element,
    next_sibling, toggle_class,
};
use crate::translation::config::DefaultView;
use crate::translation::error::{BilingualError, BilingualResult};
use crate::translation::extractor::BlockContent;

use super::{CONTAINER_CLASS, ORIGINAL_CLASS, SHOW_ORIGINAL_CLASS, TRANSLATION_CLASS, TRANS_ID_ATTR};

/// 当前可见的视图（两者互斥）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleView {
    /// 显示译文，隐藏原文
    Translation,
    /// 显示原文，隐藏译文
    Original,
}

impl VisibleView {
    pub fn toggled(self) -> Self {
        match self {
            VisibleView::Translation => VisibleView::Original,
            VisibleView::Original => VisibleView::Translation,
        }
    }
}

impl From<DefaultView> for VisibleView {
    fn from(view: DefaultView) -> Self {
        match view {
            DefaultView::Translation => VisibleView::Translation,
            DefaultView::Original => VisibleView::Original,
        }
    }
}

/// 构造双语容器；原始元素被移动（不是复制）到原文视图中
pub fn build_container(
    dom: &RcDom,
    id: &str,
    translation_children: Vec<Handle>,
    originals: &[Handle],
    view: DefaultView,
) -> Handle {
    let class = match VisibleView::from(view) {
        VisibleView::Translation => CONTAINER_CLASS.to_string(),
        VisibleView::Original => format!("{} {}", CONTAINER_CLASS, SHOW_ORIGINAL_CLASS),
    };
    let container = new_element(
        dom,
        "div",
        vec![html_attr("class", &class), html_attr(TRANS_ID_ATTR, id)],
    );

    let translation = new_element(dom, "div", vec![html_attr("class", TRANSLATION_CLASS)]);
    for child in translation_children {
        append_child(&translation, child);
    }

    let original = new_element(dom, "div", vec![html_attr("class", ORIGINAL_CLASS)]);
    for element in originals {
        append_child(&original, element.clone());
    }

    append_child(&container, translation);
    append_child(&container, original);
    container
}

/// 用双语容器替换起始标记到结束标记（含）之间的区域
///
/// 容器插在起始标记之前，随后从起始标记开始逐个移除兄弟节点直到结束标记。
pub fn swap_region(
    dom: &RcDom,
    start: &Handle,
    end: &Handle,
    block: &BlockContent,
    translation_children: Vec<Handle>,
    id: &str,
    view: DefaultView,
) -> BilingualResult<Handle> {
    let container = build_container(dom, id, translation_children, &block.elements, view);
    insert_before(start, container.clone())?;

    let mut node = Some(start.clone());
    while let Some(current) = node {
        let next = next_sibling(&current);
        detach(&current);
        if Rc::ptr_eq(&current, end) {
            break;
        }
        node = next;
    }

    Ok(container)
}

/// 撤销替换：原文视图中的节点移回容器所在位置，容器被移除
pub fn unwrap_container(container: &Handle) -> BilingualResult<()> {
    let original = container
        .children
        .borrow()
        .iter()
        .find(|child| has_class(child, ORIGINAL_CLASS))
        .cloned()
        .ok_or_else(|| BilingualError::DomError("双语容器缺少原文视图".to_string()))?;

    let children: Vec<Handle> = original.children.borrow().iter().cloned().collect();
    for child in children {
        insert_before(container, child)?;
    }
    detach(container);
    Ok(())
}

/// 切换视图，返回切换后的视图
pub fn toggle_view(container: &Handle) -> VisibleView {
    if toggle_class(container, SHOW_ORIGINAL_CLASS) {
        VisibleView::Original
    } else {
        VisibleView::Translation
    }
}

pub fn visible_view(container: &Handle) -> VisibleView {
    if has_class(container, SHOW_ORIGINAL_CLASS) {
        VisibleView::Original
    } else {
        VisibleView::Translation
    }
}

/// 文档中所有双语容器（按文档顺序）
pub fn find_containers(root: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_containers(root, &mut found);
    found
}

fn collect_containers(node: &Handle, found: &mut Vec<Handle>) {
    if has_class(node, CONTAINER_CLASS) {
        found.push(node.clone());
        return;
    }
    for child in node.children.borrow().iter() {
        collect_containers(child, found);
    }
}

/// 按区块 ID 查找容器
pub fn find_container(root: &Handle, id: &str) -> Option<Handle> {
    find_containers(root)
        .into_iter()
        .find(|container| get_node_attr(container, TRANS_ID_ATTR).as_deref() == Some(id))
}
