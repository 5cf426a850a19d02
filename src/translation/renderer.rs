//! 结构分类与译文渲染
//!
//! 根据区块的原始结构决定译文视图的构造方式，返回的节点都是新建的、
//! 没有父节点的节点，原始元素不会被修改。

use html5ever::interface::Attribute;
use html5ever::tendril::StrTendril;
use indexmap::IndexMap;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::parsers::html::dom::{
    append_child, deep_clone, element_children, find_first_descendant, get_node_attrs,
    get_node_name, is_non_blank_text, new_element, new_text, parse_fragment, set_inner_html,
    set_node_attr, set_text_content,
};
use crate::parsers::html::utils::{escape_attr_value, is_heading, is_inline_style_tag};
use crate::translation::config::SingleElementMode;
use crate::translation::extractor::BlockContent;

/// 渲染策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// 单个标题元素
    Heading,
    /// 单个非标题元素
    SingleElement,
    /// 多个元素
    MultiElement,
    /// 没有元素
    Empty,
}

/// 单元素内部结构
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InnerStructure {
    SimpleText,
    Paragraph,
    Complex,
    Plain,
}

/// 行内样式标签及其属性（不含 `id`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineStyle {
    pub tag_name: String,
    pub attrs: Vec<(String, String)>,
}

pub fn classify(block: &BlockContent) -> RenderStrategy {
    match block.elements.as_slice() {
        [] => RenderStrategy::Empty,
        [element] => match get_node_name(element) {
            Some(name) if is_heading(name) => RenderStrategy::Heading,
            _ => RenderStrategy::SingleElement,
        },
        _ => RenderStrategy::MultiElement,
    }
}

/// 构造译文视图的子节点
pub fn render_translation(
    dom: &RcDom,
    block: &BlockContent,
    translation: &str,
    mode: SingleElementMode,
) -> Vec<Handle> {
    let strategy = classify(block);
    tracing::debug!("渲染策略: {:?}", strategy);

    match (strategy, block.elements.first()) {
        (RenderStrategy::Heading, Some(original)) => vec![render_heading(dom, original, translation)],
        (RenderStrategy::SingleElement, Some(original)) => match mode {
            SingleElementMode::Reconstruct => vec![reconstruct(dom, original, translation)],
            SingleElementMode::CloneReplace => vec![clone_replace(original, translation)],
        },
        (RenderStrategy::MultiElement, _) => render_multiple(dom, &block.elements, translation),
        _ => parse_fragment(translation, "div"),
    }
}

fn has_markup(translation: &str) -> bool {
    translation.contains('<')
}

/// 复制除 `id` 以外的所有属性
fn attrs_without_id(node: &Handle) -> Vec<Attribute> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .filter(|attr| &*attr.name.local != "id")
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

fn same_tag_element(dom: &RcDom, original: &Handle) -> Handle {
    let tag_name = get_node_name(original).unwrap_or("div");
    new_element(dom, tag_name, attrs_without_id(original))
}

fn render_heading(dom: &RcDom, original: &Handle, translation: &str) -> Handle {
    let heading = same_tag_element(dom, original);
    if has_markup(translation) {
        set_inner_html(&heading, translation);
    } else {
        set_text_content(&heading, translation);
    }
    heading
}

fn analyze_structure(element: &Handle) -> InnerStructure {
    let children = element_children(element);
    let has_text = element.children.borrow().iter().any(is_non_blank_text);

    if children.is_empty() && has_text {
        InnerStructure::SimpleText
    } else if children.iter().any(|child| get_node_name(child) == Some("p")) {
        InnerStructure::Paragraph
    } else if children.len() > 1
        || (children.len() == 1 && !element_children(&children[0]).is_empty())
    {
        InnerStructure::Complex
    } else {
        InnerStructure::Plain
    }
}

/// 按原元素的标签与属性重新构造
pub fn reconstruct(dom: &RcDom, original: &Handle, translation: &str) -> Handle {
    let element = same_tag_element(dom, original);

    if has_markup(translation) {
        set_inner_html(&element, translation);
        return element;
    }

    match analyze_structure(original) {
        InnerStructure::SimpleText | InnerStructure::Plain => {
            set_text_content(&element, translation);
        }
        InnerStructure::Paragraph => {
            let paragraph = match find_first_descendant(original, &["p"]) {
                Some(original_p) => {
                    let paragraph = new_element(dom, "p", attrs_without_id(&original_p));
                    let styles = collect_inline_styles(&original_p);
                    set_inner_html(&paragraph, &wrap_with_styles(translation, &styles));
                    paragraph
                }
                None => {
                    let paragraph = new_element(dom, "p", vec![]);
                    set_inner_html(&paragraph, translation);
                    paragraph
                }
            };
            append_child(&element, paragraph);
        }
        InnerStructure::Complex => set_inner_html(&element, translation),
    }

    element
}

/// 按前序收集后代中的行内样式标签
pub fn collect_inline_styles(element: &Handle) -> Vec<InlineStyle> {
    let mut styles = Vec::new();
    collect_styles_into(element, &mut styles);
    styles
}

fn collect_styles_into(element: &Handle, styles: &mut Vec<InlineStyle>) {
    for child in element_children(element) {
        if let Some(name) = get_node_name(&child) {
            if is_inline_style_tag(name) {
                styles.push(InlineStyle {
                    tag_name: name.to_lowercase(),
                    attrs: get_node_attrs(&child)
                        .into_iter()
                        .filter(|(name, _)| name != "id")
                        .collect(),
                });
            }
        }
        collect_styles_into(&child, styles);
    }
}

/// 把译文包进行内样式标签，最后发现的标签在最内层
pub fn wrap_with_styles(translation: &str, styles: &[InlineStyle]) -> String {
    styles.iter().rev().fold(translation.to_string(), |inner, style| {
        let attrs: String = style
            .attrs
            .iter()
            .map(|(name, value)| format!(" {}=\"{}\"", name, escape_attr_value(value)))
            .collect();
        format!("<{tag}{attrs}>{inner}</{tag}>", tag = style.tag_name)
    })
}

/// 深拷贝原元素并替换其中的文本
pub fn clone_replace(original: &Handle, translation: &str) -> Handle {
    let copy = deep_clone(original);
    strip_clone_attrs(&copy);

    if has_markup(translation) {
        set_inner_html(&copy, translation);
    } else {
        replace_text_nodes(&copy, translation);
    }

    copy
}

/// 去掉所有 `id`，以及指向页内锚点的 `href`
fn strip_clone_attrs(node: &Handle) {
    let in_page_href = get_node_attrs(node)
        .iter()
        .any(|(name, value)| name == "href" && value.starts_with('#'));

    set_node_attr(node, "id", None);
    if in_page_href {
        set_node_attr(node, "href", None);
    }

    for child in element_children(node) {
        strip_clone_attrs(&child);
    }
}

fn collect_text_nodes(node: &Handle, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if is_non_blank_text(child) {
            found.push(child.clone());
        } else {
            collect_text_nodes(child, found);
        }
    }
}

fn replace_text_nodes(root: &Handle, translation: &str) {
    let mut text_nodes = Vec::new();
    collect_text_nodes(root, &mut text_nodes);

    let mut iter = text_nodes.iter();
    match iter.next() {
        Some(first) => {
            set_text_node(first, translation);
            for rest in iter {
                set_text_node(rest, "");
            }
        }
        None => append_child(root, new_text(translation)),
    }
}

fn set_text_node(node: &Handle, text: &str) {
    if let NodeData::Text { contents } = &node.data {
        *contents.borrow_mut() = StrTendril::from_slice(text);
    }
}

/// 原始元素中出现次数最多的标签；并列时取文档中先出现的标签
pub fn dominant_tag(elements: &[Handle]) -> Option<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for element in elements {
        if let Some(name) = get_node_name(element) {
            *counts.entry(name).or_insert(0) += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (tag, count) in counts {
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((tag, count));
        }
    }
    best.map(|(tag, _)| tag.to_string())
}

fn render_multiple(dom: &RcDom, elements: &[Handle], translation: &str) -> Vec<Handle> {
    if has_markup(translation) {
        return parse_fragment(translation, "div");
    }

    match dominant_tag(elements) {
        Some(tag_name) => {
            let wrapper = new_element(dom, &tag_name, vec![]);
            set_text_content(&wrapper, translation);
            vec![wrapper]
        }
        None => parse_fragment(translation, "div"),
    }
}
