use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::translation::error::{BilingualError, BilingualResult};

use super::utils::WHITESPACES;

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> BilingualResult<RcDom> {
    let s: String = if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.to_string()
    } else {
        String::from_utf8_lossy(data).to_string()
    };

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .map_err(|e| BilingualError::ParseError(format!("无法解析HTML文档: {}", e)))
}

/// 以 `context` 标签为上下文元素解析 HTML 片段，返回独立（无父节点）的节点列表
///
/// 与 `innerHTML` 赋值相同，片段开头的注释、空白和 `<style>` 等节点都会保留。
pub fn parse_fragment(html: &str, context: &str) -> Vec<Handle> {
    let scratch = html5ever::parse_fragment(
        RcDom::default(),
        Default::default(),
        QualName::new(None, ns!(html), LocalName::from(context)),
        vec![],
    )
    .one(html);

    let root = match get_child_node_by_name(&scratch.document, "html") {
        Some(root) => root,
        None => return Vec::new(),
    };

    let children: Vec<Handle> = root.children.borrow().iter().cloned().collect();
    for child in children.iter() {
        detach(child);
    }
    children
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    let node_name = match node_names.first() {
        Some(name) => *name,
        None => return found_nodes,
    };

    if node_names.len() == 1 {
        if let NodeData::Element { ref name, .. } = node.data {
            if &*name.local == node_name {
                found_nodes.push(node.clone());
            }
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    } else if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == node_name {
            let mut new_node_names = node_names;
            new_node_names.remove(0);
            found_nodes.append(&mut find_nodes(node, new_node_names));
        } else {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
            }
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    }

    found_nodes
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点的所有属性（按文档顺序）
pub fn get_node_attrs(node: &Handle) -> Vec<(String, String)> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点
///
/// `parent` 是 `Cell`，取出后必须放回，否则节点会丢失与父节点的联系。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    let _ = &attrs_mut[i].value.clear();
                    let _ = &attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(html_attr(attr_name, &attr_value));
            }
        }
    };
}

/// 构造一个 HTML 命名空间外的普通属性
pub fn html_attr(attr_name: &str, attr_value: &str) -> Attribute {
    Attribute {
        name: QualName::new(None, ns!(), LocalName::from(attr_name)),
        value: format_tendril!("{}", attr_value),
    }
}

/// 创建一个 HTML 元素节点
pub fn new_element(dom: &RcDom, tag_name: &str, attrs: Vec<Attribute>) -> Handle {
    create_element(
        dom,
        QualName::new(None, ns!(html), LocalName::from(tag_name)),
        attrs,
    )
}

/// 创建一个文本节点
pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 注释节点的原始文本
pub fn comment_text(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Comment { contents } => Some(&**contents),
        _ => None,
    }
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

/// 是否为非空白文本节点
pub fn is_non_blank_text(node: &Handle) -> bool {
    match &node.data {
        NodeData::Text { contents } => !contents.borrow().trim_matches(WHITESPACES).is_empty(),
        _ => false,
    }
}

/// 元素子节点
pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| is_element(child))
        .cloned()
        .collect()
}

/// 等价于 DOM 的 `textContent`：拼接所有后代文本节点
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, buf: &mut String) {
    match &node.data {
        NodeData::Text { contents } => buf.push_str(&contents.borrow()),
        NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, buf);
            }
        }
    }
}

/// 与 `trim()` 相同，但只裁剪 HTML 空白字符
pub fn trim_html(text: &str) -> &str {
    text.trim_matches(WHITESPACES)
}

/// 下一个兄弟节点
pub fn next_sibling(node: &Handle) -> Option<Handle> {
    let parent = get_parent_node(node)?;
    let children = parent.children.borrow();
    let index = children.iter().position(|child| Rc::ptr_eq(child, node))?;
    children.get(index + 1).cloned()
}

/// 按前序遍历查找第一个匹配标签名的后代元素（不含自身）
pub fn find_first_descendant(node: &Handle, tag_names: &[&str]) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if let Some(name) = get_node_name(child) {
            if tag_names.contains(&name) {
                return Some(child.clone());
            }
        }
        if let Some(found) = find_first_descendant(child, tag_names) {
            return Some(found);
        }
    }
    None
}

/// 是否存在带指定 class 的祖先元素（含自身）
pub fn has_ancestor_with_class(node: &Handle, class_name: &str) -> bool {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if has_class(&candidate, class_name) {
            return true;
        }
        current = get_parent_node(&candidate);
    }
    false
}

/// 是否存在带指定属性的祖先元素（含自身）
pub fn has_ancestor_with_attr(node: &Handle, attr_name: &str) -> bool {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if get_node_attr(&candidate, attr_name).is_some() {
            return true;
        }
        current = get_parent_node(&candidate);
    }
    false
}

/// 节点是否仍挂在以 `root` 为根的树上
pub fn is_attached_to(node: &Handle, root: &Handle) -> bool {
    let mut current = Some(node.clone());
    while let Some(candidate) = current {
        if Rc::ptr_eq(&candidate, root) {
            return true;
        }
        current = get_parent_node(&candidate);
    }
    false
}

pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split(WHITESPACES).any(|class| class == class_name))
        .unwrap_or(false)
}

pub fn add_class(node: &Handle, class_name: &str) {
    if has_class(node, class_name) {
        return;
    }
    let classes = match get_node_attr(node, "class") {
        Some(existing) if !trim_html(&existing).is_empty() => {
            format!("{} {}", trim_html(&existing), class_name)
        }
        _ => class_name.to_string(),
    };
    set_node_attr(node, "class", Some(classes));
}

pub fn remove_class(node: &Handle, class_name: &str) {
    if let Some(existing) = get_node_attr(node, "class") {
        let remaining: Vec<&str> = existing
            .split(WHITESPACES)
            .filter(|class| !class.is_empty() && *class != class_name)
            .collect();
        set_node_attr(node, "class", Some(remaining.join(" ")));
    }
}

/// 切换 class，返回切换后该 class 是否存在
pub fn toggle_class(node: &Handle, class_name: &str) -> bool {
    if has_class(node, class_name) {
        remove_class(node, class_name);
        false
    } else {
        add_class(node, class_name);
        true
    }
}

/// 将节点从父节点上摘除
pub fn detach(node: &Handle) {
    if let Some(weak) = node.parent.take() {
        if let Some(parent) = weak.upgrade() {
            parent
                .children
                .borrow_mut()
                .retain(|child| !Rc::ptr_eq(child, node));
        }
    }
}

/// 追加子节点（若子节点已有父节点则先摘除）
pub fn append_child(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 在 `sibling` 之前插入节点
pub fn insert_before(sibling: &Handle, node: Handle) -> BilingualResult<()> {
    let parent = get_parent_node(sibling)
        .ok_or_else(|| BilingualError::DomError("插入位置的节点没有父节点".to_string()))?;
    detach(&node);

    let index = parent
        .children
        .borrow()
        .iter()
        .position(|child| Rc::ptr_eq(child, sibling))
        .ok_or_else(|| BilingualError::DomError("节点不在其父节点的子节点列表中".to_string()))?;

    node.parent.set(Some(Rc::downgrade(&parent)));
    parent.children.borrow_mut().insert(index, node);
    Ok(())
}

/// 清空子节点
pub fn clear_children(node: &Handle) {
    let children: Vec<Handle> = node.children.borrow_mut().drain(..).collect();
    for child in children.iter() {
        child.parent.set(None);
    }
}

/// 以纯文本替换全部子节点（等价于 `textContent = ...`）
pub fn set_text_content(node: &Handle, text: &str) {
    clear_children(node);
    if !text.is_empty() {
        append_child(node, new_text(text));
    }
}

/// 以解析后的 HTML 替换全部子节点（等价于 `innerHTML = ...`）
pub fn set_inner_html(node: &Handle, html: &str) {
    let context = get_node_name(node).unwrap_or("div").to_string();
    clear_children(node);
    for child in parse_fragment(html, &context) {
        append_child(node, child);
    }
}

/// 深拷贝节点，返回的新节点没有父节点
pub fn deep_clone(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point,
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(template_contents.borrow().as_ref().map(deep_clone)),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction { target, contents } => {
            NodeData::ProcessingInstruction {
                target: target.clone(),
                contents: contents.clone(),
            }
        }
    };

    let copy = Node::new(data);
    for child in node.children.borrow().iter() {
        append_child(&copy, deep_clone(child));
    }
    copy
}
