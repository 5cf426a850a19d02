//! 通用文本匹配
//!
//! 对没有翻译标记的常见文本（导航、表头、按钮文字等）做直接替换：
//! 在元素序列化后的内部标记中，把第一次出现的匹配文本替换为译文，然后重新解析。
//! 不创建双语容器，也不做结构重建。替换过的元素带 `data-bilingual-common` 属性，
//! 它和它的后代不会再次替换。

use markup5ever_rcdom::Handle;

use crate::parsers::html::dom::{
    element_children, find_first_descendant, get_node_name, has_ancestor_with_attr,
    has_ancestor_with_class, is_attached_to, set_inner_html, set_node_attr, text_content,
};
use crate::parsers::html::serializer::inner_html;
use crate::parsers::html::utils::{trim_unicode, COMMON_TEXT_TAGS, MEDIA_TAGS, SKIP_TAGS, WHITESPACES};
use crate::translation::routes::TranslationMap;

use super::{COMMON_ATTR, CONTAINER_CLASS};

/// 匹配方式，按尝试顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// 完全一致
    Exact,
    /// 忽略大小写与空白差异后一致
    Normalized,
    /// 文本包含键
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonMatch {
    pub key: String,
    pub translation: String,
    pub kind: MatchKind,
    /// 元素中实际被替换的文本；规范化匹配时是元素自身的文本，其余情况等于键
    pub matched: String,
}

impl CommonMatch {
    pub fn is_partial(&self) -> bool {
        self.kind == MatchKind::Partial
    }
}

fn normalize_text(text: &str) -> String {
    text.split(WHITESPACES)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 通用文本匹配器
pub struct CommonTextMatcher<'a> {
    table: &'a TranslationMap,
}

impl<'a> CommonTextMatcher<'a> {
    pub fn new(table: &'a TranslationMap) -> Self {
        Self { table }
    }

    /// 空译文视为缺失
    fn entries(&self) -> impl Iterator<Item = (&'a String, &'a String)> {
        self.table.iter().filter(|(_, value)| !value.is_empty())
    }

    /// 依次尝试完全匹配、规范化匹配、包含匹配；同一级别中按插入顺序取第一个
    pub fn find(&self, text: &str) -> Option<CommonMatch> {
        if let Some(value) = self.table.get(text).filter(|value| !value.is_empty()) {
            return Some(CommonMatch {
                key: text.to_string(),
                translation: value.clone(),
                kind: MatchKind::Exact,
                matched: text.to_string(),
            });
        }

        let normalized = normalize_text(text);
        if let Some((key, value)) = self.entries().find(|(key, _)| normalize_text(key) == normalized) {
            return Some(CommonMatch {
                key: key.clone(),
                translation: value.clone(),
                kind: MatchKind::Normalized,
                matched: text.to_string(),
            });
        }

        self.entries()
            .find(|(key, _)| !key.is_empty() && text.contains(key.as_str()))
            .map(|(key, value)| CommonMatch {
                key: key.clone(),
                translation: value.clone(),
                kind: MatchKind::Partial,
                matched: key.clone(),
            })
    }

    fn is_candidate(element: &Handle) -> bool {
        let name = match get_node_name(element) {
            Some(name) => name,
            None => return false,
        };

        if !COMMON_TEXT_TAGS.contains(&name) || SKIP_TAGS.contains(&name) {
            return false;
        }

        if has_ancestor_with_class(element, CONTAINER_CLASS)
            || has_ancestor_with_attr(element, COMMON_ATTR)
        {
            return false;
        }

        if trim_unicode(&text_content(element)).is_empty() {
            return false;
        }

        find_first_descendant(element, MEDIA_TAGS).is_none()
    }

    /// 收集所有候选元素及其匹配结果（不修改文档）
    pub fn collect(&self, root: &Handle) -> Vec<(Handle, CommonMatch)> {
        let mut found = Vec::new();
        self.collect_into(root, &mut found);
        found
    }

    fn collect_into(&self, node: &Handle, found: &mut Vec<(Handle, CommonMatch)>) {
        for child in element_children(node) {
            if Self::is_candidate(&child) {
                let text = text_content(&child);
                if let Some(found_match) = self.find(trim_unicode(&text)) {
                    found.push((child.clone(), found_match));
                }
            }
            self.collect_into(&child, found);
        }
    }

    /// 先收集再替换，返回实际替换的元素数
    pub fn apply(&self, root: &Handle) -> usize {
        if self.table.is_empty() {
            return 0;
        }

        let matches = self.collect(root);
        let mut replaced = 0;

        for (element, found_match) in matches {
            // 祖先元素先被替换时，后代已经脱离文档
            if !is_attached_to(&element, root) {
                continue;
            }

            if replace_first(&element, &found_match.matched, &found_match.translation) {
                set_node_attr(&element, COMMON_ATTR, Some(String::new()));
                tracing::debug!(
                    "通用文本替换: {:?} -> {:?} ({:?})",
                    found_match.key,
                    found_match.translation,
                    found_match.kind
                );
                replaced += 1;
            }
        }

        replaced
    }
}

/// 替换元素内部标记中第一次出现的 `matched`
fn replace_first(element: &Handle, matched: &str, translation: &str) -> bool {
    let markup = inner_html(element);
    if matched.is_empty() || !markup.contains(matched) {
        return false;
    }

    set_inner_html(element, &markup.replacen(matched, translation, 1));
    true
}
