/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 标题标签
pub const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// 行内样式标签，译文重建时会尝试保留这些包裹
pub const INLINE_STYLE_TAGS: &[&str] = &[
    "strong", "b", "em", "i", "code", "kbd", "mark", "small", "sub", "sup", "u", "s", "del", "ins",
];

/// 通用文本匹配允许处理的标签
pub const COMMON_TEXT_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "a", "td", "th"];

/// 通用文本匹配永远跳过的标签
pub const SKIP_TAGS: &[&str] = &[
    "button", "input", "select", "textarea", "script", "style", "code", "pre",
];

/// 含有这些后代的元素不做通用文本替换
pub const MEDIA_TAGS: &[&str] = &["img", "video", "audio", "canvas", "svg"];

/// 检查是否为标题标签
pub fn is_heading(tag_name: &str) -> bool {
    HEADING_TAGS.contains(&tag_name.to_lowercase().as_str())
}

/// 检查是否为行内样式标签
pub fn is_inline_style_tag(tag_name: &str) -> bool {
    INLINE_STYLE_TAGS.contains(&tag_name.to_lowercase().as_str())
}

/// 裁剪首尾的 Unicode 空白（含全角空格、不换行空格和 BOM）
pub fn trim_unicode(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// 转义属性值，用于拼接 HTML 字符串
pub fn escape_attr_value(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
