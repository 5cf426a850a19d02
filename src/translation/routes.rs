//! 路由翻译表
//!
//! 以路由为键名的全量翻译数据：`{ "/geekdex": { "Hello": "你好" }, ... }`。
//! 路由键在写入、读取、删除和导入时都会规范化。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::translation::error::{BilingualError, BilingualResult};

/// 单个路由下的翻译条目，保持插入顺序
pub type TranslationMap = IndexMap<String, String>;

const INDEX_SUFFIX: &str = "/index.html";

/// 规范化路由
///
/// - `/example/index.html` -> `/example/`
/// - `/index.html` -> `/`
/// - 其他路径原样返回
pub fn normalize_route(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    match path.strip_suffix(INDEX_SUFFIX) {
        Some(directory) => format!("{}/", directory),
        None => path.to_string(),
    }
}

/// 从页面 URL 中取出规范化后的路由
pub fn route_from_url(page_url: &str) -> BilingualResult<String> {
    let parsed = Url::parse(page_url)
        .map_err(|e| BilingualError::ParseError(format!("无效的URL '{}': {}", page_url, e)))?;
    Ok(normalize_route(parsed.path()))
}

/// 全量翻译数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTranslationTable {
    routes: IndexMap<String, TranslationMap>,
}

impl RouteTranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文本解析；路由键会被规范化，规范化后重复的键以后出现者为准
    pub fn from_json(json: &str) -> BilingualResult<Self> {
        let raw: IndexMap<String, TranslationMap> = serde_json::from_str(json)?;
        Ok(raw.into_iter().collect())
    }

    /// 导出为格式化 JSON（两个空格缩进）
    pub fn to_json_pretty(&self) -> BilingualResult<String> {
        Ok(serde_json::to_string_pretty(&self.routes)?)
    }

    pub fn get(&self, route: &str) -> Option<&TranslationMap> {
        self.routes.get(&normalize_route(route))
    }

    /// 查找某一路由下的单条翻译
    pub fn lookup(&self, route: &str, key: &str) -> Option<&str> {
        self.get(route)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    pub fn insert(&mut self, route: &str, entries: TranslationMap) -> Option<TranslationMap> {
        self.routes.insert(normalize_route(route), entries)
    }

    /// 取得路由的条目表，不存在时创建
    pub fn entry(&mut self, route: &str) -> &mut TranslationMap {
        self.routes.entry(normalize_route(route)).or_default()
    }

    pub fn remove(&mut self, route: &str) -> Option<TranslationMap> {
        self.routes.shift_remove(&normalize_route(route))
    }

    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }
}

impl FromIterator<(String, TranslationMap)> for RouteTranslationTable {
    fn from_iter<I: IntoIterator<Item = (String, TranslationMap)>>(iter: I) -> Self {
        let mut table = RouteTranslationTable::new();
        for (route, entries) in iter {
            table.insert(&route, entries);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route("/a/index.html"), "/a/");
        assert_eq!(normalize_route("/index.html"), "/");
        assert_eq!(normalize_route("/a/page.html"), "/a/page.html");
        assert_eq!(normalize_route("/api/users"), "/api/users");
        assert_eq!(normalize_route("/a/b/index.html"), "/a/b/");
        assert_eq!(normalize_route("/myindex.html"), "/myindex.html");
        assert_eq!(normalize_route(""), "/");
    }

    #[test]
    fn test_route_from_url() {
        assert_eq!(
            route_from_url("https://blog.algs.tech/posts/xxx.html").unwrap(),
            "/posts/xxx.html"
        );
        assert_eq!(route_from_url("https://example.com/example/index.html").unwrap(), "/example/");
        assert_eq!(route_from_url("https://example.com").unwrap(), "/");
        assert!(route_from_url("not a url").is_err());
    }

    #[test]
    fn test_keys_are_normalized_on_insert_and_lookup() {
        let mut table = RouteTranslationTable::new();
        let mut entries = TranslationMap::new();
        entries.insert("greet".to_string(), "你好".to_string());
        table.insert("/x/index.html", entries);

        assert_eq!(table.routes().collect::<Vec<_>>(), vec!["/x/"]);
        assert_eq!(table.lookup("/x/", "greet"), Some("你好"));
        assert_eq!(table.lookup("/x/index.html", "greet"), Some("你好"));
        assert!(table.remove("/x/index.html").is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn test_from_json_normalizes_and_keeps_order() {
        let table = RouteTranslationTable::from_json(
            r#"{"/b/index.html": {"z": "1", "a": "2"}, "/a": {"k": "v"}}"#,
        )
        .unwrap();

        assert_eq!(table.routes().collect::<Vec<_>>(), vec!["/b/", "/a"]);
        let keys: Vec<&String> = table.get("/b/").unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        assert!(RouteTranslationTable::from_json(r#"{"/a": "oops"}"#).is_err());
        assert!(RouteTranslationTable::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let table = RouteTranslationTable::from_json(
            r#"{"/x/": {"greet": "你好", "bye": "再见"}, "/geekdex": {"Welcome": "欢迎"}}"#,
        )
        .unwrap();
        let exported = table.to_json_pretty().unwrap();
        assert!(exported.contains("\n  \"/x/\": {"));
        assert_eq!(RouteTranslationTable::from_json(&exported).unwrap(), table);
    }
}
