use std::collections::HashSet;
use std::rc::Rc;

use encoding_rs::Encoding;
use markup5ever_rcdom::{Handle, Node, RcDom};

use crate::parsers::html::dom::{has_ancestor_with_class, is_attached_to};
use crate::parsers::html::{get_charset, html_to_dom, inject_assets, serialize_document};
use crate::translation::common::CommonTextMatcher;
use crate::translation::config::BilingualConfig;
use crate::translation::error::{BilingualError, BilingualResult};
use crate::translation::extractor::{extract_block, find_end_marker};
use crate::translation::renderer::render_translation;
use crate::translation::routes::{normalize_route, route_from_url, RouteTranslationTable, TranslationMap};
use crate::translation::scanner::MarkerScanner;
use crate::translation::storage::memory::MemoryStore;
use crate::translation::storage::snapshot::RedbStore;
use crate::translation::storage::SnapshotStore;
use crate::translation::swapper::{find_containers, swap_region, unwrap_container};
use crate::translation::CONTAINER_CLASS;

/// 一次处理的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// 生成的双语容器数
    pub blocks: usize,
    /// 通用文本替换数
    pub common: usize,
    /// 本次是否注入了样式与脚本
    pub assets_injected: bool,
    /// 处理过程中没有发生错误；为 `false` 时文档可能只处理了一部分
    pub completed: bool,
}

/// 双语引擎
///
/// 持有全量路由翻译表、通用翻译表和当前路由。表的每次修改都会立即写入快照存储，
/// 写入结果以 `bool` 返回。文档处理是同步的，先收集全部标记再逐个修改文档。
pub struct BilingualEngine {
    config: BilingualConfig,
    store: Box<dyn SnapshotStore>,
    table: RouteTranslationTable,
    common: TranslationMap,
    current_route: String,
    scanner: MarkerScanner,
}

impl BilingualEngine {
    /// 创建引擎并从存储中载入已有快照
    ///
    /// 快照无法读取或无法解析时记录警告并从空表开始。
    pub fn new(config: BilingualConfig, store: Box<dyn SnapshotStore>) -> BilingualResult<Self> {
        config.validate()?;
        let scanner = MarkerScanner::new()?;

        let table = match store.load(&config.storage_key) {
            Ok(Some(snapshot)) => match RouteTranslationTable::from_json(&snapshot) {
                Ok(table) => {
                    tracing::debug!("已载入 {} 个路由的翻译数据", table.len());
                    table
                }
                Err(e) => {
                    tracing::warn!("快照内容无效，忽略: {}", e);
                    RouteTranslationTable::new()
                }
            },
            Ok(None) => RouteTranslationTable::new(),
            Err(e) => {
                log_error("读取快照失败", &e);
                RouteTranslationTable::new()
            }
        };

        Ok(Self {
            config,
            store,
            table,
            common: TranslationMap::new(),
            current_route: "/".to_string(),
            scanner,
        })
    }

    /// 使用进程内存储
    pub fn in_memory(config: BilingualConfig) -> BilingualResult<Self> {
        Self::new(config, Box::new(MemoryStore::new()))
    }

    /// 使用配置中的磁盘快照数据库
    pub fn open(config: BilingualConfig) -> BilingualResult<Self> {
        let store = RedbStore::open(&config.storage_path)?;
        Self::new(config, Box::new(store))
    }

    pub fn config(&self) -> &BilingualConfig {
        &self.config
    }

    pub fn current_route(&self) -> &str {
        &self.current_route
    }

    pub fn set_route(&mut self, route: &str) {
        self.current_route = normalize_route(route);
        tracing::debug!("当前路由: {}", self.current_route);
    }

    /// 以页面 URL 设置当前路由
    pub fn set_route_from_url(&mut self, page_url: &str) -> BilingualResult<()> {
        self.current_route = route_from_url(page_url)?;
        tracing::debug!("当前路由: {}", self.current_route);
        Ok(())
    }

    /// 当前路由的翻译数据
    pub fn translation_data(&self) -> TranslationMap {
        self.route_data(&self.current_route)
    }

    /// 指定路由的翻译数据，不存在时为空
    pub fn route_data(&self, route: &str) -> TranslationMap {
        self.table.get(route).cloned().unwrap_or_default()
    }

    pub fn set_route_data(&mut self, route: &str, entries: TranslationMap) -> bool {
        self.table.insert(route, entries);
        self.persist()
    }

    /// 为当前路由添加单条翻译
    pub fn add_translation(&mut self, key: &str, value: &str) -> bool {
        let route = self.current_route.clone();
        self.table
            .entry(&route)
            .insert(key.to_string(), value.to_string());
        self.persist()
    }

    /// 为当前路由批量添加翻译，已有的键被覆盖
    pub fn add_translations(&mut self, entries: TranslationMap) -> bool {
        let route = self.current_route.clone();
        self.table.entry(&route).extend(entries);
        self.persist()
    }

    pub fn remove_route_data(&mut self, route: &str) -> bool {
        if self.table.remove(route).is_none() {
            tracing::debug!("路由 {} 没有翻译数据", normalize_route(route));
        }
        self.persist()
    }

    pub fn stored_routes(&self) -> Vec<String> {
        self.table.routes().map(str::to_string).collect()
    }

    pub fn set_all_translation_data(&mut self, table: RouteTranslationTable) -> bool {
        self.table = table;
        self.persist()
    }

    pub fn all_translation_data(&self) -> &RouteTranslationTable {
        &self.table
    }

    /// 清空内存中的数据并删除快照
    pub fn clear_all_data(&mut self) -> bool {
        self.table.clear();
        match self.store.remove(&self.config.storage_key) {
            Ok(()) => {
                tracing::info!("已清除全部翻译数据");
                true
            }
            Err(e) => {
                log_error("删除快照失败", &e);
                false
            }
        }
    }

    /// 导出全量数据（两个空格缩进的 JSON）
    pub fn export_all_data(&self) -> BilingualResult<String> {
        self.table.to_json_pretty()
    }

    /// 导入全量数据，JSON 无效时返回 `false` 且不修改现有数据
    pub fn import_all_data(&mut self, json: &str) -> bool {
        match RouteTranslationTable::from_json(json) {
            Ok(table) => self.set_all_translation_data(table),
            Err(e) => {
                log_error("导入翻译数据失败", &e);
                false
            }
        }
    }

    /// 设置通用翻译表（用于没有标记的常见文本）
    pub fn set_common_translations(&mut self, entries: TranslationMap) {
        self.common = entries;
    }

    pub fn common_translations(&self) -> &TranslationMap {
        &self.common
    }

    fn persist(&mut self) -> bool {
        let snapshot = match self.table.to_json_pretty() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log_error("序列化翻译数据失败", &e);
                return false;
            }
        };

        match self.store.save(&self.config.storage_key, &snapshot) {
            Ok(()) => true,
            Err(e) => {
                log_error("保存翻译数据失败", &e);
                false
            }
        }
    }

    /// 处理文档：渲染所有标记区块，替换通用文本，按配置注入切换资源
    ///
    /// 处理中途出错时记录错误并返回 `completed == false` 的报告，已完成的修改保留在文档中。
    pub fn process(&self, dom: &RcDom) -> ProcessReport {
        let mut report = ProcessReport::default();
        let translations = self.translation_data();

        if let Err(e) = self.process_blocks(dom, &translations, &mut report) {
            log_error("处理翻译区块失败", &e);
            return report;
        }

        if self.config.process_common {
            report.common = CommonTextMatcher::new(&self.common).apply(&dom.document);
        }

        if self.config.inject_assets && !find_containers(&dom.document).is_empty() {
            report.assets_injected = inject_assets(dom);
        }

        report.completed = true;
        tracing::info!(
            "路由 {}: 处理了 {} 个翻译区块, {} 处通用文本",
            self.current_route,
            report.blocks,
            report.common
        );
        report
    }

    fn process_blocks(
        &self,
        dom: &RcDom,
        translations: &TranslationMap,
        report: &mut ProcessReport,
    ) -> BilingualResult<()> {
        if translations.is_empty() {
            tracing::debug!("路由 {} 没有翻译数据", self.current_route);
            return Ok(());
        }

        // 修改文档之前先收集全部标记
        let markers = self.scanner.collect(&dom.document);
        // 保持已处理节点存活，保证指针不会被复用
        let mut retained: Vec<Handle> = Vec::new();
        let mut processed: HashSet<*const Node> = HashSet::new();

        for marker in markers {
            if processed.contains(&Rc::as_ptr(&marker.node)) {
                continue;
            }

            if !is_attached_to(&marker.node, &dom.document)
                || has_ancestor_with_class(&marker.node, CONTAINER_CLASS)
            {
                tracing::debug!("标记 {} 已不在文档中，跳过", marker.id);
                continue;
            }

            let translation = match translations.get(&marker.id) {
                Some(translation) if !translation.is_empty() => translation,
                _ => {
                    tracing::debug!("没有 {} 的翻译，跳过", marker.id);
                    continue;
                }
            };

            let end = match find_end_marker(&marker.node, &marker.id) {
                Ok(Some(end)) => end,
                Ok(None) => {
                    tracing::warn!("未找到 {} 的结束标记，跳过", marker.id);
                    continue;
                }
                Err(e) if e.is_recoverable() => {
                    log_error("跳过区块", &e.with_context(&marker.id));
                    continue;
                }
                Err(e) => return Err(e.with_context(&marker.id)),
            };

            let block = extract_block(&marker.node, &end);
            if !block.is_renderable() {
                tracing::debug!("区块 {} 不包含元素，跳过", marker.id);
                continue;
            }

            let children =
                render_translation(dom, &block, translation, self.config.single_element_mode);
            swap_region(
                dom,
                &marker.node,
                &end,
                &block,
                children,
                &marker.id,
                self.config.default_view,
            )
            .map_err(|e| e.with_context(&marker.id))?;

            processed.insert(Rc::as_ptr(&marker.node));
            processed.insert(Rc::as_ptr(&end));
            retained.push(marker.node);
            retained.push(end);
            report.blocks += 1;
        }

        Ok(())
    }

    /// 解析 → 处理 → 序列化
    pub fn process_html(&self, input: &[u8]) -> BilingualResult<Vec<u8>> {
        let (bytes, _report) = self.process_html_with_report(input)?;
        Ok(bytes)
    }

    pub fn process_html_with_report(&self, input: &[u8]) -> BilingualResult<(Vec<u8>, ProcessReport)> {
        let (dom, document_encoding) = EncodingProcessor::new().process_encoding(input, None)?;
        let report = self.process(&dom);
        let output = serialize_document(&dom, &document_encoding)?;
        Ok((output, report))
    }

    /// 撤销渲染：把每个容器替换回其中的原始元素，返回恢复的容器数
    pub fn restore(&self, dom: &RcDom) -> usize {
        let mut restored = 0;
        for container in find_containers(&dom.document) {
            match unwrap_container(&container) {
                Ok(()) => restored += 1,
                Err(e) => tracing::warn!("恢复双语容器失败: {}", e),
            }
        }
        restored
    }
}

/// 按错误严重程度选择日志级别
fn log_error(context: &str, error: &BilingualError) {
    let level = error.severity().level();
    if level == tracing::Level::ERROR {
        tracing::error!("{}: {}", context, error);
    } else if level == tracing::Level::WARN {
        tracing::warn!("{}: {}", context, error);
    } else {
        tracing::info!("{}: {}", context, error);
    }
}

/// 编码处理器
///
/// 先按给定编码（默认 UTF-8）解析，如果文档声明了有效的字符集则按该字符集重新解析。
pub struct EncodingProcessor;

impl EncodingProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn process_encoding(
        &self,
        input_data: &[u8],
        input_encoding: Option<String>,
    ) -> BilingualResult<(RcDom, String)> {
        let mut document_encoding = input_encoding.unwrap_or_else(|| "utf-8".to_string());
        if Encoding::for_label_no_replacement(document_encoding.as_bytes()).is_none() {
            return Err(BilingualError::ConfigError(format!(
                "unknown encoding \"{}\"",
                document_encoding
            )));
        }

        let mut dom = html_to_dom(input_data, &document_encoding)?;

        if let Some(html_charset) = get_charset(&dom.document) {
            if let Some(document_charset) = Encoding::for_label_no_replacement(html_charset.as_bytes()) {
                if !document_charset.name().eq_ignore_ascii_case(&document_encoding) {
                    document_encoding = html_charset;
                    dom = html_to_dom(input_data, document_charset.name())?;
                }
            }
        }

        Ok((dom, document_encoding))
    }
}

impl Default for EncodingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> BilingualEngine {
        BilingualEngine::in_memory(BilingualConfig::default()).unwrap()
    }

    fn map(entries: &[(&str, &str)]) -> TranslationMap {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_route_operations() {
        let mut engine = engine();
        assert_eq!(engine.current_route(), "/");

        engine.set_route("/docs/index.html");
        assert_eq!(engine.current_route(), "/docs/");

        assert!(engine.add_translation("a", "甲"));
        assert!(engine.add_translations(map(&[("b", "乙"), ("a", "甲甲")])));
        assert_eq!(engine.translation_data(), map(&[("a", "甲甲"), ("b", "乙")]));
        assert_eq!(engine.route_data("/docs/index.html"), engine.translation_data());

        assert!(engine.set_route_data("/other", map(&[("x", "叉")])));
        assert_eq!(engine.stored_routes(), vec!["/docs/", "/other"]);

        assert!(engine.remove_route_data("/other"));
        assert_eq!(engine.stored_routes(), vec!["/docs/"]);
        assert!(engine.route_data("/other").is_empty());
    }

    #[test]
    fn test_set_route_from_url() {
        let mut engine = engine();
        engine
            .set_route_from_url("https://example.com/example/index.html")
            .unwrap();
        assert_eq!(engine.current_route(), "/example/");
        assert!(engine.set_route_from_url("::").is_err());
    }

    #[test]
    fn test_snapshot_is_loaded_and_saved() {
        let store = MemoryStore::new().with_entry(
            "immersive_bilingual_translations",
            r#"{"/x/index.html": {"greet": "你好"}}"#,
        );
        let mut engine = BilingualEngine::new(BilingualConfig::default(), Box::new(store)).unwrap();
        assert_eq!(engine.stored_routes(), vec!["/x/"]);

        engine.set_route("/x/");
        assert_eq!(engine.translation_data(), map(&[("greet", "你好")]));
    }

    #[test]
    fn test_invalid_snapshot_starts_empty() {
        let store = MemoryStore::new().with_entry("immersive_bilingual_translations", "{broken");
        let engine = BilingualEngine::new(BilingualConfig::default(), Box::new(store)).unwrap();
        assert!(engine.all_translation_data().is_empty());
    }

    #[test]
    fn test_storage_failure_returns_false() {
        let mut engine =
            BilingualEngine::new(BilingualConfig::default(), Box::new(MemoryStore::with_quota(8)))
                .unwrap();
        assert!(!engine.add_translation("long-key", "很长的翻译内容"));
        // 内存中的数据仍然更新
        assert_eq!(engine.translation_data().len(), 1);
    }

    #[test]
    fn test_import_failure_keeps_data() {
        let mut engine = engine();
        engine.add_translation("a", "甲");
        assert!(!engine.import_all_data("not json"));
        assert!(!engine.import_all_data(r#"{"/": ["a"]}"#));
        assert_eq!(engine.translation_data(), map(&[("a", "甲")]));
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut engine = engine();
        engine.set_route_data("/a", map(&[("k1", "v1"), ("k2", "v2")]));
        engine.set_route_data("/b/", map(&[("k", "v")]));
        let exported = engine.export_all_data().unwrap();

        let mut other = self::engine();
        assert!(other.import_all_data(&exported));
        assert_eq!(other.all_translation_data(), engine.all_translation_data());
        assert_eq!(other.export_all_data().unwrap(), exported);
    }

    #[test]
    fn test_clear_all_data() {
        let mut engine = engine();
        engine.add_translation("a", "甲");
        assert!(engine.clear_all_data());
        assert!(engine.all_translation_data().is_empty());
        assert!(engine.translation_data().is_empty());
    }

    #[test]
    fn test_validation_on_new() {
        let config = BilingualConfig {
            storage_key: String::new(),
            ..Default::default()
        };
        assert!(BilingualEngine::in_memory(config).is_err());
    }

    #[test]
    fn test_process_skips_without_translation() {
        let engine = engine();
        let dom = html_to_dom(b"<div><!--trans:a--><p>A</p><!--trans_end:a--></div>", "utf-8").unwrap();
        let report = engine.process(&dom);
        assert_eq!(report.blocks, 0);
        assert!(report.completed);
        assert!(!report.assets_injected);
    }

    #[test]
    fn test_restore() {
        let mut engine = engine();
        engine.add_translation("a", "甲");
        let dom = html_to_dom(b"<div><!--trans:a--><p>A</p><!--trans_end:a--></div>", "utf-8").unwrap();
        assert_eq!(engine.process(&dom).blocks, 1);
        assert_eq!(engine.restore(&dom), 1);
        assert!(find_containers(&dom.document).is_empty());
    }

    #[test]
    fn test_encoding_processor_uses_declared_charset() {
        let input = b"<html><head><meta charset=\"windows-1252\"></head><body><p>caf\xe9</p></body></html>";
        let (dom, encoding) = EncodingProcessor::new().process_encoding(input, None).unwrap();
        assert_eq!(encoding, "windows-1252");
        let html = String::from_utf8(serialize_document(&dom, "utf-8").unwrap()).unwrap();
        assert!(html.contains("<p>café</p>"));

        assert!(EncodingProcessor::new()
            .process_encoding(b"", Some("nope".to_string()))
            .is_err());
    }
}
