// 集成测试公共模块
//
// 提供引擎构造、文档解析等测试辅助工具

#![allow(dead_code)]

use markup5ever_rcdom::{Handle, RcDom};

use bilingual::parsers::html::{find_nodes, html_to_dom, inner_html};
use bilingual::{BilingualConfig, BilingualEngine, TranslationMap};

/// 由键值对构造翻译条目
pub fn entries(pairs: &[(&str, &str)]) -> TranslationMap {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// 内存引擎，当前路由已设置并写入翻译
pub fn engine_with(route: &str, pairs: &[(&str, &str)]) -> BilingualEngine {
    engine_with_config(BilingualConfig::default(), route, pairs)
}

pub fn engine_with_config(
    config: BilingualConfig,
    route: &str,
    pairs: &[(&str, &str)],
) -> BilingualEngine {
    let mut engine = BilingualEngine::in_memory(config).expect("引擎创建失败");
    engine.set_route(route);
    assert!(engine.add_translations(entries(pairs)));
    engine
}

pub fn parse(html: &str) -> RcDom {
    html_to_dom(html.as_bytes(), "utf-8").expect("HTML解析失败")
}

pub fn body(dom: &RcDom) -> Handle {
    find_nodes(&dom.document, vec!["html", "body"])
        .into_iter()
        .next()
        .expect("文档缺少 body")
}

pub fn body_html(dom: &RcDom) -> String {
    inner_html(&body(dom))
}

/// 不注入资源时的配置，便于比较 body 内容
pub fn plain_config() -> BilingualConfig {
    BilingualConfig {
        inject_assets: false,
        ..Default::default()
    }
}
