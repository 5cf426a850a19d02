use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

use crate::translation::error::{BilingualError, BilingualResult};

/// 序列化文档
pub fn serialize_document(dom: &RcDom, document_encoding: &str) -> BilingualResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| BilingualError::SerializationError(format!("无法序列化DOM: {}", e)))?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.to_vec();
        }
    }

    Ok(buf)
}

/// 等价于 DOM 的 `outerHTML`
pub fn outer_html(node: &Handle) -> String {
    serialize_node(node, TraversalScope::IncludeNode)
}

/// 等价于 DOM 的 `innerHTML`
pub fn inner_html(node: &Handle) -> String {
    serialize_node(node, TraversalScope::ChildrenOnly(None))
}

fn serialize_node(node: &Handle, traversal_scope: TraversalScope) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };

    // 写入 Vec<u8> 不会失败
    if let Err(e) = serialize(&mut buf, &serializable, opts) {
        tracing::warn!("节点序列化失败: {}", e);
    }

    String::from_utf8_lossy(&buf).to_string()
}
