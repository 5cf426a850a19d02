//! 存储模块
//!
//! 全量翻译数据以 JSON 文本的形式保存在一个固定的存储键下。
//!
//! - `memory` - 进程内存储，用于嵌入和测试
//! - `snapshot` - 基于 redb 的磁盘存储

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::RedbStore;

use crate::translation::error::BilingualResult;

/// 默认存储键
pub const DEFAULT_STORAGE_KEY: &str = "immersive_bilingual_translations";

/// 快照存储
///
/// 类似浏览器的 `localStorage`：按键读写整段文本。
pub trait SnapshotStore {
    /// 读取键对应的文本，键不存在时返回 `None`
    fn load(&self, key: &str) -> BilingualResult<Option<String>>;

    /// 写入（覆盖）键对应的文本
    fn save(&mut self, key: &str, contents: &str) -> BilingualResult<()>;

    /// 删除键
    fn remove(&mut self, key: &str) -> BilingualResult<()>;
}
