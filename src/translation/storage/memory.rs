use std::collections::HashMap;

use crate::translation::error::{BilingualError, BilingualResult};

use super::SnapshotStore;

/// 进程内快照存储
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// 单个值允许的最大字节数，超过时写入失败（模拟存储配额）
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// 以已有内容预置存储
    pub fn with_entry(mut self, key: &str, contents: &str) -> Self {
        self.entries.insert(key.to_string(), contents.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> BilingualResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, contents: &str) -> BilingualResult<()> {
        if let Some(quota) = self.quota {
            if contents.len() > quota {
                return Err(BilingualError::StorageError(format!(
                    "超出存储配额: {} > {} 字节",
                    contents.len(),
                    quota
                )));
            }
        }
        self.entries.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> BilingualResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("k").unwrap(), None);

        store.save("k", "{}").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("{}"));

        store.remove("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
    }

    #[test]
    fn test_quota_rejects_large_values() {
        let mut store = MemoryStore::with_quota(4);
        assert!(store.save("k", "{}").is_ok());
        assert!(matches!(
            store.save("k", "{\"a\": 1}"),
            Err(BilingualError::StorageError(_))
        ));
        assert_eq!(store.get("k"), Some("{}"));
    }
}
