//! 基于 redb 的快照存储
//!
//! 所有快照都写在同一张表里，键为存储键，值为 JSON 文本。

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition, TableError};

use crate::translation::error::{BilingualError, BilingualResult};

use super::SnapshotStore;

const SNAPSHOTS: TableDefinition<&str, &str> = TableDefinition::new("snapshots");

fn storage_error<E: Into<redb::Error>>(error: E) -> BilingualError {
    BilingualError::from(error.into())
}

/// 磁盘快照存储
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// 打开（不存在时创建）数据库文件
    pub fn open<P: AsRef<Path>>(path: P) -> BilingualResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(path).map_err(storage_error)?;
        tracing::debug!("快照数据库已打开: {}", path.display());
        Ok(Self { db })
    }
}

impl SnapshotStore for RedbStore {
    fn load(&self, key: &str) -> BilingualResult<Option<String>> {
        let read_txn = self.db.begin_read().map_err(storage_error)?;
        let table = match read_txn.open_table(SNAPSHOTS) {
            Ok(table) => table,
            // 从未写入过
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(storage_error(e)),
        };

        let value = table.get(key).map_err(storage_error)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn save(&mut self, key: &str, contents: &str) -> BilingualResult<()> {
        let write_txn = self.db.begin_write().map_err(storage_error)?;
        {
            let mut table = write_txn.open_table(SNAPSHOTS).map_err(storage_error)?;
            table.insert(key, contents).map_err(storage_error)?;
        }
        write_txn.commit().map_err(storage_error)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> BilingualResult<()> {
        let write_txn = self.db.begin_write().map_err(storage_error)?;
        {
            let mut table = write_txn.open_table(SNAPSHOTS).map_err(storage_error)?;
            table.remove(key).map_err(storage_error)?;
        }
        write_txn.commit().map_err(storage_error)?;
        Ok(())
    }
}
