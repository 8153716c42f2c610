//! 维保记录内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 功能：
//! - 维保记录 CRUD 操作
//! - 证明文件随记录整体保存与删除
//! - 条件状态写入（逾期扫描使用，比较与写入在同一把写锁内）

use crate::error::StorageError;
use crate::models::MaintenanceRecord;
use crate::traits::MaintenanceStore;
use chrono::NaiveDate;
use domain::MaintenanceStatus;
use std::collections::HashMap;
use std::sync::RwLock;

/// 维保记录内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryMaintenanceStore {
    records: RwLock<HashMap<String, MaintenanceRecord>>,
}

impl InMemoryMaintenanceStore {
    /// 创建新的维保记录存储
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryMaintenanceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MaintenanceStore for InMemoryMaintenanceStore {
    async fn list_maintenance(&self) -> Result<Vec<MaintenanceRecord>, StorageError> {
        let items = self
            .records
            .read()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default();
        Ok(items)
    }

    async fn find_maintenance(
        &self,
        maintenance_id: &str,
    ) -> Result<Option<MaintenanceRecord>, StorageError> {
        let item = self
            .records
            .read()
            .ok()
            .and_then(|map| map.get(maintenance_id).cloned());
        Ok(item)
    }

    async fn insert_maintenance(
        &self,
        record: MaintenanceRecord,
    ) -> Result<MaintenanceRecord, StorageError> {
        let mut map = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.maintenance_id) {
            return Err(StorageError::new("maintenance record exists"));
        }
        map.insert(record.maintenance_id.clone(), record.clone());
        Ok(record)
    }

    async fn save_maintenance(
        &self,
        record: MaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, StorageError> {
        let mut map = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get_mut(&record.maintenance_id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn delete_maintenance(
        &self,
        maintenance_id: &str,
    ) -> Result<Option<MaintenanceRecord>, StorageError> {
        let mut map = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.remove(maintenance_id))
    }

    async fn set_status_if(
        &self,
        maintenance_id: &str,
        expected: MaintenanceStatus,
        next_maintenance: NaiveDate,
        status: MaintenanceStatus,
    ) -> Result<bool, StorageError> {
        let mut map = self
            .records
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get_mut(maintenance_id) {
            Some(record)
                if record.status == expected && record.next_maintenance == next_maintenance =>
            {
                record.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
