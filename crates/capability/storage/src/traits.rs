//! 存储接口 Trait 定义
//!
//! 定义所有资源存储的异步接口：
//! - MaintenanceStore：维保记录存储
//! - FacilityStore：设施存储（增查改；删除只能走 FacilityGraphTx）
//! - DependentStore：任务/电表/热气表存储
//! - FacilityGraphStore / FacilityGraphTx：设施引用图的事务作用域
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发
//! - 存储实例通过 `Arc<dyn Trait>` 注入，不使用全局单例

use crate::error::StorageError;
use crate::models::{
    ElectricMeterRecord, FacilityRecord, FacilityUpdate, HeatGasMeterRecord, MaintenanceRecord,
    TaskRecord,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{DependentKind, MaintenanceStatus};

/// 维保记录存储接口
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    /// 列出所有维保记录
    async fn list_maintenance(&self) -> Result<Vec<MaintenanceRecord>, StorageError>;

    /// 查找指定维保记录
    async fn find_maintenance(
        &self,
        maintenance_id: &str,
    ) -> Result<Option<MaintenanceRecord>, StorageError>;

    /// 新增维保记录（id 已存在时报错）
    async fn insert_maintenance(
        &self,
        record: MaintenanceRecord,
    ) -> Result<MaintenanceRecord, StorageError>;

    /// 整体保存已有维保记录（含证明文件列表），记录不存在时返回 None
    async fn save_maintenance(
        &self,
        record: MaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, StorageError>;

    /// 删除维保记录及其证明文件，返回被删除的记录
    async fn delete_maintenance(
        &self,
        maintenance_id: &str,
    ) -> Result<Option<MaintenanceRecord>, StorageError>;

    /// 条件写入状态：仅当记录仍为 `expected` 状态且下次到期日仍为
    /// `next_maintenance` 时把状态改为 `status`，返回是否写入。
    ///
    /// 只改状态列，不覆盖其它字段。
    async fn set_status_if(
        &self,
        maintenance_id: &str,
        expected: MaintenanceStatus,
        next_maintenance: NaiveDate,
        status: MaintenanceStatus,
    ) -> Result<bool, StorageError>;
}

/// 设施存储接口
#[async_trait]
pub trait FacilityStore: Send + Sync {
    /// 列出所有设施
    async fn list_facilities(&self) -> Result<Vec<FacilityRecord>, StorageError>;

    /// 查找指定设施
    async fn find_facility(
        &self,
        facility_id: &str,
    ) -> Result<Option<FacilityRecord>, StorageError>;

    /// 创建新设施
    async fn create_facility(&self, record: FacilityRecord) -> Result<FacilityRecord, StorageError>;

    /// 更新设施
    async fn update_facility(
        &self,
        facility_id: &str,
        update: FacilityUpdate,
    ) -> Result<Option<FacilityRecord>, StorageError>;
}

/// 依附记录存储接口
///
/// `facility_id` 过滤为 None 时返回全部记录。
/// 创建时若引用了不存在的设施，返回外键约束错误。
#[async_trait]
pub trait DependentStore: Send + Sync {
    async fn list_tasks(&self, facility_id: Option<&str>) -> Result<Vec<TaskRecord>, StorageError>;

    async fn create_task(&self, record: TaskRecord) -> Result<TaskRecord, StorageError>;

    async fn list_electric_meters(
        &self,
        facility_id: Option<&str>,
    ) -> Result<Vec<ElectricMeterRecord>, StorageError>;

    async fn create_electric_meter(
        &self,
        record: ElectricMeterRecord,
    ) -> Result<ElectricMeterRecord, StorageError>;

    async fn list_heat_gas_meters(
        &self,
        facility_id: Option<&str>,
    ) -> Result<Vec<HeatGasMeterRecord>, StorageError>;

    async fn create_heat_gas_meter(
        &self,
        record: HeatGasMeterRecord,
    ) -> Result<HeatGasMeterRecord, StorageError>;
}

/// 设施引用图存储：开启事务作用域。
#[async_trait]
pub trait FacilityGraphStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn FacilityGraphTx>, StorageError>;
}

/// 设施引用图事务。
///
/// 未调用 `commit` 就被丢弃时，事务内的全部写入都会被撤销。
/// 存储层强制外键：仍有依附记录引用设施时 `delete_facility` 返回错误。
#[async_trait]
pub trait FacilityGraphTx: Send {
    /// 读取设施
    async fn load_facility(
        &mut self,
        facility_id: &str,
    ) -> Result<Option<FacilityRecord>, StorageError>;

    /// 统计引用该设施的某类依附记录数
    async fn count_dependents(
        &mut self,
        facility_id: &str,
        kind: DependentKind,
    ) -> Result<u64, StorageError>;

    /// 清空某类依附记录对该设施的引用，返回受影响行数
    async fn clear_facility_ref(
        &mut self,
        facility_id: &str,
        kind: DependentKind,
    ) -> Result<u64, StorageError>;

    /// 设置或清空单条依附记录的设施引用，记录不存在时返回 false
    async fn set_facility_ref(
        &mut self,
        kind: DependentKind,
        dependent_id: &str,
        facility_id: Option<&str>,
    ) -> Result<bool, StorageError>;

    /// 删除设施行，设施不存在时返回 false
    async fn delete_facility(&mut self, facility_id: &str) -> Result<bool, StorageError>;

    /// 提交事务
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}
