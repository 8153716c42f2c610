//! 维保记录管理。
//!
//! 负责维保记录的创建、更新、完成、暂停/恢复、证明文件附加与删除，
//! 以及逾期扫描。日期计算与状态判定委托给 `fms-schedule`，
//! 持久化通过注入的 `MaintenanceStore` 完成。
//!
//! 所有需要 "今天" 的操作都由调用方显式传入日期。

pub mod error;
pub mod input;
pub mod service;

pub use error::MaintenanceError;
pub use input::{CompanyInput, MaintenanceInput, MaintenancePatch, ProofDocumentInput};
pub use service::{
    MaintenanceFilter, MaintenanceService, MaintenanceServiceConfig, MaintenanceView,
};
