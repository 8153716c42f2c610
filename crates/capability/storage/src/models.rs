//! 数据模型
//!
//! 定义所有存储相关的数据模型和更新结构：
//! - 维保模型：MaintenanceRecord（含证明文件引用列表）
//! - 设施模型：FacilityRecord, FacilityUpdate
//! - 依附记录：TaskRecord, ElectricMeterRecord, HeatGasMeterRecord（可空 facility_id）

use chrono::NaiveDate;
use domain::{
    MaintenanceCycle, MaintenanceStatus, MeterMedium, Priority, ProofDocument, ServiceCompany,
    SystemType,
};

/// 维保记录。
///
/// `next_maintenance` 与 `status` 为派生字段，由维保服务在每次写入前计算。
/// `proof_documents` 归属于本记录，删除记录时一并删除。
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceRecord {
    pub maintenance_id: String,
    pub system: String,
    pub system_type: SystemType,
    pub cycle: MaintenanceCycle,
    pub company: ServiceCompany,
    pub norms: Vec<String>,
    pub last_maintenance: NaiveDate,
    pub next_maintenance: NaiveDate,
    pub status: MaintenanceStatus,
    pub cost: f64,
    pub priority: Priority,
    pub notes: Option<String>,
    pub proof_documents: Vec<ProofDocument>,
}

/// 设施记录。
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRecord {
    pub facility_id: String,
    pub name: String,
    pub facility_type: Option<String>,
    pub address: Option<String>,
    pub manager: Option<String>,
    pub contact: Option<String>,
    pub area: Option<f64>,
    pub floor_count: Option<i32>,
    pub year_built: Option<i32>,
}

/// 设施更新输入。
#[derive(Debug, Clone, Default)]
pub struct FacilityUpdate {
    pub name: Option<String>,
    pub facility_type: Option<String>,
    pub address: Option<String>,
    pub manager: Option<String>,
    pub contact: Option<String>,
    pub area: Option<f64>,
    pub floor_count: Option<i32>,
    pub year_built: Option<i32>,
}

/// 任务记录（可选关联设施）。
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub task_id: String,
    pub facility_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub done: bool,
}

/// 电表记录（可选关联设施）。
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricMeterRecord {
    pub meter_id: String,
    pub facility_id: Option<String>,
    pub serial_number: String,
    pub location: Option<String>,
}

/// 热/气表记录（可选关联设施）。
#[derive(Debug, Clone, PartialEq)]
pub struct HeatGasMeterRecord {
    pub meter_id: String,
    pub facility_id: Option<String>,
    pub serial_number: String,
    pub medium: MeterMedium,
    pub location: Option<String>,
}
