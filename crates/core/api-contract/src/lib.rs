//! 稳定的 DTO 与 API 响应契约。
//!
//! 字段统一使用 camelCase，日期使用 `YYYY-MM-DD`。
//! 枚举字段（系统类型、周期、状态、优先级、介质）在请求中以字符串传入，
//! 由服务层做大小写不敏感的解析与校验。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 维保服务公司。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// 维保记录创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceRequest {
    pub system: String,
    pub system_type: String,
    pub cycle: String,
    pub custom_cycle_days: Option<i64>,
    pub company: CompanyDto,
    #[serde(default)]
    pub norms: Vec<String>,
    pub last_maintenance: NaiveDate,
    pub cost: Option<f64>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

/// 维保记录更新请求体（未提供的字段保持不变）。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaintenanceRequest {
    pub system: Option<String>,
    pub system_type: Option<String>,
    pub cycle: Option<String>,
    pub custom_cycle_days: Option<i64>,
    pub company: Option<CompanyDto>,
    pub norms: Option<Vec<String>>,
    pub last_maintenance: Option<NaiveDate>,
    pub status: Option<String>,
    pub cost: Option<f64>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

/// 完成维保请求体，未提供日期时按当天完成。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMaintenanceRequest {
    pub completion_date: Option<NaiveDate>,
}

/// 附加证明文件请求体（文件已由附件子系统保存）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachDocumentRequest {
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
    pub mimetype: String,
}

/// 维保列表查询参数。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceListQuery {
    pub status: Option<String>,
    pub system_type: Option<String>,
}

/// 证明文件引用。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofDocumentDto {
    pub document_id: String,
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
    pub mimetype: String,
    pub uploaded_at_ms: i64,
}

/// 维保记录返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceDto {
    pub maintenance_id: String,
    pub system: String,
    pub system_type: String,
    pub cycle: String,
    pub custom_cycle_days: Option<u16>,
    pub company: CompanyDto,
    pub norms: Vec<String>,
    pub last_maintenance: NaiveDate,
    pub next_maintenance: NaiveDate,
    pub status: String,
    pub cost: f64,
    pub priority: String,
    pub notes: Option<String>,
    pub proof_documents: Vec<ProofDocumentDto>,
    pub days_until_due: i64,
}

/// 设施创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityRequest {
    pub name: String,
    pub facility_type: Option<String>,
    pub address: Option<String>,
    pub manager: Option<String>,
    pub contact: Option<String>,
    pub area: Option<f64>,
    pub floor_count: Option<i32>,
    pub year_built: Option<i32>,
}

/// 设施更新请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacilityRequest {
    pub name: Option<String>,
    pub facility_type: Option<String>,
    pub address: Option<String>,
    pub manager: Option<String>,
    pub contact: Option<String>,
    pub area: Option<f64>,
    pub floor_count: Option<i32>,
    pub year_built: Option<i32>,
}

/// 设施返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDto {
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

/// 各类别依附记录数。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentCountsDto {
    pub tasks: u64,
    pub electric_meters: u64,
    pub heat_gas_meters: u64,
}

/// 设施删除结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDeletionDto {
    pub facility_id: String,
    pub detached: DependentCountsDto,
}

/// 依附记录列表查询参数。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentListQuery {
    pub facility_id: Option<String>,
}

/// 改挂设施请求体，`facilityId` 为 null 时解除引用。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignFacilityRequest {
    pub facility_id: Option<String>,
}

/// 任务创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub facility_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub done: bool,
}

/// 任务返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub task_id: String,
    pub facility_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub done: bool,
}

/// 电表创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateElectricMeterRequest {
    pub facility_id: Option<String>,
    pub serial_number: String,
    pub location: Option<String>,
}

/// 电表返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricMeterDto {
    pub meter_id: String,
    pub facility_id: Option<String>,
    pub serial_number: String,
    pub location: Option<String>,
}

/// 热/气表创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHeatGasMeterRequest {
    pub facility_id: Option<String>,
    pub serial_number: String,
    pub medium: String,
    pub location: Option<String>,
}

/// 热/气表返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatGasMeterDto {
    pub meter_id: String,
    pub facility_id: Option<String>,
    pub serial_number: String,
    pub medium: String,
    pub location: Option<String>,
}

/// 计数指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub maintenance_created: u64,
    pub maintenance_updated: u64,
    pub maintenance_completed: u64,
    pub maintenance_deleted: u64,
    pub overdue_transitions: u64,
    pub overdue_sweeps: u64,
    pub sweep_latency_ms_total: u64,
    pub sweep_latency_ms_count: u64,
    pub facilities_deleted: u64,
    pub dependents_detached: u64,
    pub dependents_reassigned: u64,
    pub integrity_failures: u64,
}
