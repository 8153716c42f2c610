//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：bad_request_error, not_found_error, internal_error, storage_error,
//!   maintenance_error, integrity_error
//! - DTO 转换：maintenance_to_dto, facility_to_dto, dependent_counts_to_dto,
//!   task_to_dto, electric_meter_to_dto, heat_gas_meter_to_dto
//!
//! 设计原则：
//! - 所有错误返回统一的 ApiResponse 格式
//! - HTTP 状态码与错误码对应
//! - DTO 转换保持 Record 和 DTO 字段一致

use api_contract::{
    ApiResponse, CompanyDto, DependentCountsDto, ElectricMeterDto, FacilityDto, HeatGasMeterDto,
    MaintenanceDto, ProofDocumentDto, TaskDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fms_integrity::{DependentCounts, IntegrityError};
use fms_maintenance::{MaintenanceError, MaintenanceView};
use fms_storage::{
    ElectricMeterRecord, FacilityRecord, HeatGasMeterRecord, StorageError, TaskRecord,
};

/// 成功响应
pub fn ok<T: serde::Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error(message: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", message.into())),
    )
        .into_response()
}

/// 内部错误响应
pub fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message.into())),
    )
        .into_response()
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    internal_error(err.to_string())
}

/// 维保服务错误响应
pub fn maintenance_error(err: MaintenanceError) -> Response {
    match err {
        MaintenanceError::Validation { .. } => bad_request_error(err.to_string()),
        MaintenanceError::NotFound { .. } => not_found_error(err.to_string()),
        MaintenanceError::Storage(message) => internal_error(message),
    }
}

/// 完整性服务错误响应
pub fn integrity_error(err: IntegrityError) -> Response {
    match err {
        IntegrityError::NotFound { .. } => not_found_error(err.to_string()),
        IntegrityError::Integrity { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(
                "INTEGRITY.VIOLATION",
                err.to_string(),
            )),
        )
            .into_response(),
        IntegrityError::Storage(message) => internal_error(message),
    }
}

/// MaintenanceView 转 MaintenanceDto
pub fn maintenance_to_dto(view: MaintenanceView) -> MaintenanceDto {
    let record = view.record;
    MaintenanceDto {
        maintenance_id: record.maintenance_id,
        system: record.system,
        system_type: record.system_type.to_string(),
        cycle: record.cycle.kind().to_string(),
        custom_cycle_days: record.cycle.custom_days(),
        company: CompanyDto {
            name: record.company.name,
            contact: record.company.contact,
            phone: record.company.phone,
            email: record.company.email,
        },
        norms: record.norms,
        last_maintenance: record.last_maintenance,
        next_maintenance: record.next_maintenance,
        status: record.status.to_string(),
        cost: record.cost,
        priority: record.priority.to_string(),
        notes: record.notes,
        proof_documents: record
            .proof_documents
            .into_iter()
            .map(|document| ProofDocumentDto {
                document_id: document.document_id,
                filename: document.filename,
                path: document.path,
                size_bytes: document.size_bytes,
                mimetype: document.mimetype,
                uploaded_at_ms: document.uploaded_at_ms,
            })
            .collect(),
        days_until_due: view.days_until_due,
    }
}

/// FacilityRecord 转 FacilityDto
pub fn facility_to_dto(record: FacilityRecord) -> FacilityDto {
    FacilityDto {
        facility_id: record.facility_id,
        name: record.name,
        facility_type: record.facility_type,
        address: record.address,
        manager: record.manager,
        contact: record.contact,
        area: record.area,
        floor_count: record.floor_count,
        year_built: record.year_built,
    }
}

/// DependentCounts 转 DependentCountsDto
pub fn dependent_counts_to_dto(counts: DependentCounts) -> DependentCountsDto {
    DependentCountsDto {
        tasks: counts.tasks,
        electric_meters: counts.electric_meters,
        heat_gas_meters: counts.heat_gas_meters,
    }
}

/// TaskRecord 转 TaskDto
pub fn task_to_dto(record: TaskRecord) -> TaskDto {
    TaskDto {
        task_id: record.task_id,
        facility_id: record.facility_id,
        title: record.title,
        description: record.description,
        due_date: record.due_date,
        done: record.done,
    }
}

/// ElectricMeterRecord 转 ElectricMeterDto
pub fn electric_meter_to_dto(record: ElectricMeterRecord) -> ElectricMeterDto {
    ElectricMeterDto {
        meter_id: record.meter_id,
        facility_id: record.facility_id,
        serial_number: record.serial_number,
        location: record.location,
    }
}

/// HeatGasMeterRecord 转 HeatGasMeterDto
pub fn heat_gas_meter_to_dto(record: HeatGasMeterRecord) -> HeatGasMeterDto {
    HeatGasMeterDto {
        meter_id: record.meter_id,
        facility_id: record.facility_id,
        serial_number: record.serial_number,
        medium: record.medium.as_str().to_string(),
        location: record.location,
    }
}
