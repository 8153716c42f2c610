//! 维保记录 handlers
//!
//! - GET /maintenance - 列出维保记录（可按 status、systemType 过滤）
//! - POST /maintenance - 创建维保记录
//! - GET /maintenance/{id} - 获取维保记录
//! - PUT /maintenance/{id} - 更新维保记录
//! - DELETE /maintenance/{id} - 删除维保记录（含证明文件）
//! - POST /maintenance/{id}/complete - 完成维保
//! - POST /maintenance/{id}/suspend - 暂停
//! - POST /maintenance/{id}/resume - 恢复
//! - POST /maintenance/{id}/documents - 附加证明文件
//!
//! 返回的状态与 `daysUntilDue` 均按服务端当天日期重新判定。

use crate::AppState;
use crate::utils::{bad_request_error, maintenance_error, maintenance_to_dto, ok};
use api_contract::{
    AttachDocumentRequest, CompanyDto, CompleteMaintenanceRequest, CreateMaintenanceRequest,
    MaintenanceDto, MaintenanceListQuery, UpdateMaintenanceRequest,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use chrono::NaiveDate;
use domain::DomainError;
use fms_maintenance::{
    CompanyInput, MaintenanceFilter, MaintenanceInput, MaintenancePatch, MaintenanceView,
    ProofDocumentInput,
};
use fms_storage::MaintenanceRecord;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(serde::Deserialize)]
pub struct MaintenancePath {
    maintenance_id: String,
}

fn view_to_response(record: MaintenanceRecord, today: NaiveDate) -> Response {
    ok(maintenance_to_dto(MaintenanceView::new(record, today)))
}

fn company_input(company: CompanyDto) -> CompanyInput {
    CompanyInput {
        name: company.name,
        contact: company.contact,
        phone: company.phone,
        email: company.email,
    }
}

fn parse_filter(query: MaintenanceListQuery) -> Result<MaintenanceFilter, DomainError> {
    Ok(MaintenanceFilter {
        status: query.status.as_deref().map(str::parse).transpose()?,
        system_type: query.system_type.as_deref().map(str::parse).transpose()?,
    })
}

/// 列出维保记录
pub async fn list_maintenance(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceListQuery>,
) -> Response {
    let filter = match parse_filter(query) {
        Ok(filter) => filter,
        Err(err) => return bad_request_error(err.to_string()),
    };
    match state.maintenance.list(filter, (state.today)()).await {
        Ok(views) => {
            let data: Vec<MaintenanceDto> = views.into_iter().map(maintenance_to_dto).collect();
            ok(data)
        }
        Err(err) => maintenance_error(err),
    }
}

/// 创建维保记录
pub async fn create_maintenance(
    State(state): State<AppState>,
    Json(req): Json<CreateMaintenanceRequest>,
) -> Response {
    let input = MaintenanceInput {
        system: req.system,
        system_type: req.system_type,
        cycle: req.cycle,
        custom_cycle_days: req.custom_cycle_days,
        company: company_input(req.company),
        norms: req.norms,
        last_maintenance: req.last_maintenance,
        cost: req.cost,
        priority: req.priority,
        notes: req.notes,
    };
    let today = (state.today)();
    match state.maintenance.create(input, today).await {
        Ok(record) => view_to_response(record, today),
        Err(err) => maintenance_error(err),
    }
}

/// 获取维保记录
pub async fn get_maintenance(
    State(state): State<AppState>,
    Path(path): Path<MaintenancePath>,
) -> Response {
    match state
        .maintenance
        .get(&path.maintenance_id, (state.today)())
        .await
    {
        Ok(view) => ok(maintenance_to_dto(view)),
        Err(err) => maintenance_error(err),
    }
}

/// 更新维保记录
pub async fn update_maintenance(
    State(state): State<AppState>,
    Path(path): Path<MaintenancePath>,
    Json(req): Json<UpdateMaintenanceRequest>,
) -> Response {
    let patch = MaintenancePatch {
        system: req.system,
        system_type: req.system_type,
        cycle: req.cycle,
        custom_cycle_days: req.custom_cycle_days,
        company: req.company.map(company_input),
        norms: req.norms,
        last_maintenance: req.last_maintenance,
        status: req.status,
        cost: req.cost,
        priority: req.priority,
        notes: req.notes,
    };
    let today = (state.today)();
    match state
        .maintenance
        .update(&path.maintenance_id, patch, today)
        .await
    {
        Ok(record) => view_to_response(record, today),
        Err(err) => maintenance_error(err),
    }
}

/// 删除维保记录，返回被删除的记录
pub async fn delete_maintenance(
    State(state): State<AppState>,
    Path(path): Path<MaintenancePath>,
) -> Response {
    match state.maintenance.delete(&path.maintenance_id).await {
        Ok(record) => view_to_response(record, (state.today)()),
        Err(err) => maintenance_error(err),
    }
}

/// 完成维保，未提供日期时按当天完成
pub async fn complete_maintenance(
    State(state): State<AppState>,
    Path(path): Path<MaintenancePath>,
    Json(req): Json<CompleteMaintenanceRequest>,
) -> Response {
    let today = (state.today)();
    let completion_date = req.completion_date.unwrap_or(today);
    match state
        .maintenance
        .complete(&path.maintenance_id, completion_date, today)
        .await
    {
        Ok(record) => view_to_response(record, today),
        Err(err) => maintenance_error(err),
    }
}

/// 暂停维保
pub async fn suspend_maintenance(
    State(state): State<AppState>,
    Path(path): Path<MaintenancePath>,
) -> Response {
    match state.maintenance.suspend(&path.maintenance_id).await {
        Ok(record) => view_to_response(record, (state.today)()),
        Err(err) => maintenance_error(err),
    }
}

/// 恢复维保
pub async fn resume_maintenance(
    State(state): State<AppState>,
    Path(path): Path<MaintenancePath>,
) -> Response {
    let today = (state.today)();
    match state.maintenance.resume(&path.maintenance_id, today).await {
        Ok(record) => view_to_response(record, today),
        Err(err) => maintenance_error(err),
    }
}

/// 附加证明文件
pub async fn attach_document(
    State(state): State<AppState>,
    Path(path): Path<MaintenancePath>,
    Json(req): Json<AttachDocumentRequest>,
) -> Response {
    let document = ProofDocumentInput {
        filename: req.filename,
        path: req.path,
        size_bytes: req.size_bytes,
        mimetype: req.mimetype,
        uploaded_at_ms: now_epoch_ms(),
    };
    let today = (state.today)();
    match state
        .maintenance
        .attach_proof(&path.maintenance_id, document, today)
        .await
    {
        Ok(record) => view_to_response(record, today),
        Err(err) => maintenance_error(err),
    }
}

fn now_epoch_ms() -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}
