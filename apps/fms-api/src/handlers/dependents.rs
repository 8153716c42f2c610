//! 依附记录 handlers（任务、电表、热/气表）
//!
//! - GET/POST /tasks，PUT /tasks/{id}/facility
//! - GET/POST /electric-meters，PUT /electric-meters/{id}/facility
//! - GET/POST /heat-gas-meters，PUT /heat-gas-meters/{id}/facility
//!
//! 列表支持 `facilityId` 过滤；改挂设施走完整性服务（事务内校验目标设施）。

use crate::AppState;
use crate::utils::{
    bad_request_error, electric_meter_to_dto, heat_gas_meter_to_dto, integrity_error,
    normalize_optional, normalize_required, ok, storage_error, task_to_dto,
};
use api_contract::{
    AssignFacilityRequest, CreateElectricMeterRequest, CreateHeatGasMeterRequest,
    CreateTaskRequest, DependentListQuery, ElectricMeterDto, HeatGasMeterDto, TaskDto,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use domain::{DependentKind, MeterMedium};
use fms_storage::{ElectricMeterRecord, HeatGasMeterRecord, TaskRecord};
use uuid::Uuid;

pub const TASK_TITLE_MAX_CHARS: usize = 200;
pub const SERIAL_NUMBER_MAX_CHARS: usize = 100;

#[derive(serde::Deserialize)]
pub struct TaskPath {
    task_id: String,
}

#[derive(serde::Deserialize)]
pub struct MeterPath {
    meter_id: String,
}

/// 列出任务
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<DependentListQuery>,
) -> Response {
    match state
        .dependent_store
        .list_tasks(query.facility_id.as_deref())
        .await
    {
        Ok(mut tasks) => {
            tasks.sort_by(|left, right| left.task_id.cmp(&right.task_id));
            let data: Vec<TaskDto> = tasks.into_iter().map(task_to_dto).collect();
            ok(data)
        }
        Err(err) => storage_error(err),
    }
}

/// 创建任务
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Response {
    let record = match task_from_request(req) {
        Ok(record) => record,
        Err(response) => return response,
    };
    if let Err(response) = ensure_facility(&state, record.facility_id.as_deref()).await {
        return response;
    }
    match state.dependent_store.create_task(record).await {
        Ok(task) => ok(task_to_dto(task)),
        Err(err) => storage_error(err),
    }
}

/// 任务改挂设施
pub async fn assign_task_facility(
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
    Json(req): Json<AssignFacilityRequest>,
) -> Response {
    reassign(&state, DependentKind::Task, &path.task_id, req).await
}

/// 列出电表
pub async fn list_electric_meters(
    State(state): State<AppState>,
    Query(query): Query<DependentListQuery>,
) -> Response {
    match state
        .dependent_store
        .list_electric_meters(query.facility_id.as_deref())
        .await
    {
        Ok(mut meters) => {
            meters.sort_by(|left, right| left.meter_id.cmp(&right.meter_id));
            let data: Vec<ElectricMeterDto> =
                meters.into_iter().map(electric_meter_to_dto).collect();
            ok(data)
        }
        Err(err) => storage_error(err),
    }
}

/// 创建电表
pub async fn create_electric_meter(
    State(state): State<AppState>,
    Json(req): Json<CreateElectricMeterRequest>,
) -> Response {
    let record = match electric_meter_from_request(req) {
        Ok(record) => record,
        Err(response) => return response,
    };
    if let Err(response) = ensure_facility(&state, record.facility_id.as_deref()).await {
        return response;
    }
    match state.dependent_store.create_electric_meter(record).await {
        Ok(meter) => ok(electric_meter_to_dto(meter)),
        Err(err) => storage_error(err),
    }
}

/// 电表改挂设施
pub async fn assign_electric_meter_facility(
    State(state): State<AppState>,
    Path(path): Path<MeterPath>,
    Json(req): Json<AssignFacilityRequest>,
) -> Response {
    reassign(&state, DependentKind::ElectricMeter, &path.meter_id, req).await
}

/// 列出热/气表
pub async fn list_heat_gas_meters(
    State(state): State<AppState>,
    Query(query): Query<DependentListQuery>,
) -> Response {
    match state
        .dependent_store
        .list_heat_gas_meters(query.facility_id.as_deref())
        .await
    {
        Ok(mut meters) => {
            meters.sort_by(|left, right| left.meter_id.cmp(&right.meter_id));
            let data: Vec<HeatGasMeterDto> =
                meters.into_iter().map(heat_gas_meter_to_dto).collect();
            ok(data)
        }
        Err(err) => storage_error(err),
    }
}

/// 创建热/气表
pub async fn create_heat_gas_meter(
    State(state): State<AppState>,
    Json(req): Json<CreateHeatGasMeterRequest>,
) -> Response {
    let record = match heat_gas_meter_from_request(req) {
        Ok(record) => record,
        Err(response) => return response,
    };
    if let Err(response) = ensure_facility(&state, record.facility_id.as_deref()).await {
        return response;
    }
    match state.dependent_store.create_heat_gas_meter(record).await {
        Ok(meter) => ok(heat_gas_meter_to_dto(meter)),
        Err(err) => storage_error(err),
    }
}

/// 热/气表改挂设施
pub async fn assign_heat_gas_meter_facility(
    State(state): State<AppState>,
    Path(path): Path<MeterPath>,
    Json(req): Json<AssignFacilityRequest>,
) -> Response {
    reassign(&state, DependentKind::HeatGasMeter, &path.meter_id, req).await
}

async fn reassign(
    state: &AppState,
    kind: DependentKind,
    dependent_id: &str,
    req: AssignFacilityRequest,
) -> Response {
    let facility_id = match normalize_optional(req.facility_id, "facilityId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state
        .integrity
        .reassign_dependent(kind, dependent_id, facility_id.as_deref())
        .await
    {
        Ok(()) => ok(serde_json::json!({
            "dependentId": dependent_id,
            "facilityId": facility_id,
        })),
        Err(err) => integrity_error(err),
    }
}

/// 被引用的设施必须存在
async fn ensure_facility(state: &AppState, facility_id: Option<&str>) -> Result<(), Response> {
    let Some(facility_id) = facility_id else {
        return Ok(());
    };
    match state.facility_store.find_facility(facility_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(bad_request_error(format!(
            "facilityId references unknown facility: {facility_id}"
        ))),
        Err(err) => Err(storage_error(err)),
    }
}

fn task_from_request(req: CreateTaskRequest) -> Result<TaskRecord, Response> {
    Ok(TaskRecord {
        task_id: Uuid::new_v4().to_string(),
        facility_id: normalize_optional(req.facility_id, "facilityId")?,
        title: normalize_required(req.title, "title", TASK_TITLE_MAX_CHARS)?,
        description: normalize_optional(req.description, "description")?,
        due_date: req.due_date,
        done: req.done,
    })
}

fn electric_meter_from_request(
    req: CreateElectricMeterRequest,
) -> Result<ElectricMeterRecord, Response> {
    Ok(ElectricMeterRecord {
        meter_id: Uuid::new_v4().to_string(),
        facility_id: normalize_optional(req.facility_id, "facilityId")?,
        serial_number: normalize_required(
            req.serial_number,
            "serialNumber",
            SERIAL_NUMBER_MAX_CHARS,
        )?,
        location: normalize_optional(req.location, "location")?,
    })
}

fn heat_gas_meter_from_request(
    req: CreateHeatGasMeterRequest,
) -> Result<HeatGasMeterRecord, Response> {
    let medium: MeterMedium = req
        .medium
        .parse()
        .map_err(|err: domain::DomainError| bad_request_error(err.to_string()))?;
    Ok(HeatGasMeterRecord {
        meter_id: Uuid::new_v4().to_string(),
        facility_id: normalize_optional(req.facility_id, "facilityId")?,
        serial_number: normalize_required(
            req.serial_number,
            "serialNumber",
            SERIAL_NUMBER_MAX_CHARS,
        )?,
        medium,
        location: normalize_optional(req.location, "location")?,
    })
}
