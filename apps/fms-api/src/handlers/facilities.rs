//! 设施 CRUD handlers
//!
//! 提供设施资源的增删改查接口：
//! - GET /facilities - 列出设施
//! - POST /facilities - 创建设施
//! - GET /facilities/{id} - 获取设施详情
//! - PUT /facilities/{id} - 更新设施
//! - DELETE /facilities/{id} - 删除设施（依附记录解除引用，不删除）
//! - GET /facilities/{id}/dependents - 依附记录统计

use crate::AppState;
use crate::utils::{
    bad_request_error, dependent_counts_to_dto, facility_to_dto, integrity_error,
    normalize_non_negative, normalize_optional, normalize_required, not_found_error, ok,
    storage_error,
};
use api_contract::{
    CreateFacilityRequest, FacilityDeletionDto, FacilityDto, UpdateFacilityRequest,
};
use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use fms_storage::{FacilityRecord, FacilityUpdate};
use uuid::Uuid;

pub const FACILITY_NAME_MAX_CHARS: usize = 150;

#[derive(serde::Deserialize)]
pub struct FacilityPath {
    facility_id: String,
}

/// 列出设施
pub async fn list_facilities(State(state): State<AppState>) -> Response {
    match state.facility_store.list_facilities().await {
        Ok(mut facilities) => {
            facilities.sort_by(|left, right| left.name.cmp(&right.name));
            let data: Vec<FacilityDto> = facilities.into_iter().map(facility_to_dto).collect();
            ok(data)
        }
        Err(err) => storage_error(err),
    }
}

/// 创建设施
pub async fn create_facility(
    State(state): State<AppState>,
    Json(req): Json<CreateFacilityRequest>,
) -> Response {
    let record = match facility_from_request(req) {
        Ok(record) => record,
        Err(response) => return response,
    };
    match state.facility_store.create_facility(record).await {
        Ok(facility) => ok(facility_to_dto(facility)),
        Err(err) => storage_error(err),
    }
}

/// 获取设施详情
pub async fn get_facility(
    State(state): State<AppState>,
    Path(path): Path<FacilityPath>,
) -> Response {
    match state.facility_store.find_facility(&path.facility_id).await {
        Ok(Some(facility)) => ok(facility_to_dto(facility)),
        Ok(None) => not_found_error(format!("facility not found: {}", path.facility_id)),
        Err(err) => storage_error(err),
    }
}

/// 更新设施
pub async fn update_facility(
    State(state): State<AppState>,
    Path(path): Path<FacilityPath>,
    Json(req): Json<UpdateFacilityRequest>,
) -> Response {
    let update = match update_from_request(req) {
        Ok(update) => update,
        Err(response) => return response,
    };
    if update.name.is_none()
        && update.facility_type.is_none()
        && update.address.is_none()
        && update.manager.is_none()
        && update.contact.is_none()
        && update.area.is_none()
        && update.floor_count.is_none()
        && update.year_built.is_none()
    {
        return bad_request_error("empty update");
    }
    match state
        .facility_store
        .update_facility(&path.facility_id, update)
        .await
    {
        Ok(Some(facility)) => ok(facility_to_dto(facility)),
        Ok(None) => not_found_error(format!("facility not found: {}", path.facility_id)),
        Err(err) => storage_error(err),
    }
}

/// 删除设施
pub async fn delete_facility(
    State(state): State<AppState>,
    Path(path): Path<FacilityPath>,
) -> Response {
    match state.integrity.delete_facility(&path.facility_id).await {
        Ok(deletion) => ok(FacilityDeletionDto {
            facility_id: deletion.facility_id,
            detached: dependent_counts_to_dto(deletion.detached),
        }),
        Err(err) => integrity_error(err),
    }
}

/// 依附记录统计
pub async fn get_facility_dependents(
    State(state): State<AppState>,
    Path(path): Path<FacilityPath>,
) -> Response {
    match state.integrity.dependent_counts(&path.facility_id).await {
        Ok(counts) => ok(dependent_counts_to_dto(counts)),
        Err(err) => integrity_error(err),
    }
}

fn facility_from_request(req: CreateFacilityRequest) -> Result<FacilityRecord, Response> {
    Ok(FacilityRecord {
        facility_id: Uuid::new_v4().to_string(),
        name: normalize_required(req.name, "name", FACILITY_NAME_MAX_CHARS)?,
        facility_type: normalize_optional(req.facility_type, "facilityType")?,
        address: normalize_optional(req.address, "address")?,
        manager: normalize_optional(req.manager, "manager")?,
        contact: normalize_optional(req.contact, "contact")?,
        area: normalize_non_negative(req.area, "area")?,
        floor_count: req.floor_count,
        year_built: req.year_built,
    })
}

fn update_from_request(req: UpdateFacilityRequest) -> Result<FacilityUpdate, Response> {
    let name = match req.name {
        Some(name) => Some(normalize_required(name, "name", FACILITY_NAME_MAX_CHARS)?),
        None => None,
    };
    Ok(FacilityUpdate {
        name,
        facility_type: normalize_optional(req.facility_type, "facilityType")?,
        address: normalize_optional(req.address, "address")?,
        manager: normalize_optional(req.manager, "manager")?,
        contact: normalize_optional(req.contact, "contact")?,
        area: normalize_non_negative(req.area, "area")?,
        floor_count: req.floor_count,
        year_built: req.year_built,
    })
}
