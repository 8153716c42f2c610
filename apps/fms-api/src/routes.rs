//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查与指标：/health, /metrics
//! - 维保记录：/maintenance/*
//! - 设施管理：/facilities/*
//! - 依附记录：/tasks/*, /electric-meters/*, /heat-gas-meters/*

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post, put},
};

/// 创建 API 路由
///
/// 返回包含所有 API 端点的 Router，支持 / 和 /api/ 两种前缀
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route(
            "/maintenance",
            get(list_maintenance).post(create_maintenance),
        )
        .route(
            "/maintenance/:maintenance_id",
            get(get_maintenance)
                .put(update_maintenance)
                .delete(delete_maintenance),
        )
        .route(
            "/maintenance/:maintenance_id/complete",
            post(complete_maintenance),
        )
        .route(
            "/maintenance/:maintenance_id/suspend",
            post(suspend_maintenance),
        )
        .route(
            "/maintenance/:maintenance_id/resume",
            post(resume_maintenance),
        )
        .route(
            "/maintenance/:maintenance_id/documents",
            post(attach_document),
        )
        .route("/facilities", get(list_facilities).post(create_facility))
        .route(
            "/facilities/:facility_id",
            get(get_facility)
                .put(update_facility)
                .delete(delete_facility),
        )
        .route(
            "/facilities/:facility_id/dependents",
            get(get_facility_dependents),
        )
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:task_id/facility", put(assign_task_facility))
        .route(
            "/electric-meters",
            get(list_electric_meters).post(create_electric_meter),
        )
        .route(
            "/electric-meters/:meter_id/facility",
            put(assign_electric_meter_facility),
        )
        .route(
            "/heat-gas-meters",
            get(list_heat_gas_meters).post(create_heat_gas_meter),
        )
        .route(
            "/heat-gas-meters/:meter_id/facility",
            put(assign_heat_gas_meter_facility),
        )
}
