//! 健康检查与计数指标。
//!
//! - GET /health
//! - GET /metrics

use crate::utils::ok;
use api_contract::MetricsSnapshotDto;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use fms_telemetry::metrics;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    ok(MetricsSnapshotDto {
        maintenance_created: snapshot.maintenance_created,
        maintenance_updated: snapshot.maintenance_updated,
        maintenance_completed: snapshot.maintenance_completed,
        maintenance_deleted: snapshot.maintenance_deleted,
        overdue_transitions: snapshot.overdue_transitions,
        overdue_sweeps: snapshot.overdue_sweeps,
        sweep_latency_ms_total: snapshot.sweep_latency_ms_total,
        sweep_latency_ms_count: snapshot.sweep_latency_ms_count,
        facilities_deleted: snapshot.facilities_deleted,
        dependents_detached: snapshot.dependents_detached,
        dependents_reassigned: snapshot.dependents_reassigned,
        integrity_failures: snapshot.integrity_failures,
    })
}
