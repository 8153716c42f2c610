//! 设施维保 HTTP API：维保记录、设施与依附记录、请求追踪 ID、逾期巡检。

mod handlers;
mod middleware;
mod routes;
mod utils;

use axum::{Router, middleware::from_fn};
use chrono::NaiveDate;
use fms_config::AppConfig;
use fms_integrity::FacilityGraphService;
use fms_maintenance::{MaintenanceService, MaintenanceServiceConfig};
use fms_storage::{
    DependentStore, FacilityGraphStore, FacilityStore, InMemoryFacilityGraph,
    InMemoryMaintenanceStore, MaintenanceStore, PgFacilityGraphStore, PgMaintenanceStore,
    connect_pool,
};
use fms_telemetry::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// 共享给所有 handler 的应用状态。
#[derive(Clone)]
pub struct AppState {
    pub maintenance: Arc<MaintenanceService>,
    pub integrity: Arc<FacilityGraphService>,
    pub facility_store: Arc<dyn FacilityStore>,
    pub dependent_store: Arc<dyn DependentStore>,
    /// 当天日期来源，测试中可替换为固定日期。
    pub today: fn() -> NaiveDate,
}

/// 存储后端集合。
struct Stores {
    maintenance: Arc<dyn MaintenanceStore>,
    facilities: Arc<dyn FacilityStore>,
    dependents: Arc<dyn DependentStore>,
    graph: Arc<dyn FacilityGraphStore>,
}

impl Stores {
    fn in_memory() -> Self {
        let graph = Arc::new(InMemoryFacilityGraph::new());
        Self {
            maintenance: Arc::new(InMemoryMaintenanceStore::new()),
            facilities: graph.clone(),
            dependents: graph.clone(),
            graph,
        }
    }

    async fn postgres(database_url: &str) -> Result<Self, fms_storage::StorageError> {
        let pool = connect_pool(database_url).await?;
        let graph = Arc::new(PgFacilityGraphStore::new(pool.clone()));
        Ok(Self {
            maintenance: Arc::new(PgMaintenanceStore::new(pool)),
            facilities: graph.clone(),
            dependents: graph.clone(),
            graph,
        })
    }
}

fn build_state(
    stores: Stores,
    config: MaintenanceServiceConfig,
    today: fn() -> NaiveDate,
) -> AppState {
    AppState {
        maintenance: Arc::new(MaintenanceService::new_with_config(stores.maintenance, config)),
        integrity: Arc::new(FacilityGraphService::new(stores.graph)),
        facility_store: stores.facilities,
        dependent_store: stores.dependents,
        today,
    }
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_api_router())
        .nest("/api", routes::create_api_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(from_fn(middleware::request_context))
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// 按固定间隔把到期记录标记为逾期。
fn spawn_overdue_sweep(
    maintenance: Arc<MaintenanceService>,
    every: Duration,
    today: fn() -> NaiveDate,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match maintenance.refresh_overdue(today()).await {
                Ok(updated) => info!(
                    target: "fms.sweep",
                    updated,
                    "overdue_sweep_finished"
                ),
                Err(err) => warn!(
                    target: "fms.sweep",
                    error = %err,
                    "overdue_sweep_failed"
                ),
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let stores = match config.database_url.as_deref() {
        Some(database_url) => Stores::postgres(database_url).await?,
        None => {
            warn!(target: "fms.api", "database_url_missing_using_in_memory");
            Stores::in_memory()
        }
    };
    let service_config = MaintenanceServiceConfig {
        allow_future_completion: config.allow_future_completion,
    };
    let state = build_state(stores, service_config, local_today);

    if config.overdue_sweep_seconds > 0 {
        spawn_overdue_sweep(
            state.maintenance.clone(),
            Duration::from_secs(config.overdue_sweep_seconds),
            state.today,
        );
    }

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "fms.api", http_addr = %config.http_addr, "http_listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use fms_storage::{FacilityRecord, TaskRecord};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    fn test_state() -> AppState {
        build_state(
            Stores::in_memory(),
            MaintenanceServiceConfig::default(),
            fixed_today,
        )
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).expect("json body");
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn facility(facility_id: &str) -> FacilityRecord {
        FacilityRecord {
            facility_id: facility_id.to_string(),
            name: "Hauptgebäude".to_string(),
            facility_type: None,
            address: None,
            manager: None,
            contact: None,
            area: None,
            floor_count: None,
            year_built: None,
        }
    }

    #[tokio::test]
    async fn health_responds_with_request_ids() {
        let app = build_app(test_state());
        let response = app
            .oneshot(empty_request("GET", "/health"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert!(response.headers().contains_key("x-trace-id"));
    }

    #[tokio::test]
    async fn create_maintenance_computes_next_date() {
        let app = build_app(test_state());
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/maintenance",
                json!({
                    "system": "Sprinkleranlage",
                    "systemType": "FireSafety",
                    "cycle": "Monthly",
                    "company": { "name": "Brandschutz GmbH" },
                    "lastMaintenance": "2024-01-31",
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["nextMaintenance"], json!("2024-02-29"));
        assert_eq!(body["data"]["status"], json!("Overdue"));
    }

    #[tokio::test]
    async fn create_maintenance_rejects_blank_system() {
        let app = build_app(test_state());
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/maintenance",
                json!({
                    "system": "   ",
                    "systemType": "FireSafety",
                    "cycle": "Annual",
                    "company": { "name": "Brandschutz GmbH" },
                    "lastMaintenance": "2024-01-01",
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!("INVALID.REQUEST"));
    }

    #[tokio::test]
    async fn unknown_maintenance_returns_not_found() {
        let app = build_app(test_state());
        let (status, body) = send(&app, empty_request("GET", "/api/maintenance/missing")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], json!("RESOURCE.NOT_FOUND"));
    }

    #[tokio::test]
    async fn delete_facility_detaches_dependents() {
        let state = test_state();
        state
            .facility_store
            .create_facility(facility("facility-1"))
            .await
            .expect("facility");
        state
            .dependent_store
            .create_task(TaskRecord {
                task_id: "task-1".to_string(),
                facility_id: Some("facility-1".to_string()),
                title: "Prüfen".to_string(),
                description: None,
                due_date: None,
                done: false,
            })
            .await
            .expect("task");
        let app = build_app(state);

        let (status, body) =
            send(&app, empty_request("DELETE", "/api/facilities/facility-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["detached"]["tasks"], json!(1));

        let (status, body) = send(&app, empty_request("GET", "/api/tasks")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["taskId"], json!("task-1"));
        assert_eq!(body["data"][0]["facilityId"], Value::Null);

        let (status, _) = send(&app, empty_request("GET", "/api/facilities/facility-1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_task_rejects_unknown_facility() {
        let app = build_app(test_state());
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/tasks",
                json!({ "title": "Prüfen", "facilityId": "missing" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("INVALID.REQUEST"));
    }
}
