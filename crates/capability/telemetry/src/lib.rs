//! 追踪、请求 ID 生成与进程级计数指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
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

/// 基础指标。
pub struct TelemetryMetrics {
    maintenance_created: AtomicU64,
    maintenance_updated: AtomicU64,
    maintenance_completed: AtomicU64,
    maintenance_deleted: AtomicU64,
    overdue_transitions: AtomicU64,
    overdue_sweeps: AtomicU64,
    sweep_latency_ms_total: AtomicU64,
    sweep_latency_ms_count: AtomicU64,
    facilities_deleted: AtomicU64,
    dependents_detached: AtomicU64,
    dependents_reassigned: AtomicU64,
    integrity_failures: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            maintenance_created: AtomicU64::new(0),
            maintenance_updated: AtomicU64::new(0),
            maintenance_completed: AtomicU64::new(0),
            maintenance_deleted: AtomicU64::new(0),
            overdue_transitions: AtomicU64::new(0),
            overdue_sweeps: AtomicU64::new(0),
            sweep_latency_ms_total: AtomicU64::new(0),
            sweep_latency_ms_count: AtomicU64::new(0),
            facilities_deleted: AtomicU64::new(0),
            dependents_detached: AtomicU64::new(0),
            dependents_reassigned: AtomicU64::new(0),
            integrity_failures: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            maintenance_created: self.maintenance_created.load(Ordering::Relaxed),
            maintenance_updated: self.maintenance_updated.load(Ordering::Relaxed),
            maintenance_completed: self.maintenance_completed.load(Ordering::Relaxed),
            maintenance_deleted: self.maintenance_deleted.load(Ordering::Relaxed),
            overdue_transitions: self.overdue_transitions.load(Ordering::Relaxed),
            overdue_sweeps: self.overdue_sweeps.load(Ordering::Relaxed),
            sweep_latency_ms_total: self.sweep_latency_ms_total.load(Ordering::Relaxed),
            sweep_latency_ms_count: self.sweep_latency_ms_count.load(Ordering::Relaxed),
            facilities_deleted: self.facilities_deleted.load(Ordering::Relaxed),
            dependents_detached: self.dependents_detached.load(Ordering::Relaxed),
            dependents_reassigned: self.dependents_reassigned.load(Ordering::Relaxed),
            integrity_failures: self.integrity_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录维保记录创建次数。
pub fn record_maintenance_created() {
    metrics().maintenance_created.fetch_add(1, Ordering::Relaxed);
}

/// 记录维保记录更新次数（含暂停、恢复、附加证明文件）。
pub fn record_maintenance_updated() {
    metrics().maintenance_updated.fetch_add(1, Ordering::Relaxed);
}

/// 记录维保完成次数。
pub fn record_maintenance_completed() {
    metrics()
        .maintenance_completed
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录维保记录删除次数。
pub fn record_maintenance_deleted() {
    metrics().maintenance_deleted.fetch_add(1, Ordering::Relaxed);
}

/// 记录 Active → Overdue 的状态流转次数。
pub fn record_overdue_transition() {
    metrics().overdue_transitions.fetch_add(1, Ordering::Relaxed);
}

/// 记录逾期扫描耗时（毫秒）。
pub fn record_overdue_sweep_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics.overdue_sweeps.fetch_add(1, Ordering::Relaxed);
    metrics
        .sweep_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .sweep_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录设施删除次数。
pub fn record_facility_deleted() {
    metrics().facilities_deleted.fetch_add(1, Ordering::Relaxed);
}

/// 记录被解除引用的依附记录数。
pub fn record_dependents_detached(count: u64) {
    metrics()
        .dependents_detached
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录依附记录改挂次数。
pub fn record_dependent_reassigned() {
    metrics()
        .dependents_reassigned
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录完整性校验失败次数。
pub fn record_integrity_failure() {
    metrics().integrity_failures.fetch_add(1, Ordering::Relaxed);
}
