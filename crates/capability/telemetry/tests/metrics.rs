use fms_telemetry::{
    TelemetryMetrics, metrics, record_dependents_detached, record_overdue_sweep_latency_ms,
};

#[test]
fn fresh_metrics_start_at_zero() {
    let snapshot = TelemetryMetrics::new().snapshot();
    assert_eq!(snapshot.maintenance_created, 0);
    assert_eq!(snapshot.integrity_failures, 0);
}

#[test]
fn counters_accumulate() {
    let before = metrics().snapshot();
    record_dependents_detached(5);
    record_overdue_sweep_latency_ms(12);
    let after = metrics().snapshot();
    assert!(after.dependents_detached >= before.dependents_detached + 5);
    assert!(after.overdue_sweeps > before.overdue_sweeps);
    assert!(after.sweep_latency_ms_total >= before.sweep_latency_ms_total + 12);
}
