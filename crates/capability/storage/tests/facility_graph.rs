use domain::{DependentKind, MeterMedium};
use fms_storage::{
    DependentStore, ElectricMeterRecord, FacilityGraphStore, FacilityRecord, FacilityStore,
    FacilityUpdate, HeatGasMeterRecord, InMemoryFacilityGraph, TaskRecord,
};

fn facility(facility_id: &str) -> FacilityRecord {
    FacilityRecord {
        facility_id: facility_id.to_string(),
        name: format!("Facility {facility_id}"),
        facility_type: None,
        address: None,
        manager: None,
        contact: None,
        area: None,
        floor_count: None,
        year_built: None,
    }
}

fn task(task_id: &str, facility_id: Option<&str>) -> TaskRecord {
    TaskRecord {
        task_id: task_id.to_string(),
        facility_id: facility_id.map(str::to_string),
        title: format!("Task {task_id}"),
        description: None,
        due_date: None,
        done: false,
    }
}

fn electric_meter(meter_id: &str, facility_id: Option<&str>) -> ElectricMeterRecord {
    ElectricMeterRecord {
        meter_id: meter_id.to_string(),
        facility_id: facility_id.map(str::to_string),
        serial_number: format!("SN-{meter_id}"),
        location: None,
    }
}

async fn seeded_graph() -> InMemoryFacilityGraph {
    let graph = InMemoryFacilityGraph::new();
    graph.create_facility(facility("f-1")).await.expect("facility");
    graph.create_facility(facility("f-2")).await.expect("facility");
    graph.create_task(task("t-1", Some("f-1"))).await.expect("task");
    graph.create_task(task("t-2", None)).await.expect("task");
    graph
        .create_electric_meter(electric_meter("e-1", Some("f-1")))
        .await
        .expect("meter");
    graph
}

#[tokio::test]
async fn dependent_lists_filter_by_facility() {
    let graph = seeded_graph().await;
    assert_eq!(graph.list_tasks(None).await.expect("list").len(), 2);
    let scoped = graph.list_tasks(Some("f-1")).await.expect("list");
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].task_id, "t-1");
    assert!(
        graph
            .list_electric_meters(Some("f-2"))
            .await
            .expect("list")
            .is_empty()
    );
}

#[tokio::test]
async fn create_dependent_with_missing_facility_is_rejected() {
    let graph = seeded_graph().await;
    let result = graph
        .create_heat_gas_meter(HeatGasMeterRecord {
            meter_id: "h-1".to_string(),
            facility_id: Some("missing".to_string()),
            serial_number: "SN-h-1".to_string(),
            medium: MeterMedium::Gas,
            location: None,
        })
        .await;
    let err = result.expect_err("foreign key");
    assert!(err.to_string().contains("heat_gas_meters"));
}

#[tokio::test]
async fn update_facility_patches_supplied_fields() {
    let graph = seeded_graph().await;
    let updated = graph
        .update_facility(
            "f-1",
            FacilityUpdate {
                address: Some("Main St 1".to_string()),
                ..FacilityUpdate::default()
            },
        )
        .await
        .expect("update")
        .expect("facility");
    assert_eq!(updated.name, "Facility f-1");
    assert_eq!(updated.address.as_deref(), Some("Main St 1"));

    let missing = graph
        .update_facility("missing", FacilityUpdate::default())
        .await
        .expect("update");
    assert!(missing.is_none());
}

#[tokio::test]
async fn delete_referenced_facility_fails_foreign_key() {
    let graph = seeded_graph().await;
    let mut tx = graph.begin().await.expect("begin");
    let err = tx.delete_facility("f-1").await.expect_err("foreign key");
    assert!(err.to_string().contains("foreign key violation"));
    tx.rollback().await.expect("rollback");
    assert!(graph.find_facility("f-1").await.expect("find").is_some());
}

#[tokio::test]
async fn dropped_transaction_discards_writes() {
    let graph = seeded_graph().await;
    {
        let mut tx = graph.begin().await.expect("begin");
        let cleared = tx
            .clear_facility_ref("f-1", DependentKind::Task)
            .await
            .expect("clear");
        assert_eq!(cleared, 1);
        assert_eq!(
            tx.count_dependents("f-1", DependentKind::Task)
                .await
                .expect("count"),
            0
        );
    }
    let tasks = graph.list_tasks(Some("f-1")).await.expect("list");
    assert_eq!(tasks.len(), 1);
}

#[tokio::test]
async fn committed_transaction_applies_writes() {
    let graph = seeded_graph().await;
    let mut tx = graph.begin().await.expect("begin");
    for kind in DependentKind::ALL {
        tx.clear_facility_ref("f-1", kind).await.expect("clear");
    }
    assert!(tx.delete_facility("f-1").await.expect("delete"));
    tx.commit().await.expect("commit");

    assert!(graph.find_facility("f-1").await.expect("find").is_none());
    let tasks = graph.list_tasks(None).await.expect("list");
    assert!(tasks.iter().all(|task| task.facility_id.is_none()));
}

#[tokio::test]
async fn set_facility_ref_checks_target_and_dependent() {
    let graph = seeded_graph().await;
    let mut tx = graph.begin().await.expect("begin");
    assert!(
        tx.set_facility_ref(DependentKind::Task, "t-2", Some("f-2"))
            .await
            .expect("set")
    );
    assert!(
        !tx.set_facility_ref(DependentKind::Task, "missing", None)
            .await
            .expect("set")
    );
    assert!(
        tx.set_facility_ref(DependentKind::ElectricMeter, "e-1", Some("missing"))
            .await
            .is_err()
    );
    tx.commit().await.expect("commit");

    let tasks = graph.list_tasks(Some("f-2")).await.expect("list");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_id, "t-2");
}
