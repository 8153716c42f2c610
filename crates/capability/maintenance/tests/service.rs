use async_trait::async_trait;
use chrono::NaiveDate;
use domain::{CycleKind, MaintenanceCycle, MaintenanceStatus, Priority, SystemType};
use fms_maintenance::{
    CompanyInput, MaintenanceError, MaintenanceFilter, MaintenanceInput, MaintenancePatch,
    MaintenanceService, MaintenanceServiceConfig, ProofDocumentInput,
};
use fms_storage::{InMemoryMaintenanceStore, MaintenanceRecord, MaintenanceStore, StorageError};
use std::sync::{Arc, Mutex};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
}

fn input(cycle: &str, custom_cycle_days: Option<i64>, last: NaiveDate) -> MaintenanceInput {
    MaintenanceInput {
        system: "  Boiler room pump ".to_string(),
        system_type: "plumbing".to_string(),
        cycle: cycle.to_string(),
        custom_cycle_days,
        company: CompanyInput {
            name: "Aqua Service".to_string(),
            contact: Some("  ".to_string()),
            phone: Some("+49 30 1234".to_string()),
            email: None,
        },
        norms: vec!["VDI 6023".to_string(), " ".to_string()],
        last_maintenance: last,
        cost: None,
        priority: None,
        notes: None,
    }
}

fn service() -> (MaintenanceService, Arc<InMemoryMaintenanceStore>) {
    let store = Arc::new(InMemoryMaintenanceStore::new());
    (MaintenanceService::new(store.clone()), store)
}

fn assert_validation(result: Result<impl std::fmt::Debug, MaintenanceError>, expected: &str) {
    match result {
        Err(MaintenanceError::Validation { field, .. }) => assert_eq!(field, expected),
        other => panic!("expected validation error on {expected}, got {other:?}"),
    }
}

#[tokio::test]
async fn create_computes_next_and_status() {
    let (service, _) = service();
    let today = date(2024, 1, 10);

    let overdue = service
        .create(input("Monthly", None, date(2023, 12, 1)), today)
        .await
        .expect("create");
    assert_eq!(overdue.next_maintenance, date(2024, 1, 1));
    assert_eq!(overdue.status, MaintenanceStatus::Overdue);
    assert_eq!(overdue.system, "Boiler room pump");
    assert_eq!(overdue.system_type, SystemType::Plumbing);
    assert_eq!(overdue.priority, Priority::Medium);
    assert_eq!(overdue.cost, 0.0);
    assert_eq!(overdue.norms, vec!["VDI 6023".to_string()]);
    assert!(overdue.company.contact.is_none());

    let active = service
        .create(input("Monthly", None, date(2024, 1, 5)), today)
        .await
        .expect("create");
    assert_eq!(active.next_maintenance, date(2024, 2, 5));
    assert_eq!(active.status, MaintenanceStatus::Active);
}

#[tokio::test]
async fn create_with_custom_cycle() {
    let (service, _) = service();
    let record = service
        .create(input("custom", Some(10), date(2024, 1, 1)), date(2024, 1, 1))
        .await
        .expect("create");
    assert_eq!(record.cycle.kind(), CycleKind::Custom);
    assert_eq!(record.cycle.custom_days(), Some(10));
    assert_eq!(record.next_maintenance, date(2024, 1, 11));
}

#[tokio::test]
async fn create_rejects_invalid_fields() {
    let (service, store) = service();
    let today = date(2024, 1, 1);

    let result = service
        .create(input("Custom", None, date(2024, 1, 1)), today)
        .await;
    assert_validation(result, "customCycleDays");

    let result = service
        .create(input("Custom", Some(3651), date(2024, 1, 1)), today)
        .await;
    assert_validation(result, "customCycleDays");

    let result = service
        .create(input("Hourly", None, date(2024, 1, 1)), today)
        .await;
    assert_validation(result, "cycle");

    let mut long_system = input("Weekly", None, date(2024, 1, 1));
    long_system.system = "x".repeat(201);
    assert_validation(service.create(long_system, today).await, "system");

    let mut negative_cost = input("Weekly", None, date(2024, 1, 1));
    negative_cost.cost = Some(-1.0);
    assert_validation(service.create(negative_cost, today).await, "cost");

    let mut unknown_priority = input("Weekly", None, date(2024, 1, 1));
    unknown_priority.priority = Some("Urgent".to_string());
    assert_validation(service.create(unknown_priority, today).await, "priority");

    let mut missing_company = input("Weekly", None, date(2024, 1, 1));
    missing_company.company.name = " ".to_string();
    assert_validation(service.create(missing_company, today).await, "company.name");

    assert!(store.list_maintenance().await.expect("list").is_empty());
}

#[tokio::test]
async fn update_recomputes_next_and_keeps_sticky_status() {
    let (service, _) = service();
    let today = date(2024, 1, 10);
    let record = service
        .create(input("Monthly", None, date(2024, 1, 5)), today)
        .await
        .expect("create");
    let suspended = service
        .suspend(&record.maintenance_id)
        .await
        .expect("suspend");
    assert_eq!(suspended.status, MaintenanceStatus::Suspended);

    let updated = service
        .update(
            &record.maintenance_id,
            MaintenancePatch {
                cycle: Some("Weekly".to_string()),
                last_maintenance: Some(date(2023, 12, 1)),
                ..MaintenancePatch::default()
            },
            today,
        )
        .await
        .expect("update");
    assert_eq!(updated.next_maintenance, date(2023, 12, 8));
    assert_eq!(updated.status, MaintenanceStatus::Suspended);
}

#[tokio::test]
async fn update_with_active_status_clears_manual_state() {
    let (service, _) = service();
    let today = date(2024, 1, 10);
    let record = service
        .create(input("Weekly", None, date(2023, 12, 1)), today)
        .await
        .expect("create");
    service
        .update(
            &record.maintenance_id,
            MaintenancePatch {
                status: Some("Completed".to_string()),
                ..MaintenancePatch::default()
            },
            today,
        )
        .await
        .expect("complete via update");

    let updated = service
        .update(
            &record.maintenance_id,
            MaintenancePatch {
                status: Some("active".to_string()),
                ..MaintenancePatch::default()
            },
            today,
        )
        .await
        .expect("update");
    assert_eq!(updated.status, MaintenanceStatus::Overdue);
}

#[tokio::test]
async fn update_to_custom_reuses_previous_days() {
    let (service, _) = service();
    let today = date(2024, 1, 1);
    let record = service
        .create(input("Custom", Some(14), date(2024, 1, 1)), today)
        .await
        .expect("create");
    service
        .update(
            &record.maintenance_id,
            MaintenancePatch {
                cycle: Some("Weekly".to_string()),
                ..MaintenancePatch::default()
            },
            today,
        )
        .await
        .expect("to weekly");

    // 固定周期不保留天数，再切回 Custom 时必须提供
    let result = service
        .update(
            &record.maintenance_id,
            MaintenancePatch {
                cycle: Some("Custom".to_string()),
                ..MaintenancePatch::default()
            },
            today,
        )
        .await;
    assert_validation(result, "customCycleDays");

    let other = service
        .create(input("Custom", Some(14), date(2024, 1, 1)), today)
        .await
        .expect("create");
    let updated = service
        .update(
            &other.maintenance_id,
            MaintenancePatch {
                cycle: Some("Custom".to_string()),
                last_maintenance: Some(date(2024, 2, 1)),
                ..MaintenancePatch::default()
            },
            today,
        )
        .await
        .expect("update");
    assert_eq!(updated.cycle.custom_days(), Some(14));
    assert_eq!(updated.next_maintenance, date(2024, 2, 15));
}

#[tokio::test]
async fn update_unknown_record_is_not_found() {
    let (service, _) = service();
    let result = service
        .update("missing", MaintenancePatch::default(), date(2024, 1, 1))
        .await;
    assert!(matches!(result, Err(MaintenanceError::NotFound { id }) if id == "missing"));
}

#[tokio::test]
async fn complete_reschedules_from_completion_date() {
    let (service, _) = service();
    let today = date(2024, 3, 1);
    let record = service
        .create(input("Weekly", None, date(2024, 1, 1)), today)
        .await
        .expect("create");
    assert_eq!(record.status, MaintenanceStatus::Overdue);

    let completed = service
        .complete(&record.maintenance_id, date(2024, 3, 1), today)
        .await
        .expect("complete");
    assert_eq!(completed.last_maintenance, date(2024, 3, 1));
    assert_eq!(completed.next_maintenance, date(2024, 3, 8));
    assert_eq!(completed.status, MaintenanceStatus::Active);
}

#[tokio::test]
async fn complete_rejects_future_date_unless_configured() {
    let (service, store) = service();
    let today = date(2024, 3, 1);
    let record = service
        .create(input("Weekly", None, date(2024, 2, 28)), today)
        .await
        .expect("create");
    let result = service
        .complete(&record.maintenance_id, date(2024, 3, 2), today)
        .await;
    assert_validation(result, "completionDate");

    let permissive = MaintenanceService::new_with_config(
        store,
        MaintenanceServiceConfig {
            allow_future_completion: true,
        },
    );
    let completed = permissive
        .complete(&record.maintenance_id, date(2024, 3, 2), today)
        .await
        .expect("complete");
    assert_eq!(completed.next_maintenance, date(2024, 3, 9));
}

#[tokio::test]
async fn complete_unknown_record_is_not_found_even_with_future_date() {
    let (service, _) = service();
    let result = service
        .complete("missing", date(2024, 3, 2), date(2024, 3, 1))
        .await;
    assert!(matches!(result, Err(MaintenanceError::NotFound { id }) if id == "missing"));
}

#[tokio::test]
async fn suspended_record_cannot_be_completed() {
    let (service, _) = service();
    let today = date(2024, 3, 1);
    let record = service
        .create(input("Weekly", None, date(2024, 2, 28)), today)
        .await
        .expect("create");
    service
        .suspend(&record.maintenance_id)
        .await
        .expect("suspend");
    let result = service
        .complete(&record.maintenance_id, today, today)
        .await;
    assert_validation(result, "status");
}

#[tokio::test]
async fn suspend_and_resume() {
    let (service, _) = service();
    let created_on = date(2024, 1, 1);
    let record = service
        .create(input("Weekly", None, created_on), created_on)
        .await
        .expect("create");

    let first = service
        .suspend(&record.maintenance_id)
        .await
        .expect("suspend");
    let second = service
        .suspend(&record.maintenance_id)
        .await
        .expect("suspend again");
    assert_eq!(first, second);

    let resumed = service
        .resume(&record.maintenance_id, date(2024, 2, 1))
        .await
        .expect("resume");
    assert_eq!(resumed.status, MaintenanceStatus::Overdue);

    let result = service
        .resume(&record.maintenance_id, date(2024, 2, 1))
        .await;
    assert_validation(result, "status");
}

#[tokio::test]
async fn attach_proof_and_delete_returns_documents() {
    let (service, store) = service();
    let today = date(2024, 1, 1);
    let record = service
        .create(input("Annual", None, today), today)
        .await
        .expect("create");

    let result = service
        .attach_proof(
            &record.maintenance_id,
            ProofDocumentInput {
                filename: " ".to_string(),
                path: "uploads/a.pdf".to_string(),
                size_bytes: 10,
                mimetype: "application/pdf".to_string(),
                uploaded_at_ms: 0,
            },
            today,
        )
        .await;
    assert_validation(result, "filename");

    let updated = service
        .attach_proof(
            &record.maintenance_id,
            ProofDocumentInput {
                filename: "protocol.pdf".to_string(),
                path: "uploads/protocol.pdf".to_string(),
                size_bytes: 4096,
                mimetype: "application/pdf".to_string(),
                uploaded_at_ms: 1_704_067_200_000,
            },
            today,
        )
        .await
        .expect("attach");
    assert_eq!(updated.proof_documents.len(), 1);
    assert!(!updated.proof_documents[0].document_id.is_empty());

    let removed = service
        .delete(&record.maintenance_id)
        .await
        .expect("delete");
    assert_eq!(removed.proof_documents.len(), 1);
    assert_eq!(removed.proof_documents[0].filename, "protocol.pdf");
    assert!(store.list_maintenance().await.expect("list").is_empty());

    let result = service.delete(&record.maintenance_id).await;
    assert!(matches!(result, Err(MaintenanceError::NotFound { .. })));
}

#[tokio::test]
async fn get_reevaluates_without_persisting() {
    let (service, store) = service();
    let record = service
        .create(input("Weekly", None, date(2024, 1, 1)), date(2024, 1, 1))
        .await
        .expect("create");

    let view = service
        .get(&record.maintenance_id, date(2024, 1, 10))
        .await
        .expect("get");
    assert_eq!(view.record.status, MaintenanceStatus::Overdue);
    assert_eq!(view.days_until_due, -2);

    let stored = store
        .find_maintenance(&record.maintenance_id)
        .await
        .expect("find")
        .expect("record");
    assert_eq!(stored.status, MaintenanceStatus::Active);
}

#[tokio::test]
async fn list_filters_and_orders_by_next_due() {
    let (service, _) = service();
    let today = date(2024, 1, 10);
    let annual = service
        .create(input("Annual", None, date(2024, 1, 1)), today)
        .await
        .expect("create");
    let weekly = service
        .create(input("Weekly", None, date(2024, 1, 1)), today)
        .await
        .expect("create");
    let mut electrical = input("Monthly", None, date(2024, 1, 1));
    electrical.system_type = "Electrical".to_string();
    let monthly = service.create(electrical, today).await.expect("create");

    let all = service
        .list(MaintenanceFilter::default(), today)
        .await
        .expect("list");
    let ids: Vec<&str> = all
        .iter()
        .map(|view| view.record.maintenance_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            weekly.maintenance_id.as_str(),
            monthly.maintenance_id.as_str(),
            annual.maintenance_id.as_str()
        ]
    );

    let overdue = service
        .list(
            MaintenanceFilter {
                status: Some(MaintenanceStatus::Overdue),
                system_type: None,
            },
            today,
        )
        .await
        .expect("list");
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].record.maintenance_id, weekly.maintenance_id);

    let electrical = service
        .list(
            MaintenanceFilter {
                status: None,
                system_type: Some(SystemType::Electrical),
            },
            today,
        )
        .await
        .expect("list");
    assert_eq!(electrical.len(), 1);
    assert_eq!(electrical[0].record.maintenance_id, monthly.maintenance_id);
}

#[tokio::test]
async fn refresh_overdue_persists_changed_records() {
    let (service, store) = service();
    let created_on = date(2024, 1, 1);
    let weekly = service
        .create(input("Weekly", None, created_on), created_on)
        .await
        .expect("create");
    let suspended = service
        .create(input("Daily", None, created_on), created_on)
        .await
        .expect("create");
    service
        .suspend(&suspended.maintenance_id)
        .await
        .expect("suspend");
    service
        .create(input("Annual", None, created_on), created_on)
        .await
        .expect("create");

    let updated = service
        .refresh_overdue(date(2024, 1, 20))
        .await
        .expect("refresh");
    assert_eq!(updated, 1);

    let stored = store
        .find_maintenance(&weekly.maintenance_id)
        .await
        .expect("find")
        .expect("record");
    assert_eq!(stored.status, MaintenanceStatus::Overdue);
    assert_eq!(
        stored.cycle,
        MaintenanceCycle::from_parts(CycleKind::Weekly, None).expect("cycle")
    );

    let again = service
        .refresh_overdue(date(2024, 1, 20))
        .await
        .expect("refresh");
    assert_eq!(again, 0);
}

/// 在 `list_maintenance` 返回快照后立即提交一批写入，模拟扫描期间的并发请求。
struct ConcurrentWriteStore {
    inner: Arc<InMemoryMaintenanceStore>,
    pending: Mutex<Vec<MaintenanceRecord>>,
}

#[async_trait]
impl MaintenanceStore for ConcurrentWriteStore {
    async fn list_maintenance(&self) -> Result<Vec<MaintenanceRecord>, StorageError> {
        let snapshot = self.inner.list_maintenance().await?;
        let pending: Vec<MaintenanceRecord> = self
            .pending
            .lock()
            .expect("pending lock")
            .drain(..)
            .collect();
        for record in pending {
            self.inner.save_maintenance(record).await?;
        }
        Ok(snapshot)
    }

    async fn find_maintenance(
        &self,
        maintenance_id: &str,
    ) -> Result<Option<MaintenanceRecord>, StorageError> {
        self.inner.find_maintenance(maintenance_id).await
    }

    async fn insert_maintenance(
        &self,
        record: MaintenanceRecord,
    ) -> Result<MaintenanceRecord, StorageError> {
        self.inner.insert_maintenance(record).await
    }

    async fn save_maintenance(
        &self,
        record: MaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, StorageError> {
        self.inner.save_maintenance(record).await
    }

    async fn delete_maintenance(
        &self,
        maintenance_id: &str,
    ) -> Result<Option<MaintenanceRecord>, StorageError> {
        self.inner.delete_maintenance(maintenance_id).await
    }

    async fn set_status_if(
        &self,
        maintenance_id: &str,
        expected: MaintenanceStatus,
        next_maintenance: NaiveDate,
        status: MaintenanceStatus,
    ) -> Result<bool, StorageError> {
        self.inner
            .set_status_if(maintenance_id, expected, next_maintenance, status)
            .await
    }
}

#[tokio::test]
async fn refresh_overdue_keeps_writes_committed_during_sweep() {
    let inner = Arc::new(InMemoryMaintenanceStore::new());
    let setup = MaintenanceService::new(inner.clone());
    let created_on = date(2024, 1, 1);
    let completed = setup
        .create(input("Weekly", None, created_on), created_on)
        .await
        .expect("create");
    let suspended = setup
        .create(input("Weekly", None, created_on), created_on)
        .await
        .expect("create");
    let untouched = setup
        .create(input("Weekly", None, created_on), created_on)
        .await
        .expect("create");

    let today = date(2024, 1, 20);
    let mut completion = completed.clone();
    completion.last_maintenance = today;
    completion.next_maintenance = date(2024, 1, 27);
    completion.status = MaintenanceStatus::Active;
    let mut suspension = suspended.clone();
    suspension.status = MaintenanceStatus::Suspended;

    let store = Arc::new(ConcurrentWriteStore {
        inner: inner.clone(),
        pending: Mutex::new(vec![completion, suspension]),
    });
    let service = MaintenanceService::new(store);
    let updated = service.refresh_overdue(today).await.expect("refresh");
    assert_eq!(updated, 1);

    let stored = inner
        .find_maintenance(&completed.maintenance_id)
        .await
        .expect("find")
        .expect("record");
    assert_eq!(stored.last_maintenance, today);
    assert_eq!(stored.next_maintenance, date(2024, 1, 27));
    assert_eq!(stored.status, MaintenanceStatus::Active);

    let stored = inner
        .find_maintenance(&suspended.maintenance_id)
        .await
        .expect("find")
        .expect("record");
    assert_eq!(stored.status, MaintenanceStatus::Suspended);

    let stored = inner
        .find_maintenance(&untouched.maintenance_id)
        .await
        .expect("find")
        .expect("record");
    assert_eq!(stored.status, MaintenanceStatus::Overdue);
}
