//! 维保记录管理服务。
//!
//! 每次写入前显式调用周期计算与状态判定，保证
//! `next_maintenance == next_due(last_maintenance, cycle)`。

use crate::error::MaintenanceError;
use crate::input::{
    FILENAME_MAX_CHARS, MIMETYPE_MAX_CHARS, MaintenanceInput, MaintenancePatch, NOTES_MAX_CHARS,
    PATH_MAX_CHARS, ProofDocumentInput, SYSTEM_MAX_CHARS, optional_text, required_text,
    validate_company, validate_cost, validate_norms,
};
use chrono::NaiveDate;
use domain::{CycleKind, MaintenanceCycle, MaintenanceStatus, Priority, ProofDocument, SystemType};
use fms_schedule::{days_until_due, evaluate_status, next_due};
use fms_storage::{MaintenanceRecord, MaintenanceStore};
use fms_telemetry::{
    record_maintenance_completed, record_maintenance_created, record_maintenance_deleted,
    record_maintenance_updated, record_overdue_sweep_latency_ms, record_overdue_transition,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct MaintenanceServiceConfig {
    /// 是否允许完成日期晚于今天。
    pub allow_future_completion: bool,
}

/// 读侧视图：状态按 `today` 重新判定，并附带距离到期天数。
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceView {
    pub record: MaintenanceRecord,
    pub days_until_due: i64,
}

impl MaintenanceView {
    pub fn new(mut record: MaintenanceRecord, today: NaiveDate) -> Self {
        record.status = evaluate_status(record.next_maintenance, record.status, today);
        let days_until_due = days_until_due(record.next_maintenance, today);
        Self {
            record,
            days_until_due,
        }
    }
}

/// 列表过滤条件（均为可选，按有效状态过滤）。
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintenanceFilter {
    pub status: Option<MaintenanceStatus>,
    pub system_type: Option<SystemType>,
}

impl MaintenanceFilter {
    fn matches(&self, record: &MaintenanceRecord) -> bool {
        self.status.is_none_or(|status| record.status == status)
            && self
                .system_type
                .is_none_or(|system_type| record.system_type == system_type)
    }
}

pub struct MaintenanceService {
    store: Arc<dyn MaintenanceStore>,
    config: MaintenanceServiceConfig,
}

impl MaintenanceService {
    pub fn new(store: Arc<dyn MaintenanceStore>) -> Self {
        Self::new_with_config(store, MaintenanceServiceConfig::default())
    }

    pub fn new_with_config(
        store: Arc<dyn MaintenanceStore>,
        config: MaintenanceServiceConfig,
    ) -> Self {
        Self { store, config }
    }

    pub async fn create(
        &self,
        input: MaintenanceInput,
        today: NaiveDate,
    ) -> Result<MaintenanceRecord, MaintenanceError> {
        let system = required_text(&input.system, "system", SYSTEM_MAX_CHARS)?;
        let system_type: SystemType = input.system_type.parse()?;
        let kind: CycleKind = input.cycle.parse()?;
        let cycle = MaintenanceCycle::from_parts(kind, input.custom_cycle_days)?;
        let company = validate_company(&input.company)?;
        let norms = validate_norms(&input.norms)?;
        let cost = validate_cost(input.cost.unwrap_or(0.0))?;
        let priority = match input.priority.as_deref() {
            Some(priority) => priority.parse()?,
            None => Priority::default(),
        };
        let notes = optional_text(input.notes.as_deref(), "notes", Some(NOTES_MAX_CHARS))?;

        let next_maintenance = next_due(input.last_maintenance, cycle)?;
        let status = evaluate_status(next_maintenance, MaintenanceStatus::Active, today);
        let record = MaintenanceRecord {
            maintenance_id: uuid::Uuid::new_v4().to_string(),
            system,
            system_type,
            cycle,
            company,
            norms,
            last_maintenance: input.last_maintenance,
            next_maintenance,
            status,
            cost,
            priority,
            notes,
            proof_documents: Vec::new(),
        };
        let record = self.store.insert_maintenance(record).await?;
        record_maintenance_created();
        info!(
            target: "fms.maintenance",
            maintenance_id = %record.maintenance_id,
            system_type = %record.system_type,
            cycle = %record.cycle,
            last_maintenance = %record.last_maintenance,
            next_maintenance = %record.next_maintenance,
            status = %record.status,
            "maintenance_created"
        );
        Ok(record)
    }

    pub async fn update(
        &self,
        maintenance_id: &str,
        patch: MaintenancePatch,
        today: NaiveDate,
    ) -> Result<MaintenanceRecord, MaintenanceError> {
        let mut record = self.load(maintenance_id).await?;
        let previous_status = record.status;

        if let Some(system) = patch.system.as_deref() {
            record.system = required_text(system, "system", SYSTEM_MAX_CHARS)?;
        }
        if let Some(system_type) = patch.system_type.as_deref() {
            record.system_type = system_type.parse()?;
        }
        if let Some(company) = patch.company.as_ref() {
            record.company = validate_company(company)?;
        }
        if let Some(norms) = patch.norms.as_deref() {
            record.norms = validate_norms(norms)?;
        }
        if let Some(cost) = patch.cost {
            record.cost = validate_cost(cost)?;
        }
        if let Some(priority) = patch.priority.as_deref() {
            record.priority = priority.parse()?;
        }
        if let Some(notes) = patch.notes.as_deref() {
            record.notes = optional_text(Some(notes), "notes", Some(NOTES_MAX_CHARS))?;
        }
        if let Some(last_maintenance) = patch.last_maintenance {
            record.last_maintenance = last_maintenance;
        }
        if patch.cycle.is_some() || patch.custom_cycle_days.is_some() {
            let kind = match patch.cycle.as_deref() {
                Some(cycle) => cycle.parse()?,
                None => record.cycle.kind(),
            };
            // 切换到 Custom 但未给天数时沿用原天数
            let custom_days = patch
                .custom_cycle_days
                .or(record.cycle.custom_days().map(i64::from));
            record.cycle = MaintenanceCycle::from_parts(kind, custom_days)?;
        }
        record.next_maintenance = next_due(record.last_maintenance, record.cycle)?;

        let requested: Option<MaintenanceStatus> = match patch.status.as_deref() {
            Some(status) => Some(status.parse()?),
            None => None,
        };
        record.status = match requested {
            Some(status) if status.is_sticky() => status,
            // 显式设置 Active/Overdue：清除人工状态，按 Active 重新判定
            Some(_) => evaluate_status(record.next_maintenance, MaintenanceStatus::Active, today),
            None => evaluate_status(record.next_maintenance, record.status, today),
        };

        let record = self.save(record).await?;
        record_maintenance_updated();
        self.note_transition(&record, previous_status);
        info!(
            target: "fms.maintenance",
            maintenance_id = %record.maintenance_id,
            cycle = %record.cycle,
            next_maintenance = %record.next_maintenance,
            status = %record.status,
            "maintenance_updated"
        );
        Ok(record)
    }

    /// 完成维保并重新排期。
    pub async fn complete(
        &self,
        maintenance_id: &str,
        completion_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<MaintenanceRecord, MaintenanceError> {
        let mut record = self.load(maintenance_id).await?;
        if completion_date > today && !self.config.allow_future_completion {
            return Err(MaintenanceError::validation(
                "completionDate",
                format!("completionDate {completion_date} is after today {today}"),
            ));
        }
        if record.status == MaintenanceStatus::Suspended {
            return Err(MaintenanceError::validation(
                "status",
                "cannot complete a Suspended record, resume it first",
            ));
        }
        record.last_maintenance = completion_date;
        record.next_maintenance = next_due(completion_date, record.cycle)?;
        record.status = MaintenanceStatus::Active;

        let record = self.save(record).await?;
        record_maintenance_completed();
        info!(
            target: "fms.maintenance",
            maintenance_id = %record.maintenance_id,
            completion_date = %completion_date,
            next_maintenance = %record.next_maintenance,
            "maintenance_completed"
        );
        Ok(record)
    }

    /// 暂停；已暂停时原样返回。
    pub async fn suspend(
        &self,
        maintenance_id: &str,
    ) -> Result<MaintenanceRecord, MaintenanceError> {
        let mut record = self.load(maintenance_id).await?;
        if record.status == MaintenanceStatus::Suspended {
            return Ok(record);
        }
        let previous_status = record.status;
        record.status = MaintenanceStatus::Suspended;
        let record = self.save(record).await?;
        record_maintenance_updated();
        info!(
            target: "fms.maintenance",
            maintenance_id = %record.maintenance_id,
            previous_status = %previous_status,
            "maintenance_suspended"
        );
        Ok(record)
    }

    /// 恢复到自动状态（按 Active 重新判定，已过期则为 Overdue）。
    pub async fn resume(
        &self,
        maintenance_id: &str,
        today: NaiveDate,
    ) -> Result<MaintenanceRecord, MaintenanceError> {
        let mut record = self.load(maintenance_id).await?;
        if record.status != MaintenanceStatus::Suspended {
            return Err(MaintenanceError::validation(
                "status",
                format!("only Suspended records can be resumed, got {}", record.status),
            ));
        }
        record.status = evaluate_status(record.next_maintenance, MaintenanceStatus::Active, today);
        let record = self.save(record).await?;
        record_maintenance_updated();
        self.note_transition(&record, MaintenanceStatus::Suspended);
        info!(
            target: "fms.maintenance",
            maintenance_id = %record.maintenance_id,
            status = %record.status,
            "maintenance_resumed"
        );
        Ok(record)
    }

    /// 追加证明文件引用。
    pub async fn attach_proof(
        &self,
        maintenance_id: &str,
        document: ProofDocumentInput,
        today: NaiveDate,
    ) -> Result<MaintenanceRecord, MaintenanceError> {
        let filename = required_text(&document.filename, "filename", FILENAME_MAX_CHARS)?;
        let path = required_text(&document.path, "path", PATH_MAX_CHARS)?;
        let mimetype = required_text(&document.mimetype, "mimetype", MIMETYPE_MAX_CHARS)?;
        let mut record = self.load(maintenance_id).await?;
        let previous_status = record.status;
        let document = ProofDocument {
            document_id: uuid::Uuid::new_v4().to_string(),
            filename,
            path,
            size_bytes: document.size_bytes,
            mimetype,
            uploaded_at_ms: document.uploaded_at_ms,
        };
        let document_id = document.document_id.clone();
        record.proof_documents.push(document);
        record.status = evaluate_status(record.next_maintenance, record.status, today);

        let record = self.save(record).await?;
        record_maintenance_updated();
        self.note_transition(&record, previous_status);
        info!(
            target: "fms.maintenance",
            maintenance_id = %record.maintenance_id,
            document_id = %document_id,
            documents = record.proof_documents.len(),
            "maintenance_proof_attached"
        );
        Ok(record)
    }

    /// 删除记录及其证明文件，返回被删除的记录供附件子系统释放文件。
    pub async fn delete(&self, maintenance_id: &str) -> Result<MaintenanceRecord, MaintenanceError> {
        let record = self
            .store
            .delete_maintenance(maintenance_id)
            .await?
            .ok_or_else(|| MaintenanceError::not_found(maintenance_id))?;
        record_maintenance_deleted();
        info!(
            target: "fms.maintenance",
            maintenance_id = %record.maintenance_id,
            documents = record.proof_documents.len(),
            "maintenance_deleted"
        );
        Ok(record)
    }

    pub async fn get(
        &self,
        maintenance_id: &str,
        today: NaiveDate,
    ) -> Result<MaintenanceView, MaintenanceError> {
        let record = self.load(maintenance_id).await?;
        Ok(MaintenanceView::new(record, today))
    }

    /// 列出记录视图，按下次到期日升序。
    pub async fn list(
        &self,
        filter: MaintenanceFilter,
        today: NaiveDate,
    ) -> Result<Vec<MaintenanceView>, MaintenanceError> {
        let records = self.store.list_maintenance().await?;
        let mut views: Vec<MaintenanceView> = records
            .into_iter()
            .map(|record| MaintenanceView::new(record, today))
            .filter(|view| filter.matches(&view.record))
            .collect();
        views.sort_by(|left, right| {
            left.record
                .next_maintenance
                .cmp(&right.record.next_maintenance)
                .then_with(|| left.record.maintenance_id.cmp(&right.record.maintenance_id))
        });
        Ok(views)
    }

    /// 逾期扫描：重新判定所有记录，只对状态发生变化的记录做条件状态写入。
    pub async fn refresh_overdue(&self, today: NaiveDate) -> Result<usize, MaintenanceError> {
        let started_at = Instant::now();
        let records = self.store.list_maintenance().await?;
        let mut updated = 0;
        for mut record in records {
            let status = evaluate_status(record.next_maintenance, record.status, today);
            if status == record.status {
                continue;
            }
            let previous_status = record.status;
            // 快照之后被其它写入修改或删除的记录保持原样，留给下一轮扫描
            let written = self
                .store
                .set_status_if(
                    &record.maintenance_id,
                    previous_status,
                    record.next_maintenance,
                    status,
                )
                .await?;
            if !written {
                continue;
            }
            record.status = status;
            updated += 1;
            self.note_transition(&record, previous_status);
        }
        let latency_ms = started_at.elapsed().as_millis() as u64;
        record_overdue_sweep_latency_ms(latency_ms);
        info!(
            target: "fms.maintenance",
            today = %today,
            updated,
            latency_ms,
            "maintenance_overdue_refreshed"
        );
        Ok(updated)
    }

    async fn load(&self, maintenance_id: &str) -> Result<MaintenanceRecord, MaintenanceError> {
        self.store
            .find_maintenance(maintenance_id)
            .await?
            .ok_or_else(|| MaintenanceError::not_found(maintenance_id))
    }

    async fn save(&self, record: MaintenanceRecord) -> Result<MaintenanceRecord, MaintenanceError> {
        let maintenance_id = record.maintenance_id.clone();
        self.store
            .save_maintenance(record)
            .await?
            .ok_or(MaintenanceError::NotFound { id: maintenance_id })
    }

    fn note_transition(&self, record: &MaintenanceRecord, previous_status: MaintenanceStatus) {
        if record.status == MaintenanceStatus::Overdue && previous_status != MaintenanceStatus::Overdue
        {
            record_overdue_transition();
            warn!(
                target: "fms.maintenance",
                maintenance_id = %record.maintenance_id,
                next_maintenance = %record.next_maintenance,
                previous_status = %previous_status,
                "maintenance_overdue"
            );
        }
    }
}
