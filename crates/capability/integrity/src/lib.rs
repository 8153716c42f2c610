//! 设施引用图完整性管理。
//!
//! 设施删除采用 "解除引用，不级联删除"：引用该设施的任务、电表、热/气表
//! 只清空 `facility_id`，记录本身保留。整个过程在一个事务作用域内完成：
//!
//! 0. 开启事务，读取设施（不存在返回 NotFound）
//! 1. 按类别统计依附记录
//! 2. 清空各类别对该设施的引用
//! 3. 删除设施
//! 4. 校验设施已不存在且各类别引用数为 0，否则回滚并返回 Integrity
//! 5. 提交
//!
//! 任一步失败都会回滚；步骤顺序固定，存储层强制外键，
//! 先删除设施会直接失败。失败不重试，交由调用方处理。

use domain::DependentKind;
use fms_storage::{FacilityGraphStore, FacilityGraphTx, StorageError};
use fms_telemetry::{
    record_dependent_reassigned, record_dependents_detached, record_facility_deleted,
    record_integrity_failure,
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 完整性管理错误。
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    /// 删除后校验失败：`kind` 为依附类别或 `facility`。
    #[error(
        "integrity violation for facility {facility_id}: {kind} expected {expected}, found {actual}"
    )]
    Integrity {
        facility_id: String,
        kind: &'static str,
        expected: u64,
        actual: u64,
    },
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for IntegrityError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

/// 各类别依附记录数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependentCounts {
    pub tasks: u64,
    pub electric_meters: u64,
    pub heat_gas_meters: u64,
}

impl DependentCounts {
    pub fn get(&self, kind: DependentKind) -> u64 {
        match kind {
            DependentKind::Task => self.tasks,
            DependentKind::ElectricMeter => self.electric_meters,
            DependentKind::HeatGasMeter => self.heat_gas_meters,
        }
    }

    fn set(&mut self, kind: DependentKind, count: u64) {
        match kind {
            DependentKind::Task => self.tasks = count,
            DependentKind::ElectricMeter => self.electric_meters = count,
            DependentKind::HeatGasMeter => self.heat_gas_meters = count,
        }
    }

    pub fn total(&self) -> u64 {
        self.tasks + self.electric_meters + self.heat_gas_meters
    }
}

/// 设施删除结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityDeletion {
    pub facility_id: String,
    pub detached: DependentCounts,
}

pub struct FacilityGraphService {
    store: Arc<dyn FacilityGraphStore>,
}

impl FacilityGraphService {
    pub fn new(store: Arc<dyn FacilityGraphStore>) -> Self {
        Self { store }
    }

    /// 删除设施：先解除依附记录引用，再删除设施，原子执行。
    pub async fn delete_facility(
        &self,
        facility_id: &str,
    ) -> Result<FacilityDeletion, IntegrityError> {
        let mut tx = self.store.begin().await?;
        let detached = match detach_and_delete(tx.as_mut(), facility_id).await {
            Ok(detached) => detached,
            Err(err) => {
                rollback(tx, facility_id).await;
                if matches!(err, IntegrityError::Integrity { .. }) {
                    record_integrity_failure();
                }
                warn!(
                    target: "fms.integrity",
                    facility_id = %facility_id,
                    error = %err,
                    "facility_delete_rolled_back"
                );
                return Err(err);
            }
        };
        tx.commit().await?;

        record_facility_deleted();
        record_dependents_detached(detached.total());
        info!(
            target: "fms.integrity",
            facility_id = %facility_id,
            tasks = detached.tasks,
            electric_meters = detached.electric_meters,
            heat_gas_meters = detached.heat_gas_meters,
            "facility_deleted"
        );
        Ok(FacilityDeletion {
            facility_id: facility_id.to_string(),
            detached,
        })
    }

    /// 将依附记录改挂到另一设施，`target_facility` 为 None 时解除引用。
    pub async fn reassign_dependent(
        &self,
        kind: DependentKind,
        dependent_id: &str,
        target_facility: Option<&str>,
    ) -> Result<(), IntegrityError> {
        let mut tx = self.store.begin().await?;
        if let Err(err) = reassign(tx.as_mut(), kind, dependent_id, target_facility).await {
            rollback(tx, dependent_id).await;
            return Err(err);
        }
        tx.commit().await?;

        record_dependent_reassigned();
        info!(
            target: "fms.integrity",
            dependent_kind = %kind,
            dependent_id = %dependent_id,
            facility_id = target_facility.unwrap_or("-"),
            "dependent_reassigned"
        );
        Ok(())
    }

    /// 统计引用该设施的依附记录（只读）。
    pub async fn dependent_counts(
        &self,
        facility_id: &str,
    ) -> Result<DependentCounts, IntegrityError> {
        let mut tx = self.store.begin().await?;
        let result = count_all(tx.as_mut(), facility_id).await;
        rollback(tx, facility_id).await;
        result
    }
}

async fn require_facility(
    tx: &mut dyn FacilityGraphTx,
    facility_id: &str,
) -> Result<(), IntegrityError> {
    match tx.load_facility(facility_id).await? {
        Some(_) => Ok(()),
        None => Err(IntegrityError::NotFound {
            entity: "facility",
            id: facility_id.to_string(),
        }),
    }
}

async fn count_all(
    tx: &mut dyn FacilityGraphTx,
    facility_id: &str,
) -> Result<DependentCounts, IntegrityError> {
    require_facility(tx, facility_id).await?;
    let mut counts = DependentCounts::default();
    for kind in DependentKind::ALL {
        counts.set(kind, tx.count_dependents(facility_id, kind).await?);
    }
    Ok(counts)
}

async fn detach_and_delete(
    tx: &mut dyn FacilityGraphTx,
    facility_id: &str,
) -> Result<DependentCounts, IntegrityError> {
    let counts = count_all(tx, facility_id).await?;

    let mut detached = DependentCounts::default();
    for kind in DependentKind::ALL {
        if counts.get(kind) > 0 {
            detached.set(kind, tx.clear_facility_ref(facility_id, kind).await?);
        }
    }

    tx.delete_facility(facility_id).await?;

    if tx.load_facility(facility_id).await?.is_some() {
        return Err(violation(facility_id, "facility", 0, 1));
    }
    for kind in DependentKind::ALL {
        let actual = tx.count_dependents(facility_id, kind).await?;
        if actual != 0 {
            return Err(violation(facility_id, kind.as_str(), 0, actual));
        }
    }
    Ok(detached)
}

async fn reassign(
    tx: &mut dyn FacilityGraphTx,
    kind: DependentKind,
    dependent_id: &str,
    target_facility: Option<&str>,
) -> Result<(), IntegrityError> {
    if let Some(facility_id) = target_facility {
        require_facility(tx, facility_id).await?;
    }
    if !tx
        .set_facility_ref(kind, dependent_id, target_facility)
        .await?
    {
        return Err(IntegrityError::NotFound {
            entity: kind.as_str(),
            id: dependent_id.to_string(),
        });
    }
    Ok(())
}

fn violation(facility_id: &str, kind: &'static str, expected: u64, actual: u64) -> IntegrityError {
    error!(
        target: "fms.integrity",
        facility_id = %facility_id,
        dependent_kind = kind,
        expected,
        actual,
        "facility_integrity_violation"
    );
    IntegrityError::Integrity {
        facility_id: facility_id.to_string(),
        kind,
        expected,
        actual,
    }
}

async fn rollback(tx: Box<dyn FacilityGraphTx>, scope_id: &str) {
    if let Err(err) = tx.rollback().await {
        warn!(
            target: "fms.integrity",
            scope_id = %scope_id,
            error = %err,
            "transaction_rollback_failed"
        );
    }
}
