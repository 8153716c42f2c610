//! 设施引用图内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 设施、任务、电表、热/气表放在同一份状态中，以便提供跨表事务：
//! - 开启事务时持有状态锁（OwnedMutexGuard），并复制一份工作副本
//! - 事务内的读写都作用于工作副本
//! - 提交时将工作副本写回；回滚或直接丢弃时副本被丢弃
//!
//! 与数据库一致，内存实现同样强制外键：设施仍被引用时不能删除，
//! 依附记录不能引用不存在的设施。

use crate::error::StorageError;
use crate::models::{
    ElectricMeterRecord, FacilityRecord, FacilityUpdate, HeatGasMeterRecord, TaskRecord,
};
use crate::traits::{DependentStore, FacilityGraphStore, FacilityGraphTx, FacilityStore};
use domain::DependentKind;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 可空设施引用。
trait FacilityRef {
    fn facility_id(&self) -> Option<&str>;
    fn set_facility_id(&mut self, facility_id: Option<String>);
}

impl FacilityRef for TaskRecord {
    fn facility_id(&self) -> Option<&str> {
        self.facility_id.as_deref()
    }

    fn set_facility_id(&mut self, facility_id: Option<String>) {
        self.facility_id = facility_id;
    }
}

impl FacilityRef for ElectricMeterRecord {
    fn facility_id(&self) -> Option<&str> {
        self.facility_id.as_deref()
    }

    fn set_facility_id(&mut self, facility_id: Option<String>) {
        self.facility_id = facility_id;
    }
}

impl FacilityRef for HeatGasMeterRecord {
    fn facility_id(&self) -> Option<&str> {
        self.facility_id.as_deref()
    }

    fn set_facility_id(&mut self, facility_id: Option<String>) {
        self.facility_id = facility_id;
    }
}

fn count_refs<T: FacilityRef>(rows: &HashMap<String, T>, facility_id: &str) -> u64 {
    rows.values()
        .filter(|row| row.facility_id() == Some(facility_id))
        .count() as u64
}

fn clear_refs<T: FacilityRef>(rows: &mut HashMap<String, T>, facility_id: &str) -> u64 {
    let mut cleared = 0;
    for row in rows.values_mut() {
        if row.facility_id() == Some(facility_id) {
            row.set_facility_id(None);
            cleared += 1;
        }
    }
    cleared
}

fn set_ref<T: FacilityRef>(
    rows: &mut HashMap<String, T>,
    dependent_id: &str,
    facility_id: Option<&str>,
) -> bool {
    match rows.get_mut(dependent_id) {
        Some(row) => {
            row.set_facility_id(facility_id.map(str::to_string));
            true
        }
        None => false,
    }
}

fn filter_rows<T: FacilityRef + Clone>(
    rows: &HashMap<String, T>,
    facility_id: Option<&str>,
) -> Vec<T> {
    rows.values()
        .filter(|row| facility_id.is_none() || row.facility_id() == facility_id)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default)]
struct GraphState {
    facilities: HashMap<String, FacilityRecord>,
    tasks: HashMap<String, TaskRecord>,
    electric_meters: HashMap<String, ElectricMeterRecord>,
    heat_gas_meters: HashMap<String, HeatGasMeterRecord>,
}

impl GraphState {
    fn count(&self, facility_id: &str, kind: DependentKind) -> u64 {
        match kind {
            DependentKind::Task => count_refs(&self.tasks, facility_id),
            DependentKind::ElectricMeter => count_refs(&self.electric_meters, facility_id),
            DependentKind::HeatGasMeter => count_refs(&self.heat_gas_meters, facility_id),
        }
    }

    fn clear(&mut self, facility_id: &str, kind: DependentKind) -> u64 {
        match kind {
            DependentKind::Task => clear_refs(&mut self.tasks, facility_id),
            DependentKind::ElectricMeter => clear_refs(&mut self.electric_meters, facility_id),
            DependentKind::HeatGasMeter => clear_refs(&mut self.heat_gas_meters, facility_id),
        }
    }

    /// 外键检查：被引用的设施必须存在。
    fn ensure_facility_exists(
        &self,
        table: &str,
        facility_id: Option<&str>,
    ) -> Result<(), StorageError> {
        match facility_id {
            Some(id) if !self.facilities.contains_key(id) => {
                Err(StorageError::foreign_key(table, id))
            }
            _ => Ok(()),
        }
    }

    fn set(
        &mut self,
        kind: DependentKind,
        dependent_id: &str,
        facility_id: Option<&str>,
    ) -> Result<bool, StorageError> {
        self.ensure_facility_exists(dependent_table(kind), facility_id)?;
        let updated = match kind {
            DependentKind::Task => set_ref(&mut self.tasks, dependent_id, facility_id),
            DependentKind::ElectricMeter => {
                set_ref(&mut self.electric_meters, dependent_id, facility_id)
            }
            DependentKind::HeatGasMeter => {
                set_ref(&mut self.heat_gas_meters, dependent_id, facility_id)
            }
        };
        Ok(updated)
    }

    fn delete_facility(&mut self, facility_id: &str) -> Result<bool, StorageError> {
        for kind in DependentKind::ALL {
            if self.count(facility_id, kind) > 0 {
                return Err(StorageError::foreign_key(dependent_table(kind), facility_id));
            }
        }
        Ok(self.facilities.remove(facility_id).is_some())
    }
}

fn dependent_table(kind: DependentKind) -> &'static str {
    match kind {
        DependentKind::Task => "tasks",
        DependentKind::ElectricMeter => "electric_meters",
        DependentKind::HeatGasMeter => "heat_gas_meters",
    }
}

/// 设施引用图内存存储
///
/// 同时实现 FacilityStore、DependentStore 与 FacilityGraphStore。
/// 事务之间串行执行（单写者）。
#[derive(Clone, Default)]
pub struct InMemoryFacilityGraph {
    state: Arc<Mutex<GraphState>>,
}

impl InMemoryFacilityGraph {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FacilityStore for InMemoryFacilityGraph {
    async fn list_facilities(&self) -> Result<Vec<FacilityRecord>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.facilities.values().cloned().collect())
    }

    async fn find_facility(
        &self,
        facility_id: &str,
    ) -> Result<Option<FacilityRecord>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.facilities.get(facility_id).cloned())
    }

    async fn create_facility(&self, record: FacilityRecord) -> Result<FacilityRecord, StorageError> {
        let mut state = self.state.lock().await;
        if state.facilities.contains_key(&record.facility_id) {
            return Err(StorageError::new("facility exists"));
        }
        state
            .facilities
            .insert(record.facility_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_facility(
        &self,
        facility_id: &str,
        update: FacilityUpdate,
    ) -> Result<Option<FacilityRecord>, StorageError> {
        let mut state = self.state.lock().await;
        let facility = match state.facilities.get_mut(facility_id) {
            Some(facility) => facility,
            None => return Ok(None),
        };
        if let Some(name) = update.name {
            facility.name = name;
        }
        if let Some(facility_type) = update.facility_type {
            facility.facility_type = Some(facility_type);
        }
        if let Some(address) = update.address {
            facility.address = Some(address);
        }
        if let Some(manager) = update.manager {
            facility.manager = Some(manager);
        }
        if let Some(contact) = update.contact {
            facility.contact = Some(contact);
        }
        if let Some(area) = update.area {
            facility.area = Some(area);
        }
        if let Some(floor_count) = update.floor_count {
            facility.floor_count = Some(floor_count);
        }
        if let Some(year_built) = update.year_built {
            facility.year_built = Some(year_built);
        }
        Ok(Some(facility.clone()))
    }
}

#[async_trait::async_trait]
impl DependentStore for InMemoryFacilityGraph {
    async fn list_tasks(&self, facility_id: Option<&str>) -> Result<Vec<TaskRecord>, StorageError> {
        let state = self.state.lock().await;
        Ok(filter_rows(&state.tasks, facility_id))
    }

    async fn create_task(&self, record: TaskRecord) -> Result<TaskRecord, StorageError> {
        let mut state = self.state.lock().await;
        state.ensure_facility_exists("tasks", record.facility_id.as_deref())?;
        if state.tasks.contains_key(&record.task_id) {
            return Err(StorageError::new("task exists"));
        }
        state.tasks.insert(record.task_id.clone(), record.clone());
        Ok(record)
    }

    async fn list_electric_meters(
        &self,
        facility_id: Option<&str>,
    ) -> Result<Vec<ElectricMeterRecord>, StorageError> {
        let state = self.state.lock().await;
        Ok(filter_rows(&state.electric_meters, facility_id))
    }

    async fn create_electric_meter(
        &self,
        record: ElectricMeterRecord,
    ) -> Result<ElectricMeterRecord, StorageError> {
        let mut state = self.state.lock().await;
        state.ensure_facility_exists("electric_meters", record.facility_id.as_deref())?;
        if state.electric_meters.contains_key(&record.meter_id) {
            return Err(StorageError::new("electric meter exists"));
        }
        state
            .electric_meters
            .insert(record.meter_id.clone(), record.clone());
        Ok(record)
    }

    async fn list_heat_gas_meters(
        &self,
        facility_id: Option<&str>,
    ) -> Result<Vec<HeatGasMeterRecord>, StorageError> {
        let state = self.state.lock().await;
        Ok(filter_rows(&state.heat_gas_meters, facility_id))
    }

    async fn create_heat_gas_meter(
        &self,
        record: HeatGasMeterRecord,
    ) -> Result<HeatGasMeterRecord, StorageError> {
        let mut state = self.state.lock().await;
        state.ensure_facility_exists("heat_gas_meters", record.facility_id.as_deref())?;
        if state.heat_gas_meters.contains_key(&record.meter_id) {
            return Err(StorageError::new("heat/gas meter exists"));
        }
        state
            .heat_gas_meters
            .insert(record.meter_id.clone(), record.clone());
        Ok(record)
    }
}

#[async_trait::async_trait]
impl FacilityGraphStore for InMemoryFacilityGraph {
    async fn begin(&self) -> Result<Box<dyn FacilityGraphTx>, StorageError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryGraphTx { guard, working }))
    }
}

/// 内存事务：持有状态锁直到提交、回滚或丢弃。
struct InMemoryGraphTx {
    guard: OwnedMutexGuard<GraphState>,
    working: GraphState,
}

#[async_trait::async_trait]
impl FacilityGraphTx for InMemoryGraphTx {
    async fn load_facility(
        &mut self,
        facility_id: &str,
    ) -> Result<Option<FacilityRecord>, StorageError> {
        Ok(self.working.facilities.get(facility_id).cloned())
    }

    async fn count_dependents(
        &mut self,
        facility_id: &str,
        kind: DependentKind,
    ) -> Result<u64, StorageError> {
        Ok(self.working.count(facility_id, kind))
    }

    async fn clear_facility_ref(
        &mut self,
        facility_id: &str,
        kind: DependentKind,
    ) -> Result<u64, StorageError> {
        Ok(self.working.clear(facility_id, kind))
    }

    async fn set_facility_ref(
        &mut self,
        kind: DependentKind,
        dependent_id: &str,
        facility_id: Option<&str>,
    ) -> Result<bool, StorageError> {
        self.working.set(kind, dependent_id, facility_id)
    }

    async fn delete_facility(&mut self, facility_id: &str) -> Result<bool, StorageError> {
        self.working.delete_facility(facility_id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let InMemoryGraphTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        Ok(())
    }
}
