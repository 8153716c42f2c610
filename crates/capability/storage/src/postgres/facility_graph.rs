//! Postgres 设施引用图存储实现
//!
//! 设施、任务、电表、热/气表的 SQL 实现，以及设施删除所需的事务作用域。
//!
//! 依附表的 `facility_id` 为可空外键（references facilities），
//! 因此删除设施前必须先清空引用，否则数据库返回外键冲突。

use crate::error::StorageError;
use crate::models::{
    ElectricMeterRecord, FacilityRecord, FacilityUpdate, HeatGasMeterRecord, TaskRecord,
};
use crate::traits::{DependentStore, FacilityGraphStore, FacilityGraphTx, FacilityStore};
use domain::DependentKind;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

const FACILITY_COLUMNS: &str = "facility_id, name, facility_type, address, manager, contact, \
     area, floor_count, year_built";

/// 依附类别对应的表名与主键列。
fn dependent_table(kind: DependentKind) -> (&'static str, &'static str) {
    match kind {
        DependentKind::Task => ("tasks", "task_id"),
        DependentKind::ElectricMeter => ("electric_meters", "meter_id"),
        DependentKind::HeatGasMeter => ("heat_gas_meters", "meter_id"),
    }
}

fn facility_from_row(row: &PgRow) -> Result<FacilityRecord, StorageError> {
    Ok(FacilityRecord {
        facility_id: row.try_get("facility_id")?,
        name: row.try_get("name")?,
        facility_type: row.try_get("facility_type")?,
        address: row.try_get("address")?,
        manager: row.try_get("manager")?,
        contact: row.try_get("contact")?,
        area: row.try_get("area")?,
        floor_count: row.try_get("floor_count")?,
        year_built: row.try_get("year_built")?,
    })
}

pub struct PgFacilityGraphStore {
    pub pool: PgPool,
}

impl PgFacilityGraphStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 通过数据库 URL 建立连接池
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl FacilityStore for PgFacilityGraphStore {
    async fn list_facilities(&self) -> Result<Vec<FacilityRecord>, StorageError> {
        let sql = format!("select {FACILITY_COLUMNS} from facilities order by name");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut facilities = Vec::with_capacity(rows.len());
        for row in rows {
            facilities.push(facility_from_row(&row)?);
        }
        Ok(facilities)
    }

    async fn find_facility(
        &self,
        facility_id: &str,
    ) -> Result<Option<FacilityRecord>, StorageError> {
        let sql = format!("select {FACILITY_COLUMNS} from facilities where facility_id = $1");
        let row = sqlx::query(&sql)
            .bind(facility_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(facility_from_row).transpose()
    }

    async fn create_facility(&self, record: FacilityRecord) -> Result<FacilityRecord, StorageError> {
        sqlx::query(
            "insert into facilities \
             (facility_id, name, facility_type, address, manager, contact, area, floor_count, year_built) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&record.facility_id)
        .bind(&record.name)
        .bind(&record.facility_type)
        .bind(&record.address)
        .bind(&record.manager)
        .bind(&record.contact)
        .bind(record.area)
        .bind(record.floor_count)
        .bind(record.year_built)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn update_facility(
        &self,
        facility_id: &str,
        update: FacilityUpdate,
    ) -> Result<Option<FacilityRecord>, StorageError> {
        let sql = format!(
            "update facilities set \
             name = coalesce($1, name), \
             facility_type = coalesce($2, facility_type), \
             address = coalesce($3, address), \
             manager = coalesce($4, manager), \
             contact = coalesce($5, contact), \
             area = coalesce($6, area), \
             floor_count = coalesce($7, floor_count), \
             year_built = coalesce($8, year_built) \
             where facility_id = $9 \
             returning {FACILITY_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(update.name)
            .bind(update.facility_type)
            .bind(update.address)
            .bind(update.manager)
            .bind(update.contact)
            .bind(update.area)
            .bind(update.floor_count)
            .bind(update.year_built)
            .bind(facility_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(facility_from_row).transpose()
    }
}

#[async_trait::async_trait]
impl DependentStore for PgFacilityGraphStore {
    async fn list_tasks(&self, facility_id: Option<&str>) -> Result<Vec<TaskRecord>, StorageError> {
        let rows = sqlx::query(
            "select task_id, facility_id, title, description, due_date, done \
             from tasks where ($1::text is null or facility_id = $1) order by task_id",
        )
        .bind(facility_id)
        .fetch_all(&self.pool)
        .await?;
        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            tasks.push(TaskRecord {
                task_id: row.try_get("task_id")?,
                facility_id: row.try_get("facility_id")?,
                title: row.try_get("title")?,
                description: row.try_get("description")?,
                due_date: row.try_get("due_date")?,
                done: row.try_get("done")?,
            });
        }
        Ok(tasks)
    }

    async fn create_task(&self, record: TaskRecord) -> Result<TaskRecord, StorageError> {
        sqlx::query(
            "insert into tasks (task_id, facility_id, title, description, due_date, done) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&record.task_id)
        .bind(&record.facility_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.due_date)
        .bind(record.done)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_electric_meters(
        &self,
        facility_id: Option<&str>,
    ) -> Result<Vec<ElectricMeterRecord>, StorageError> {
        let rows = sqlx::query(
            "select meter_id, facility_id, serial_number, location \
             from electric_meters where ($1::text is null or facility_id = $1) order by meter_id",
        )
        .bind(facility_id)
        .fetch_all(&self.pool)
        .await?;
        let mut meters = Vec::with_capacity(rows.len());
        for row in rows {
            meters.push(ElectricMeterRecord {
                meter_id: row.try_get("meter_id")?,
                facility_id: row.try_get("facility_id")?,
                serial_number: row.try_get("serial_number")?,
                location: row.try_get("location")?,
            });
        }
        Ok(meters)
    }

    async fn create_electric_meter(
        &self,
        record: ElectricMeterRecord,
    ) -> Result<ElectricMeterRecord, StorageError> {
        sqlx::query(
            "insert into electric_meters (meter_id, facility_id, serial_number, location) \
             values ($1, $2, $3, $4)",
        )
        .bind(&record.meter_id)
        .bind(&record.facility_id)
        .bind(&record.serial_number)
        .bind(&record.location)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_heat_gas_meters(
        &self,
        facility_id: Option<&str>,
    ) -> Result<Vec<HeatGasMeterRecord>, StorageError> {
        let rows = sqlx::query(
            "select meter_id, facility_id, serial_number, medium, location \
             from heat_gas_meters where ($1::text is null or facility_id = $1) order by meter_id",
        )
        .bind(facility_id)
        .fetch_all(&self.pool)
        .await?;
        let mut meters = Vec::with_capacity(rows.len());
        for row in rows {
            let medium: String = row.try_get("medium")?;
            meters.push(HeatGasMeterRecord {
                meter_id: row.try_get("meter_id")?,
                facility_id: row.try_get("facility_id")?,
                serial_number: row.try_get("serial_number")?,
                medium: medium.parse()?,
                location: row.try_get("location")?,
            });
        }
        Ok(meters)
    }

    async fn create_heat_gas_meter(
        &self,
        record: HeatGasMeterRecord,
    ) -> Result<HeatGasMeterRecord, StorageError> {
        sqlx::query(
            "insert into heat_gas_meters (meter_id, facility_id, serial_number, medium, location) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&record.meter_id)
        .bind(&record.facility_id)
        .bind(&record.serial_number)
        .bind(record.medium.as_str())
        .bind(&record.location)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }
}

#[async_trait::async_trait]
impl FacilityGraphStore for PgFacilityGraphStore {
    async fn begin(&self) -> Result<Box<dyn FacilityGraphTx>, StorageError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgFacilityGraphTx { tx }))
    }
}

/// Postgres 事务；丢弃时由 sqlx 自动回滚。
pub struct PgFacilityGraphTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl FacilityGraphTx for PgFacilityGraphTx {
    async fn load_facility(
        &mut self,
        facility_id: &str,
    ) -> Result<Option<FacilityRecord>, StorageError> {
        // 行锁：同一设施的并发删除在此串行化
        let sql = format!(
            "select {FACILITY_COLUMNS} from facilities where facility_id = $1 for update"
        );
        let row = sqlx::query(&sql)
            .bind(facility_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(facility_from_row).transpose()
    }

    async fn count_dependents(
        &mut self,
        facility_id: &str,
        kind: DependentKind,
    ) -> Result<u64, StorageError> {
        let (table, _) = dependent_table(kind);
        let sql = format!("select count(*) from {table} where facility_id = $1");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(facility_id)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn clear_facility_ref(
        &mut self,
        facility_id: &str,
        kind: DependentKind,
    ) -> Result<u64, StorageError> {
        let (table, _) = dependent_table(kind);
        let sql = format!("update {table} set facility_id = null where facility_id = $1");
        let result = sqlx::query(&sql)
            .bind(facility_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_facility_ref(
        &mut self,
        kind: DependentKind,
        dependent_id: &str,
        facility_id: Option<&str>,
    ) -> Result<bool, StorageError> {
        let (table, id_column) = dependent_table(kind);
        let sql = format!("update {table} set facility_id = $1 where {id_column} = $2");
        let result = sqlx::query(&sql)
            .bind(facility_id)
            .bind(dependent_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_facility(&mut self, facility_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from facilities where facility_id = $1")
            .bind(facility_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        let this = *self;
        this.tx.rollback().await?;
        Ok(())
    }
}
