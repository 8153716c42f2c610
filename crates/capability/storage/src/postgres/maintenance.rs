//! Postgres 维保记录存储实现
//!
//! 维保记录存于 `maintenance_records`，证明文件引用存于
//! `maintenance_documents`（按 `position` 保序）。
//!
//! 设计要点：
//! - 记录与证明文件在同一事务内写入/删除
//! - 删除记录时显式先删证明文件再删记录（强归属，级联删除）
//! - 使用参数化 SQL 防止注入
//! - 逾期扫描只做条件状态更新，不整行回写

use crate::error::StorageError;
use crate::models::MaintenanceRecord;
use crate::traits::MaintenanceStore;
use chrono::NaiveDate;
use domain::{MaintenanceCycle, MaintenanceStatus, ProofDocument, ServiceCompany};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use std::collections::HashMap;

const RECORD_COLUMNS: &str = "maintenance_id, system, system_type, cycle, custom_cycle_days, \
     company_name, company_contact, company_phone, company_email, norms, \
     last_maintenance, next_maintenance, status, cost, priority, notes";

const DOCUMENT_COLUMNS: &str =
    "document_id, maintenance_id, filename, path, size_bytes, mimetype, uploaded_at_ms";

pub struct PgMaintenanceStore {
    pub pool: PgPool,
}

impl PgMaintenanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 通过数据库 URL 建立连接池
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn record_from_row(row: &PgRow) -> Result<MaintenanceRecord, StorageError> {
    let system_type: String = row.try_get("system_type")?;
    let cycle: String = row.try_get("cycle")?;
    let custom_cycle_days: Option<i32> = row.try_get("custom_cycle_days")?;
    let status: String = row.try_get("status")?;
    let priority: String = row.try_get("priority")?;
    Ok(MaintenanceRecord {
        maintenance_id: row.try_get("maintenance_id")?,
        system: row.try_get("system")?,
        system_type: system_type.parse()?,
        cycle: MaintenanceCycle::from_parts(cycle.parse()?, custom_cycle_days.map(i64::from))?,
        company: ServiceCompany {
            name: row.try_get("company_name")?,
            contact: row.try_get("company_contact")?,
            phone: row.try_get("company_phone")?,
            email: row.try_get("company_email")?,
        },
        norms: row.try_get("norms")?,
        last_maintenance: row.try_get("last_maintenance")?,
        next_maintenance: row.try_get("next_maintenance")?,
        status: status.parse()?,
        cost: row.try_get("cost")?,
        priority: priority.parse()?,
        notes: row.try_get("notes")?,
        proof_documents: Vec::new(),
    })
}

fn document_from_row(row: &PgRow) -> Result<(String, ProofDocument), StorageError> {
    let size_bytes: i64 = row.try_get("size_bytes")?;
    let size_bytes = u64::try_from(size_bytes)
        .map_err(|_| StorageError::new(format!("negative document size: {size_bytes}")))?;
    let document = ProofDocument {
        document_id: row.try_get("document_id")?,
        filename: row.try_get("filename")?,
        path: row.try_get("path")?,
        size_bytes,
        mimetype: row.try_get("mimetype")?,
        uploaded_at_ms: row.try_get("uploaded_at_ms")?,
    };
    Ok((row.try_get("maintenance_id")?, document))
}

async fn load_documents(
    conn: &mut PgConnection,
    maintenance_id: &str,
) -> Result<Vec<ProofDocument>, StorageError> {
    let sql = format!(
        "select {DOCUMENT_COLUMNS} from maintenance_documents \
         where maintenance_id = $1 order by position"
    );
    let rows = sqlx::query(&sql)
        .bind(maintenance_id)
        .fetch_all(&mut *conn)
        .await?;
    let mut documents = Vec::with_capacity(rows.len());
    for row in rows {
        let (_, document) = document_from_row(&row)?;
        documents.push(document);
    }
    Ok(documents)
}

async fn replace_documents(
    conn: &mut PgConnection,
    maintenance_id: &str,
    documents: &[ProofDocument],
) -> Result<(), StorageError> {
    sqlx::query("delete from maintenance_documents where maintenance_id = $1")
        .bind(maintenance_id)
        .execute(&mut *conn)
        .await?;
    for (position, document) in documents.iter().enumerate() {
        let size_bytes = i64::try_from(document.size_bytes)
            .map_err(|_| StorageError::new("document size too large"))?;
        sqlx::query(
            "insert into maintenance_documents \
             (document_id, maintenance_id, position, filename, path, size_bytes, mimetype, uploaded_at_ms) \
             values ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&document.document_id)
        .bind(maintenance_id)
        .bind(position as i32)
        .bind(&document.filename)
        .bind(&document.path)
        .bind(size_bytes)
        .bind(&document.mimetype)
        .bind(document.uploaded_at_ms)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait::async_trait]
impl MaintenanceStore for PgMaintenanceStore {
    async fn list_maintenance(&self) -> Result<Vec<MaintenanceRecord>, StorageError> {
        let sql = format!(
            "select {RECORD_COLUMNS} from maintenance_records order by next_maintenance"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let sql = format!(
            "select {DOCUMENT_COLUMNS} from maintenance_documents \
             order by maintenance_id, position"
        );
        let document_rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut documents: HashMap<String, Vec<ProofDocument>> = HashMap::new();
        for row in document_rows {
            let (maintenance_id, document) = document_from_row(&row)?;
            documents.entry(maintenance_id).or_default().push(document);
        }
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = record_from_row(&row)?;
            record.proof_documents = documents
                .remove(&record.maintenance_id)
                .unwrap_or_default();
            records.push(record);
        }
        Ok(records)
    }

    async fn find_maintenance(
        &self,
        maintenance_id: &str,
    ) -> Result<Option<MaintenanceRecord>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let sql =
            format!("select {RECORD_COLUMNS} from maintenance_records where maintenance_id = $1");
        let row = sqlx::query(&sql)
            .bind(maintenance_id)
            .fetch_optional(&mut *conn)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut record = record_from_row(&row)?;
        record.proof_documents = load_documents(&mut conn, maintenance_id).await?;
        Ok(Some(record))
    }

    async fn insert_maintenance(
        &self,
        record: MaintenanceRecord,
    ) -> Result<MaintenanceRecord, StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "insert into maintenance_records \
             (maintenance_id, system, system_type, cycle, custom_cycle_days, \
              company_name, company_contact, company_phone, company_email, norms, \
              last_maintenance, next_maintenance, status, cost, priority, notes) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(&record.maintenance_id)
        .bind(&record.system)
        .bind(record.system_type.as_str())
        .bind(record.cycle.kind().as_str())
        .bind(record.cycle.custom_days().map(i32::from))
        .bind(&record.company.name)
        .bind(&record.company.contact)
        .bind(&record.company.phone)
        .bind(&record.company.email)
        .bind(&record.norms)
        .bind(record.last_maintenance)
        .bind(record.next_maintenance)
        .bind(record.status.as_str())
        .bind(record.cost)
        .bind(record.priority.as_str())
        .bind(&record.notes)
        .execute(&mut *tx)
        .await?;
        replace_documents(&mut tx, &record.maintenance_id, &record.proof_documents).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn save_maintenance(
        &self,
        record: MaintenanceRecord,
    ) -> Result<Option<MaintenanceRecord>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "update maintenance_records set \
             system = $2, system_type = $3, cycle = $4, custom_cycle_days = $5, \
             company_name = $6, company_contact = $7, company_phone = $8, company_email = $9, \
             norms = $10, last_maintenance = $11, next_maintenance = $12, status = $13, \
             cost = $14, priority = $15, notes = $16 \
             where maintenance_id = $1",
        )
        .bind(&record.maintenance_id)
        .bind(&record.system)
        .bind(record.system_type.as_str())
        .bind(record.cycle.kind().as_str())
        .bind(record.cycle.custom_days().map(i32::from))
        .bind(&record.company.name)
        .bind(&record.company.contact)
        .bind(&record.company.phone)
        .bind(&record.company.email)
        .bind(&record.norms)
        .bind(record.last_maintenance)
        .bind(record.next_maintenance)
        .bind(record.status.as_str())
        .bind(record.cost)
        .bind(record.priority.as_str())
        .bind(&record.notes)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        replace_documents(&mut tx, &record.maintenance_id, &record.proof_documents).await?;
        tx.commit().await?;
        Ok(Some(record))
    }

    /// 删除维保记录（先删证明文件，再删记录）
    async fn delete_maintenance(
        &self,
        maintenance_id: &str,
    ) -> Result<Option<MaintenanceRecord>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "select {RECORD_COLUMNS} from maintenance_records \
             where maintenance_id = $1 for update"
        );
        let row = sqlx::query(&sql)
            .bind(maintenance_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut record = record_from_row(&row)?;
        record.proof_documents = load_documents(&mut tx, maintenance_id).await?;

        sqlx::query("delete from maintenance_documents where maintenance_id = $1")
            .bind(maintenance_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("delete from maintenance_records where maintenance_id = $1")
            .bind(maintenance_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(record))
    }

    /// 条件更新状态列（比较与写入在同一条 SQL 内完成）
    async fn set_status_if(
        &self,
        maintenance_id: &str,
        expected: MaintenanceStatus,
        next_maintenance: NaiveDate,
        status: MaintenanceStatus,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "update maintenance_records set status = $1 \
             where maintenance_id = $2 and status = $3 and next_maintenance = $4",
        )
        .bind(status.as_str())
        .bind(maintenance_id)
        .bind(expected.as_str())
        .bind(next_maintenance)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
