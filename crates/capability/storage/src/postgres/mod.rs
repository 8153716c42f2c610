//! # PostgreSQL 存储实现模块
//!
//! 本模块提供所有存储接口的 PostgreSQL 实现，用于生产环境。
//!
//! ## 设计原则
//!
//! 1. **参数化查询**：所有 SQL 查询使用参数绑定，防止 SQL 注入攻击
//! 2. **显式事务**：跨表写入（维保记录 + 证明文件、设施删除）在同一事务内完成
//! 3. **连接池管理**：使用连接池复用数据库连接，由调用方注入
//!
//! ## 包含的实现
//!
//! - **MaintenanceStore** (`maintenance.rs`)：维保记录与证明文件引用
//! - **FacilityStore / DependentStore / FacilityGraphStore** (`facility_graph.rs`)：
//!   设施、任务、电表、热/气表及设施删除事务
//!
//! ## 数据库模式要求
//!
//! ### 维保表
//! - `maintenance_records`：(maintenance_id, system, system_type, cycle, custom_cycle_days,
//!   company_name, company_contact, company_phone, company_email, norms text[],
//!   last_maintenance date, next_maintenance date, status, cost float8, priority, notes)
//! - `maintenance_documents`：(document_id, maintenance_id → maintenance_records, position,
//!   filename, path, size_bytes, mimetype, uploaded_at_ms)
//!
//! ### 设施表
//! - `facilities`：(facility_id, name, facility_type, address, manager, contact, area float8,
//!   floor_count, year_built)
//! - `tasks`：(task_id, facility_id null → facilities, title, description, due_date, done)
//! - `electric_meters`：(meter_id, facility_id null → facilities, serial_number, location)
//! - `heat_gas_meters`：(meter_id, facility_id null → facilities, serial_number, medium, location)
//!
//! 依附表的外键不带 `on delete` 动作：删除设施前必须由完整性服务先解除引用。
//!
//! ## 错误处理
//!
//! 所有存储操作返回 `Result<T, StorageError>`，`sqlx::Error` 自动转换。
//! 库内枚举文本无法解析时同样返回 `StorageError`。

pub mod facility_graph;
pub mod maintenance;

pub use facility_graph::*;
pub use maintenance::*;
