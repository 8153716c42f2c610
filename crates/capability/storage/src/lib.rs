//! # FMS Storage 模块
//!
//! 本模块提供统一的数据存储抽象层，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：定义所有资源存储的异步 Trait 接口
//! 2. **数据模型层** (`models.rs`)：定义存储相关的数据结构
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 4. **连接管理层** (`connection.rs`)：数据库连接池管理
//! 5. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试和演示）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!
//! ## 事务作用域
//!
//! 设施删除需要 "统计 → 解除引用 → 删除 → 校验" 在一个原子单元内完成，
//! 因此设施引用图单独提供 [`FacilityGraphStore::begin`]，返回
//! [`FacilityGraphTx`]。事务未提交即被丢弃时，所有写入撤销。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use fms_storage::{FacilityGraphStore, InMemoryFacilityGraph};
//! use domain::DependentKind;
//!
//! let graph = InMemoryFacilityGraph::new();
//! let mut tx = graph.begin().await?;
//! let tasks = tx.count_dependents("facility-1", DependentKind::Task).await?;
//! tx.commit().await?;
//! ```

// 模块导出：将子模块的内容导出到 crate 根目录
pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod traits;

// 导出常用类型到 crate 根目录，方便外部引用
pub use connection::*;
pub use error::*;
pub use models::*;
pub use traits::*;

// 导出内存存储实现类型
pub use in_memory::{InMemoryFacilityGraph, InMemoryMaintenanceStore};

// 导出 PostgreSQL 存储实现类型
pub use postgres::{PgFacilityGraphStore, PgFacilityGraphTx, PgMaintenanceStore};
