//! 内存存储实现模块
//!
//! 仅用于本地演示和测试（未配置数据库 URL 时 API 也使用它）。
//!
//! 包含以下实现：
//! - MaintenanceStore: InMemoryMaintenanceStore
//! - FacilityStore / DependentStore / FacilityGraphStore: InMemoryFacilityGraph

pub mod facility_graph;
pub mod maintenance;

pub use facility_graph::*;
pub use maintenance::*;
