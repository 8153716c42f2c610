//! Handlers 模块

pub mod dependents;
pub mod facilities;
pub mod health;
pub mod maintenance;

pub use dependents::*;
pub use facilities::*;
pub use health::*;
pub use maintenance::*;
