//! 中间件模块

pub mod request_context;

pub use request_context::*;
