//! 输入验证辅助函数
//!
//! 提供统一的输入验证函数：
//! - normalize_required：验证必填字段，去除空格并检查非空与长度上限
//! - normalize_optional：验证可选字段，如果提供则去除空格并检查非空
//! - normalize_non_negative：验证可选数值字段为有限的非负数
//!
//! 验证规则：
//! - 去除首尾空格
//! - 非空字符串才通过验证
//! - 长度按字符数计算
//! - 失败返回 bad_request_error 响应

use crate::utils::response::bad_request_error;
use axum::response::Response;

/// 验证必填字段，去除空格并检查非空与长度上限
pub fn normalize_required(value: String, field: &str, max_chars: usize) -> Result<String, Response> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request_error(format!("{field} required")));
    }
    let chars = trimmed.chars().count();
    if chars > max_chars {
        return Err(bad_request_error(format!(
            "{field} must be at most {max_chars} characters, got {chars}"
        )));
    }
    Ok(trimmed.to_string())
}

/// 验证可选字段，如果提供则去除空格并检查非空
pub fn normalize_optional(value: Option<String>, field: &str) -> Result<Option<String>, Response> {
    match value {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(bad_request_error(format!("{field} required")));
            }
            Ok(Some(trimmed.to_string()))
        }
        None => Ok(None),
    }
}

/// 验证可选数值字段为有限的非负数
pub fn normalize_non_negative(value: Option<f64>, field: &str) -> Result<Option<f64>, Response> {
    match value {
        Some(value) if !value.is_finite() || value < 0.0 => Err(bad_request_error(format!(
            "{field} must be a finite non-negative number"
        ))),
        other => Ok(other),
    }
}
