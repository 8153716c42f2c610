//! 维保输入与字段校验
//!
//! 对外输入保持原始形态（枚举为字符串、周期为 "名称 + 可选天数"），
//! 由本模块统一校验并转换为领域值：
//! - 去除首尾空格，必填字段不能为空
//! - 按字符数检查长度上限
//! - 枚举名称大小写不敏感
//! - 费用必须是有限的非负数
//!
//! 校验失败返回 `MaintenanceError::Validation`，错误信息包含对外字段名。

use crate::error::MaintenanceError;
use chrono::NaiveDate;
use domain::ServiceCompany;

pub const SYSTEM_MAX_CHARS: usize = 200;
pub const COMPANY_NAME_MAX_CHARS: usize = 150;
pub const NORM_MAX_CHARS: usize = 100;
pub const NOTES_MAX_CHARS: usize = 1000;
pub const FILENAME_MAX_CHARS: usize = 255;
pub const PATH_MAX_CHARS: usize = 1024;
pub const MIMETYPE_MAX_CHARS: usize = 100;

/// 服务公司输入。
#[derive(Debug, Clone, Default)]
pub struct CompanyInput {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// 创建维保记录的输入。
#[derive(Debug, Clone)]
pub struct MaintenanceInput {
    pub system: String,
    pub system_type: String,
    pub cycle: String,
    pub custom_cycle_days: Option<i64>,
    pub company: CompanyInput,
    pub norms: Vec<String>,
    pub last_maintenance: NaiveDate,
    pub cost: Option<f64>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

/// 更新维保记录的输入，未提供的字段保持不变。
#[derive(Debug, Clone, Default)]
pub struct MaintenancePatch {
    pub system: Option<String>,
    pub system_type: Option<String>,
    pub cycle: Option<String>,
    pub custom_cycle_days: Option<i64>,
    pub company: Option<CompanyInput>,
    pub norms: Option<Vec<String>>,
    pub last_maintenance: Option<NaiveDate>,
    pub status: Option<String>,
    pub cost: Option<f64>,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

/// 证明文件引用输入（文件本体已由附件子系统保存）。
#[derive(Debug, Clone)]
pub struct ProofDocumentInput {
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
    pub mimetype: String,
    pub uploaded_at_ms: i64,
}

/// 验证必填字段：去除空格、检查非空与长度上限
pub fn required_text(
    value: &str,
    field: &'static str,
    max_chars: usize,
) -> Result<String, MaintenanceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MaintenanceError::validation(field, format!("{field} required")));
    }
    check_length(trimmed, field, max_chars)?;
    Ok(trimmed.to_string())
}

/// 验证可选字段：提供时去除空格，空白视为未提供
pub fn optional_text(
    value: Option<&str>,
    field: &'static str,
    max_chars: Option<usize>,
) -> Result<Option<String>, MaintenanceError> {
    let Some(trimmed) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if let Some(max_chars) = max_chars {
        check_length(trimmed, field, max_chars)?;
    }
    Ok(Some(trimmed.to_string()))
}

fn check_length(value: &str, field: &'static str, max_chars: usize) -> Result<(), MaintenanceError> {
    let chars = value.chars().count();
    if chars > max_chars {
        return Err(MaintenanceError::validation(
            field,
            format!("{field} must be at most {max_chars} characters, got {chars}"),
        ));
    }
    Ok(())
}

pub fn validate_company(input: &CompanyInput) -> Result<ServiceCompany, MaintenanceError> {
    Ok(ServiceCompany {
        name: required_text(&input.name, "company.name", COMPANY_NAME_MAX_CHARS)?,
        contact: optional_text(input.contact.as_deref(), "company.contact", None)?,
        phone: optional_text(input.phone.as_deref(), "company.phone", None)?,
        email: optional_text(input.email.as_deref(), "company.email", None)?,
    })
}

/// 规范列表：逐项去除空格，丢弃空白项，保留顺序。
pub fn validate_norms(norms: &[String]) -> Result<Vec<String>, MaintenanceError> {
    let mut validated = Vec::with_capacity(norms.len());
    for norm in norms {
        if let Some(norm) = optional_text(Some(norm), "norms", Some(NORM_MAX_CHARS))? {
            validated.push(norm);
        }
    }
    Ok(validated)
}

pub fn validate_cost(cost: f64) -> Result<f64, MaintenanceError> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(MaintenanceError::validation(
            "cost",
            format!("cost must be a finite non-negative number, got {cost}"),
        ));
    }
    Ok(cost)
}
