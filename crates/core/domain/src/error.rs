/// 领域值构造错误。
///
/// `field` 使用对外输入的字段名（camelCase），便于上层直接回显。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("unknown {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
    #[error("customCycleDays required for Custom cycle")]
    MissingCustomDays,
    #[error("customCycleDays must be between 1 and 3650, got {value}")]
    CustomDaysOutOfRange { value: i64 },
}

impl DomainError {
    /// 出错的输入字段名。
    pub fn field(&self) -> &'static str {
        match self {
            Self::UnknownVariant { field, .. } => field,
            Self::MissingCustomDays | Self::CustomDaysOutOfRange { .. } => "customCycleDays",
        }
    }
}
