use domain::DomainError;
use fms_schedule::ScheduleError;
use fms_storage::StorageError;

/// 维保记录管理错误。
#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    /// 字段校验失败，`field` 为对外字段名（camelCase）。
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error("maintenance record not found: {id}")]
    NotFound { id: String },
    #[error("storage error: {0}")]
    Storage(String),
}

impl MaintenanceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

impl From<DomainError> for MaintenanceError {
    fn from(err: DomainError) -> Self {
        Self::validation(err.field(), err.to_string())
    }
}

impl From<ScheduleError> for MaintenanceError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::InvalidCycle(err) => err.into(),
            ScheduleError::DateOutOfRange { .. } => {
                Self::validation("lastMaintenance", err.to_string())
            }
        }
    }
}

impl From<StorageError> for MaintenanceError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
