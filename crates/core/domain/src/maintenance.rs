//! 维保记录的值类型：系统类型、状态、优先级、服务公司、证明文件引用。

use crate::error::DomainError;
use std::fmt;
use std::str::FromStr;

/// 被维保系统的类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemType {
    Hvac,
    Electrical,
    Plumbing,
    FireSafety,
    Security,
    Elevator,
    Generator,
    Other,
}

impl SystemType {
    pub const ALL: [SystemType; 8] = [
        SystemType::Hvac,
        SystemType::Electrical,
        SystemType::Plumbing,
        SystemType::FireSafety,
        SystemType::Security,
        SystemType::Elevator,
        SystemType::Generator,
        SystemType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SystemType::Hvac => "HVAC",
            SystemType::Electrical => "Electrical",
            SystemType::Plumbing => "Plumbing",
            SystemType::FireSafety => "FireSafety",
            SystemType::Security => "Security",
            SystemType::Elevator => "Elevator",
            SystemType::Generator => "Generator",
            SystemType::Other => "Other",
        }
    }
}

impl FromStr for SystemType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|item| item.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::UnknownVariant {
                field: "systemType",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 维保记录状态。
///
/// `Active`/`Overdue` 由状态判定自动切换；`Completed`/`Suspended`
/// 只能通过显式操作设置，自动判定不会覆盖。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaintenanceStatus {
    Active,
    Overdue,
    Completed,
    Suspended,
}

impl MaintenanceStatus {
    pub const ALL: [MaintenanceStatus; 4] = [
        MaintenanceStatus::Active,
        MaintenanceStatus::Overdue,
        MaintenanceStatus::Completed,
        MaintenanceStatus::Suspended,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MaintenanceStatus::Active => "Active",
            MaintenanceStatus::Overdue => "Overdue",
            MaintenanceStatus::Completed => "Completed",
            MaintenanceStatus::Suspended => "Suspended",
        }
    }

    /// 人工设置的状态（自动判定不覆盖）。
    pub fn is_sticky(self) -> bool {
        matches!(
            self,
            MaintenanceStatus::Completed | MaintenanceStatus::Suspended
        )
    }
}

impl FromStr for MaintenanceStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|item| item.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::UnknownVariant {
                field: "status",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 维保优先级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|item| item.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::UnknownVariant {
                field: "priority",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 维保服务公司。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCompany {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// 证明文件引用（不透明，文件本体由附件子系统保存）。
///
/// 归属于维保记录，随记录一起删除。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofDocument {
    pub document_id: String,
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
    pub mimetype: String,
    pub uploaded_at_ms: i64,
}
