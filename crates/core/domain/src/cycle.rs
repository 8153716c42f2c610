//! 维保周期
//!
//! 周期建模为带标签的枚举：固定周期 `Fixed(FixedInterval)` 或自定义周期
//! `Custom(CustomDays)`。自定义周期必须携带天数，类型层面不存在
//! "Custom 但没有天数" 的值。

use crate::error::DomainError;
use std::fmt;
use std::str::FromStr;

/// 周期名称（对外输入取值，含 Custom）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleKind {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    BiAnnual,
    Custom,
}

impl CycleKind {
    pub const ALL: [CycleKind; 8] = [
        CycleKind::Daily,
        CycleKind::Weekly,
        CycleKind::Monthly,
        CycleKind::Quarterly,
        CycleKind::SemiAnnual,
        CycleKind::Annual,
        CycleKind::BiAnnual,
        CycleKind::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CycleKind::Daily => "Daily",
            CycleKind::Weekly => "Weekly",
            CycleKind::Monthly => "Monthly",
            CycleKind::Quarterly => "Quarterly",
            CycleKind::SemiAnnual => "SemiAnnual",
            CycleKind::Annual => "Annual",
            CycleKind::BiAnnual => "BiAnnual",
            CycleKind::Custom => "Custom",
        }
    }
}

impl FromStr for CycleKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DomainError::UnknownVariant {
                field: "cycle",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 固定周期。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedInterval {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    BiAnnual,
}

/// 自定义周期天数，取值范围 1..=3650。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomDays(u16);

impl CustomDays {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 3650;

    pub fn new(days: i64) -> Result<Self, DomainError> {
        if days < i64::from(Self::MIN) || days > i64::from(Self::MAX) {
            return Err(DomainError::CustomDaysOutOfRange { value: days });
        }
        Ok(Self(days as u16))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

/// 维保周期。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaintenanceCycle {
    Fixed(FixedInterval),
    Custom(CustomDays),
}

impl MaintenanceCycle {
    /// 由周期名称与可选天数构造。
    ///
    /// - `Custom`：天数必填且必须在 1..=3650
    /// - 其它周期：忽略天数
    pub fn from_parts(kind: CycleKind, custom_days: Option<i64>) -> Result<Self, DomainError> {
        let fixed = match kind {
            CycleKind::Daily => FixedInterval::Daily,
            CycleKind::Weekly => FixedInterval::Weekly,
            CycleKind::Monthly => FixedInterval::Monthly,
            CycleKind::Quarterly => FixedInterval::Quarterly,
            CycleKind::SemiAnnual => FixedInterval::SemiAnnual,
            CycleKind::Annual => FixedInterval::Annual,
            CycleKind::BiAnnual => FixedInterval::BiAnnual,
            CycleKind::Custom => {
                let days = custom_days.ok_or(DomainError::MissingCustomDays)?;
                return Ok(MaintenanceCycle::Custom(CustomDays::new(days)?));
            }
        };
        Ok(MaintenanceCycle::Fixed(fixed))
    }

    pub fn kind(&self) -> CycleKind {
        match self {
            MaintenanceCycle::Fixed(FixedInterval::Daily) => CycleKind::Daily,
            MaintenanceCycle::Fixed(FixedInterval::Weekly) => CycleKind::Weekly,
            MaintenanceCycle::Fixed(FixedInterval::Monthly) => CycleKind::Monthly,
            MaintenanceCycle::Fixed(FixedInterval::Quarterly) => CycleKind::Quarterly,
            MaintenanceCycle::Fixed(FixedInterval::SemiAnnual) => CycleKind::SemiAnnual,
            MaintenanceCycle::Fixed(FixedInterval::Annual) => CycleKind::Annual,
            MaintenanceCycle::Fixed(FixedInterval::BiAnnual) => CycleKind::BiAnnual,
            MaintenanceCycle::Custom(_) => CycleKind::Custom,
        }
    }

    /// 自定义天数（仅 Custom 周期有值）。
    pub fn custom_days(&self) -> Option<u16> {
        match self {
            MaintenanceCycle::Custom(days) => Some(days.get()),
            MaintenanceCycle::Fixed(_) => None,
        }
    }
}

impl fmt::Display for MaintenanceCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceCycle::Custom(days) => write!(f, "Custom({})", days.get()),
            MaintenanceCycle::Fixed(_) => f.write_str(self.kind().as_str()),
        }
    }
}
