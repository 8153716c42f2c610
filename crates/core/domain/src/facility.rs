//! 设施依附关系类型。

use crate::error::DomainError;
use std::fmt;
use std::str::FromStr;

/// 依附于设施的记录类别（可空外键 `facility_id`）。
///
/// 删除设施时这些记录只解除引用，不会被删除。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependentKind {
    Task,
    ElectricMeter,
    HeatGasMeter,
}

impl DependentKind {
    pub const ALL: [DependentKind; 3] = [
        DependentKind::Task,
        DependentKind::ElectricMeter,
        DependentKind::HeatGasMeter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DependentKind::Task => "task",
            DependentKind::ElectricMeter => "electric_meter",
            DependentKind::HeatGasMeter => "heat_gas_meter",
        }
    }
}

impl fmt::Display for DependentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 热/气表计量介质。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterMedium {
    Heat,
    Gas,
}

impl MeterMedium {
    pub fn as_str(self) -> &'static str {
        match self {
            MeterMedium::Heat => "Heat",
            MeterMedium::Gas => "Gas",
        }
    }
}

impl FromStr for MeterMedium {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "heat" => Ok(MeterMedium::Heat),
            "gas" => Ok(MeterMedium::Gas),
            _ => Err(DomainError::UnknownVariant {
                field: "medium",
                value: value.to_string(),
            }),
        }
    }
}
