//! 维保周期计算与状态判定。
//!
//! 本模块只有纯函数，不读取系统时钟："今天" 总是由调用方显式传入。
//!
//! - [`next_due`]：上次维保日期 + 周期 → 下次到期日
//! - [`next_due_for`]：按对外输入（周期名称 + 可选天数）计算，含天数校验
//! - [`evaluate_status`]：到期日 + 当前状态 + 今天 → 有效状态
//! - [`days_until_due`]：距离到期的天数（读侧计算，不落库）
//!
//! ## 月份加法规则
//!
//! 按月/按年的周期使用日历语义，目标月份没有对应日期时截断到该月最后一天：
//! 2024-01-31 + 1 个月 = 2024-02-29，2023-01-31 + 1 个月 = 2023-02-28，
//! 2024-02-29 + 1 年 = 2025-02-28。

use chrono::{Days, Months, NaiveDate};
use domain::{CycleKind, DomainError, FixedInterval, MaintenanceCycle, MaintenanceStatus};

/// 周期计算错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid cycle: {0}")]
    InvalidCycle(#[from] DomainError),
    #[error("next due date out of range: {last} + {cycle}")]
    DateOutOfRange {
        last: NaiveDate,
        cycle: MaintenanceCycle,
    },
}

/// 固定周期对应的日历偏移。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOffset {
    Days(u64),
    Months(u32),
}

/// 固定周期的偏移表。
pub fn interval_offset(interval: FixedInterval) -> CycleOffset {
    match interval {
        FixedInterval::Daily => CycleOffset::Days(1),
        FixedInterval::Weekly => CycleOffset::Days(7),
        FixedInterval::Monthly => CycleOffset::Months(1),
        FixedInterval::Quarterly => CycleOffset::Months(3),
        FixedInterval::SemiAnnual => CycleOffset::Months(6),
        FixedInterval::Annual => CycleOffset::Months(12),
        FixedInterval::BiAnnual => CycleOffset::Months(24),
    }
}

/// 计算下次到期日。
pub fn next_due(last: NaiveDate, cycle: MaintenanceCycle) -> Result<NaiveDate, ScheduleError> {
    let offset = match cycle {
        MaintenanceCycle::Fixed(interval) => interval_offset(interval),
        MaintenanceCycle::Custom(days) => CycleOffset::Days(u64::from(days.get())),
    };
    let next = match offset {
        CycleOffset::Days(days) => last.checked_add_days(Days::new(days)),
        // checked_add_months 在目标月份日期不存在时取月末
        CycleOffset::Months(months) => last.checked_add_months(Months::new(months)),
    };
    next.ok_or(ScheduleError::DateOutOfRange { last, cycle })
}

/// 按对外输入计算下次到期日。
///
/// `Custom` 周期缺少天数或天数不在 1..=3650 时返回错误；其它周期忽略天数。
pub fn next_due_for(
    last: NaiveDate,
    kind: CycleKind,
    custom_days: Option<i64>,
) -> Result<NaiveDate, ScheduleError> {
    let cycle = MaintenanceCycle::from_parts(kind, custom_days)?;
    next_due(last, cycle)
}

/// 判定有效状态。
///
/// `Completed`/`Suspended` 原样返回；否则到期日早于今天为 `Overdue`，
/// 其余（含当天到期）为 `Active`。
pub fn evaluate_status(
    next: NaiveDate,
    current: MaintenanceStatus,
    today: NaiveDate,
) -> MaintenanceStatus {
    if current.is_sticky() {
        return current;
    }
    if next < today {
        MaintenanceStatus::Overdue
    } else {
        MaintenanceStatus::Active
    }
}

/// 距离到期的天数，已逾期时为负数。
pub fn days_until_due(next: NaiveDate, today: NaiveDate) -> i64 {
    next.signed_duration_since(today).num_days()
}
