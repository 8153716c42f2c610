pub mod cycle;
pub mod error;
pub mod facility;
pub mod maintenance;

pub use cycle::{CustomDays, CycleKind, FixedInterval, MaintenanceCycle};
pub use error::DomainError;
pub use facility::{DependentKind, MeterMedium};
pub use maintenance::{MaintenanceStatus, Priority, ProofDocument, ServiceCompany, SystemType};
