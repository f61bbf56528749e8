//! Shared types, configuration, errors, and metric arithmetic for the
//! CRM unit-economics analytics core.

pub mod config;
pub mod error;
pub mod metric;
pub mod types;

pub use config::AnalyticsConfig;
pub use error::{CrmError, CrmResult};
pub use types::{CallRecord, ContactRecord, DealRecord, SegmentName, SourceTables, SpendRecord};
