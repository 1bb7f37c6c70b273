//! Aggregations over complaint collections for dashboard headers and the
//! admin user-management view.

pub mod dashboard;
pub mod users;

pub use dashboard::StatusCounts;
pub use users::{customer_summaries, CustomerSummary};
