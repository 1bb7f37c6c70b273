//! Customer roll-up for the admin user-management view.

use chrono::{DateTime, Utc};

use crate::types::{Account, Complaint};

/// Phone shown when the customer has no account on file
pub const PHONE_NOT_PROVIDED: &str = "Not provided";

/// One customer who has submitted at least one complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSummary {
    pub name: String,
    pub email: String,
    /// Account mobile, or [`PHONE_NOT_PROVIDED`]
    pub phone: String,
    pub complaint_count: usize,
    /// Creation time of the customer's first complaint
    pub joined_at: DateTime<Utc>,
    pub status: &'static str,
}

/// Group complaints by customer email, in order of first appearance.
///
/// Name comes from the first complaint; phone is looked up in `accounts`.
pub fn customer_summaries(complaints: &[Complaint], accounts: &[Account]) -> Vec<CustomerSummary> {
    let mut summaries: Vec<CustomerSummary> = Vec::new();

    for complaint in complaints {
        if let Some(existing) = summaries
            .iter_mut()
            .find(|s| s.email == complaint.customer_email)
        {
            existing.complaint_count += 1;
            continue;
        }

        let phone = accounts
            .iter()
            .find(|a| a.email == complaint.customer_email)
            .map(|a| a.mobile.clone())
            .unwrap_or_else(|| PHONE_NOT_PROVIDED.to_string());

        summaries.push(CustomerSummary {
            name: complaint.customer_name.clone(),
            email: complaint.customer_email.clone(),
            phone,
            complaint_count: 1,
            joined_at: complaint.created_at,
            status: "Active",
        });
    }

    summaries
}
