//! Core domain types for ResolveNow
//!
//! These types mirror the two persisted collections (`userAccounts` and
//! `complaints`). Field names serialize in camelCase, matching the JSON
//! snapshot format.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Account** | A registered person with exactly one [`Role`] |
//! | **Customer** | Submits complaints and talks to the assigned agent |
//! | **Agent** | Handles complaints assigned to them |
//! | **Admin** | Assigns complaints to agents and reviews users |
//! | **Complaint** | A customer-submitted issue tracked through a [`ComplaintStatus`] |
//! | **Assignment** | Linking a complaint to one responsible agent |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================
// Accounts
// ============================================

/// Account role. Closed set; every role-dependent view matches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Agent,
    Admin,
}

impl Role {
    /// All roles in selector order.
    pub const ALL: [Role; 3] = [Role::Customer, Role::Agent, Role::Admin];

    /// Returns the display name for this role
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Agent => "Agent",
            Role::Admin => "Admin",
        }
    }

    /// Returns the identifier used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Agent => "agent",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "agent" => Ok(Role::Agent),
            "admin" => Ok(Role::Admin),
            _ => Err(Error::InvalidValue {
                kind: "role",
                value: s.to_string(),
            }),
        }
    }
}

/// A registered account as stored in `userAccounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    /// Unique key across all accounts
    pub email: String,
    /// Stored credential (see [`crate::auth`])
    pub password: String,
    pub mobile: String,
    pub role: Role,
}

/// Sign-up form input. The password is plaintext until [`crate::auth::sign_up`]
/// hashes it.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile: String,
    pub role: Role,
}

/// The logged-in identity. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for CurrentUser {
    fn from(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

// ============================================
// Complaints
// ============================================

/// Complaint lifecycle status.
///
/// Transitions are unconstrained: an agent may move between any two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in-progress",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Closed => "closed",
        }
    }

    /// Badge text, e.g. "in progress"
    pub fn label(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::InProgress => "in progress",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComplaintStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ComplaintStatus::Pending),
            "in-progress" | "in_progress" | "in progress" => Ok(ComplaintStatus::InProgress),
            "resolved" => Ok(ComplaintStatus::Resolved),
            "closed" => Ok(ComplaintStatus::Closed),
            _ => Err(Error::InvalidValue {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Complaint priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(Error::InvalidValue {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// Complaint category offered on the submission form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Product,
    Service,
    Billing,
    Delivery,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Product,
        Category::Service,
        Category::Billing,
        Category::Delivery,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Product => "product",
            Category::Service => "service",
            Category::Billing => "billing",
            Category::Delivery => "delivery",
            Category::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Product => "Product Issue",
            Category::Service => "Service Issue",
            Category::Billing => "Billing Problem",
            Category::Delivery => "Delivery Issue",
            Category::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "product" => Ok(Category::Product),
            "service" => Ok(Category::Service),
            "billing" => Ok(Category::Billing),
            "delivery" => Ok(Category::Delivery),
            "other" => Ok(Category::Other),
            _ => Err(Error::InvalidValue {
                kind: "category",
                value: s.to_string(),
            }),
        }
    }
}

/// One entry in a complaint's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name of the author
    pub sender: String,
    pub message: String,
    /// Local wall-clock time, formatted when the message was sent
    pub time: String,
}

/// A complaint record as stored in `complaints`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub address: String,
    pub status: ComplaintStatus,
    /// Agent display name once assigned
    pub assigned_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    /// Append-only conversation, oldest first
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl Complaint {
    /// Build a freshly submitted complaint.
    ///
    /// Status starts as pending, no agent is assigned, and the conversation is
    /// seeded with the description sent by the customer.
    pub fn from_submission(
        id: String,
        submission: NewComplaint,
        customer: &CurrentUser,
        created_at: DateTime<Utc>,
        time: String,
    ) -> Self {
        let first_message = ChatMessage {
            sender: customer.name.clone(),
            message: submission.description.clone(),
            time,
        };

        Self {
            id,
            title: submission.title,
            description: submission.description,
            category: submission.category,
            priority: submission.priority,
            contact_phone: submission.contact_phone,
            address: submission.address,
            status: ComplaintStatus::Pending,
            assigned_agent: None,
            created_at,
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            messages: vec![first_message],
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_agent.is_some()
    }

    pub fn is_assigned_to(&self, agent_name: &str) -> bool {
        self.assigned_agent.as_deref() == Some(agent_name)
    }
}

/// Submission form input
#[derive(Debug, Clone, Default)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub contact_phone: String,
    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&ComplaintStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");

        let parsed: ComplaintStatus = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(parsed, ComplaintStatus::Closed);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Agent".parse::<Role>().unwrap(), Role::Agent);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_complaint_deserializes_camel_case_layout() {
        let json = r#"{
            "id": "CMPAB12CD",
            "title": "Broken item",
            "description": "Arrived cracked",
            "category": "product",
            "priority": "high",
            "contactPhone": "555",
            "address": "",
            "status": "in-progress",
            "assignedAgent": "Bob",
            "createdAt": "2024-01-15T10:30:00.000Z",
            "customerName": "Alice",
            "customerEmail": "a@x.com",
            "messages": [
                {"sender": "Alice", "message": "Arrived cracked", "time": "01/15/2024, 10:30 AM"}
            ]
        }"#;

        let complaint: Complaint = serde_json::from_str(json).unwrap();
        assert_eq!(complaint.status, ComplaintStatus::InProgress);
        assert_eq!(complaint.category, Category::Product);
        assert!(complaint.is_assigned_to("Bob"));
        assert_eq!(complaint.messages.len(), 1);
    }

    #[test]
    fn test_from_submission_seeds_conversation() {
        let customer = CurrentUser {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            role: Role::Customer,
        };
        let submission = NewComplaint {
            title: "Late delivery".to_string(),
            description: "Still waiting".to_string(),
            ..Default::default()
        };

        let complaint = Complaint::from_submission(
            "CMP000001".to_string(),
            submission,
            &customer,
            Utc::now(),
            "now".to_string(),
        );

        assert_eq!(complaint.status, ComplaintStatus::Pending);
        assert!(!complaint.is_assigned());
        assert_eq!(complaint.messages.len(), 1);
        assert_eq!(complaint.messages[0].sender, "Alice");
        assert_eq!(complaint.messages[0].message, "Still waiting");
    }
}
