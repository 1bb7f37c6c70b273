//! Admin views: every complaint, assignment, user management.

use crate::analytics::{customer_summaries, CustomerSummary, StatusCounts};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::types::{Account, Complaint, ComplaintStatus, CurrentUser, Role};

pub struct AdminController<'a> {
    db: &'a Database,
    user: CurrentUser,
}

impl<'a> AdminController<'a> {
    pub fn new(db: &'a Database, user: CurrentUser) -> Self {
        Self { db, user }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn all_complaints(&self) -> Result<Vec<Complaint>> {
        self.db.list_complaints()
    }

    /// Registered agents, in sign-up order
    pub fn agents(&self) -> Result<Vec<Account>> {
        self.db.list_accounts_by_role(Role::Agent)
    }

    /// Assign an unassigned complaint to an agent.
    ///
    /// Sets the agent and moves the complaint to in-progress in one write.
    pub fn assign(&self, id: &str, agent_name: &str) -> Result<Complaint> {
        if !self.agents()?.iter().any(|a| a.name == agent_name) {
            return Err(Error::AgentNotFound(agent_name.to_string()));
        }

        let updated = self.db.update_complaint(id, |complaint| {
            if let Some(current) = &complaint.assigned_agent {
                return Err(Error::AlreadyAssigned {
                    id: complaint.id.clone(),
                    agent: current.clone(),
                });
            }
            complaint.assigned_agent = Some(agent_name.to_string());
            complaint.status = ComplaintStatus::InProgress;
            Ok(())
        })?;

        tracing::info!(id, agent = agent_name, admin = %self.user.email, "Complaint assigned");
        Ok(updated)
    }

    /// Customers who have submitted complaints, with counts
    pub fn customer_summaries(&self) -> Result<Vec<CustomerSummary>> {
        let complaints = self.db.list_complaints()?;
        let accounts = self.db.list_accounts()?;
        Ok(customer_summaries(&complaints, &accounts))
    }

    /// Status counts over all complaints
    pub fn stats(&self) -> Result<StatusCounts> {
        Ok(StatusCounts::from_complaints(&self.all_complaints()?))
    }
}
