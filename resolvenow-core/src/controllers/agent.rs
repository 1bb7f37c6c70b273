//! Agent views: assigned complaints, status changes, replies.

use super::append_message;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::types::{Complaint, ComplaintStatus, CurrentUser};

pub struct AgentController<'a> {
    db: &'a Database,
    user: CurrentUser,
}

impl<'a> AgentController<'a> {
    pub fn new(db: &'a Database, user: CurrentUser) -> Self {
        Self { db, user }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Complaints assigned to this agent (matched by display name)
    pub fn assigned_complaints(&self) -> Result<Vec<Complaint>> {
        self.db.list_complaints_by_agent(&self.user.name)
    }

    /// Set the status of an assigned complaint.
    ///
    /// Any status may follow any other, including reopening a closed complaint.
    pub fn set_status(&self, id: &str, status: ComplaintStatus) -> Result<Complaint> {
        let name = &self.user.name;
        let updated = self.db.update_complaint(id, |complaint| {
            if !complaint.is_assigned_to(name) {
                return Err(Error::NotPermitted {
                    who: name.clone(),
                    id: complaint.id.clone(),
                });
            }
            complaint.status = status;
            Ok(())
        })?;

        tracing::info!(id, agent = %name, status = %status, "Status updated");
        Ok(updated)
    }

    /// Reply on an assigned complaint
    pub fn send_message(&self, id: &str, text: &str) -> Result<Complaint> {
        let name = self.user.name.clone();
        append_message(self.db, id, &self.user, text, |c| c.is_assigned_to(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::CustomerController;
    use crate::types::{NewComplaint, Role};

    fn setup() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();

        let customer = CurrentUser {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
            role: Role::Customer,
        };
        let id = CustomerController::new(&db, customer, "CMP")
            .submit(NewComplaint {
                title: "Broken item".to_string(),
                description: "Cracked".to_string(),
                ..Default::default()
            })
            .unwrap()
            .id;

        db.update_complaint(&id, |c| {
            c.assigned_agent = Some("Bob".to_string());
            c.status = ComplaintStatus::InProgress;
            Ok(())
        })
        .unwrap();

        (db, id)
    }

    fn agent(name: &str) -> CurrentUser {
        CurrentUser {
            name: name.to_string(),
            email: format!("{}@x.com", name.to_lowercase()),
            role: Role::Agent,
        }
    }

    #[test]
    fn test_sees_only_assigned() {
        let (db, id) = setup();
        let bob = AgentController::new(&db, agent("Bob"));
        let carol = AgentController::new(&db, agent("Carol"));

        let assigned = bob.assigned_complaints().unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, id);
        assert!(carol.assigned_complaints().unwrap().is_empty());
    }

    #[test]
    fn test_any_transition_allowed() {
        let (db, id) = setup();
        let bob = AgentController::new(&db, agent("Bob"));

        let closed = bob.set_status(&id, ComplaintStatus::Closed).unwrap();
        assert_eq!(closed.status, ComplaintStatus::Closed);

        // Reopening a closed complaint is not guarded
        let reopened = bob.set_status(&id, ComplaintStatus::Pending).unwrap();
        assert_eq!(reopened.status, ComplaintStatus::Pending);
        assert_eq!(reopened.assigned_agent.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_unassigned_agent_cannot_act() {
        let (db, id) = setup();
        let carol = AgentController::new(&db, agent("Carol"));

        assert!(matches!(
            carol.set_status(&id, ComplaintStatus::Resolved),
            Err(Error::NotPermitted { .. })
        ));
        assert!(matches!(
            carol.send_message(&id, "hello"),
            Err(Error::NotPermitted { .. })
        ));
        assert!(matches!(
            carol.set_status("CMPMISSING", ComplaintStatus::Resolved),
            Err(Error::ComplaintNotFound(_))
        ));
    }

    #[test]
    fn test_reply() {
        let (db, id) = setup();
        let bob = AgentController::new(&db, agent("Bob"));

        let updated = bob.send_message(&id, "Replacement shipped").unwrap();
        assert_eq!(updated.messages.len(), 2);
        assert_eq!(updated.messages[1].sender, "Bob");
    }
}
