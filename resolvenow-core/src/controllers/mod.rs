//! Role-based view controllers.
//!
//! Each controller borrows the [`Database`] and owns the logged-in
//! [`CurrentUser`]. [`Dashboard::for_user`] picks the controller for the
//! user's role; front ends match on it exhaustively.

mod admin;
mod agent;
mod customer;

pub use admin::AdminController;
pub use agent::AgentController;
pub use customer::CustomerController;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::format::message_time_now;
use crate::types::{ChatMessage, Complaint, CurrentUser, Role};

/// Sidebar entries. Each role sees a fixed subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    MyComplaints,
    SubmitComplaint,
    AssignedComplaints,
    AllComplaints,
    ManageUsers,
}

impl MenuItem {
    /// Menu entries for a role, in display order
    pub fn for_role(role: Role) -> &'static [MenuItem] {
        match role {
            Role::Customer => &[MenuItem::MyComplaints, MenuItem::SubmitComplaint],
            Role::Agent => &[MenuItem::AssignedComplaints],
            Role::Admin => &[MenuItem::AllComplaints, MenuItem::ManageUsers],
        }
    }

    /// The view a role lands on after login
    pub fn default_for(role: Role) -> MenuItem {
        match role {
            Role::Customer => MenuItem::MyComplaints,
            Role::Agent => MenuItem::AssignedComplaints,
            Role::Admin => MenuItem::AllComplaints,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            MenuItem::MyComplaints => "complaints",
            MenuItem::SubmitComplaint => "submit",
            MenuItem::AssignedComplaints => "assigned",
            MenuItem::AllComplaints => "all-complaints",
            MenuItem::ManageUsers => "users",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::MyComplaints => "My Complaints",
            MenuItem::SubmitComplaint => "Submit Complaint",
            MenuItem::AssignedComplaints => "Assigned Complaints",
            MenuItem::AllComplaints => "All Complaints",
            MenuItem::ManageUsers => "Manage Users",
        }
    }
}

/// The controller for a logged-in user, selected by role.
pub enum Dashboard<'a> {
    Customer(CustomerController<'a>),
    Agent(AgentController<'a>),
    Admin(AdminController<'a>),
}

impl<'a> Dashboard<'a> {
    /// Build the controller matching `user.role`.
    pub fn for_user(db: &'a Database, user: CurrentUser, id_prefix: &str) -> Self {
        match user.role {
            Role::Customer => Dashboard::Customer(CustomerController::new(db, user, id_prefix)),
            Role::Agent => Dashboard::Agent(AgentController::new(db, user)),
            Role::Admin => Dashboard::Admin(AdminController::new(db, user)),
        }
    }

    pub fn user(&self) -> &CurrentUser {
        match self {
            Dashboard::Customer(c) => c.user(),
            Dashboard::Agent(c) => c.user(),
            Dashboard::Admin(c) => c.user(),
        }
    }

    pub fn menu(&self) -> &'static [MenuItem] {
        MenuItem::for_role(self.user().role)
    }
}

/// Append `text` from `sender` to a complaint's conversation.
///
/// `may_post` decides, against the stored record, whether the sender is a
/// participant. Blank text is rejected before touching storage.
fn append_message<F>(
    db: &Database,
    id: &str,
    sender: &CurrentUser,
    text: &str,
    may_post: F,
) -> Result<Complaint>
where
    F: FnOnce(&Complaint) -> bool,
{
    if text.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    let updated = db.update_complaint(id, |complaint| {
        if !may_post(complaint) {
            return Err(Error::NotPermitted {
                who: sender.name.clone(),
                id: complaint.id.clone(),
            });
        }
        complaint.messages.push(ChatMessage {
            sender: sender.name.clone(),
            message: text.to_string(),
            time: message_time_now(),
        });
        Ok(())
    })?;

    tracing::info!(
        id,
        sender = %sender.email,
        role = %sender.role,
        messages = updated.messages.len(),
        "Message appended"
    );
    Ok(updated)
}
