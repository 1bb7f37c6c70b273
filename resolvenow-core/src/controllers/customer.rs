//! Customer views: own complaints, submission, conversation.

use chrono::Utc;

use super::append_message;
use crate::analytics::StatusCounts;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::format::message_time_now;
use crate::types::{Complaint, CurrentUser, NewComplaint};

pub struct CustomerController<'a> {
    db: &'a Database,
    user: CurrentUser,
    id_prefix: String,
}

impl<'a> CustomerController<'a> {
    pub fn new(db: &'a Database, user: CurrentUser, id_prefix: &str) -> Self {
        Self {
            db,
            user,
            id_prefix: id_prefix.to_string(),
        }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Complaints submitted under this customer's email
    pub fn my_complaints(&self) -> Result<Vec<Complaint>> {
        self.db.list_complaints_by_customer(&self.user.email)
    }

    /// Submit a new complaint.
    ///
    /// Title and description are required. The stored record starts pending,
    /// unassigned, with the description as its first message.
    pub fn submit(&self, submission: NewComplaint) -> Result<Complaint> {
        if submission.title.trim().is_empty() {
            return Err(Error::MissingField("title"));
        }
        if submission.description.trim().is_empty() {
            return Err(Error::MissingField("description"));
        }

        let now = Utc::now();
        let time = message_time_now();
        self.db.create_complaint(&self.id_prefix, |id| {
            Complaint::from_submission(id, submission, &self.user, now, time)
        })
    }

    /// Send a message on one of this customer's complaints
    pub fn send_message(&self, id: &str, text: &str) -> Result<Complaint> {
        let email = self.user.email.clone();
        append_message(self.db, id, &self.user, text, |c| c.customer_email == email)
    }

    /// Status counts over this customer's complaints
    pub fn stats(&self) -> Result<StatusCounts> {
        Ok(StatusCounts::from_complaints(&self.my_complaints()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, ComplaintStatus, Priority, Role};

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn customer(name: &str, email: &str) -> CurrentUser {
        CurrentUser {
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Customer,
        }
    }

    fn broken_item() -> NewComplaint {
        NewComplaint {
            title: "Broken item".to_string(),
            description: "The screen arrived cracked".to_string(),
            category: Category::Product,
            priority: Priority::High,
            contact_phone: "555".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    #[test]
    fn test_submit_initial_state() {
        let db = setup();
        let alice = CustomerController::new(&db, customer("Alice", "a@x.com"), "CMP");

        let complaint = alice.submit(broken_item()).unwrap();
        assert_eq!(complaint.status, ComplaintStatus::Pending);
        assert_eq!(complaint.assigned_agent, None);
        assert_eq!(complaint.customer_email, "a@x.com");
        assert_eq!(complaint.customer_name, "Alice");
        assert_eq!(complaint.messages.len(), 1);
        assert_eq!(complaint.messages[0].message, "The screen arrived cracked");
        assert_eq!(complaint.priority, Priority::High);
    }

    #[test]
    fn test_submit_requires_title_and_description() {
        let db = setup();
        let alice = CustomerController::new(&db, customer("Alice", "a@x.com"), "CMP");

        let mut missing_title = broken_item();
        missing_title.title = "  ".to_string();
        assert!(matches!(
            alice.submit(missing_title),
            Err(Error::MissingField("title"))
        ));

        let mut missing_description = broken_item();
        missing_description.description = String::new();
        assert!(matches!(
            alice.submit(missing_description),
            Err(Error::MissingField("description"))
        ));

        assert!(db.list_complaints().unwrap().is_empty());
    }

    #[test]
    fn test_sees_only_own_complaints() {
        let db = setup();
        let alice = CustomerController::new(&db, customer("Alice", "a@x.com"), "CMP");
        let carl = CustomerController::new(&db, customer("Carl", "c@x.com"), "CMP");

        alice.submit(broken_item()).unwrap();
        carl.submit(broken_item()).unwrap();
        carl.submit(broken_item()).unwrap();

        assert_eq!(alice.my_complaints().unwrap().len(), 1);
        assert_eq!(carl.stats().unwrap().total, 2);
        assert_eq!(carl.stats().unwrap().pending, 2);
    }

    #[test]
    fn test_message_append_preserves_order() {
        let db = setup();
        let alice = CustomerController::new(&db, customer("Alice", "a@x.com"), "CMP");
        let complaint = alice.submit(broken_item()).unwrap();

        let updated = alice.send_message(&complaint.id, "Any update?").unwrap();
        assert_eq!(updated.messages.len(), 2);
        assert_eq!(updated.messages[0], complaint.messages[0]);
        assert_eq!(updated.messages[1].message, "Any update?");
        assert_eq!(updated.messages[1].sender, "Alice");
    }

    #[test]
    fn test_cannot_message_someone_elses_complaint() {
        let db = setup();
        let alice = CustomerController::new(&db, customer("Alice", "a@x.com"), "CMP");
        let carl = CustomerController::new(&db, customer("Carl", "c@x.com"), "CMP");
        let complaint = alice.submit(broken_item()).unwrap();

        assert!(matches!(
            carl.send_message(&complaint.id, "hi"),
            Err(Error::NotPermitted { .. })
        ));
        assert!(matches!(
            alice.send_message(&complaint.id, "   "),
            Err(Error::EmptyMessage)
        ));
        assert!(matches!(
            alice.send_message("CMPXXXXXX", "hi"),
            Err(Error::ComplaintNotFound(_))
        ));

        let stored = db.get_complaint(&complaint.id).unwrap().unwrap();
        assert_eq!(stored.messages.len(), 1);
    }
}
