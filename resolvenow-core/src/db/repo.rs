//! Database repository layer
//!
//! Provides the account and complaint stores. Each collection is one JSON
//! array; every mutation reads the full array, changes it, and writes it back
//! inside a single immediate transaction.

use crate::db::schema::{ACCOUNTS_KEY, COMPLAINTS_KEY};
use crate::error::{Error, Result};
use crate::types::*;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Length of the random part of a complaint ID
const COMPLAINT_ID_LEN: usize = 6;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Database handle owning both collections (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Database opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock();
        super::schema::run_migrations(&conn)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-transaction rolls the transaction back, so the connection stays usable.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ============================================
    // Collection primitives
    // ============================================

    fn read_collection<T: DeserializeOwned>(conn: &Connection, key: &str) -> Result<Vec<T>> {
        let raw: Option<String> = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;

        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_collection<T: Serialize>(conn: &Connection, key: &str, items: &[T]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Load a whole collection
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let conn = self.lock();
        Self::read_collection(&conn, key)
    }

    /// Read-modify-write a whole collection atomically.
    ///
    /// The collection is written back only when `f` succeeds.
    fn modify<T, R, F>(&self, key: &str, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut items: Vec<T> = Self::read_collection(&tx, key)?;
        let result = f(&mut items)?;
        Self::write_collection(&tx, key, &items)?;

        tx.commit()?;
        Ok(result)
    }

    // ============================================
    // Account operations
    // ============================================

    /// Register a new account. Fails if the email is already taken.
    pub fn register_account(&self, account: Account) -> Result<()> {
        self.modify(ACCOUNTS_KEY, |accounts: &mut Vec<Account>| {
            if accounts.iter().any(|a| a.email == account.email) {
                return Err(Error::DuplicateEmail(account.email.clone()));
            }
            tracing::info!(email = %account.email, role = %account.role, "Account registered");
            accounts.push(account);
            Ok(())
        })
    }

    /// Find the account with this email and role
    pub fn find_account(&self, email: &str, role: Role) -> Result<Option<Account>> {
        let accounts: Vec<Account> = self.load(ACCOUNTS_KEY)?;
        Ok(accounts
            .into_iter()
            .find(|a| a.email == email && a.role == role))
    }

    /// Find an account by email regardless of role
    pub fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts: Vec<Account> = self.load(ACCOUNTS_KEY)?;
        Ok(accounts.into_iter().find(|a| a.email == email))
    }

    /// List all accounts in registration order
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        self.load(ACCOUNTS_KEY)
    }

    /// List accounts with the given role in registration order
    pub fn list_accounts_by_role(&self, role: Role) -> Result<Vec<Account>> {
        let accounts: Vec<Account> = self.load(ACCOUNTS_KEY)?;
        Ok(accounts.into_iter().filter(|a| a.role == role).collect())
    }

    // ============================================
    // Complaint operations
    // ============================================

    /// Append a new complaint under a freshly generated ID.
    ///
    /// `build` receives the ID and returns the record to store.
    pub fn create_complaint<F>(&self, id_prefix: &str, build: F) -> Result<Complaint>
    where
        F: FnOnce(String) -> Complaint,
    {
        self.modify(COMPLAINTS_KEY, |complaints: &mut Vec<Complaint>| {
            let id = loop {
                let candidate = new_complaint_id(id_prefix);
                if !complaints.iter().any(|c| c.id == candidate) {
                    break candidate;
                }
            };

            let mut complaint = build(id.clone());
            complaint.id = id;

            tracing::info!(
                id = %complaint.id,
                customer = %complaint.customer_email,
                "Complaint created"
            );
            complaints.push(complaint.clone());
            Ok(complaint)
        })
    }

    /// Get a complaint by ID
    pub fn get_complaint(&self, id: &str) -> Result<Option<Complaint>> {
        let complaints: Vec<Complaint> = self.load(COMPLAINTS_KEY)?;
        Ok(complaints.into_iter().find(|c| c.id == id))
    }

    /// List all complaints in submission order
    pub fn list_complaints(&self) -> Result<Vec<Complaint>> {
        self.load(COMPLAINTS_KEY)
    }

    /// List complaints submitted by this customer email
    pub fn list_complaints_by_customer(&self, email: &str) -> Result<Vec<Complaint>> {
        let complaints: Vec<Complaint> = self.load(COMPLAINTS_KEY)?;
        Ok(complaints
            .into_iter()
            .filter(|c| c.customer_email == email)
            .collect())
    }

    /// List complaints assigned to this agent name
    pub fn list_complaints_by_agent(&self, agent_name: &str) -> Result<Vec<Complaint>> {
        let complaints: Vec<Complaint> = self.load(COMPLAINTS_KEY)?;
        Ok(complaints
            .into_iter()
            .filter(|c| c.is_assigned_to(agent_name))
            .collect())
    }

    /// Transform one complaint in place, leaving all others unchanged.
    ///
    /// Returns the updated record, or `ComplaintNotFound` without writing
    /// anything. If `f` fails nothing is written either.
    pub fn update_complaint<F>(&self, id: &str, f: F) -> Result<Complaint>
    where
        F: FnOnce(&mut Complaint) -> Result<()>,
    {
        self.modify(COMPLAINTS_KEY, |complaints: &mut Vec<Complaint>| {
            let complaint = complaints
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| Error::ComplaintNotFound(id.to_string()))?;
            f(complaint)?;
            Ok(complaint.clone())
        })
    }

    // ============================================
    // Whole-store operations
    // ============================================

    /// Replace both collections in one transaction.
    ///
    /// Rejects input where two accounts share an email (`DuplicateEmail`) or
    /// two complaints share an ID (`DuplicateComplaintId`); nothing is written
    /// in that case.
    pub fn replace_all(&self, accounts: &[Account], complaints: &[Complaint]) -> Result<()> {
        let mut emails = HashSet::new();
        if let Some(dup) = accounts.iter().find(|a| !emails.insert(a.email.as_str())) {
            return Err(Error::DuplicateEmail(dup.email.clone()));
        }
        let mut ids = HashSet::new();
        if let Some(dup) = complaints.iter().find(|c| !ids.insert(c.id.as_str())) {
            return Err(Error::DuplicateComplaintId(dup.id.clone()));
        }

        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Self::write_collection(&tx, ACCOUNTS_KEY, accounts)?;
        Self::write_collection(&tx, COMPLAINTS_KEY, complaints)?;
        tx.commit()?;

        tracing::info!(
            accounts = accounts.len(),
            complaints = complaints.len(),
            "Collections replaced"
        );
        Ok(())
    }

    /// Get the database file size in bytes
    pub fn get_database_size(&self) -> Result<u64> {
        let conn = self.lock();
        let page_count: i64 = conn.query_row("PRAGMA page_count", [], |r| r.get(0))?;
        let page_size: i64 = conn.query_row("PRAGMA page_size", [], |r| r.get(0))?;
        Ok((page_count * page_size).max(0) as u64)
    }

    /// Get size, schema version and collection sizes for the store overview.
    pub fn get_store_health(&self) -> Result<StoreHealth> {
        let database_size_bytes = self.get_database_size()?;
        let schema_version = {
            let conn = self.lock();
            super::schema::get_schema_version(&conn)?
        };
        let accounts: Vec<Account> = self.load(ACCOUNTS_KEY)?;
        let complaints: Vec<Complaint> = self.load(COMPLAINTS_KEY)?;

        Ok(StoreHealth {
            database_size_bytes,
            schema_version,
            account_count: accounts.len(),
            complaint_count: complaints.len(),
        })
    }
}

/// Overall store health.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreHealth {
    /// Database size in bytes
    pub database_size_bytes: u64,
    /// `PRAGMA user_version` of the open database
    pub schema_version: i32,
    /// Number of registered accounts
    pub account_count: usize,
    /// Number of stored complaints
    pub complaint_count: usize,
}

/// Generate `<prefix>` followed by six upper-case base-36 characters.
fn new_complaint_id(prefix: &str) -> String {
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(prefix.len() + COMPLAINT_ID_LEN);
    id.push_str(prefix);
    for _ in 0..COMPLAINT_ID_LEN {
        id.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn create_test_account(email: &str, role: Role) -> Account {
        Account {
            name: format!("User {}", email),
            email: email.to_string(),
            password: "pw".to_string(),
            mobile: "555".to_string(),
            role,
        }
    }

    fn create_test_complaint(db: &Database, customer_email: &str) -> Complaint {
        let customer = CurrentUser {
            name: "Alice".to_string(),
            email: customer_email.to_string(),
            role: Role::Customer,
        };
        db.create_complaint("CMP", |id| {
            Complaint::from_submission(
                id,
                NewComplaint {
                    title: "Broken item".to_string(),
                    description: "Arrived cracked".to_string(),
                    ..Default::default()
                },
                &customer,
                Utc::now(),
                "01/01/2025, 09:00 AM".to_string(),
            )
        })
        .unwrap()
    }

    #[test]
    fn test_empty_collections() {
        let db = test_db();
        assert!(db.list_accounts().unwrap().is_empty());
        assert!(db.list_complaints().unwrap().is_empty());
    }

    #[test]
    fn test_register_rejects_duplicate_email() {
        let db = test_db();
        db.register_account(create_test_account("a@x.com", Role::Customer))
            .unwrap();

        // Same email under a different role is still a duplicate
        let err = db
            .register_account(create_test_account("a@x.com", Role::Agent))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(ref e) if e == "a@x.com"));
        assert_eq!(db.list_accounts().unwrap().len(), 1);
    }

    #[test]
    fn test_find_account_requires_role_match() {
        let db = test_db();
        db.register_account(create_test_account("a@x.com", Role::Customer))
            .unwrap();

        assert!(db.find_account("a@x.com", Role::Customer).unwrap().is_some());
        assert!(db.find_account("a@x.com", Role::Admin).unwrap().is_none());
        assert!(db.find_account_by_email("a@x.com").unwrap().is_some());
    }

    #[test]
    fn test_list_by_role_keeps_insertion_order() {
        let db = test_db();
        db.register_account(create_test_account("b@x.com", Role::Agent))
            .unwrap();
        db.register_account(create_test_account("c@x.com", Role::Customer))
            .unwrap();
        db.register_account(create_test_account("a@x.com", Role::Agent))
            .unwrap();

        let agents = db.list_accounts_by_role(Role::Agent).unwrap();
        let emails: Vec<_> = agents.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(emails, vec!["b@x.com", "a@x.com"]);
    }

    #[test]
    fn test_create_complaint_generates_id() {
        let db = test_db();
        let first = create_test_complaint(&db, "a@x.com");
        let second = create_test_complaint(&db, "a@x.com");

        assert!(first.id.starts_with("CMP"));
        assert_eq!(first.id.len(), 9);
        assert_ne!(first.id, second.id);

        let stored = db.get_complaint(&first.id).unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[test]
    fn test_list_filters() {
        let db = test_db();
        let mine = create_test_complaint(&db, "a@x.com");
        create_test_complaint(&db, "other@x.com");

        db.update_complaint(&mine.id, |c| {
            c.assigned_agent = Some("Bob".to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(db.list_complaints().unwrap().len(), 2);
        assert_eq!(db.list_complaints_by_customer("a@x.com").unwrap().len(), 1);
        let bobs = db.list_complaints_by_agent("Bob").unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].id, mine.id);
        assert!(db.list_complaints_by_agent("Carol").unwrap().is_empty());
    }

    #[test]
    fn test_update_missing_complaint() {
        let db = test_db();
        let existing = create_test_complaint(&db, "a@x.com");

        let err = db
            .update_complaint("CMPNOPE00", |c| {
                c.status = ComplaintStatus::Closed;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, Error::ComplaintNotFound(ref id) if id == "CMPNOPE00"));

        let untouched = db.get_complaint(&existing.id).unwrap().unwrap();
        assert_eq!(untouched.status, ComplaintStatus::Pending);
    }

    #[test]
    fn test_failed_mutator_writes_nothing() {
        let db = test_db();
        let complaint = create_test_complaint(&db, "a@x.com");

        let result = db.update_complaint(&complaint.id, |c| {
            c.status = ComplaintStatus::Closed;
            Err(Error::EmptyMessage)
        });
        assert!(result.is_err());

        let stored = db.get_complaint(&complaint.id).unwrap().unwrap();
        assert_eq!(stored.status, ComplaintStatus::Pending);
    }

    #[test]
    fn test_update_leaves_others_unchanged() {
        let db = test_db();
        let a = create_test_complaint(&db, "a@x.com");
        let b = create_test_complaint(&db, "b@x.com");

        db.update_complaint(&a.id, |c| {
            c.status = ComplaintStatus::Resolved;
            Ok(())
        })
        .unwrap();

        let all = db.list_complaints().unwrap();
        assert_eq!(all[0].status, ComplaintStatus::Resolved);
        assert_eq!(all[1], b);
    }

    #[test]
    fn test_replace_all() {
        let db = test_db();
        create_test_complaint(&db, "a@x.com");

        let accounts = vec![create_test_account("z@x.com", Role::Admin)];
        db.replace_all(&accounts, &[]).unwrap();

        assert_eq!(db.list_accounts().unwrap(), accounts);
        assert!(db.list_complaints().unwrap().is_empty());
    }

    #[test]
    fn test_replace_all_rejects_duplicate_email() {
        let db = test_db();
        db.register_account(create_test_account("keep@x.com", Role::Admin))
            .unwrap();

        let accounts = vec![
            create_test_account("a@x.com", Role::Customer),
            create_test_account("a@x.com", Role::Agent),
        ];
        let err = db.replace_all(&accounts, &[]).unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(ref e) if e == "a@x.com"));

        let stored = db.list_accounts().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].email, "keep@x.com");
    }

    #[test]
    fn test_replace_all_rejects_duplicate_complaint_id() {
        let db = test_db();
        let complaint = create_test_complaint(&db, "a@x.com");

        let twice = vec![complaint.clone(), complaint.clone()];
        let err = db.replace_all(&[], &twice).unwrap_err();
        assert!(matches!(err, Error::DuplicateComplaintId(ref id) if *id == complaint.id));
        assert_eq!(db.list_complaints().unwrap(), vec![complaint]);
    }

    #[test]
    fn test_store_health() {
        let db = test_db();
        db.register_account(create_test_account("a@x.com", Role::Customer))
            .unwrap();
        create_test_complaint(&db, "a@x.com");
        create_test_complaint(&db, "a@x.com");

        let health = db.get_store_health().unwrap();
        assert_eq!(health.schema_version, crate::db::schema::SCHEMA_VERSION);
        assert_eq!(health.account_count, 1);
        assert_eq!(health.complaint_count, 2);
        assert!(health.database_size_bytes > 0);
    }

    #[test]
    fn test_complaint_id_format() {
        let id = new_complaint_id("CMP");
        assert_eq!(id.len(), 9);
        assert!(id[3..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
