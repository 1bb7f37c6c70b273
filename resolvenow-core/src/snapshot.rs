//! Whole-store snapshots.
//!
//! A snapshot is the two collections side by side, keyed by their store
//! names:
//!
//! ```json
//! { "userAccounts": [ ... ], "complaints": [ ... ] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::Result;
use crate::types::{Account, Complaint};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "userAccounts", default)]
    pub user_accounts: Vec<Account>,
    #[serde(default)]
    pub complaints: Vec<Complaint>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Read both collections.
pub fn export(db: &Database) -> Result<Snapshot> {
    Ok(Snapshot {
        user_accounts: db.list_accounts()?,
        complaints: db.list_complaints()?,
    })
}

/// Replace both collections with the snapshot's contents.
///
/// A snapshot with a repeated email or complaint ID is rejected and the
/// store is left as it was.
pub fn import(db: &Database, snapshot: &Snapshot) -> Result<()> {
    db.replace_all(&snapshot.user_accounts, &snapshot.complaints)
}
