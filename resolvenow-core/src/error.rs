//! Error types for resolvenow-core

use thiserror::Error;

/// Main error type for the resolvenow-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No account matches the email and role
    #[error("no account exists with these credentials; please sign up first")]
    AccountNotFound,

    /// Account exists but the password does not match
    #[error("the password you entered is incorrect")]
    InvalidPassword,

    /// Sign-up with an email that is already registered
    #[error("an account with email {0} already exists; please login instead")]
    DuplicateEmail(String),

    /// Two complaints in one collection share an ID
    #[error("duplicate complaint ID: {0}")]
    DuplicateComplaintId(String),

    /// Complaint not found
    #[error("complaint not found: {0}")]
    ComplaintNotFound(String),

    /// Assignment target is not a registered agent
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    /// Complaint already has an agent
    #[error("complaint {id} is already assigned to {agent}")]
    AlreadyAssigned { id: String, agent: String },

    /// Caller may not act on this complaint
    #[error("{who} may not modify complaint {id}")]
    NotPermitted { who: String, id: String },

    /// Message body is blank
    #[error("message must not be empty")]
    EmptyMessage,

    /// Required form field left blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Unknown enum value in user input
    #[error("invalid {kind}: {value}")]
    InvalidValue { kind: &'static str, value: String },
}

impl Error {
    /// Short title for notices shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            Error::AccountNotFound => "Account Not Found",
            Error::InvalidPassword => "Invalid Password",
            Error::DuplicateEmail(_) => "Account Already Exists",
            Error::DuplicateComplaintId(_) => "Duplicate Complaint",
            Error::ComplaintNotFound(_) => "Complaint Not Found",
            Error::AgentNotFound(_) => "Agent Not Found",
            Error::AlreadyAssigned { .. } => "Already Assigned",
            Error::NotPermitted { .. } => "Not Permitted",
            Error::EmptyMessage => "Empty Message",
            Error::MissingField(_) | Error::InvalidValue { .. } => "Invalid Input",
            Error::Database(_) | Error::Io(_) | Error::Json(_) | Error::Config(_) => "Error",
        }
    }
}

/// Result type alias for resolvenow-core
pub type Result<T> = std::result::Result<T, Error>;
