use thiserror::Error;

/// Hierarchy- and uniqueness-integrity violations.
///
/// Each variant is a stable machine-checkable kind; callers map these to
/// presentation however they like.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    #[error("employee number already exists")]
    DuplicateEmployeeNumber,

    #[error("email already exists")]
    DuplicateEmail,

    #[error("employee cannot be their own manager")]
    SelfManagement,

    #[error("assignment would create a reporting cycle")]
    CycleDetected,

    #[error("manager not found")]
    ManagerNotFound,

    #[error("cannot delete employee with subordinates; reassign them first")]
    HasSubordinates,

    #[error("concurrent modification detected; retry the request")]
    ConcurrentUpdate,

    #[error("reporting hierarchy is malformed")]
    MalformedHierarchy,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    /// Covers bad credentials, inactive accounts and invalid or expired
    /// tokens alike. Deliberately carries no detail so the error cannot be
    /// used to enumerate accounts.
    #[error("Invalid credentials or token")]
    AuthenticationFailure,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the error is a rule rejection the caller can fix, as
    /// opposed to an infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

/// Result type alias for application
pub type AppResult<T> = Result<T, AppError>;

/// Helper trait for converting Option to AppError::NotFound
pub trait OptionExt<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(msg.into()))
    }
}

/// Helper to convert anyhow errors to AppError
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {err}"))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AppError::AuthenticationFailure
    }
}
