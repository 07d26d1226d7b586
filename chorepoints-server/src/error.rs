use crate::storage::StorageError;
use chorepoints_shared::ParseEnumError;

/// Failure of a workflow operation. Whatever the variant, the unit of work
/// that produced it has been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("assignment {assignment_id} does not belong to child {child_id}")]
    NotOwner {
        assignment_id: String,
        child_id: String,
    },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{entity} {id} is {status}; operation not allowed")]
    InvalidState {
        entity: &'static str,
        id: String,
        status: String,
    },

    /// A concurrent operation moved the row first.
    #[error("{entity} {id} was changed concurrently")]
    StatusConflict { entity: &'static str, id: String },

    #[error("insufficient points: balance {balance}, required {required}")]
    InsufficientPoints { balance: i64, required: i64 },

    #[error("relationship already exists: parent {parent_id}, child {child_id}")]
    DuplicateRelationship { parent_id: String, child_id: String },

    #[error("user {parent_id} is already a parent of {child_id}")]
    AlreadyParent { parent_id: String, child_id: String },

    #[error("user {0} is not a parent")]
    UserNotParent(String),

    #[error("referential error: {0}")]
    Referential(String),

    /// Unknown, expired and used codes all map here.
    #[error("invalid invitation code")]
    InvalidInvitationCode,

    #[error("could not generate a unique invitation code after {attempts} attempts")]
    CodeGenerationFailed { attempts: u32 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal failure: {0}")]
    Internal(#[from] StorageError),
}

impl WorkflowError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub(crate) fn conflict(entity: &'static str, id: impl Into<String>) -> Self {
        Self::StatusConflict {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn invalid_state(
        entity: &'static str,
        id: impl Into<String>,
        status: impl ToString,
    ) -> Self {
        Self::InvalidState {
            entity,
            id: id.into(),
            status: status.to_string(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, WorkflowError::Internal(e) if e.is_unique_violation())
    }
}

impl From<diesel::result::Error> for WorkflowError {
    fn from(value: diesel::result::Error) -> Self {
        WorkflowError::Internal(StorageError::Database(value))
    }
}

impl From<ParseEnumError> for WorkflowError {
    fn from(value: ParseEnumError) -> Self {
        WorkflowError::Internal(StorageError::Corrupt(value))
    }
}
