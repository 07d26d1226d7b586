pub mod auth;
pub mod domain;

pub use auth::Role;
pub use domain::{ClaimStatus, CodeStatus, Decision, LedgerKind, ParseEnumError, TaskEvent, TaskStatus};
