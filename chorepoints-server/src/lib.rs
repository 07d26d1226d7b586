pub mod catalog;
pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod invitations;
pub mod ledger;
pub mod rewards;
pub mod storage;
pub mod tasks;

pub use engine::Engine;
pub use error::WorkflowError;
pub use invitations::{CodeSource, InvitationPolicy, SecureCodeSource};
