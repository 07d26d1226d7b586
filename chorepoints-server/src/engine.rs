use std::sync::Arc;

use crate::invitations::{CodeSource, InvitationPolicy, SecureCodeSource};
use crate::storage::Store;

/// Entry point for callers that have already authenticated an actor.
///
/// Cheap to clone; every operation opens its own unit of work on the shared
/// store, so clones may run operations concurrently.
#[derive(Clone)]
pub struct Engine {
    pub(crate) store: Store,
    pub(crate) policy: InvitationPolicy,
    pub(crate) codes: Arc<dyn CodeSource>,
}

impl Engine {
    pub fn new(store: Store, policy: InvitationPolicy) -> Self {
        let codes = Arc::new(SecureCodeSource::new(policy.code_length));
        Self {
            store,
            policy,
            codes,
        }
    }

    /// Replace the invitation code generator.
    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = codes;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn policy(&self) -> &InvitationPolicy {
        &self.policy
    }
}
