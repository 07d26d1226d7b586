//! Single-use, time-boxed codes that link a second parent to a child.

use chrono::TimeDelta;
use rand::Rng;
use rand::rngs::OsRng;
use tracing::{info, warn};

use crate::config::{ConfigError, InvitationConfig, MAX_VALIDITY_DAYS};
use crate::directory;
use crate::engine::Engine;
use crate::error::WorkflowError;
use crate::storage::models::{InvitationCode, NewInvitationCode};
use crate::storage::{self, invitations};
use chorepoints_shared::CodeStatus;

/// Upper-case letters and digits minus the look-alikes `0 O 1 I`.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Produces candidate invitation codes.
pub trait CodeSource: Send + Sync {
    fn next_code(&self) -> String;
}

/// Draws codes from the operating system CSPRNG.
#[derive(Debug, Clone)]
pub struct SecureCodeSource {
    length: usize,
}

impl SecureCodeSource {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl CodeSource for SecureCodeSource {
    fn next_code(&self) -> String {
        let mut rng = OsRng;
        (0..self.length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct InvitationPolicy {
    pub validity: TimeDelta,
    pub code_length: usize,
    pub max_attempts: u32,
}

impl Default for InvitationPolicy {
    fn default() -> Self {
        Self {
            validity: TimeDelta::days(7),
            code_length: 8,
            max_attempts: 5,
        }
    }
}

impl TryFrom<&InvitationConfig> for InvitationPolicy {
    type Error = ConfigError;

    fn try_from(cfg: &InvitationConfig) -> Result<Self, ConfigError> {
        let validity = Some(cfg.validity_days)
            .filter(|d| (1..=MAX_VALIDITY_DAYS).contains(d))
            .and_then(TimeDelta::try_days)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "invitations.validity_days {} is out of range",
                    cfg.validity_days
                ))
            })?;
        Ok(Self {
            validity,
            code_length: cfg.code_length,
            max_attempts: cfg.max_attempts,
        })
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

impl Engine {
    /// Issue a code that lets another parent join `child`.
    ///
    /// A collision with an existing code is retried with a fresh candidate up
    /// to `max_attempts` times; any other failure is returned immediately.
    pub async fn generate_invitation_code(
        &self,
        parent: &str,
        child: &str,
    ) -> Result<String, WorkflowError> {
        let attempts = self.policy.max_attempts.max(1);
        for attempt in 1..=attempts {
            let code = normalize(&self.codes.next_code());
            let (p, c, candidate) = (parent.to_string(), child.to_string(), code.clone());
            let validity = self.policy.validity;
            let res = self
                .store
                .write(move |conn| -> Result<_, WorkflowError> {
                    if !directory::is_parent_of(conn, &p, &c)? {
                        return Err(WorkflowError::forbidden(format!(
                            "{p} is not a parent of {c}"
                        )));
                    }
                    let now = storage::now();
                    let expires_at = now.checked_add_signed(validity).ok_or_else(|| {
                        WorkflowError::InvalidInput("invitation validity out of range".into())
                    })?;
                    invitations::insert(
                        conn,
                        &NewInvitationCode {
                            code: &candidate,
                            child_id: &c,
                            created_by: &p,
                            status: CodeStatus::Active.as_str(),
                            expires_at,
                            created_at: now,
                        },
                    )?;
                    Ok(())
                })
                .await;
            match res {
                Ok(()) => {
                    info!(parent_id = %parent, child_id = %child, attempt, "invitation code issued");
                    return Ok(code);
                }
                Err(e) if e.is_unique_violation() => {
                    warn!(parent_id = %parent, child_id = %child, attempt, "invitation code collision; retrying");
                }
                Err(e) => {
                    warn!(parent_id = %parent, child_id = %child, error = %e, "generate_invitation_code rejected");
                    return Err(e);
                }
            }
        }
        warn!(parent_id = %parent, child_id = %child, attempts, "invitation code retries exhausted");
        Err(WorkflowError::CodeGenerationFailed { attempts })
    }

    /// Link `parent` to the child behind `code` and burn the code.
    pub async fn accept_invitation(&self, parent: &str, code: &str) -> Result<(), WorkflowError> {
        let (p, code) = (parent.to_string(), normalize(code));
        let child = self
            .store
            .write(move |conn| -> Result<_, WorkflowError> {
                let now = storage::now();
                let invite = invitations::find_redeemable(conn, &code, now)?
                    .ok_or(WorkflowError::InvalidInvitationCode)?;
                let next = invite
                    .status()?
                    .next()
                    .ok_or(WorkflowError::InvalidInvitationCode)?;
                directory::require_parent(conn, &p)?;
                let already = || WorkflowError::AlreadyParent {
                    parent_id: p.clone(),
                    child_id: invite.child_id.clone(),
                };
                if invite.created_by == p || directory::is_parent_of(conn, &p, &invite.child_id)? {
                    return Err(already());
                }
                match directory::add_relationship(conn, &p, &invite.child_id) {
                    Ok(()) => {}
                    Err(WorkflowError::DuplicateRelationship { .. }) => return Err(already()),
                    Err(e) => return Err(e),
                }
                if !invitations::mark_used(conn, &code, next, &p, now)?.is_applied() {
                    return Err(WorkflowError::InvalidInvitationCode);
                }
                Ok(invite.child_id)
            })
            .await
            .inspect_err(|e| warn!(parent_id = %parent, error = %e, "accept_invitation rejected"))?;
        info!(parent_id = %parent, child_id = %child, "invitation accepted");
        Ok(())
    }

    pub async fn invitation(&self, code: &str) -> Result<Option<InvitationCode>, WorkflowError> {
        let code = normalize(code);
        self.store
            .read(move |conn| -> Result<_, WorkflowError> { Ok(invitations::find(conn, &code)?) })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_codes_use_the_unambiguous_alphabet() {
        let source = SecureCodeSource::new(8);
        for _ in 0..200 {
            let code = source.next_code();
            assert_eq!(code.len(), 8);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)), "{code}");
            assert!(!code.contains(['0', 'O', '1', 'I']));
        }
    }

    #[test]
    fn policy_follows_config() {
        let policy = InvitationPolicy::try_from(&InvitationConfig {
            validity_days: 3,
            code_length: 10,
            max_attempts: 2,
        })
        .unwrap();
        assert_eq!(policy.validity, TimeDelta::days(3));
        assert_eq!(policy.code_length, 10);
        assert_eq!(policy.max_attempts, 2);
    }

    #[test]
    fn default_policy_matches_default_config() {
        let policy = InvitationPolicy::try_from(&InvitationConfig::default()).unwrap();
        let default = InvitationPolicy::default();
        assert_eq!(policy.validity, default.validity);
        assert_eq!(policy.code_length, default.code_length);
        assert_eq!(policy.max_attempts, default.max_attempts);
    }

    #[test]
    fn huge_validity_is_an_error_not_a_panic() {
        let err = InvitationPolicy::try_from(&InvitationConfig {
            validity_days: 200_000_000_000_000,
            ..InvitationConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");
    }

    #[test]
    fn codes_are_normalized_before_lookup() {
        assert_eq!(normalize("  abcd2345 "), "ABCD2345");
    }
}
