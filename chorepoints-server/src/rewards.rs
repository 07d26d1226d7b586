//! Reward claims: `pending -> approved | rejected`.
//!
//! Points are reserved when the claim is made: the `redemption` entry is
//! written together with the claim row, and a rejection writes a matching
//! `refund`. Approval touches only the claim.

use chorepoints_shared::{ClaimStatus, Decision, LedgerKind, Role};
use tracing::{info, warn};
use uuid::Uuid;

use crate::directory;
use crate::engine::Engine;
use crate::error::WorkflowError;
use crate::ledger::{self, Cause};
use crate::storage::models::{NewRewardClaim, RewardClaim};
use crate::storage::{self, catalog, claims, users};

const ENTITY: &str = "claim";

impl Engine {
    /// Redeem `reward` for `child`, deducting its required points right away.
    pub async fn claim_reward(&self, child: &str, reward: &str) -> Result<String, WorkflowError> {
        let (c, r) = (child.to_string(), reward.to_string());
        let (id, deducted) = self
            .store
            .write(move |conn| -> Result<_, WorkflowError> {
                let def = catalog::find_reward(conn, &r)?
                    .ok_or_else(|| WorkflowError::not_found("reward definition", r.as_str()))?;
                let claimant = users::find(conn, &c)?
                    .ok_or_else(|| WorkflowError::not_found("child", c.as_str()))?;
                if claimant.role()? != Role::Child {
                    return Err(WorkflowError::forbidden(format!(
                        "{c} is not a child account"
                    )));
                }
                let parents = directory::parent_ids_of_child(conn, &c)?;
                if !parents.contains(&def.parent_id) {
                    return Err(WorkflowError::forbidden(format!(
                        "reward {r} was not created by a parent of {c}"
                    )));
                }
                let balance = ledger::balance(conn, &c)?;
                let required = i64::from(def.required_points);
                if balance < required {
                    return Err(WorkflowError::InsufficientPoints { balance, required });
                }
                let id = Uuid::new_v4().to_string();
                claims::insert(
                    conn,
                    &NewRewardClaim {
                        id: &id,
                        child_id: &c,
                        reward_id: &r,
                        points_deducted: def.required_points,
                        status: ClaimStatus::Pending.as_str(),
                        claimed_at: storage::now(),
                    },
                )?;
                if def.required_points > 0 {
                    ledger::post(
                        conn,
                        &c,
                        -def.required_points,
                        LedgerKind::Redemption,
                        Cause::Claim(&id),
                        &c,
                        Some(&def.name),
                    )?;
                }
                Ok((id, def.required_points))
            })
            .await
            .inspect_err(|e| {
                warn!(child_id = %child, reward_id = %reward, error = %e, "claim_reward rejected")
            })?;
        info!(claim_id = %id, child_id = %child, reward_id = %reward, deducted, "reward claimed");
        Ok(id)
    }

    /// Approve or reject a pending claim. The reviewer must own the reward or
    /// share a child with its owner.
    pub async fn review_claim(
        &self,
        parent: &str,
        claim: &str,
        decision: Decision,
    ) -> Result<(), WorkflowError> {
        let (p, id) = (parent.to_string(), claim.to_string());
        let refunded = self
            .store
            .write(move |conn| -> Result<_, WorkflowError> {
                let (row, owner) = claims::load_for_update(conn, &id)?
                    .ok_or_else(|| WorkflowError::not_found(ENTITY, id.as_str()))?;
                let status = row.status()?;
                let Some(next) = status.next(decision) else {
                    return Err(WorkflowError::invalid_state(ENTITY, id, status));
                };
                if p != owner && !directory::has_shared_child(conn, &p, &owner)? {
                    return Err(WorkflowError::forbidden(format!(
                        "{p} may not review rewards of {owner}"
                    )));
                }
                if !claims::mark_reviewed(conn, &id, next, &p, storage::now())?.is_applied() {
                    return Err(WorkflowError::conflict(ENTITY, id));
                }
                if next == ClaimStatus::Rejected && row.points_deducted > 0 {
                    ledger::post(
                        conn,
                        &row.child_id,
                        row.points_deducted,
                        LedgerKind::Refund,
                        Cause::Claim(&id),
                        &p,
                        None,
                    )?;
                    return Ok(row.points_deducted);
                }
                Ok(0)
            })
            .await
            .inspect_err(|e| {
                warn!(parent_id = %parent, claim_id = %claim, error = %e, "review_claim rejected")
            })?;
        info!(
            parent_id = %parent,
            claim_id = %claim,
            decision = %decision,
            refunded,
            "claim reviewed"
        );
        Ok(())
    }

    pub async fn claim(&self, id: &str) -> Result<Option<RewardClaim>, WorkflowError> {
        let id = id.to_string();
        self.store
            .read(move |conn| -> Result<_, WorkflowError> { Ok(claims::find(conn, &id)?) })
            .await
    }

    pub async fn claims_for_child(&self, child: &str) -> Result<Vec<RewardClaim>, WorkflowError> {
        let child = child.to_string();
        self.store
            .read(move |conn| -> Result<_, WorkflowError> {
                Ok(claims::list_for_child(conn, &child)?)
            })
            .await
    }
}
