use chorepoints_shared::ClaimStatus;
use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::CasOutcome;
use super::models::{NewRewardClaim, RewardClaim};
use super::schema::{reward_claims, reward_definitions};

pub fn insert(conn: &mut SqliteConnection, row: &NewRewardClaim<'_>) -> QueryResult<()> {
    diesel::insert_into(reward_claims::table)
        .values(row)
        .execute(conn)?;
    Ok(())
}

pub fn find(conn: &mut SqliteConnection, id: &str) -> QueryResult<Option<RewardClaim>> {
    reward_claims::table
        .filter(reward_claims::id.eq(id))
        .select(RewardClaim::as_select())
        .first(conn)
        .optional()
}

/// Claim together with the owning parent of its reward definition.
/// Call inside `Store::write`.
pub fn load_for_update(
    conn: &mut SqliteConnection,
    id: &str,
) -> QueryResult<Option<(RewardClaim, String)>> {
    reward_claims::table
        .inner_join(reward_definitions::table)
        .filter(reward_claims::id.eq(id))
        .select((RewardClaim::as_select(), reward_definitions::parent_id))
        .first(conn)
        .optional()
}

pub fn list_for_child(conn: &mut SqliteConnection, child: &str) -> QueryResult<Vec<RewardClaim>> {
    reward_claims::table
        .filter(reward_claims::child_id.eq(child))
        .order(reward_claims::claimed_at.desc())
        .select(RewardClaim::as_select())
        .load(conn)
}

pub fn mark_reviewed(
    conn: &mut SqliteConnection,
    id: &str,
    to: ClaimStatus,
    reviewer: &str,
    at: NaiveDateTime,
) -> QueryResult<CasOutcome> {
    let rows = diesel::update(
        reward_claims::table
            .filter(reward_claims::id.eq(id))
            .filter(reward_claims::status.eq(ClaimStatus::Pending.as_str())),
    )
    .set((
        reward_claims::status.eq(to.as_str()),
        reward_claims::reviewed_by.eq(Some(reviewer)),
        reward_claims::reviewed_at.eq(Some(at)),
    ))
    .execute(conn)?;
    Ok(CasOutcome::from_affected(rows))
}
