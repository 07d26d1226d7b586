use chorepoints_shared::CodeStatus;
use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::CasOutcome;
use super::models::{InvitationCode, NewInvitationCode};
use super::schema::invitation_codes::dsl as ic;

/// Fails with a unique violation when `row.code` is already taken.
pub fn insert(conn: &mut SqliteConnection, row: &NewInvitationCode<'_>) -> QueryResult<()> {
    diesel::insert_into(ic::invitation_codes)
        .values(row)
        .execute(conn)?;
    Ok(())
}

/// An active code whose expiry lies after `now`. Unknown, used and expired
/// codes all come back as `None`.
pub fn find_redeemable(
    conn: &mut SqliteConnection,
    code: &str,
    now: NaiveDateTime,
) -> QueryResult<Option<InvitationCode>> {
    ic::invitation_codes
        .filter(ic::code.eq(code))
        .filter(ic::status.eq(CodeStatus::Active.as_str()))
        .filter(ic::expires_at.gt(now))
        .select(InvitationCode::as_select())
        .first(conn)
        .optional()
}

pub fn find(conn: &mut SqliteConnection, code: &str) -> QueryResult<Option<InvitationCode>> {
    ic::invitation_codes
        .filter(ic::code.eq(code))
        .select(InvitationCode::as_select())
        .first(conn)
        .optional()
}

/// Move an active code to `to`, recording who redeemed it.
pub fn mark_used(
    conn: &mut SqliteConnection,
    code: &str,
    to: CodeStatus,
    used_by: &str,
    at: NaiveDateTime,
) -> QueryResult<CasOutcome> {
    let rows = diesel::update(
        ic::invitation_codes
            .filter(ic::code.eq(code))
            .filter(ic::status.eq(CodeStatus::Active.as_str())),
    )
    .set((
        ic::status.eq(to.as_str()),
        ic::used_by.eq(Some(used_by)),
        ic::used_at.eq(Some(at)),
    ))
    .execute(conn)?;
    Ok(CasOutcome::from_affected(rows))
}
