use diesel::dsl::sum;
use diesel::prelude::*;

use super::models::{LedgerEntry, NewLedgerEntry};
use super::schema::point_transactions::dsl as pt;

/// Append-only: this module has no update or delete.
pub fn append(conn: &mut SqliteConnection, entry: &NewLedgerEntry<'_>) -> QueryResult<()> {
    diesel::insert_into(pt::point_transactions)
        .values(entry)
        .execute(conn)?;
    Ok(())
}

pub fn balance(conn: &mut SqliteConnection, child: &str) -> QueryResult<i64> {
    let total: Option<i64> = pt::point_transactions
        .filter(pt::child_id.eq(child))
        .select(sum(pt::change_amount))
        .first(conn)?;
    Ok(total.unwrap_or(0))
}

pub fn entries_for_child(conn: &mut SqliteConnection, child: &str) -> QueryResult<Vec<LedgerEntry>> {
    pt::point_transactions
        .filter(pt::child_id.eq(child))
        .order(pt::id.desc())
        .select(LedgerEntry::as_select())
        .load(conn)
}
