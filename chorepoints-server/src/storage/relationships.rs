//! Raw queries over the `relationships` table. The directory contract with
//! its typed failures lives in [`crate::directory`].

use diesel::prelude::*;

use super::models::NewRelationship;
use super::schema::relationships::dsl as r;

pub fn exists(conn: &mut SqliteConnection, parent: &str, child: &str) -> QueryResult<bool> {
    let count: i64 = r::relationships
        .filter(r::parent_id.eq(parent))
        .filter(r::child_id.eq(child))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub fn parent_ids(conn: &mut SqliteConnection, child: &str) -> QueryResult<Vec<String>> {
    r::relationships
        .filter(r::child_id.eq(child))
        .order((r::created_at.asc(), r::parent_id.asc()))
        .select(r::parent_id)
        .load(conn)
}

pub fn child_ids(conn: &mut SqliteConnection, parent: &str) -> QueryResult<Vec<String>> {
    r::relationships
        .filter(r::parent_id.eq(parent))
        .order((r::created_at.asc(), r::child_id.asc()))
        .select(r::child_id)
        .load(conn)
}

pub fn any_shared_child(conn: &mut SqliteConnection, a: &str, b: &str) -> QueryResult<bool> {
    let children_of_b = child_ids(conn, b)?;
    if children_of_b.is_empty() {
        return Ok(false);
    }
    let count: i64 = r::relationships
        .filter(r::parent_id.eq(a))
        .filter(r::child_id.eq_any(children_of_b))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub fn insert(conn: &mut SqliteConnection, parent: &str, child: &str) -> QueryResult<()> {
    diesel::insert_into(r::relationships)
        .values(&NewRelationship {
            parent_id: parent,
            child_id: child,
        })
        .execute(conn)?;
    Ok(())
}
