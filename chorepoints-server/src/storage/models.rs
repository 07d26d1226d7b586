use crate::storage::schema::{
    invitation_codes, point_transactions, relationships, reward_claims, reward_definitions,
    task_assignments, task_definitions, users,
};
use chorepoints_shared::{ClaimStatus, CodeStatus, LedgerKind, ParseEnumError, Role, TaskStatus};
use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn role(&self) -> Result<Role, ParseEnumError> {
        self.role.parse()
    }
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = relationships)]
pub struct NewRelationship<'a> {
    pub parent_id: &'a str,
    pub child_id: &'a str,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = task_definitions)]
pub struct TaskDefinition {
    pub id: String,
    pub name: String,
    pub points: i32,
    pub parent_id: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = task_definitions)]
pub struct NewTaskDefinition<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub points: i32,
    pub parent_id: &'a str,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = task_assignments)]
#[diesel(belongs_to(TaskDefinition, foreign_key = task_id))]
pub struct TaskAssignment {
    pub id: String,
    pub child_id: String,
    pub task_id: String,
    pub assigned_by: String,
    pub status: String,
    pub assigned_at: NaiveDateTime,
    pub submitted_at: Option<NaiveDateTime>,
    pub verified_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub verified_by: Option<String>,
}

impl TaskAssignment {
    pub fn status(&self) -> Result<TaskStatus, ParseEnumError> {
        self.status.parse()
    }
}

#[derive(Insertable)]
#[diesel(table_name = task_assignments)]
pub struct NewTaskAssignment<'a> {
    pub id: &'a str,
    pub child_id: &'a str,
    pub task_id: &'a str,
    pub assigned_by: &'a str,
    pub status: &'a str,
    pub assigned_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = reward_definitions)]
pub struct RewardDefinition {
    pub id: String,
    pub name: String,
    pub required_points: i32,
    pub parent_id: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = reward_definitions)]
pub struct NewRewardDefinition<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub required_points: i32,
    pub parent_id: &'a str,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = reward_claims)]
#[diesel(belongs_to(RewardDefinition, foreign_key = reward_id))]
pub struct RewardClaim {
    pub id: String,
    pub child_id: String,
    pub reward_id: String,
    pub points_deducted: i32,
    pub status: String,
    pub claimed_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
    pub reviewed_by: Option<String>,
}

impl RewardClaim {
    pub fn status(&self) -> Result<ClaimStatus, ParseEnumError> {
        self.status.parse()
    }
}

#[derive(Insertable)]
#[diesel(table_name = reward_claims)]
pub struct NewRewardClaim<'a> {
    pub id: &'a str,
    pub child_id: &'a str,
    pub reward_id: &'a str,
    pub points_deducted: i32,
    pub status: &'a str,
    pub claimed_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = point_transactions)]
pub struct LedgerEntry {
    pub id: i32,
    pub child_id: String,
    pub change_amount: i32,
    pub kind: String,
    pub task_assignment_id: Option<String>,
    pub reward_claim_id: Option<String>,
    pub created_by: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

impl LedgerEntry {
    pub fn kind(&self) -> Result<LedgerKind, ParseEnumError> {
        self.kind.parse()
    }
}

#[derive(Insertable)]
#[diesel(table_name = point_transactions)]
pub struct NewLedgerEntry<'a> {
    pub child_id: &'a str,
    pub change_amount: i32,
    pub kind: &'a str,
    pub task_assignment_id: Option<&'a str>,
    pub reward_claim_id: Option<&'a str>,
    pub created_by: &'a str,
    pub note: Option<&'a str>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = invitation_codes)]
#[diesel(primary_key(code))]
pub struct InvitationCode {
    pub code: String,
    pub child_id: String,
    pub created_by: String,
    pub status: String,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub used_by: Option<String>,
    pub used_at: Option<NaiveDateTime>,
}

impl InvitationCode {
    pub fn status(&self) -> Result<CodeStatus, ParseEnumError> {
        self.status.parse()
    }
}

#[derive(Insertable)]
#[diesel(table_name = invitation_codes)]
pub struct NewInvitationCode<'a> {
    pub code: &'a str,
    pub child_id: &'a str,
    pub created_by: &'a str,
    pub status: &'a str,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}
