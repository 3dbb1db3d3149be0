use async_trait::async_trait;
use query_core::{CountStrategy, Page, PageRequest, SortSpec};
use query_db::QueryError;
use sea_orm::DbErr;

use crate::contract::model::{
    Member, MemberSummary, MemberTeamRow, NewMember, SearchCondition, Team,
};

/// Sort keys every repository must accept, matched case-insensitively.
pub const SORTABLE_FIELDS: &[&str] = &["id", "username", "age", "team_id", "team_name"];

/// Result of a team move attempted by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamChange {
    Moved { from: Option<i64>, to: i64 },
    Unchanged,
    MemberMissing,
    TeamMissing,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait MembersRepository: Send + Sync {
    async fn insert_team(&self, name: String) -> Result<Team, DbErr>;
    async fn find_team(&self, id: i64) -> Result<Option<Team>, DbErr>;

    /// Insert a member; the id is assigned by the store.
    async fn insert_member(&self, new_member: NewMember) -> Result<Member, DbErr>;
    async fn find_member(&self, id: i64) -> Result<Option<Member>, DbErr>;
    async fn list_members(&self) -> Result<Vec<Member>, DbErr>;
    async fn find_members_by_username(&self, username: &str) -> Result<Vec<Member>, DbErr>;
    /// Members whose team is `team_id`, in id order.
    async fn members_of_team(&self, team_id: i64) -> Result<Vec<Member>, DbErr>;

    /// Re-point a member at `team_id` atomically.
    async fn change_team(&self, member_id: i64, team_id: i64) -> Result<TeamChange, DbErr>;

    /// Every matching joined row, ordered by `sort` then member id.
    async fn search(
        &self,
        condition: &SearchCondition,
        sort: &SortSpec,
    ) -> Result<Vec<MemberTeamRow>, QueryError>;

    /// One page of joined rows.
    async fn search_page(
        &self,
        condition: &SearchCondition,
        request: &PageRequest,
        strategy: CountStrategy,
    ) -> Result<Page<MemberTeamRow>, QueryError>;

    /// One page of member records filtered through the same join.
    async fn search_members_page(
        &self,
        condition: &SearchCondition,
        request: &PageRequest,
        strategy: CountStrategy,
    ) -> Result<Page<Member>, QueryError>;

    async fn search_summaries(
        &self,
        condition: &SearchCondition,
    ) -> Result<Vec<MemberSummary>, QueryError>;
}
