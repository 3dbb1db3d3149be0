//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait + TransactionTrait`, so it can be built on a
//! `DatabaseConnection` or on anything else that can open transactions.
//! Searches always run on `member LEFT JOIN team`; see [`super::filter`].

use async_trait::async_trait;
use query_core::{CountStrategy, Page, PageRequest, SortDir, SortSpec};
use query_db::{fetch_page, fetch_sorted, QueryError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use crate::contract::model::{
    Member, MemberSummary, MemberTeamRow, NewMember, SearchCondition, Team,
};
use crate::domain::repo::{MembersRepository, TeamChange};
use crate::infra::storage::entity::{member, team};
use crate::infra::storage::filter::{
    filtered_members, member_summaries, member_team_rows, sort_fields, MEMBER_ID_FIELD,
};

const TIEBREAKER: (&str, SortDir) = (MEMBER_ID_FIELD, SortDir::Asc);

#[derive(Debug, FromQueryResult)]
struct MemberTeamRecord {
    member_id: i64,
    username: Option<String>,
    age: i32,
    team_id: Option<i64>,
    team_name: Option<String>,
}

impl From<MemberTeamRecord> for MemberTeamRow {
    fn from(r: MemberTeamRecord) -> Self {
        Self {
            member_id: r.member_id,
            username: r.username,
            age: r.age,
            team_id: r.team_id,
            team_name: r.team_name,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct SummaryRecord {
    username: Option<String>,
    age: i32,
}

impl From<SummaryRecord> for MemberSummary {
    fn from(r: SummaryRecord) -> Self {
        Self {
            username: r.username,
            age: r.age,
        }
    }
}

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmMembersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmMembersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> MembersRepository for SeaOrmMembersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn insert_team(&self, name: String) -> Result<Team, DbErr> {
        let m = team::ActiveModel {
            name: Set(name),
            ..Default::default()
        };
        Ok(m.insert(&self.conn).await?.into())
    }

    async fn find_team(&self, id: i64) -> Result<Option<Team>, DbErr> {
        let found = team::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Into::into))
    }

    async fn insert_member(&self, new_member: NewMember) -> Result<Member, DbErr> {
        let m = member::ActiveModel {
            username: Set(new_member.username),
            age: Set(new_member.age),
            team_id: Set(new_member.team_id),
            ..Default::default()
        };
        Ok(m.insert(&self.conn).await?.into())
    }

    async fn find_member(&self, id: i64) -> Result<Option<Member>, DbErr> {
        let found = member::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Into::into))
    }

    async fn list_members(&self) -> Result<Vec<Member>, DbErr> {
        let rows = member::Entity::find()
            .order_by_asc(member::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_members_by_username(&self, username: &str) -> Result<Vec<Member>, DbErr> {
        let rows = member::Entity::find()
            .filter(member::Column::Username.eq(username))
            .order_by_asc(member::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn members_of_team(&self, team_id: i64) -> Result<Vec<Member>, DbErr> {
        let rows = member::Entity::find()
            .filter(member::Column::TeamId.eq(team_id))
            .order_by_asc(member::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn change_team(&self, member_id: i64, team_id: i64) -> Result<TeamChange, DbErr> {
        // Early returns drop the transaction, which rolls it back.
        let txn = self.conn.begin().await?;

        let Some(current) = member::Entity::find_by_id(member_id).one(&txn).await? else {
            return Ok(TeamChange::MemberMissing);
        };
        if current.team_id == Some(team_id) {
            return Ok(TeamChange::Unchanged);
        }
        if team::Entity::find_by_id(team_id).one(&txn).await?.is_none() {
            return Ok(TeamChange::TeamMissing);
        }

        let from = current.team_id;
        let mut am: member::ActiveModel = current.into();
        am.team_id = Set(Some(team_id));
        am.update(&txn).await?;
        txn.commit().await?;

        debug!(member_id, ?from, to = team_id, "team reassigned");
        Ok(TeamChange::Moved { from, to: team_id })
    }

    async fn search(
        &self,
        condition: &SearchCondition,
        sort: &SortSpec,
    ) -> Result<Vec<MemberTeamRow>, QueryError> {
        let rows: Vec<MemberTeamRecord> = fetch_sorted(
            member_team_rows(condition),
            &self.conn,
            sort,
            &sort_fields(),
            TIEBREAKER,
        )
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search_page(
        &self,
        condition: &SearchCondition,
        request: &PageRequest,
        strategy: CountStrategy,
    ) -> Result<Page<MemberTeamRow>, QueryError> {
        let page: Page<MemberTeamRecord> = fetch_page(
            member_team_rows(condition),
            filtered_members(condition),
            &self.conn,
            request,
            &sort_fields(),
            TIEBREAKER,
            strategy,
        )
        .await?;
        Ok(page.map_content(Into::into))
    }

    async fn search_members_page(
        &self,
        condition: &SearchCondition,
        request: &PageRequest,
        strategy: CountStrategy,
    ) -> Result<Page<Member>, QueryError> {
        let page: Page<member::Model> = fetch_page(
            filtered_members(condition),
            filtered_members(condition),
            &self.conn,
            request,
            &sort_fields(),
            TIEBREAKER,
            strategy,
        )
        .await?;
        Ok(page.map_content(Into::into))
    }

    async fn search_summaries(
        &self,
        condition: &SearchCondition,
    ) -> Result<Vec<MemberSummary>, QueryError> {
        let rows: Vec<SummaryRecord> = fetch_sorted(
            member_summaries(condition),
            &self.conn,
            &SortSpec::empty(),
            &sort_fields(),
            TIEBREAKER,
        )
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
