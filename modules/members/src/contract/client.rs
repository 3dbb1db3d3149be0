use async_trait::async_trait;
use query_core::{CountStrategy, Page, PageRequest, SortSpec};

use crate::contract::{
    error::MembersError,
    model::{
        Member, MemberSummary, MemberTeamRow, NewMember, SearchCondition, Team, TeamRoster,
    },
};

/// Public API trait for the members module that other modules can use
#[async_trait]
pub trait MembersApi: Send + Sync {
    /// All matching rows in primary-key order
    async fn search(&self, condition: SearchCondition) -> Result<Vec<MemberTeamRow>, MembersError>;

    /// One page of matching rows, total computed with the configured count strategy
    async fn search_page(
        &self,
        condition: SearchCondition,
        page_index: i64,
        page_size: i64,
        sort: SortSpec,
    ) -> Result<Page<MemberTeamRow>, MembersError>;

    /// One page of matching rows with an explicit count strategy
    async fn search_page_with(
        &self,
        condition: SearchCondition,
        request: PageRequest,
        strategy: CountStrategy,
    ) -> Result<Page<MemberTeamRow>, MembersError>;

    /// One page of matching member records
    async fn search_members_page(
        &self,
        condition: SearchCondition,
        request: PageRequest,
    ) -> Result<Page<Member>, MembersError>;

    async fn search_summaries(
        &self,
        condition: SearchCondition,
    ) -> Result<Vec<MemberSummary>, MembersError>;

    async fn create_team(&self, name: String) -> Result<Team, MembersError>;

    async fn create_member(&self, new_member: NewMember) -> Result<Member, MembersError>;

    async fn get_member(&self, id: i64) -> Result<Member, MembersError>;

    async fn list_members(&self) -> Result<Vec<Member>, MembersError>;

    async fn find_members_by_username(&self, username: String)
        -> Result<Vec<Member>, MembersError>;

    /// Move a member to another team; `None` leaves the member where it is
    async fn change_team(&self, member_id: i64, team_id: Option<i64>)
        -> Result<Member, MembersError>;

    async fn team_roster(&self, team_id: i64) -> Result<TeamRoster, MembersError>;
}
