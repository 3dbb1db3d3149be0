use async_trait::async_trait;
use query_core::{CountStrategy, Page, PageRequest, SortSpec};
use std::sync::Arc;

use crate::contract::{
    client::MembersApi,
    error::MembersError,
    model::{
        Member, MemberSummary, MemberTeamRow, NewMember, SearchCondition, Team, TeamRoster,
    },
};
use crate::domain::service::Service;

/// Local implementation of the MembersApi trait that delegates to the domain service
pub struct MembersLocalClient {
    service: Arc<Service>,
}

impl MembersLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MembersApi for MembersLocalClient {
    async fn search(&self, condition: SearchCondition) -> Result<Vec<MemberTeamRow>, MembersError> {
        self.service.search(condition).await.map_err(Into::into)
    }

    async fn search_page(
        &self,
        condition: SearchCondition,
        page_index: i64,
        page_size: i64,
        sort: SortSpec,
    ) -> Result<Page<MemberTeamRow>, MembersError> {
        self.service
            .search_page(condition, page_index, page_size, sort)
            .await
            .map_err(Into::into)
    }

    async fn search_page_with(
        &self,
        condition: SearchCondition,
        request: PageRequest,
        strategy: CountStrategy,
    ) -> Result<Page<MemberTeamRow>, MembersError> {
        self.service
            .search_page_with(condition, request, strategy)
            .await
            .map_err(Into::into)
    }

    async fn search_members_page(
        &self,
        condition: SearchCondition,
        request: PageRequest,
    ) -> Result<Page<Member>, MembersError> {
        self.service
            .search_members_page(condition, request)
            .await
            .map_err(Into::into)
    }

    async fn search_summaries(
        &self,
        condition: SearchCondition,
    ) -> Result<Vec<MemberSummary>, MembersError> {
        self.service
            .search_summaries(condition)
            .await
            .map_err(Into::into)
    }

    async fn create_team(&self, name: String) -> Result<Team, MembersError> {
        self.service.create_team(name).await.map_err(Into::into)
    }

    async fn create_member(&self, new_member: NewMember) -> Result<Member, MembersError> {
        self.service
            .create_member(new_member)
            .await
            .map_err(Into::into)
    }

    async fn get_member(&self, id: i64) -> Result<Member, MembersError> {
        self.service.get_member(id).await.map_err(Into::into)
    }

    async fn list_members(&self) -> Result<Vec<Member>, MembersError> {
        self.service.list_members().await.map_err(Into::into)
    }

    async fn find_members_by_username(
        &self,
        username: String,
    ) -> Result<Vec<Member>, MembersError> {
        self.service
            .find_members_by_username(username)
            .await
            .map_err(Into::into)
    }

    async fn change_team(
        &self,
        member_id: i64,
        team_id: Option<i64>,
    ) -> Result<Member, MembersError> {
        self.service
            .change_team(member_id, team_id)
            .await
            .map_err(Into::into)
    }

    async fn team_roster(&self, team_id: i64) -> Result<TeamRoster, MembersError> {
        self.service.team_roster(team_id).await.map_err(Into::into)
    }
}
