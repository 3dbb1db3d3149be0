use std::sync::Arc;

use query_core::{CountStrategy, Page, PageRequest, SortSpec};
use tracing::{debug, info, instrument};

use crate::contract::model::{
    Member, MemberSummary, MemberTeamRow, NewMember, SearchCondition, Team, TeamRoster,
};
use crate::domain::error::DomainError;
use crate::domain::repo::{MembersRepository, TeamChange, SORTABLE_FIELDS};

/// Domain service for member search and team membership.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn MembersRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub count_strategy: CountStrategy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 1000,
            count_strategy: CountStrategy::Separate,
        }
    }
}

impl Service {
    pub fn new(repo: Arc<dyn MembersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Validate caller paging input; a missing size falls back to the configured default.
    pub fn page_request(
        &self,
        page_index: i64,
        page_size: Option<i64>,
        sort: SortSpec,
    ) -> Result<PageRequest, DomainError> {
        let page_size = page_size.unwrap_or(self.config.default_page_size as i64);
        let request = PageRequest::new(page_index, page_size)?
            .check_max_size(self.config.max_page_size)?
            .with_sort(sort);
        Ok(request)
    }

    /// Checks paging limits and sort keys so bad input never reaches the store.
    fn check_request(&self, request: PageRequest) -> Result<PageRequest, DomainError> {
        let request = request.check_max_size(self.config.max_page_size)?;
        if let Some(key) = request
            .sort()
            .keys()
            .iter()
            .find(|k| !SORTABLE_FIELDS.iter().any(|f| f.eq_ignore_ascii_case(&k.field)))
        {
            return Err(DomainError::UnknownSortField {
                field: key.field.clone(),
            });
        }
        Ok(request)
    }

    #[instrument(name = "members.service.search", skip(self))]
    pub async fn search(&self, condition: SearchCondition) -> Result<Vec<MemberTeamRow>, DomainError> {
        let rows = self.repo.search(&condition, &SortSpec::empty()).await?;
        debug!(rows = rows.len(), "search finished");
        Ok(rows)
    }

    #[instrument(name = "members.service.search_page", skip(self, sort))]
    pub async fn search_page(
        &self,
        condition: SearchCondition,
        page_index: i64,
        page_size: i64,
        sort: SortSpec,
    ) -> Result<Page<MemberTeamRow>, DomainError> {
        let request = self.page_request(page_index, Some(page_size), sort)?;
        self.search_page_with(condition, request, self.config.count_strategy)
            .await
    }

    #[instrument(
        name = "members.service.search_page_with",
        skip(self, condition, request),
        fields(
            page_index = request.page_index(),
            page_size = request.page_size(),
            sort = %request.sort().to_signed_tokens()
        )
    )]
    pub async fn search_page_with(
        &self,
        condition: SearchCondition,
        request: PageRequest,
        strategy: CountStrategy,
    ) -> Result<Page<MemberTeamRow>, DomainError> {
        let request = self.check_request(request)?;
        let page = self.repo.search_page(&condition, &request, strategy).await?;
        debug!(
            rows = page.content.len(),
            total = page.total,
            "page assembled"
        );
        Ok(page)
    }

    #[instrument(name = "members.service.search_members_page", skip(self, request))]
    pub async fn search_members_page(
        &self,
        condition: SearchCondition,
        request: PageRequest,
    ) -> Result<Page<Member>, DomainError> {
        let request = self.check_request(request)?;
        let page = self
            .repo
            .search_members_page(&condition, &request, self.config.count_strategy)
            .await?;
        Ok(page)
    }

    #[instrument(name = "members.service.search_summaries", skip(self))]
    pub async fn search_summaries(
        &self,
        condition: SearchCondition,
    ) -> Result<Vec<MemberSummary>, DomainError> {
        Ok(self.repo.search_summaries(&condition).await?)
    }

    #[instrument(name = "members.service.create_team", skip(self))]
    pub async fn create_team(&self, name: String) -> Result<Team, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name", "team name cannot be empty"));
        }
        let team = self.repo.insert_team(name).await?;
        info!(team_id = team.id, "team created");
        Ok(team)
    }

    #[instrument(name = "members.service.create_member", skip(self))]
    pub async fn create_member(&self, new_member: NewMember) -> Result<Member, DomainError> {
        if let Some(team_id) = new_member.team_id {
            self.repo
                .find_team(team_id)
                .await?
                .ok_or_else(|| DomainError::team_not_found(team_id))?;
        }
        let member = self.repo.insert_member(new_member).await?;
        info!(member_id = member.id, "member created");
        Ok(member)
    }

    #[instrument(name = "members.service.get_member", skip(self))]
    pub async fn get_member(&self, id: i64) -> Result<Member, DomainError> {
        self.repo
            .find_member(id)
            .await?
            .ok_or_else(|| DomainError::member_not_found(id))
    }

    #[instrument(name = "members.service.list_members", skip(self))]
    pub async fn list_members(&self) -> Result<Vec<Member>, DomainError> {
        Ok(self.repo.list_members().await?)
    }

    #[instrument(name = "members.service.find_members_by_username", skip(self))]
    pub async fn find_members_by_username(
        &self,
        username: String,
    ) -> Result<Vec<Member>, DomainError> {
        Ok(self.repo.find_members_by_username(&username).await?)
    }

    /// Move a member to `team_id`. `None` and the current team are no-ops.
    #[instrument(name = "members.service.change_team", skip(self))]
    pub async fn change_team(
        &self,
        member_id: i64,
        team_id: Option<i64>,
    ) -> Result<Member, DomainError> {
        let Some(team_id) = team_id else {
            debug!("no target team; membership left unchanged");
            return self.get_member(member_id).await;
        };

        match self.repo.change_team(member_id, team_id).await? {
            TeamChange::MemberMissing => return Err(DomainError::member_not_found(member_id)),
            TeamChange::TeamMissing => return Err(DomainError::team_not_found(team_id)),
            TeamChange::Unchanged => debug!("member already in team"),
            TeamChange::Moved { from, to } => info!(?from, to, "member changed team"),
        }
        self.get_member(member_id).await
    }

    #[instrument(name = "members.service.team_roster", skip(self))]
    pub async fn team_roster(&self, team_id: i64) -> Result<TeamRoster, DomainError> {
        let team = self
            .repo
            .find_team(team_id)
            .await?
            .ok_or_else(|| DomainError::team_not_found(team_id))?;
        let members = self.repo.members_of_team(team_id).await?;
        Ok(TeamRoster { team, members })
    }
}
