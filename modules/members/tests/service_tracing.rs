//! Service-layer spans and the lazy count, checked against an in-memory mock repository

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use members::contract::model::{
    Member, MemberSummary, MemberTeamRow, NewMember, SearchCondition, Team,
};
use members::domain::predicate::{compose, matches_all};
use members::domain::repo::{MembersRepository, TeamChange};
use members::domain::error::DomainError;
use members::domain::service::{Service, ServiceConfig};
use query_core::{assemble_page, CountStrategy, Page, PageRequest, SortSpec};
use query_db::QueryError;
use sea_orm::DbErr;
use tracing_test::traced_test;

// Mock repository for testing
struct MockMembersRepository {
    rows: Vec<MemberTeamRow>,
    search_calls: AtomicUsize,
    count_calls: AtomicUsize,
}

impl MockMembersRepository {
    fn new() -> Self {
        let rows = (1..=4)
            .map(|i| MemberTeamRow {
                member_id: i,
                username: Some(format!("member{i}")),
                age: (i * 10) as i32,
                team_id: Some(if i <= 2 { 1 } else { 2 }),
                team_name: Some(if i <= 2 { "teamA" } else { "teamB" }.to_string()),
            })
            .collect();
        Self {
            rows,
            search_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
        }
    }

    fn filtered(&self, condition: &SearchCondition) -> Vec<MemberTeamRow> {
        let predicates = compose(condition);
        self.rows
            .iter()
            .filter(|r| matches_all(&predicates, r))
            .cloned()
            .collect()
    }

    fn member(row: &MemberTeamRow) -> Member {
        Member {
            id: row.member_id,
            username: row.username.clone(),
            age: row.age,
            team_id: row.team_id,
        }
    }
}

#[async_trait::async_trait]
impl MembersRepository for MockMembersRepository {
    async fn insert_team(&self, name: String) -> Result<Team, DbErr> {
        Ok(Team { id: 3, name })
    }

    async fn find_team(&self, id: i64) -> Result<Option<Team>, DbErr> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.team_id == Some(id))
            .map(|r| Team {
                id,
                name: r.team_name.clone().unwrap_or_default(),
            }))
    }

    async fn insert_member(&self, new_member: NewMember) -> Result<Member, DbErr> {
        Ok(Member {
            id: 5,
            username: new_member.username,
            age: new_member.age,
            team_id: new_member.team_id,
        })
    }

    async fn find_member(&self, id: i64) -> Result<Option<Member>, DbErr> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.member_id == id)
            .map(Self::member))
    }

    async fn list_members(&self) -> Result<Vec<Member>, DbErr> {
        Ok(self.rows.iter().map(Self::member).collect())
    }

    async fn find_members_by_username(&self, username: &str) -> Result<Vec<Member>, DbErr> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.username.as_deref() == Some(username))
            .map(Self::member)
            .collect())
    }

    async fn members_of_team(&self, team_id: i64) -> Result<Vec<Member>, DbErr> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.team_id == Some(team_id))
            .map(Self::member)
            .collect())
    }

    async fn change_team(&self, member_id: i64, team_id: i64) -> Result<TeamChange, DbErr> {
        match self.rows.iter().find(|r| r.member_id == member_id) {
            None => Ok(TeamChange::MemberMissing),
            Some(r) if r.team_id == Some(team_id) => Ok(TeamChange::Unchanged),
            Some(_) => Ok(TeamChange::TeamMissing),
        }
    }

    async fn search(
        &self,
        condition: &SearchCondition,
        _sort: &SortSpec,
    ) -> Result<Vec<MemberTeamRow>, QueryError> {
        Ok(self.filtered(condition))
    }

    async fn search_page(
        &self,
        condition: &SearchCondition,
        request: &PageRequest,
        _strategy: CountStrategy,
    ) -> Result<Page<MemberTeamRow>, QueryError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let all = self.filtered(condition);
        let total = all.len() as u64;
        let content: Vec<MemberTeamRow> = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        assemble_page(content, request, || async {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            Ok::<u64, QueryError>(total)
        })
        .await
    }

    async fn search_members_page(
        &self,
        condition: &SearchCondition,
        request: &PageRequest,
        strategy: CountStrategy,
    ) -> Result<Page<Member>, QueryError> {
        let page = self.search_page(condition, request, strategy).await?;
        Ok(page.map_content(|r| Self::member(&r)))
    }

    async fn search_summaries(
        &self,
        condition: &SearchCondition,
    ) -> Result<Vec<MemberSummary>, QueryError> {
        Ok(self
            .filtered(condition)
            .into_iter()
            .map(|r| MemberSummary {
                username: r.username,
                age: r.age,
            })
            .collect())
    }
}

fn service_with(repo: Arc<MockMembersRepository>) -> Service {
    Service::new(repo, ServiceConfig::default())
}

#[traced_test]
#[tokio::test]
async fn search_page_emits_spans() {
    let repo = Arc::new(MockMembersRepository::new());
    let service = service_with(repo.clone());

    let page = service
        .search_page(SearchCondition::all(), 0, 2, SortSpec::empty())
        .await
        .unwrap();

    assert_eq!(page.total, 4);
    assert!(logs_contain("members.service.search_page"));
    assert!(logs_contain("page assembled"));
}

#[traced_test]
#[tokio::test]
async fn short_page_skips_count() {
    let repo = Arc::new(MockMembersRepository::new());
    let service = service_with(repo.clone());

    let page = service
        .search_page(SearchCondition::all(), 1, 3, SortSpec::empty())
        .await
        .unwrap();
    assert_eq!(page.content.len(), 1);
    assert_eq!(page.total, 4);
    assert_eq!(repo.count_calls.load(Ordering::SeqCst), 0);

    let page = service
        .search_page(SearchCondition::all(), 0, 2, SortSpec::empty())
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(repo.count_calls.load(Ordering::SeqCst), 1);
}

#[traced_test]
#[tokio::test]
async fn search_filters_through_predicates() {
    let service = service_with(Arc::new(MockMembersRepository::new()));

    let rows = service
        .search(SearchCondition::all().with_team_name("teamB").with_age_goe(35))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].member_id, 4);
    assert!(logs_contain("members.service.search"));
}

#[traced_test]
#[tokio::test]
async fn create_member_emits_spans() {
    let service = service_with(Arc::new(MockMembersRepository::new()));

    let created = service
        .create_member(NewMember::new("member5", 50).in_team(2))
        .await
        .unwrap();

    assert_eq!(created.id, 5);
    assert!(logs_contain("members.service.create_member"));
    assert!(logs_contain("member created"));
}

#[traced_test]
#[tokio::test]
async fn change_team_to_same_team_emits_spans() {
    let service = service_with(Arc::new(MockMembersRepository::new()));

    let member = service.change_team(1, Some(1)).await.unwrap();

    assert_eq!(member.team_id, Some(1));
    assert!(logs_contain("members.service.change_team"));
    assert!(logs_contain("member already in team"));
}

#[traced_test]
#[tokio::test]
async fn invalid_requests_never_reach_repository() {
    let repo = Arc::new(MockMembersRepository::new());
    let service = Service::new(
        repo.clone(),
        ServiceConfig {
            max_page_size: 3,
            ..ServiceConfig::default()
        },
    );

    let err = service
        .search_page(SearchCondition::all(), 0, 2, SortSpec::from_signed_tokens("-email").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnknownSortField { ref field } if field == "email"));

    let request = PageRequest::first(2).with_sort(SortSpec::from_signed_tokens("age,phone").unwrap());
    let err = service
        .search_members_page(SearchCondition::all(), request)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UnknownSortField { ref field } if field == "phone"));

    let err = service
        .search_page(SearchCondition::all(), -1, 2, SortSpec::empty())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidPageRequest { .. }));

    let err = service
        .search_page_with(SearchCondition::all(), PageRequest::first(4), CountStrategy::Combined)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidPageRequest { page_size: 4, .. }));

    assert_eq!(repo.search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(repo.count_calls.load(Ordering::SeqCst), 0);

    // sort names are case-insensitive
    let page = service
        .search_page(SearchCondition::all(), 0, 2, SortSpec::from_signed_tokens("-AGE").unwrap())
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(repo.search_calls.load(Ordering::SeqCst), 1);
}
