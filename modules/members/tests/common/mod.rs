#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use members::contract::model::{Member, NewMember, Team};
use members::domain::service::{Service, ServiceConfig};
use members::infra::storage::migrations::Migrator;
use members::infra::storage::SeaOrmMembersRepository;
use query_db::{ConnectOpts, DbHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

/// Fresh in-memory database with the schema applied.
pub async fn create_test_db() -> Result<(DbHandle, DatabaseConnection)> {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
    let conn = db.sea();
    Migrator::up(&conn, None).await?;
    Ok((db, conn))
}

pub async fn create_test_service(config: ServiceConfig) -> Result<(DbHandle, Arc<Service>)> {
    let (db, conn) = create_test_db().await?;
    let repo = Arc::new(SeaOrmMembersRepository::new(conn));
    Ok((db, Arc::new(Service::new(repo, config))))
}

pub struct Fixture {
    pub team_a: Team,
    pub team_b: Team,
    pub members: Vec<Member>,
}

/// teamA: member1 (10), member2 (20); teamB: member3 (30), member4 (40).
pub async fn seed(service: &Service) -> Result<Fixture> {
    let team_a = service.create_team("teamA".into()).await?;
    let team_b = service.create_team("teamB".into()).await?;

    let mut members = Vec::new();
    for (name, age, team) in [
        ("member1", 10, team_a.id),
        ("member2", 20, team_a.id),
        ("member3", 30, team_b.id),
        ("member4", 40, team_b.id),
    ] {
        members.push(
            service
                .create_member(NewMember::new(name, age).in_team(team))
                .await?,
        );
    }

    Ok(Fixture {
        team_a,
        team_b,
        members,
    })
}

pub fn names<'a, I>(usernames: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Option<String>>,
{
    usernames
        .into_iter()
        .map(|u| u.clone().unwrap_or_else(|| "<null>".to_string()))
        .collect()
}
