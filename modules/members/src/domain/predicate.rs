//! Search condition → atomic predicates.
//!
//! Each field of a [`SearchCondition`] yields at most one predicate. Text
//! fields only count when they contain a non-whitespace character, so `None`,
//! `""` and `"   "` all mean "no filter". Present predicates are combined with
//! AND by the storage layer; an empty list means no WHERE clause at all.

use crate::contract::model::{MemberTeamRow, SearchCondition};

/// One atomic filter over the member ⟕ team join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `member.username = value`
    UsernameEq(String),
    /// `team.name = value`
    TeamNameEq(String),
    /// `member.age >= value`
    AgeGoe(i32),
    /// `member.age <= value`
    AgeLoe(i32),
}

impl Predicate {
    /// Evaluate against an already joined row.
    pub fn matches(&self, row: &MemberTeamRow) -> bool {
        match self {
            Predicate::UsernameEq(v) => row.username.as_deref() == Some(v.as_str()),
            Predicate::TeamNameEq(v) => row.team_name.as_deref() == Some(v.as_str()),
            Predicate::AgeGoe(v) => row.age >= *v,
            Predicate::AgeLoe(v) => row.age <= *v,
        }
    }
}

fn has_text(s: Option<&str>) -> Option<&str> {
    s.filter(|v| v.chars().any(|c| !c.is_whitespace()))
}

pub fn username_eq(username: Option<&str>) -> Option<Predicate> {
    has_text(username).map(|v| Predicate::UsernameEq(v.to_string()))
}

pub fn team_name_eq(team_name: Option<&str>) -> Option<Predicate> {
    has_text(team_name).map(|v| Predicate::TeamNameEq(v.to_string()))
}

pub fn age_goe(age: Option<i32>) -> Option<Predicate> {
    age.map(Predicate::AgeGoe)
}

pub fn age_loe(age: Option<i32>) -> Option<Predicate> {
    age.map(Predicate::AgeLoe)
}

/// Present predicates in a fixed order: username, team name, age-goe, age-loe.
pub fn compose(condition: &SearchCondition) -> Vec<Predicate> {
    [
        username_eq(condition.username.as_deref()),
        team_name_eq(condition.team_name.as_deref()),
        age_goe(condition.age_goe),
        age_loe(condition.age_loe),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// True when every predicate holds; vacuously true for an empty list.
pub fn matches_all(predicates: &[Predicate], row: &MemberTeamRow) -> bool {
    predicates.iter().all(|p| p.matches(row))
}
