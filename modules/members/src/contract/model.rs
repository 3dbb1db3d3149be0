use serde::Deserialize;

/// Optional filters for a member search. Every field is independent; a
/// missing or blank text field means "no filter on that field".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchCondition {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "teamName")]
    pub team_name: Option<String>,
    #[serde(default, alias = "ageGoe")]
    pub age_goe: Option<i32>,
    #[serde(default, alias = "ageLoe")]
    pub age_loe: Option<i32>,
}

impl SearchCondition {
    /// Matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_username(self, username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_team_name(self, team_name: impl Into<String>) -> Self {
        Self {
            team_name: Some(team_name.into()),
            ..self
        }
    }

    #[must_use]
    pub fn with_age_goe(self, age: i32) -> Self {
        Self {
            age_goe: Some(age),
            ..self
        }
    }

    #[must_use]
    pub fn with_age_loe(self, age: i32) -> Self {
        Self {
            age_loe: Some(age),
            ..self
        }
    }
}

/// Member record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
}

/// Data for creating a new member
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewMember {
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
}

impl NewMember {
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            username: Some(username.into()),
            age,
            team_id: None,
        }
    }

    #[must_use]
    pub fn in_team(mut self, team_id: i64) -> Self {
        self.team_id = Some(team_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// A team with the members currently pointing at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRoster {
    pub team: Team,
    pub members: Vec<Member>,
}

/// Flattened member + team row produced by searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberTeamRow {
    pub member_id: i64,
    pub username: Option<String>,
    pub age: i32,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

/// Username and age only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    pub username: Option<String>,
    pub age: i32,
}
