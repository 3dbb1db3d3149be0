//! Predicates → SeaORM conditions over the member ⟕ team join.

use query_db::FieldMap;
use sea_orm::{
    sea_query::Expr, Condition, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait, Select,
};

use crate::contract::model::SearchCondition;
use crate::domain::predicate::{compose, Predicate};
use crate::infra::storage::entity::{member, team};

/// Tie-breaker appended to every sort.
pub const MEMBER_ID_FIELD: &str = "id";

fn to_condition(p: &Predicate) -> Condition {
    let expr = match p {
        Predicate::UsernameEq(v) => {
            Expr::col((member::Entity, member::Column::Username)).eq(v.as_str())
        }
        Predicate::TeamNameEq(v) => Expr::col((team::Entity, team::Column::Name)).eq(v.as_str()),
        Predicate::AgeGoe(v) => Expr::col((member::Entity, member::Column::Age)).gte(*v),
        Predicate::AgeLoe(v) => Expr::col((member::Entity, member::Column::Age)).lte(*v),
    };
    Condition::all().add(expr)
}

/// AND of every present predicate; `None` when there is nothing to filter on.
pub fn where_clause(condition: &SearchCondition) -> Option<Condition> {
    let predicates = compose(condition);
    if predicates.is_empty() {
        return None;
    }
    Some(
        predicates
            .iter()
            .fold(Condition::all(), |acc, p| acc.add(to_condition(p))),
    )
}

/// `member LEFT JOIN team` with the condition applied, selecting member columns.
pub fn filtered_members(condition: &SearchCondition) -> Select<member::Entity> {
    let select = member::Entity::find().join(JoinType::LeftJoin, member::Relation::Team.def());
    match where_clause(condition) {
        Some(cond) => select.filter(cond),
        None => select,
    }
}

/// Same join and filter, projected to `MemberTeamRow` column aliases.
pub fn member_team_rows(condition: &SearchCondition) -> Select<member::Entity> {
    filtered_members(condition)
        .select_only()
        .column_as(member::Column::Id, "member_id")
        .column(member::Column::Username)
        .column(member::Column::Age)
        .column_as(team::Column::Id, "team_id")
        .column_as(team::Column::Name, "team_name")
}

/// Same join and filter, projected to `MemberSummary` columns.
pub fn member_summaries(condition: &SearchCondition) -> Select<member::Entity> {
    filtered_members(condition)
        .select_only()
        .column(member::Column::Username)
        .column(member::Column::Age)
}

/// Sortable fields of a joined member row.
pub fn sort_fields() -> FieldMap {
    FieldMap::new()
        .insert(MEMBER_ID_FIELD, Expr::col((member::Entity, member::Column::Id)))
        .insert("username", Expr::col((member::Entity, member::Column::Username)))
        .insert("age", Expr::col((member::Entity, member::Column::Age)))
        .insert("team_id", Expr::col((member::Entity, member::Column::TeamId)))
        .insert("team_name", Expr::col((team::Entity, team::Column::Name)))
}
