use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Social profile URLs kept as a single JSON column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct SocialLinks {
    pub twitter: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "investors")]
#[serde(rename_all = "camelCase")]
#[schema(as = Investor)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    pub name: String,
    pub fund_type: Option<String>,
    pub website: Option<String>,
    /// Comma-separated sector list, e.g. "Fintech, Payments".
    pub focus: Option<String>,
    /// Comma-separated stage list, e.g. "Seed, Series A".
    pub stage: Option<String>,
    pub partner_name: Option<String>,
    pub partner_email: Option<String>,
    pub portfolio: Option<String>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Json", nullable)]
    pub social_links: Option<SocialLinks>,
    pub investment_count: Option<i32>,
    pub exit_count: Option<i32>,
    pub description: Option<String>,
    pub founding_year: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::matches::Entity")]
    Matches,
}

impl Related<super::matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Matches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
