use sea_orm::entity::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Reviewer verdict on a generated match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Where the outreach email stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    #[sea_orm(string_value = "not_sent")]
    NotSent,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "opened")]
    Opened,
    #[sea_orm(string_value = "replied")]
    Replied,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "matches")]
#[serde(rename_all = "camelCase")]
#[schema(as = Match)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    pub campaign_id: i32,
    pub investor_id: i32,
    /// 0-100 fit score as judged by the model.
    pub match_score: Option<i32>,
    pub match_reason: Option<String>,
    pub status: ReviewStatus,
    pub email_status: EmailStatus,
    pub email_content: Option<String>,
    pub last_interaction: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::campaign::Entity",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id"
    )]
    Campaign,
    #[sea_orm(
        belongs_to = "super::investor::Entity",
        from = "Column::InvestorId",
        to = "super::investor::Column::Id"
    )]
    Investor,
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl Related<super::investor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
