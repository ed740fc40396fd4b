use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, NotSet,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::matches::{EmailStatus, ReviewStatus};
use crate::entities::{campaign, investor, matches, Campaign, Investor, Matches};

/// Rows per INSERT batch during imports.
const INSERT_CHUNK: usize = 100;

/// Investor row ready for insertion (everything but the generated id).
#[derive(Debug, Clone, Default)]
pub struct NewInvestor {
    pub name: String,
    pub fund_type: Option<String>,
    pub website: Option<String>,
    pub focus: Option<String>,
    pub stage: Option<String>,
    pub partner_name: Option<String>,
    pub partner_email: Option<String>,
    pub portfolio: Option<String>,
    pub location: Option<String>,
    pub social_links: Option<investor::SocialLinks>,
    pub investment_count: Option<i32>,
    pub exit_count: Option<i32>,
    pub description: Option<String>,
    pub founding_year: Option<i32>,
}

impl From<NewInvestor> for investor::ActiveModel {
    fn from(row: NewInvestor) -> Self {
        investor::ActiveModel {
            id: NotSet,
            name: Set(row.name),
            fund_type: Set(row.fund_type),
            website: Set(row.website),
            focus: Set(row.focus),
            stage: Set(row.stage),
            partner_name: Set(row.partner_name),
            partner_email: Set(row.partner_email),
            portfolio: Set(row.portfolio),
            location: Set(row.location),
            social_links: Set(row.social_links),
            investment_count: Set(row.investment_count),
            exit_count: Set(row.exit_count),
            description: Set(row.description),
            founding_year: Set(row.founding_year),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewMatch {
    pub campaign_id: i32,
    pub investor_id: i32,
    pub match_score: Option<i32>,
    pub match_reason: Option<String>,
    pub status: ReviewStatus,
    pub email_status: EmailStatus,
}

/// Partial update for a match; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    pub match_score: Option<i32>,
    pub match_reason: Option<String>,
    pub status: Option<ReviewStatus>,
    pub email_status: Option<EmailStatus>,
    pub email_content: Option<String>,
    pub last_interaction: Option<DateTime<Utc>>,
}

impl MatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.match_score.is_none()
            && self.match_reason.is_none()
            && self.status.is_none()
            && self.email_status.is_none()
            && self.email_content.is_none()
            && self.last_interaction.is_none()
    }
}

/// Match joined with its investor, the shape the review board consumes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchWithInvestor {
    #[serde(flatten)]
    pub record: matches::Model,
    pub investor: investor::Model,
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn investors(
        &self,
        search: Option<&str>,
        focus: Option<&str>,
    ) -> Result<Vec<investor::Model>, DbErr>;
    async fn investor(&self, id: i32) -> Result<Option<investor::Model>, DbErr>;
    async fn create_investors(&self, rows: Vec<NewInvestor>) -> Result<usize, DbErr>;

    async fn campaigns(&self) -> Result<Vec<campaign::Model>, DbErr>;
    async fn campaign(&self, id: i32) -> Result<Option<campaign::Model>, DbErr>;
    async fn create_campaign(&self, row: NewCampaign) -> Result<campaign::Model, DbErr>;

    async fn campaign_matches(&self, campaign_id: i32) -> Result<Vec<MatchWithInvestor>, DbErr>;
    async fn matched_investor_ids(&self, campaign_id: i32) -> Result<Vec<i32>, DbErr>;
    async fn match_by_id(&self, id: i32) -> Result<Option<matches::Model>, DbErr>;
    async fn create_match(&self, row: NewMatch) -> Result<matches::Model, DbErr>;
    async fn update_match(
        &self,
        id: i32,
        update: MatchUpdate,
    ) -> Result<Option<matches::Model>, DbErr>;
}

/// sea-orm backed store; works against Postgres and SQLite alike.
#[derive(Clone)]
pub struct SeaOrmStorage {
    conn: DatabaseConnection,
}

impl SeaOrmStorage {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

// LOWER(col) LIKE %term% so the filter behaves the same on both backends.
fn contains_ci(column: investor::Column, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", term.to_lowercase()))
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn investors(
        &self,
        search: Option<&str>,
        focus: Option<&str>,
    ) -> Result<Vec<investor::Model>, DbErr> {
        let mut condition = Condition::all();

        if let Some(term) = search.filter(|t| !t.trim().is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(contains_ci(investor::Column::Name, term))
                    .add(contains_ci(investor::Column::Focus, term))
                    .add(contains_ci(investor::Column::Description, term)),
            );
        }
        if let Some(term) = focus.filter(|t| !t.trim().is_empty()) {
            condition = condition.add(contains_ci(investor::Column::Focus, term));
        }

        Investor::find().filter(condition).all(&self.conn).await
    }

    async fn investor(&self, id: i32) -> Result<Option<investor::Model>, DbErr> {
        Investor::find_by_id(id).one(&self.conn).await
    }

    async fn create_investors(&self, rows: Vec<NewInvestor>) -> Result<usize, DbErr> {
        if rows.is_empty() {
            return Ok(0);
        }
        let total = rows.len();
        for chunk in rows.chunks(INSERT_CHUNK) {
            Investor::insert_many(chunk.iter().cloned().map(investor::ActiveModel::from))
                .exec(&self.conn)
                .await?;
        }
        Ok(total)
    }

    async fn campaigns(&self) -> Result<Vec<campaign::Model>, DbErr> {
        Campaign::find()
            .order_by_desc(campaign::Column::CreatedAt)
            .all(&self.conn)
            .await
    }

    async fn campaign(&self, id: i32) -> Result<Option<campaign::Model>, DbErr> {
        Campaign::find_by_id(id).one(&self.conn).await
    }

    async fn create_campaign(&self, row: NewCampaign) -> Result<campaign::Model, DbErr> {
        campaign::ActiveModel {
            id: NotSet,
            name: Set(row.name),
            description: Set(row.description),
            is_active: Set(row.is_active),
            created_at: Set(Utc::now()),
        }
        .insert(&self.conn)
        .await
    }

    async fn campaign_matches(&self, campaign_id: i32) -> Result<Vec<MatchWithInvestor>, DbErr> {
        let rows = Matches::find()
            .filter(matches::Column::CampaignId.eq(campaign_id))
            .find_also_related(Investor)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(record, investor)| {
                investor.map(|investor| MatchWithInvestor { record, investor })
            })
            .collect())
    }

    async fn matched_investor_ids(&self, campaign_id: i32) -> Result<Vec<i32>, DbErr> {
        Matches::find()
            .select_only()
            .column(matches::Column::InvestorId)
            .filter(matches::Column::CampaignId.eq(campaign_id))
            .into_tuple::<i32>()
            .all(&self.conn)
            .await
    }

    async fn match_by_id(&self, id: i32) -> Result<Option<matches::Model>, DbErr> {
        Matches::find_by_id(id).one(&self.conn).await
    }

    async fn create_match(&self, row: NewMatch) -> Result<matches::Model, DbErr> {
        matches::ActiveModel {
            id: NotSet,
            campaign_id: Set(row.campaign_id),
            investor_id: Set(row.investor_id),
            match_score: Set(row.match_score),
            match_reason: Set(row.match_reason),
            status: Set(row.status),
            email_status: Set(row.email_status),
            email_content: Set(None),
            last_interaction: Set(None),
        }
        .insert(&self.conn)
        .await
    }

    async fn update_match(
        &self,
        id: i32,
        update: MatchUpdate,
    ) -> Result<Option<matches::Model>, DbErr> {
        let Some(existing) = Matches::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(existing));
        }

        let mut active: matches::ActiveModel = existing.into();
        if let Some(v) = update.match_score {
            active.match_score = Set(Some(v));
        }
        if let Some(v) = update.match_reason {
            active.match_reason = Set(Some(v));
        }
        if let Some(v) = update.status {
            active.status = Set(v);
        }
        if let Some(v) = update.email_status {
            active.email_status = Set(v);
        }
        if let Some(v) = update.email_content {
            active.email_content = Set(Some(v));
        }
        if let Some(v) = update.last_interaction {
            active.last_interaction = Set(Some(v));
        }

        let updated = active.update(&self.conn).await?;
        Ok(Some(updated))
    }
}
