use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::campaign;
use crate::error::AppError;
use crate::matching;
use crate::storage::{MatchWithInvestor, NewCampaign};
use crate::AppState;

/// Payload for creating a campaign
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaign {
    name: String,
    #[serde(default)]
    description: Option<String>,
    /// Defaults to true when omitted
    #[serde(default)]
    is_active: Option<bool>,
}

/// How many matches a generation run created
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateMatchesResponse {
    pub count: usize,
}

/// List campaigns, newest first
#[utoipa::path(
    get,
    path = "/api/campaigns",
    responses(
        (status = 200, description = "All campaigns, newest first", body = [campaign::Model])
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_campaigns(
    State(state): State<AppState>,
) -> Result<Json<Vec<campaign::Model>>, AppError> {
    let campaigns = state.storage.campaigns().await?;
    Ok(Json(campaigns))
}

/// Create a campaign
#[utoipa::path(
    post,
    path = "/api/campaigns",
    request_body = CreateCampaign,
    responses(
        (status = 201, description = "Campaign created", body = campaign::Model),
        (status = 400, description = "Name missing or blank")
    )
)]
#[tracing::instrument(skip(state, body))]
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(body): Json<CreateCampaign>,
) -> Result<(StatusCode, Json<campaign::Model>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("name must not be empty".to_string()));
    }

    let created = state
        .storage
        .create_campaign(NewCampaign {
            name: body.name,
            description: body.description,
            is_active: body.is_active.unwrap_or(true),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch a single campaign
#[utoipa::path(
    get,
    path = "/api/campaigns/{id}",
    params(("id" = i32, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "The campaign", body = campaign::Model),
        (status = 404, description = "Campaign not found")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<campaign::Model>, AppError> {
    let campaign = state
        .storage
        .campaign(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;
    Ok(Json(campaign))
}

/// List a campaign's matches with their investors
#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/matches",
    params(("id" = i32, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Matches for the campaign, each with its investor", body = [MatchWithInvestor])
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_campaign_matches(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<MatchWithInvestor>>, AppError> {
    let matches = state.storage.campaign_matches(id).await?;
    Ok(Json(matches))
}

/// Score investors against the campaign and persist the good fits
#[utoipa::path(
    post,
    path = "/api/campaigns/{id}/matches/generate",
    params(("id" = i32, Path, description = "Campaign id")),
    responses(
        (status = 200, description = "Generation finished", body = GenerateMatchesResponse),
        (status = 404, description = "Campaign not found")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn generate_campaign_matches(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GenerateMatchesResponse>, AppError> {
    let count =
        matching::generate_matches(state.storage.as_ref(), state.provider.as_ref(), id).await?;
    Ok(Json(GenerateMatchesResponse { count }))
}
