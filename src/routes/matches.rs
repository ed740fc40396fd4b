use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::matches;
use crate::error::AppError;
use crate::matching;
use crate::storage::MatchUpdate;
use crate::AppState;

/// Freshly drafted outreach email
#[derive(Debug, Serialize, ToSchema)]
pub struct EmailDraftResponse {
    pub content: String,
}

/// Update review status, email status or other match fields
#[utoipa::path(
    patch,
    path = "/api/matches/{id}",
    params(("id" = i32, Path, description = "Match id")),
    request_body = MatchUpdate,
    responses(
        (status = 200, description = "The updated match", body = matches::Model),
        (status = 404, description = "Match not found")
    )
)]
#[tracing::instrument(skip(state, update))]
pub async fn update_match(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<MatchUpdate>,
) -> Result<Json<matches::Model>, AppError> {
    let updated = state
        .storage
        .update_match(id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;
    Ok(Json(updated))
}

/// Draft an outreach email for the match and store it
#[utoipa::path(
    post,
    path = "/api/matches/{id}/email",
    params(("id" = i32, Path, description = "Match id")),
    responses(
        (status = 200, description = "Draft created and stored on the match", body = EmailDraftResponse),
        (status = 404, description = "Match, campaign or investor not found"),
        (status = 500, description = "Model call failed; nothing stored")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn draft_match_email(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EmailDraftResponse>, AppError> {
    let content =
        matching::draft_email(state.storage.as_ref(), state.provider.as_ref(), id).await?;
    Ok(Json(EmailDraftResponse { content }))
}
