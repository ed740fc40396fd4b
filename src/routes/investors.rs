use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::entities::investor;
use crate::error::AppError;
use crate::import::{self, ImportOutcome};
use crate::AppState;

/// Filters for the investor listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvestorListQuery {
    /// Case-insensitive needle matched against name, focus and description
    #[serde(default)]
    search: Option<String>,
    /// Case-insensitive needle matched against focus only
    #[serde(default)]
    focus: Option<String>,
}

/// List investors, optionally filtered
#[utoipa::path(
    get,
    path = "/api/investors",
    params(InvestorListQuery),
    responses(
        (status = 200, description = "Investors matching the filters", body = [investor::Model])
    )
)]
#[tracing::instrument(skip(state, query))]
pub async fn list_investors(
    State(state): State<AppState>,
    Query(query): Query<InvestorListQuery>,
) -> Result<Json<Vec<investor::Model>>, AppError> {
    let investors = state
        .storage
        .investors(query.search.as_deref(), query.focus.as_deref())
        .await?;
    Ok(Json(investors))
}

/// Fetch a single investor
#[utoipa::path(
    get,
    path = "/api/investors/{id}",
    params(("id" = i32, Path, description = "Investor id")),
    responses(
        (status = 200, description = "The investor", body = investor::Model),
        (status = 404, description = "Investor not found")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_investor(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<investor::Model>, AppError> {
    let investor = state
        .storage
        .investor(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Investor not found".to_string()))?;
    Ok(Json(investor))
}

/// Bulk-import investors from a CSV body
#[utoipa::path(
    post,
    path = "/api/investors/import",
    request_body(content = String, content_type = "text/csv", description = "Investor spreadsheet"),
    responses(
        (status = 200, description = "Import finished; skipped rows are reported, not fatal", body = ImportOutcome),
        (status = 400, description = "CSV could not be parsed at all")
    )
)]
#[tracing::instrument(skip(state, body))]
pub async fn import_investors(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportOutcome>, AppError> {
    let outcome = import::import_csv(state.storage.as_ref(), &body).await?;
    Ok(Json(outcome))
}
