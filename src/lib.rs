use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
// Conditionally import SwaggerUi only when needed (not test)
#[cfg(not(test))]
use utoipa_swagger_ui::SwaggerUi;
// Conditionally import CORS only when needed (not test)
#[cfg(not(test))]
use tower_http::cors::{Any, CorsLayer};
// Conditionally import Governor only when needed (not test)
#[cfg(not(test))]
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
#[cfg(not(test))]
use std::num::NonZeroU32;

pub mod ai;
pub mod db;
pub mod entities;
pub mod error;
pub mod import;
pub mod matching;
pub mod routes;
pub mod storage;

use crate::ai::CompletionProvider;
use crate::storage::Storage;

/// Shared handler state: the store and the completion model, both behind
/// trait objects so tests can swap in doubles.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub provider: Arc<dyn CompletionProvider>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Service is healthy")
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FundMatch API",
        version = "0.1.0",
        description = "Investor matching and outreach for fundraising campaigns"
    ),
    paths(
        routes::investors::list_investors,
        routes::investors::get_investor,
        routes::investors::import_investors,
        routes::campaigns::list_campaigns,
        routes::campaigns::create_campaign,
        routes::campaigns::get_campaign,
        routes::campaigns::list_campaign_matches,
        routes::campaigns::generate_campaign_matches,
        routes::matches::update_match,
        routes::matches::draft_match_email,
        health_check
    ),
    components(schemas(
        entities::investor::Model,
        entities::investor::SocialLinks,
        entities::campaign::Model,
        entities::matches::Model,
        entities::matches::ReviewStatus,
        entities::matches::EmailStatus,
        storage::MatchWithInvestor,
        storage::MatchUpdate,
        import::ImportOutcome,
        import::SkippedRow,
        routes::campaigns::CreateCampaign,
        routes::campaigns::GenerateMatchesResponse,
        routes::matches::EmailDraftResponse
    ))
)]
struct ApiDoc;

/// Create the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // --- Define API routes separately ---
    let api_routes = Router::new()
        .route("/api/investors", get(routes::list_investors))
        .route("/api/investors/import", post(routes::import_investors))
        .route("/api/investors/{id}", get(routes::get_investor))
        .route(
            "/api/campaigns",
            get(routes::list_campaigns).post(routes::create_campaign),
        )
        .route("/api/campaigns/{id}", get(routes::get_campaign))
        .route(
            "/api/campaigns/{id}/matches",
            get(routes::list_campaign_matches),
        )
        .route(
            "/api/campaigns/{id}/matches/generate",
            post(routes::generate_campaign_matches),
        )
        .route("/api/matches/{id}", patch(routes::update_match))
        .route("/api/matches/{id}/email", post(routes::draft_match_email))
        .route("/health", get(health_check))
        .with_state(state);

    // --- Conditionally apply layers and Swagger UI only when NOT running tests ---
    #[cfg(not(test))]
    let (docs_router, rate_limited_api_routes) = {
        // Create Swagger UI router
        let docs_router = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

        // Configure Rate Limiting
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(SmartIpKeyExtractor)
                .period(std::time::Duration::from_secs(60))
                .burst_size(NonZeroU32::new(10).unwrap().into())
                .finish()
                .unwrap(),
        );
        // Apply Governor layer ONLY to the api_routes defined above
        let rate_limited_api_routes = api_routes.layer(GovernorLayer { config: governor_conf });

        (docs_router, rate_limited_api_routes)
    };

    // For test builds, use the original api_routes and an empty router for docs
    #[cfg(test)]
    let (docs_router, rate_limited_api_routes) = (Router::new(), api_routes);

    // --- Build the final application router ---
    #[allow(unused_mut)]
    let mut app = Router::new()
        .merge(rate_limited_api_routes)
        .merge(docs_router);

    // --- Apply CORS to the whole app (both API and docs) if needed ---
    #[cfg(not(test))]
    {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app
}
