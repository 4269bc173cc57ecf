pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::cvs::handlers as cvs;
use crate::matching::handlers as matching;
use crate::offers::handlers as offers;
use crate::state::AppState;

/// Room for multipart boundaries and the `candidate_id` field on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // CVs
        .route(
            "/api/v1/cvs/upload",
            post(cvs::handle_upload_cv).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/cvs", get(cvs::handle_list_cvs))
        .route(
            "/api/v1/cvs/:id",
            get(cvs::handle_get_cv).delete(cvs::handle_delete_cv),
        )
        // Offers
        .route(
            "/api/v1/offers",
            post(offers::handle_create_offer).get(offers::handle_list_offers),
        )
        .route(
            "/api/v1/offers/:id",
            get(offers::handle_get_offer)
                .patch(offers::handle_update_offer)
                .delete(offers::handle_delete_offer),
        )
        // Matching
        .route("/api/v1/matching/score", post(matching::handle_score))
        .route(
            "/api/v1/matching/search-offers",
            post(matching::handle_search_offers),
        )
        .route(
            "/api/v1/matching/search-candidates/:offer_id",
            post(matching::handle_search_candidates),
        )
        .route("/api/v1/matching/test", post(matching::handle_test_match))
        // Applications
        .route(
            "/api/v1/applications",
            post(applications::handle_create_application)
                .get(applications::handle_list_applications),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get_application),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_update_status),
        )
        .with_state(state)
}
