use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers::{categories, health, risks, stats};
use crate::services::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        // Risks
        .route("/risks", post(risks::create_risk).get(risks::list_risks))
        .route("/risks/form", post(risks::create_risk_form))
        .route(
            "/risks/:id",
            get(risks::get_risk)
                .put(risks::update_risk)
                .delete(risks::delete_risk),
        )
        .route(
            "/risks/:id/recommendations",
            get(risks::get_risk_recommendations).put(risks::refresh_recommendations),
        )
        .route(
            "/recommendations/preview",
            post(risks::preview_recommendations),
        )
        // Statistics
        .route("/stats", get(stats::risk_stats))
        .route("/stats/dashboard", get(stats::dashboard))
        .route("/stats/categories", get(stats::category_stats))
        // Categories
        .route(
            "/categories",
            post(categories::create_category).get(categories::list_categories),
        )
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .nest_service("/static", static_files)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
