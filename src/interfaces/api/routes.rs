use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::common::di::AppState;
use crate::interfaces::api::handlers::history_handler;
use crate::interfaces::api::handlers::search_handler::SearchHandler;

/// Creates API routes for the application
pub fn create_api_routes(app_state: AppState) -> Router {
    let search_router = Router::new()
        // Same parameters as a shareable link, or the full configuration as JSON
        .route("/search", get(SearchHandler::search_get).post(SearchHandler::search_post))
        .route("/search/link", post(SearchHandler::create_link))
        .route("/search/local", post(SearchHandler::rank_local));

    let history_router = Router::new()
        .route(
            "/search/history",
            get(history_handler::get_history).delete(history_handler::clear_history),
        )
        .route("/search/history/{id}", delete(history_handler::remove_history_item));

    Router::new()
        .merge(search_router)
        .merge(history_router)
        .with_state(app_state)
}
