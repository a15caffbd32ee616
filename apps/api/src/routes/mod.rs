pub mod health;

use axum::{
    http::{header, Method},
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::chat::handlers;
use crate::state::AppState;

/// Path the embedded website widget has always posted to.
pub const LEGACY_CHAT_PATH: &str = "/.netlify/functions/for-more-travel-assistant";

fn chat_route() -> MethodRouter<AppState> {
    post(handlers::handle_chat).fallback(handlers::handle_method_not_allowed)
}

/// Echoes the caller's origin, as the widget is embedded on several sites.
/// Requests without an `Origin` header get no allow-origin header at all.
/// Answers every OPTIONS request itself, so routes never see one.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/chat", chat_route())
        .route(LEGACY_CHAT_PATH, chat_route())
        .layer(cors_layer())
        .with_state(state)
}
