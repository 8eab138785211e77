mod docs;
mod error;
mod middleware;
mod state;
mod util;

pub mod routes;
pub mod services;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorResponse, FieldErrors};
pub use middleware::{CurrentAdmin, ADMIN_ONLY};
pub use state::{AppState, ChatRateLimiter};
pub use util::SESSION_COOKIE;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use routes::{admin, auth, chat, faqs, health, pages};

pub fn build_router(state: AppState) -> Router {
    let chat_routes = Router::new()
        .route("/api/chat", post(chat::send_message))
        .route_layer(from_fn_with_state(state.clone(), middleware::throttle_chat));

    let admin_api = Router::new()
        .route("/api/admin/faqs", post(faqs::create_faq))
        .route(
            "/api/admin/faqs/:id",
            get(faqs::show_faq)
                .put(faqs::update_faq)
                .patch(faqs::update_faq)
                .delete(faqs::delete_faq),
        )
        .route("/api/admin/chat-logs", get(admin::list_chat_logs))
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/admin/chat-logs/data", get(admin::list_chat_logs))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin_api));

    let admin_pages = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/admin/knowledge-base", get(pages::knowledge_base))
        .route("/admin/chat-logs", get(pages::chat_logs))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin_page));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/docs/openapi.json", get(routes::docs::openapi_json))
        // Public pages
        .route("/", get(pages::home))
        .route("/chat", get(pages::chat))
        .route("/faqs", get(pages::faqs))
        .route("/login", get(pages::login))
        // Public knowledge base
        .route("/api/faqs", get(faqs::list_faqs))
        .route("/api/faqs/categories", get(faqs::list_categories))
        // Accounts
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/user", get(auth::current_user))
        .merge(chat_routes)
        .merge(admin_api)
        .merge(admin_pages)
        .with_state(state)
        .layer(middleware::trace_layer())
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
