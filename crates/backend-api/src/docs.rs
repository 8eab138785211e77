use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(title = "GSU SmartAssist API"),
    paths(
        crate::routes::health::health_check,
        crate::routes::chat::send_message,
        crate::routes::faqs::list_faqs,
        crate::routes::faqs::list_categories,
        crate::routes::faqs::create_faq,
        crate::routes::faqs::show_faq,
        crate::routes::faqs::update_faq,
        crate::routes::faqs::delete_faq,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::current_user,
        crate::routes::admin::list_chat_logs,
        crate::routes::admin::dashboard
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::chat::ChatRequest,
            crate::routes::chat::ChatResponse,
            crate::routes::faqs::FaqResponse,
            crate::routes::faqs::CreateFaqBody,
            crate::routes::faqs::UpdateFaqBody,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::SessionResponse,
            crate::routes::auth::UserResponse,
            crate::routes::admin::ChatLogResponse,
            crate::routes::admin::DashboardResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Chat", description = "Asking the assistant"),
        (name = "FAQs", description = "Public knowledge base"),
        (name = "Auth", description = "Accounts and sessions"),
        (name = "Admin", description = "Knowledge base management and chat review")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
