use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use smartassist_database::{FaqEntry, FaqFilter, UpdateFaqRequest};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::{
    middleware::CurrentAdmin,
    services::faq::{self as faq_service, FaqDraft},
    ApiError, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct FaqResponse {
    pub id: i64,
    pub category: String,
    pub question: String,
    pub answer: String,
    pub keywords: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<FaqEntry> for FaqResponse {
    fn from(entry: FaqEntry) -> Self {
        Self {
            id: entry.id,
            category: entry.category,
            question: entry.question,
            answer: entry.answer,
            keywords: entry.keywords,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FaqQuery {
    /// Exact category name.
    pub category: Option<String>,
    /// Case-insensitive text contained in the category, question, answer or keywords.
    pub search: Option<String>,
}

impl From<FaqQuery> for FaqFilter {
    fn from(query: FaqQuery) -> Self {
        Self {
            category: query.category.filter(|value| !value.trim().is_empty()),
            search: query.search.filter(|value| !value.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFaqBody {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    /// Comma separated phrases that should also select this entry.
    #[serde(default)]
    pub keywords: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFaqBody {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    /// `null` or an empty string clears the keywords.
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<String>)]
    pub keywords: Option<Option<String>>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl UpdateFaqBody {
    fn into_update(self) -> UpdateFaqRequest {
        UpdateFaqRequest {
            category: self.category,
            question: self.question,
            answer: self.answer,
            keywords: self.keywords,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/faqs",
    tag = "FAQs",
    params(FaqQuery),
    responses(
        (status = 200, description = "FAQ entries ordered by category", body = [FaqResponse])
    )
)]
pub async fn list_faqs(
    State(state): State<AppState>,
    Query(query): Query<FaqQuery>,
) -> Result<Json<Vec<FaqResponse>>, ApiError> {
    let entries = faq_service::list(state.db_pool(), &query.into()).await?;
    Ok(Json(entries.into_iter().map(FaqResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/faqs/categories",
    tag = "FAQs",
    responses(
        (status = 200, description = "Distinct FAQ categories", body = [String])
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(faq_service::categories(state.db_pool()).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/faqs",
    tag = "Admin",
    security(("bearerAuth" = [])),
    request_body = CreateFaqBody,
    responses(
        (status = 201, description = "FAQ created", body = FaqResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access only", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid FAQ data", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_faq(
    State(state): State<AppState>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Json(payload): Json<CreateFaqBody>,
) -> Result<(StatusCode, Json<FaqResponse>), ApiError> {
    let draft = FaqDraft {
        category: payload.category,
        question: payload.question,
        answer: payload.answer,
        keywords: payload.keywords,
    };
    let entry = faq_service::create(state.db_pool(), draft).await?;
    info!(admin = %admin.email, faq = entry.id, "faq created");

    Ok((StatusCode::CREATED, Json(entry.into())))
}

#[utoipa::path(
    get,
    path = "/api/admin/faqs/{id}",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "FAQ id")),
    responses(
        (status = 200, description = "FAQ entry", body = FaqResponse),
        (status = 404, description = "FAQ not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn show_faq(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FaqResponse>, ApiError> {
    Ok(Json(faq_service::find(state.db_pool(), id).await?.into()))
}

#[utoipa::path(
    put,
    path = "/api/admin/faqs/{id}",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "FAQ id")),
    request_body = UpdateFaqBody,
    responses(
        (status = 200, description = "FAQ updated", body = FaqResponse),
        (status = 404, description = "FAQ not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Blank field in update", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_faq(
    State(state): State<AppState>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateFaqBody>,
) -> Result<Json<FaqResponse>, ApiError> {
    let entry = faq_service::update(state.db_pool(), id, payload.into_update()).await?;
    info!(admin = %admin.email, faq = id, "faq updated");

    Ok(Json(entry.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admin/faqs/{id}",
    tag = "Admin",
    security(("bearerAuth" = [])),
    params(("id" = i64, Path, description = "FAQ id")),
    responses(
        (status = 204, description = "FAQ deleted"),
        (status = 404, description = "FAQ not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_faq(
    State(state): State<AppState>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    faq_service::delete(state.db_pool(), id).await?;
    info!(admin = %admin.email, faq = id, "faq deleted");

    Ok(StatusCode::NO_CONTENT)
}
