use axum::Json;
use utoipa::OpenApi;

use crate::docs::ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
