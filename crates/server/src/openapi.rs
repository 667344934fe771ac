use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct SavedResponse { pub message: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String }

/// Arbitrary user fields plus an optional `sharedItems` array.
#[derive(Serialize, ToSchema)]
pub struct UserDataDoc {
    #[serde(rename = "sharedItems")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub shared_items: Option<Vec<serde_json::Value>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::data::fetch,
        crate::routes::data::save,
    ),
    components(
        schemas(
            HealthResponse,
            SavedResponse,
            ErrorResponse,
            UserDataDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "data")
    )
)]
pub struct ApiDoc;
