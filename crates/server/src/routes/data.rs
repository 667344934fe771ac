use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use serde_json::Value;

use common::types::Message;
use service::checkin::{UserId, UserState};

use super::AppState;
use crate::errors::{ApiError, READ_FAILED, SAVE_FAILED};
use crate::observability;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Header value as the user id; missing, empty or non-UTF-8 is a 400.
fn user_id(headers: &HeaderMap, internal_msg: &'static str) -> Result<UserId, ApiError> {
    let raw = headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok());
    UserId::parse(raw).map_err(|e| ApiError::from_service(e, internal_msg))
}

/// An empty body counts as `{}`; the content type is not checked.
fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))
}

#[utoipa::path(
    get,
    path = "/api/data",
    tag = "data",
    params(("X-User-Id" = String, Header, description = "Caller-chosen user identifier")),
    responses(
        (status = 200, description = "User fields merged with sharedItems", body = crate::openapi::UserDataDoc),
        (status = 400, description = "Missing UserId", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Failed to read data", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn fetch(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserState>, ApiError> {
    let result = async {
        let user_id = user_id(&headers, READ_FAILED)?;
        state
            .checkins
            .fetch(&user_id)
            .await
            .map_err(|e| ApiError::from_service(e, READ_FAILED))
    }
    .await;
    observability::record("fetch", &result);
    result.map(Json)
}

#[utoipa::path(
    post,
    path = "/api/data",
    tag = "data",
    params(("X-User-Id" = String, Header, description = "Caller-chosen user identifier")),
    request_body = crate::openapi::UserDataDoc,
    responses(
        (status = 200, description = "Saved successfully", body = crate::openapi::SavedResponse),
        (status = 400, description = "Missing UserId or malformed body", body = crate::openapi::ErrorResponse),
        (status = 500, description = "Failed to save data", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn save(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Message>, ApiError> {
    let result = async {
        // header first: a missing id wins over a bad body
        let user_id = user_id(&headers, SAVE_FAILED)?;
        let payload = parse_body(&body)?;
        state
            .checkins
            .save(&user_id, payload)
            .await
            .map_err(|e| ApiError::from_service(e, SAVE_FAILED))
    }
    .await;
    observability::record("save", &result);
    result.map(|()| Json(Message { message: "Saved successfully" }))
}
