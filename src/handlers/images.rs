use axum::{
    extract::{RawQuery, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::filter::PageRequest;
use crate::middleware::JSON_CONTENT_TYPE;
use crate::server::AppState;

/// GET /images - one page of images, in the order the store returned them
pub async fn list_images(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let page = PageRequest::from_query(query.as_deref(), &state.paging);

    let images = state
        .images
        .get_images(&page)
        .await
        .map_err(|e| ApiError::internal("cannot get images", e))?;

    let body = serde_json::to_vec(&images).map_err(|e| ApiError::internal("cannot encode", e))?;

    Ok(([(CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response())
}
