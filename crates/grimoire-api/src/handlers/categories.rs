//! Category HTTP handlers.
//!
//! Bodies are read as raw bytes and decoded with [`parse_body`], so an
//! empty body is an empty request and malformed JSON is a 400 in the usual
//! error shape.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use grimoire_core::{Category, CreateCategoryRequest, UpdateCategoryRequest};

use crate::{parse_body, ApiError, AppState};

/// Create a category.
///
/// # Returns
/// - 200 OK with the category
/// - 400 Bad Request if `title` is missing or blank
/// - 409 Conflict if the title is taken
pub async fn create_category(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Category>, ApiError> {
    let req: CreateCategoryRequest = parse_body(&body)?;
    let category = state.categories.create(req).await?;
    Ok(Json(category))
}

/// Get a category by id. Malformed ids are 404.
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.categories.get(&id).await?))
}

/// Partially update a category.
///
/// # Returns
/// - 200 OK with the updated category
/// - 400 Bad Request for a blank title
/// - 404 Not Found
/// - 409 Conflict if the new title is taken
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Category>, ApiError> {
    let req: UpdateCategoryRequest = parse_body(&body)?;
    Ok(Json(state.categories.update(&id, req).await?))
}

/// Delete a category.
///
/// # Returns
/// - 204 No Content
/// - 404 Not Found
/// - 409 Conflict under the `restrict` policy while wizards remain
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.categories.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
