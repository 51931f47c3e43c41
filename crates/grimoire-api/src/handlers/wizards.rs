//! Wizard HTTP handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};

use grimoire_core::defaults::WIZARD_LIST_PATH;
use grimoire_core::{CreateWizardRequest, PageRequest, UpdateWizardRequest, Wizard, WizardDetail};

use crate::{parse_body, ApiError, AppState};

/// List one page of wizards.
///
/// `page` is a zero-based index; anything but a non-negative integer means
/// 0, and only the first `page` pair counts when it is repeated. Responds
/// with `{count, data}` and a `Link` header carrying next, prev and last
/// page URLs.
pub async fn list_wizards(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ApiError> {
    let raw_page = query
        .iter()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str());
    let request = PageRequest::parse(raw_page);
    let (page, links) = state.wizards.list(request).await?;

    let link = links.to_header_value(&state.public_url, WIZARD_LIST_PATH);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::LINK,
        HeaderValue::from_str(&link)
            .map_err(|e| ApiError::Internal(format!("Invalid Link header: {}", e)))?,
    );

    Ok((headers, Json(page)))
}

/// Create a wizard and register it with its category.
///
/// # Returns
/// - 200 OK with the wizard
/// - 400 Bad Request for a missing name, content or categoryId
/// - 404 Not Found if the category does not exist
/// - 409 Conflict if the name is taken
pub async fn create_wizard(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Wizard>, ApiError> {
    let req: CreateWizardRequest = parse_body(&body)?;
    Ok(Json(state.wizards.create(req).await?))
}

/// Get a wizard with its category expanded.
pub async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WizardDetail>, ApiError> {
    Ok(Json(state.wizards.get(&id).await?))
}

pub async fn update_wizard(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Wizard>, ApiError> {
    let req: UpdateWizardRequest = parse_body(&body)?;
    Ok(Json(state.wizards.update(&id, req).await?))
}

pub async fn delete_wizard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.wizards.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT and DELETE on the collection need an id.
pub async fn reject_collection_write() -> ApiError {
    ApiError::BadRequest("A wizard id is required".to_string())
}
