//! Listing CRUD and browse handlers.

use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use friplass_core::{filter_and_sort, owned_by, Draft, FilterSpec, Listing};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{json_body, map_store_error, ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListingsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub favorites: Option<String>,
    /// Comma-separated ids; favorites live on the client.
    pub favorites_ids: Option<String>,
}

impl ListingsQuery {
    fn spec(&self) -> FilterSpec {
        FilterSpec::from_query(
            self.category.as_deref(),
            self.q.as_deref(),
            self.sort.as_deref(),
            self.favorites.as_deref(),
        )
    }

    fn favorite_ids(&self) -> HashSet<String> {
        self.favorites_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.q.is_none()
            && self.sort.is_none()
            && self.favorites.is_none()
            && self.favorites_ids.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MineQuery {
    #[serde(default)]
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct OkResponse {
    pub ok: bool,
}

/// `GET /listings`: the stored collection, or the browse view when any
/// filter parameter is given.
pub(super) async fn list_listings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListingsQuery>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let all = state
        .repo
        .list()
        .await
        .map_err(|e| map_store_error(req_id.0, e))?;

    if query.is_empty() {
        return Ok(Json(all));
    }

    let spec = query.spec();
    let favorites = query.favorite_ids();
    let shown = filter_and_sort(&all, &spec, &favorites)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(shown))
}

/// `GET /listings/mine?device_id=...`
pub(super) async fn list_my_listings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MineQuery>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let all = state
        .repo
        .list()
        .await
        .map_err(|e| map_store_error(req_id.0, e))?;
    Ok(Json(
        owned_by(&all, &query.device_id).into_iter().cloned().collect(),
    ))
}

pub(super) async fn get_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    state
        .repo
        .find(&id)
        .await
        .map(Json)
        .map_err(|e| map_store_error(req_id.0, e))
}

pub(super) async fn create_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Listing>), ApiError> {
    let draft = Draft::from_value(json_body(&req_id.0, body)?);
    let listing = state
        .repo
        .create(draft)
        .await
        .map_err(|e| map_store_error(req_id.0, e))?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub(super) async fn update_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Listing>, ApiError> {
    let patch = Draft::from_value(json_body(&req_id.0, body)?);
    state
        .repo
        .update(&id, patch)
        .await
        .map(Json)
        .map_err(|e| map_store_error(req_id.0, e))
}

pub(super) async fn delete_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    state
        .repo
        .delete(&id)
        .await
        .map_err(|e| map_store_error(req_id.0, e))?;
    Ok(Json(OkResponse { ok: true }))
}
