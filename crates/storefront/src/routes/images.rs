//! Item image handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use bazaar_core::{ImageId, ItemId};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::blob;
use crate::services::ImageService;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    /// Base64-encoded payloads in upload order.
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: ImageId,
}

fn item_id(raw: &str) -> Result<ItemId> {
    ItemId::parse(raw).map_err(|e| AppError::BadRequest(format!("item_id: {e}")))
}

/// `GET /images/{item_id}`
pub async fn item_images(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ImagesResponse>> {
    let images = ImageService::new(state.pool())
        .item_images(item_id(&raw_id)?)
        .await?;
    Ok(Json(ImagesResponse {
        images: blob::encode_all(&images),
    }))
}

/// `GET /item/{item_id}/image`
pub async fn item_image(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse> {
    let image = ImageService::new(state.pool())
        .item_image(item_id(&raw_id)?)
        .await?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes))
}

/// `POST /item/{item_id}/images` with the raw image as the body.
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let id = ImageService::new(state.pool())
        .upload(caller, item_id(&raw_id)?, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(UploadResponse { id })))
}
