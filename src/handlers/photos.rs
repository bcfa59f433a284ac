// src/handlers/photos.rs

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    services::storage::{process_image, CropRect},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub reference: String,
    pub url: String,
}

// POST /api/photos
//
// Upload multipart de foto de pessoa ou imagem de fundo do layout. O campo
// "file" carrega os bytes; o campo opcional "crop" traz o retângulo de
// recorte em JSON ({"x":0,"y":0,"width":100,"height":130}).
#[utoipa::path(
    post,
    path = "/api/photos",
    tag = "Fotos",
    responses(
        (status = 201, description = "Imagem gravada", body = UploadResponse),
        (status = 400, description = "Imagem ou recorte inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |app_err: AppError| app_err.to_api_error(&locale, &app_state.i18n_store);

    let mut bytes: Option<Vec<u8>> = None;
    let mut crop: Option<CropRect> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| to_api(AppError::InternalServerError(anyhow::anyhow!(e))))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| to_api(AppError::InternalServerError(anyhow::anyhow!(e))))?;
                bytes = Some(data.to_vec());
            }
            Some("crop") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| to_api(AppError::InvalidCrop))?;
                crop = Some(
                    serde_json::from_str(&text).map_err(|_| to_api(AppError::InvalidCrop))?,
                );
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| to_api(AppError::UnsupportedImage))?;

    // Valida o formato e aplica o recorte antes de gravar
    let (processed, content_type) = process_image(&bytes, crop).map_err(to_api)?;

    let reference = app_state
        .image_store
        .upload(processed, content_type)
        .await
        .map_err(to_api)?;
    let url = app_state
        .image_store
        .resolve(&reference)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::CREATED, Json(UploadResponse { reference, url })))
}

// GET /api/photos/{reference}
#[utoipa::path(
    get,
    path = "/api/photos/{reference}",
    tag = "Fotos",
    responses(
        (status = 200, description = "Bytes da imagem"),
        (status = 404, description = "Foto não encontrada")
    ),
    params(("reference" = String, Path, description = "Referência da imagem"))
)]
pub async fn get_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (bytes, content_type) = app_state
        .image_store
        .read(&reference)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
