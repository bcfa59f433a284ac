// src/handlers/layouts.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::layout::{Field, Layout, LayoutDeleteResponse, Position},
};

// O salvar do editor manda o molde completo: os nove pares de
// posição/visibilidade sempre presentes, nunca parciais.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveLayoutPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Layout Padrão")]
    pub title: String,

    pub background_image: Option<String>,

    pub photo_position: Position,
    pub name_position: Position,
    pub rg_position: Position,
    pub cpf_position: Position,
    pub role_position: Position,
    pub company_position: Position,
    pub association_date_position: Position,
    pub expiration_date_position: Position,
    pub dependent_name_position: Position,

    pub show_photo: bool,
    pub show_name: bool,
    pub show_rg: bool,
    pub show_cpf: bool,
    pub show_role: bool,
    pub show_company: bool,
    pub show_association_date: bool,
    pub show_expiration_date: bool,
    pub show_dependent_name: bool,
}

impl SaveLayoutPayload {
    // Monta o Layout saturando cada posição nos limites do cartão.
    fn into_layout(self, id: Uuid) -> Layout {
        let mut layout = Layout::new(id, self.title);
        layout.background_image = self.background_image;

        let positions = [
            (Field::Photo, self.photo_position, self.show_photo),
            (Field::Name, self.name_position, self.show_name),
            (Field::Rg, self.rg_position, self.show_rg),
            (Field::Cpf, self.cpf_position, self.show_cpf),
            (Field::Role, self.role_position, self.show_role),
            (Field::Company, self.company_position, self.show_company),
            (
                Field::AssociationDate,
                self.association_date_position,
                self.show_association_date,
            ),
            (
                Field::ExpirationDate,
                self.expiration_date_position,
                self.show_expiration_date,
            ),
            (
                Field::DependentName,
                self.dependent_name_position,
                self.show_dependent_name,
            ),
        ];
        for (field, position, visible) in positions {
            layout.set_position(field, position.x, position.y);
            layout.set_visibility(field, visible);
        }
        layout
    }
}

// GET /api/layouts
#[utoipa::path(
    get,
    path = "/api/layouts",
    tag = "Layouts",
    responses(
        (status = 200, description = "Coleção de layouts", body = Vec<Layout>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_layouts(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let layouts = app_state
        .layout_service
        .list()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(layouts)))
}

// POST /api/layouts
//
// Devolve um layout novo com geometria padrão e título sequencial. O
// registro só é persistido quando o operador salvar explicitamente.
#[utoipa::path(
    post,
    path = "/api/layouts",
    tag = "Layouts",
    responses(
        (status = 201, description = "Layout padrão criado (não persistido)", body = Layout)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_layout(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let layout = app_state
        .layout_service
        .new_layout()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(layout)))
}

// PUT /api/layouts/{id}
#[utoipa::path(
    put,
    path = "/api/layouts/{id}",
    tag = "Layouts",
    request_body = SaveLayoutPayload,
    responses(
        (status = 200, description = "Layout salvo", body = Layout),
        (status = 400, description = "Dados inválidos")
    ),
    params(("id" = Uuid, Path, description = "ID do layout")),
    security(("api_jwt" = []))
)]
pub async fn save_layout(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveLayoutPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let saved = app_state
        .layout_service
        .save(user.id, payload.into_layout(id))
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(saved)))
}

// POST /api/layouts/{id}/duplicate
#[utoipa::path(
    post,
    path = "/api/layouts/{id}/duplicate",
    tag = "Layouts",
    responses(
        (status = 201, description = "Layout duplicado", body = Layout),
        (status = 404, description = "Layout não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do layout")),
    security(("api_jwt" = []))
)]
pub async fn duplicate_layout(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let copy = app_state
        .layout_service
        .duplicate(user.id, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(copy)))
}

// DELETE /api/layouts/{id}
#[utoipa::path(
    delete,
    path = "/api/layouts/{id}",
    tag = "Layouts",
    responses(
        (status = 200, description = "Layout excluído", body = LayoutDeleteResponse),
        (status = 409, description = "Último layout não pode ser excluído")
    ),
    params(("id" = Uuid, Path, description = "ID do layout")),
    security(("api_jwt" = []))
)]
pub async fn delete_layout(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let remaining = app_state
        .layout_service
        .delete(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(remaining)))
}

// GET /api/layouts/{id}/preview
//
// O cartão do editor com dados de amostra e as datas de hoje.
#[utoipa::path(
    get,
    path = "/api/layouts/{id}/preview",
    tag = "Layouts",
    responses(
        (status = 200, description = "Preview da carteirinha", body = String, content_type = "text/html"),
        (status = 404, description = "Layout não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do layout")),
    security(("api_jwt" = []))
)]
pub async fn preview_layout(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let layout = app_state
        .layout_service
        .get(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let html = app_state
        .card_service
        .render_preview(&layout, Utc::now().date_naive());

    Ok(Html(html))
}
