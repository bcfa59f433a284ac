// src/handlers/associates.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::associates::Associate,
    services::associate_service::{AssociateInput, DependentInput},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociatePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "12.345.678-9")]
    pub rg: String,

    #[validate(custom(function = "crate::common::documents::validate_cpf"))]
    #[schema(example = "529.982.247-25")]
    pub cpf: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Motorista")]
    pub role: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Transportes Silva")]
    pub company: String,

    #[schema(value_type = String, format = Date, example = "2024-03-15")]
    pub association_date: NaiveDate,

    // Quando ausente, a validade padrão é um ano após a associação
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-15")]
    pub expiration_date: Option<NaiveDate>,

    pub photo_url: Option<String>,
}

impl From<AssociatePayload> for AssociateInput {
    fn from(payload: AssociatePayload) -> Self {
        AssociateInput {
            name: payload.name,
            rg: payload.rg,
            cpf: payload.cpf,
            role: payload.role,
            company: payload.company,
            association_date: payload.association_date,
            expiration_date: payload.expiration_date,
            photo_url: payload.photo_url,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DependentPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "João da Silva")]
    pub name: String,

    #[validate(length(min = 1, message = "required"))]
    pub rg: String,

    #[validate(custom(function = "crate::common::documents::validate_cpf"))]
    pub cpf: String,

    // Empresa e datas ausentes são herdadas do titular no cadastro
    pub company: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub association_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date)]
    pub expiration_date: Option<NaiveDate>,

    pub photo_url: Option<String>,
}

impl From<DependentPayload> for DependentInput {
    fn from(payload: DependentPayload) -> Self {
        DependentInput {
            name: payload.name,
            rg: payload.rg,
            cpf: payload.cpf,
            company: payload.company,
            association_date: payload.association_date,
            expiration_date: payload.expiration_date,
            photo_url: payload.photo_url,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAssociatesQuery {
    // Busca por nome, CPF ou RG
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociatesPage {
    pub items: Vec<Associate>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

// =============================================================================
//  ASSOCIADOS
// =============================================================================

// POST /api/associates
#[utoipa::path(
    post,
    path = "/api/associates",
    tag = "Associados",
    request_body = AssociatePayload,
    responses(
        (status = 201, description = "Associado cadastrado", body = Associate),
        (status = 409, description = "CPF ou RG já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_associate(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<AssociatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let associate = app_state
        .associate_service
        .register(user.id, payload.into())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(associate)))
}

// GET /api/associates
#[utoipa::path(
    get,
    path = "/api/associates",
    tag = "Associados",
    params(ListAssociatesQuery),
    responses(
        (status = 200, description = "Listagem paginada com dependentes", body = AssociatesPage)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_associates(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListAssociatesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.unwrap_or(0).max(0);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    let (items, total) = app_state
        .associate_service
        .list(query.search.as_deref(), page, per_page)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(AssociatesPage {
            items,
            total,
            page,
            per_page,
        }),
    ))
}

// GET /api/associates/{id}
#[utoipa::path(
    get,
    path = "/api/associates/{id}",
    tag = "Associados",
    responses(
        (status = 200, description = "Associado com dependentes", body = Associate),
        (status = 404, description = "Associado não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do associado")),
    security(("api_jwt" = []))
)]
pub async fn get_associate(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let associate = app_state
        .associate_service
        .get(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(associate)))
}

// PUT /api/associates/{id}
#[utoipa::path(
    put,
    path = "/api/associates/{id}",
    tag = "Associados",
    request_body = AssociatePayload,
    responses(
        (status = 200, description = "Associado atualizado", body = Associate),
        (status = 404, description = "Associado não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do associado")),
    security(("api_jwt" = []))
)]
pub async fn update_associate(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssociatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let associate = app_state
        .associate_service
        .update(id, payload.into())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(associate)))
}

// DELETE /api/associates/{id}
#[utoipa::path(
    delete,
    path = "/api/associates/{id}",
    tag = "Associados",
    responses(
        (status = 204, description = "Associado removido (dependentes em cascata)"),
        (status = 404, description = "Associado não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do associado")),
    security(("api_jwt" = []))
)]
pub async fn delete_associate(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .associate_service
        .delete(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  DEPENDENTES
// =============================================================================

// POST /api/associates/{id}/dependents
#[utoipa::path(
    post,
    path = "/api/associates/{id}/dependents",
    tag = "Dependentes",
    request_body = DependentPayload,
    responses(
        (status = 201, description = "Dependente cadastrado", body = crate::models::associates::Dependent),
        (status = 404, description = "Associado não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do associado titular")),
    security(("api_jwt" = []))
)]
pub async fn create_dependent(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<DependentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let dependent = app_state
        .associate_service
        .add_dependent(id, payload.into())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(dependent)))
}

// PUT /api/dependents/{id}
#[utoipa::path(
    put,
    path = "/api/dependents/{id}",
    tag = "Dependentes",
    request_body = DependentPayload,
    responses(
        (status = 200, description = "Dependente atualizado", body = crate::models::associates::Dependent),
        (status = 404, description = "Dependente não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do dependente")),
    security(("api_jwt" = []))
)]
pub async fn update_dependent(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<DependentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let dependent = app_state
        .associate_service
        .update_dependent(id, payload.into())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(dependent)))
}

// DELETE /api/dependents/{id}
#[utoipa::path(
    delete,
    path = "/api/dependents/{id}",
    tag = "Dependentes",
    responses(
        (status = 204, description = "Dependente removido"),
        (status = 404, description = "Dependente não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do dependente")),
    security(("api_jwt" = []))
)]
pub async fn delete_dependent(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .associate_service
        .delete_dependent(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
