// src/handlers/print.rs

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::print::PrintSelection,
};

// POST /api/print
//
// Recebe a seleção (titulares e dependentes, cada um com seu layout) e
// devolve o documento de impressão pronto: páginas A4 com quatro
// carteirinhas cada. A ação é bloqueada se algum selecionado estiver sem
// layout — nunca sai impressão parcial.
#[utoipa::path(
    post,
    path = "/api/print",
    tag = "Impressão",
    request_body = PrintSelection,
    responses(
        (status = 200, description = "Documento de impressão", body = String, content_type = "text/html"),
        (status = 422, description = "Seleção vazia ou sem layout atribuído")
    ),
    security(("api_jwt" = []))
)]
pub async fn print_cards(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(selection): Json<PrintSelection>,
) -> Result<impl IntoResponse, ApiError> {
    let document = app_state
        .print_service
        .render_print_document(&selection)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Html(document))
}
