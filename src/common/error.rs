// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("CPF já cadastrado")]
    CpfAlreadyExists,

    #[error("RG já cadastrado")]
    RgAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Área restrita a administradores")]
    AdminOnly,

    #[error("Associado não encontrado")]
    AssociateNotFound,

    #[error("Dependente não encontrado")]
    DependentNotFound,

    #[error("Layout não encontrado")]
    LayoutNotFound,

    // O editor nunca pode ficar sem layouts
    #[error("Não é possível excluir o único layout existente")]
    LastLayout,

    #[error("Nenhuma carteirinha selecionada")]
    EmptySelection,

    #[error("Item selecionado sem layout atribuído")]
    IncompleteSelection,

    #[error("Formato de imagem não suportado")]
    UnsupportedImage,

    #[error("Área de recorte inválida")]
    InvalidCrop,

    #[error("Foto não encontrada")]
    PhotoNotFound,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Código estável usado para buscar a mensagem traduzida no I18nStore.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::CpfAlreadyExists => "cpf_already_exists",
            AppError::RgAlreadyExists => "rg_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::AdminOnly => "admin_only",
            AppError::AssociateNotFound => "associate_not_found",
            AppError::DependentNotFound => "dependent_not_found",
            AppError::LayoutNotFound => "layout_not_found",
            AppError::LastLayout => "last_layout",
            AppError::EmptySelection => "empty_selection",
            AppError::IncompleteSelection => "incomplete_selection",
            AppError::UnsupportedImage => "unsupported_image",
            AppError::InvalidCrop => "invalid_crop",
            AppError::PhotoNotFound => "photo_not_found",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => "internal_error",
            AppError::JwtError(_) => "invalid_token",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::UnsupportedImage
            | AppError::InvalidCrop => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists
            | AppError::CpfAlreadyExists
            | AppError::RgAlreadyExists
            | AppError::LastLayout => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::JwtError(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::AdminOnly => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::AssociateNotFound
            | AppError::DependentNotFound
            | AppError::LayoutNotFound
            | AppError::PhotoNotFound => StatusCode::NOT_FOUND,
            AppError::EmptySelection | AppError::IncompleteSelection => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Converte para a resposta HTTP localizada. Erros de validação carregam
    // os detalhes por campo; erros internos são logados aqui, no limite.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        if let AppError::ValidationError(errors) = self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            return ApiError {
                status: StatusCode::BAD_REQUEST,
                message: store.message(self.code(), &locale.0),
                details: Some(details),
            };
        }

        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        ApiError {
            status: self.status(),
            message: store.message(self.code(), &locale.0),
            details: None,
        }
    }
}

// A resposta de erro já pronta para ir para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<std::collections::HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => Json(json!({ "error": self.message, "details": details })),
            None => Json(json!({ "error": self.message })),
        };
        (self.status, body).into_response()
    }
}

// Middlewares e extratores retornam AppError direto; a mensagem sai em pt,
// o idioma do produto.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale("pt".to_string()), &I18nStore::new())
            .into_response()
    }
}
