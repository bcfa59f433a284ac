// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Associados ---
        handlers::associates::create_associate,
        handlers::associates::list_associates,
        handlers::associates::get_associate,
        handlers::associates::update_associate,
        handlers::associates::delete_associate,

        // --- Dependentes ---
        handlers::associates::create_dependent,
        handlers::associates::update_dependent,
        handlers::associates::delete_dependent,

        // --- Layouts ---
        handlers::layouts::list_layouts,
        handlers::layouts::create_layout,
        handlers::layouts::save_layout,
        handlers::layouts::duplicate_layout,
        handlers::layouts::delete_layout,
        handlers::layouts::preview_layout,

        // --- Impressão ---
        handlers::print::print_cards,

        // --- Fotos ---
        handlers::photos::upload_photo,
        handlers::photos::get_photo,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Associados ---
            models::associates::Associate,
            models::associates::Dependent,
            handlers::associates::AssociatePayload,
            handlers::associates::DependentPayload,
            handlers::associates::AssociatesPage,

            // --- Layouts ---
            models::layout::Position,
            models::layout::Field,
            models::layout::Layout,
            models::layout::LayoutDeleteResponse,
            handlers::layouts::SaveLayoutPayload,

            // --- Impressão ---
            models::print::PrintSelection,

            // --- Fotos ---
            handlers::photos::UploadResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registro e login de operadores"),
        (name = "Associados", description = "Cadastro e pesquisa de associados"),
        (name = "Dependentes", description = "Dependentes de um associado"),
        (name = "Layouts", description = "Editor de layouts de carteirinha"),
        (name = "Impressão", description = "Composição do documento de impressão"),
        (name = "Fotos", description = "Upload e leitura de imagens"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
