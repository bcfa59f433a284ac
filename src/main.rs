// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::{admin_guard, auth_guard};

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let associate_routes = Router::new()
        .route(
            "/",
            post(handlers::associates::create_associate)
                .get(handlers::associates::list_associates),
        )
        .route(
            "/{id}",
            get(handlers::associates::get_associate)
                .put(handlers::associates::update_associate)
                .delete(handlers::associates::delete_associate),
        )
        .route(
            "/{id}/dependents",
            post(handlers::associates::create_dependent),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dependent_routes = Router::new()
        .route(
            "/{id}",
            put(handlers::associates::update_dependent)
                .delete(handlers::associates::delete_dependent),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Editor de layouts e impressão: área administrativa.
    // O admin_guard roda depois do auth_guard (camada mais interna).
    let layout_routes = Router::new()
        .route(
            "/",
            get(handlers::layouts::list_layouts).post(handlers::layouts::create_layout),
        )
        .route(
            "/{id}",
            put(handlers::layouts::save_layout).delete(handlers::layouts::delete_layout),
        )
        .route("/{id}/duplicate", post(handlers::layouts::duplicate_layout))
        .route("/{id}/preview", get(handlers::layouts::preview_layout))
        .layer(axum_middleware::from_fn(admin_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let print_routes = Router::new()
        .route("/", post(handlers::print::print_cards))
        .layer(axum_middleware::from_fn(admin_guard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let photo_routes = Router::new()
        .route("/", post(handlers::photos::upload_photo))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ))
        // Leitura pública: as URLs resolvidas aparecem nos cartões impressos
        .route("/{reference}", get(handlers::photos::get_photo));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/associates", associate_routes)
        .nest("/api/dependents", dependent_routes)
        .nest("/api/layouts", layout_routes)
        .nest("/api/print", print_routes)
        .nest("/api/photos", photo_routes)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
