// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{AssociateRepository, LayoutRepository, UserRepository},
    services::{
        associate_service::AssociateService,
        auth::AuthService,
        card_service::CardService,
        layout_service::LayoutService,
        print_service::PrintService,
        storage::{ImageStore, LocalImageStore},
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub associate_service: AssociateService,
    pub layout_service: LayoutService,
    pub card_service: CardService,
    pub print_service: PrintService,
    pub image_store: Arc<dyn ImageStore>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        // Onde as fotos e imagens de fundo ficam guardadas
        let media_dir = env::var("MEDIA_DIR").unwrap_or_else(|_| "./media".to_string());
        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let associate_repo = AssociateRepository::new(db_pool.clone());
        let layout_repo = LayoutRepository::new(db_pool.clone());

        let image_store: Arc<dyn ImageStore> =
            Arc::new(LocalImageStore::new(media_dir.into(), public_base_url));

        let auth_service = AuthService::new(user_repo, jwt_secret);
        let associate_service = AssociateService::new(associate_repo.clone());
        let layout_service = LayoutService::new(layout_repo.clone());
        let card_service = CardService::new();
        let print_service = PrintService::new(associate_repo, layout_repo, image_store.clone());

        Ok(Self {
            db_pool,
            i18n_store: I18nStore::new(),
            auth_service,
            associate_service,
            layout_service,
            card_service,
            print_service,
            image_store,
        })
    }
}
