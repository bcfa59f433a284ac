// src/services/layout_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LayoutRepository,
    models::layout::{Layout, LayoutCollection, LayoutDeleteResponse},
};

// Media as operações da coleção de layouts contra a persistência. As regras
// de seleção e o invariante de coleção nunca-vazia moram em
// LayoutCollection; aqui decidimos o que vai ao banco e quando.
#[derive(Clone)]
pub struct LayoutService {
    repo: LayoutRepository,
}

impl LayoutService {
    pub fn new(repo: LayoutRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Layout>, AppError> {
        Ok(LayoutCollection::from_store(self.repo.list().await?).into_layouts())
    }

    pub async fn get(&self, id: Uuid) -> Result<Layout, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::LayoutNotFound)
    }

    // Um layout novo com geometria padrão e título sequencial. Não é
    // persistido: só vai ao banco no salvar explícito do operador.
    pub async fn new_layout(&self) -> Result<Layout, AppError> {
        let mut collection = LayoutCollection::from_store(self.repo.list().await?);
        Ok(collection.add().clone())
    }

    // Upsert: insere quando o id é novo, sobrescreve quando já existe.
    // Última escrita vence em edições concorrentes do mesmo id.
    pub async fn save(&self, user_id: Uuid, mut layout: Layout) -> Result<Layout, AppError> {
        layout.user_id = Some(user_id);
        self.repo.upsert(&layout).await
    }

    // Duplica o layout dado: a coleção local só muda depois que a
    // persistência confirmar a cópia.
    pub async fn duplicate(&self, user_id: Uuid, id: Uuid) -> Result<Layout, AppError> {
        let mut collection = LayoutCollection::from_store(self.repo.list().await?);
        let index = collection.index_of(id).ok_or(AppError::LayoutNotFound)?;
        collection.select(index);

        let copy = collection.duplicate_current(Uuid::new_v4(), Some(user_id));
        let saved = self.repo.upsert(&copy).await?;
        collection.append_selected(saved.clone());

        tracing::info!("📋 Layout {} duplicado como {}", id, saved.id);
        Ok(saved)
    }

    // Exclui e devolve a coleção restante com a nova seleção. A regra do
    // único layout decide antes de qualquer chamada ao banco.
    pub async fn delete(&self, id: Uuid) -> Result<LayoutDeleteResponse, AppError> {
        let mut collection = LayoutCollection::from_store(self.repo.list().await?);
        let index = collection.index_of(id).ok_or(AppError::LayoutNotFound)?;
        collection.select(index);

        let removed = collection.remove(index)?;
        self.repo.delete(removed.id).await?;

        Ok(LayoutDeleteResponse {
            selected_index: collection.current_index(),
            layouts: collection.into_layouts(),
        })
    }
}
