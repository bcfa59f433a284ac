// src/models/print.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::associates::{Associate, Dependent};

// A seleção de impressão: quem imprimir e com qual layout. Associados e
// dependentes são conjuntos independentes — selecionar um dependente não
// seleciona o titular, e desmarcar o titular não desmarca os dependentes
// já escolhidos. Os mapas de atribuição são transitórios e nunca
// persistidos.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintSelection {
    pub associates: Vec<Uuid>,
    pub dependents: Vec<Uuid>,
    pub associate_layouts: HashMap<Uuid, Uuid>,
    pub dependent_layouts: HashMap<Uuid, Uuid>,
}

impl PrintSelection {
    pub fn is_empty(&self) -> bool {
        self.associates.is_empty() && self.dependents.is_empty()
    }

    // Marca/desmarca um associado. Desmarcar remove apenas a carteirinha
    // dele da fila (e sua atribuição de layout); a seleção dos dependentes
    // não é tocada.
    pub fn toggle_associate(&mut self, id: Uuid) {
        if let Some(index) = self.associates.iter().position(|&a| a == id) {
            self.associates.remove(index);
            self.associate_layouts.remove(&id);
        } else {
            self.associates.push(id);
        }
    }

    pub fn toggle_dependent(&mut self, id: Uuid) {
        if let Some(index) = self.dependents.iter().position(|&d| d == id) {
            self.dependents.remove(index);
            self.dependent_layouts.remove(&id);
        } else {
            self.dependents.push(id);
        }
    }

    pub fn assign_associate_layout(&mut self, id: Uuid, layout_id: Uuid) {
        self.associate_layouts.insert(id, layout_id);
    }

    pub fn assign_dependent_layout(&mut self, id: Uuid, layout_id: Uuid) {
        self.dependent_layouts.insert(id, layout_id);
    }

    // A impressão só libera quando todo selecionado tem layout atribuído;
    // nunca sai saída parcial.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.is_empty() {
            return Err(AppError::EmptySelection);
        }
        let associates_ok = self
            .associates
            .iter()
            .all(|id| self.associate_layouts.contains_key(id));
        let dependents_ok = self
            .dependents
            .iter()
            .all(|id| self.dependent_layouts.contains_key(id));
        if associates_ok && dependents_ok {
            Ok(())
        } else {
            Err(AppError::IncompleteSelection)
        }
    }
}

// Estado da foto na hora de desenhar o cartão. "Sem foto" e "não foi
// possível carregar" são estados distintos e nunca se confundem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoState {
    Missing,
    Resolved(String),
    Failed,
}

// Os dados já prontos para o cartão, independentes de quem os originou.
// O slot "name" de um dependente recebe o nome do titular; o nome do
// próprio dependente vai no slot "dependent_name".
#[derive(Debug, Clone)]
pub struct CardData {
    pub name_slot: String,
    pub dependent_name_slot: Option<String>,
    pub rg: String,
    pub cpf: String,
    pub role: Option<String>,
    pub company: String,
    pub association_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub photo: PhotoState,
}

impl CardData {
    pub fn for_associate(associate: &Associate, photo: PhotoState) -> Self {
        Self {
            name_slot: associate.name.to_uppercase(),
            dependent_name_slot: None,
            rg: associate.rg.to_uppercase(),
            cpf: associate.cpf.clone(),
            role: Some(associate.role.to_uppercase()),
            company: associate.company.to_uppercase(),
            association_date: associate.association_date,
            expiration_date: associate.expiration_date,
            photo,
        }
    }

    pub fn for_dependent(dependent: &Dependent, associate_name: &str, photo: PhotoState) -> Self {
        Self {
            name_slot: associate_name.to_uppercase(),
            dependent_name_slot: Some(dependent.name.to_uppercase()),
            rg: dependent.rg.to_uppercase(),
            cpf: dependent.cpf.clone(),
            // Dependente não tem cargo
            role: None,
            company: dependent.company.to_uppercase(),
            association_date: dependent.association_date,
            expiration_date: dependent.expiration_date,
            photo,
        }
    }

    // Conteúdo de amostra do editor: nenhum dado real, datas de hoje.
    pub fn sample(today: NaiveDate) -> Self {
        Self {
            name_slot: "Nome do Associado".to_string(),
            dependent_name_slot: Some("Nome do Dependente".to_string()),
            rg: "00.000.000-0".to_string(),
            cpf: "000.000.000-00".to_string(),
            role: Some("Exemplo".to_string()),
            company: "Exemplo".to_string(),
            association_date: Some(today),
            expiration_date: Some(today),
            photo: PhotoState::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection_with(associates: &[Uuid], dependents: &[Uuid]) -> PrintSelection {
        PrintSelection {
            associates: associates.to_vec(),
            dependents: dependents.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_desmarcar_titular_preserva_dependentes() {
        let associate = Uuid::new_v4();
        let dependent = Uuid::new_v4();
        let mut selection = PrintSelection::default();

        selection.toggle_associate(associate);
        selection.toggle_dependent(dependent);
        selection.assign_associate_layout(associate, Uuid::new_v4());

        selection.toggle_associate(associate);

        assert!(selection.associates.is_empty());
        assert!(selection.associate_layouts.is_empty());
        assert_eq!(selection.dependents, vec![dependent]);
    }

    #[test]
    fn test_selecionar_dependente_nao_seleciona_titular() {
        let mut selection = PrintSelection::default();
        selection.toggle_dependent(Uuid::new_v4());
        assert!(selection.associates.is_empty());
        assert_eq!(selection.dependents.len(), 1);
    }

    #[test]
    fn test_validacao_bloqueia_selecao_vazia() {
        let selection = PrintSelection::default();
        assert!(matches!(selection.validate(), Err(AppError::EmptySelection)));
    }

    #[test]
    fn test_validacao_exige_layout_para_todos() {
        let a = Uuid::new_v4();
        let d = Uuid::new_v4();
        let mut selection = selection_with(&[a], &[d]);

        assert!(matches!(
            selection.validate(),
            Err(AppError::IncompleteSelection)
        ));

        selection.assign_associate_layout(a, Uuid::new_v4());
        assert!(matches!(
            selection.validate(),
            Err(AppError::IncompleteSelection)
        ));

        selection.assign_dependent_layout(d, Uuid::new_v4());
        assert!(selection.validate().is_ok());
    }
}
