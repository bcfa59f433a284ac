// src/models/layout.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// Dimensões fixas da carteirinha, em pixels na escala 1:1 de impressão.
pub const CARD_WIDTH: i32 = 825;
pub const CARD_HEIGHT: i32 = 260;

// Coordenada dentro do espaço da carteirinha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ZERO: Position = Position { x: 0, y: 0 };

    // Coordenadas fora da faixa são sempre saturadas nos limites do
    // cartão, nunca descartadas.
    pub fn clamped(x: i32, y: i32) -> Self {
        Self {
            x: x.clamp(0, CARD_WIDTH),
            y: y.clamp(0, CARD_HEIGHT),
        }
    }
}

// O banco pode devolver a posição como objeto JSONB nativo ou como string
// JSON, dependendo de como a linha foi gravada. Esta função aceita as duas
// formas e sempre produz a forma canônica; lixo vira {0,0}.
pub fn plain_to_position(value: &Value) -> Position {
    match value {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed) => object_to_position(&parsed),
            Err(_) => Position::ZERO,
        },
        other => object_to_position(other),
    }
}

fn object_to_position(value: &Value) -> Position {
    let x = value.get("x").and_then(Value::as_i64).unwrap_or(0) as i32;
    let y = value.get("y").and_then(Value::as_i64).unwrap_or(0) as i32;
    Position::clamped(x, y)
}

// A gravação sempre emite a forma estruturada, nunca string.
pub fn position_to_plain(position: Position) -> Value {
    json!({ "x": position.x, "y": position.y })
}

// Conjunto fechado de campos posicionáveis. A ordem de ALL é a ordem de
// desenho: campos posteriores sobrepõem os anteriores na mesma coordenada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Photo,
    Name,
    Rg,
    Cpf,
    Role,
    Company,
    AssociationDate,
    ExpirationDate,
    DependentName,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Photo,
        Field::Name,
        Field::Rg,
        Field::Cpf,
        Field::Role,
        Field::Company,
        Field::AssociationDate,
        Field::ExpirationDate,
        Field::DependentName,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Field::Photo => "photo",
            Field::Name => "name",
            Field::Rg => "rg",
            Field::Cpf => "cpf",
            Field::Role => "role",
            Field::Company => "company",
            Field::AssociationDate => "association_date",
            Field::ExpirationDate => "expiration_date",
            Field::DependentName => "dependent_name",
        }
    }
}

// O molde da carteirinha: uma posição e um flag de visibilidade por campo,
// sempre os nove pares presentes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub id: Uuid,
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

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Option<Uuid>,
}

impl Layout {
    // Layout recém-criado: tudo em {0,0} e oculto.
    pub fn new(id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            background_image: None,
            photo_position: Position::ZERO,
            name_position: Position::ZERO,
            rg_position: Position::ZERO,
            cpf_position: Position::ZERO,
            role_position: Position::ZERO,
            company_position: Position::ZERO,
            association_date_position: Position::ZERO,
            expiration_date_position: Position::ZERO,
            dependent_name_position: Position::ZERO,
            show_photo: false,
            show_name: false,
            show_rg: false,
            show_cpf: false,
            show_role: false,
            show_company: false,
            show_association_date: false,
            show_expiration_date: false,
            show_dependent_name: false,
            created_at: now,
            updated_at: now,
            user_id: None,
        }
    }

    pub fn position(&self, field: Field) -> Position {
        match field {
            Field::Photo => self.photo_position,
            Field::Name => self.name_position,
            Field::Rg => self.rg_position,
            Field::Cpf => self.cpf_position,
            Field::Role => self.role_position,
            Field::Company => self.company_position,
            Field::AssociationDate => self.association_date_position,
            Field::ExpirationDate => self.expiration_date_position,
            Field::DependentName => self.dependent_name_position,
        }
    }

    pub fn visible(&self, field: Field) -> bool {
        match field {
            Field::Photo => self.show_photo,
            Field::Name => self.show_name,
            Field::Rg => self.show_rg,
            Field::Cpf => self.show_cpf,
            Field::Role => self.show_role,
            Field::Company => self.show_company,
            Field::AssociationDate => self.show_association_date,
            Field::ExpirationDate => self.show_expiration_date,
            Field::DependentName => self.show_dependent_name,
        }
    }

    // Edição de posição: os dois eixos sempre presentes, saturados na faixa.
    pub fn set_position(&mut self, field: Field, x: i32, y: i32) {
        let position = Position::clamped(x, y);
        match field {
            Field::Photo => self.photo_position = position,
            Field::Name => self.name_position = position,
            Field::Rg => self.rg_position = position,
            Field::Cpf => self.cpf_position = position,
            Field::Role => self.role_position = position,
            Field::Company => self.company_position = position,
            Field::AssociationDate => self.association_date_position = position,
            Field::ExpirationDate => self.expiration_date_position = position,
            Field::DependentName => self.dependent_name_position = position,
        }
    }

    pub fn set_visibility(&mut self, field: Field, visible: bool) {
        match field {
            Field::Photo => self.show_photo = visible,
            Field::Name => self.show_name = visible,
            Field::Rg => self.show_rg = visible,
            Field::Cpf => self.show_cpf = visible,
            Field::Role => self.show_role = visible,
            Field::Company => self.show_company = visible,
            Field::AssociationDate => self.show_association_date = visible,
            Field::ExpirationDate => self.show_expiration_date = visible,
            Field::DependentName => self.show_dependent_name = visible,
        }
    }

    // Cópia profunda com identidade nova; geometria e flags preservados.
    pub fn duplicated(&self, new_id: Uuid, user_id: Option<Uuid>) -> Layout {
        let now = Utc::now();
        Layout {
            id: new_id,
            title: format!("{} (Cópia)", self.title),
            user_id,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}

// Resposta da exclusão: a coleção restante e o índice que o editor deve
// selecionar em seguida.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDeleteResponse {
    pub layouts: Vec<Layout>,
    pub selected_index: usize,
}

// A coleção ordenada de layouts do editor, com o índice da seleção atual.
// As regras de seleção e a garantia de nunca ficar vazia moram aqui; a
// persistência é responsabilidade do serviço que a utiliza.
#[derive(Debug, Clone)]
pub struct LayoutCollection {
    layouts: Vec<Layout>,
    current: usize,
}

impl LayoutCollection {
    // Uma loja sem layouts ganha um "Novo Layout" padrão, como na primeira
    // abertura do editor.
    pub fn from_store(layouts: Vec<Layout>) -> Self {
        let layouts = if layouts.is_empty() {
            vec![Layout::new(Uuid::new_v4(), "Novo Layout")]
        } else {
            layouts
        };
        Self { layouts, current: 0 }
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn into_layouts(self) -> Vec<Layout> {
        self.layouts
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Layout {
        &self.layouts[self.current]
    }

    pub fn index_of(&self, id: Uuid) -> Option<usize> {
        self.layouts.iter().position(|l| l.id == id)
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.layouts.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    // Acrescenta um layout padrão com título sequencial e o seleciona.
    pub fn add(&mut self) -> &Layout {
        let title = format!("Layout {}", self.layouts.len() + 1);
        let layout = Layout::new(Uuid::new_v4(), title);
        self.layouts.push(layout);
        self.current = self.layouts.len() - 1;
        self.current()
    }

    // Cópia do layout selecionado, sem mutação local: a coleção só muda
    // depois que a persistência confirmar, via append_selected.
    pub fn duplicate_current(&self, new_id: Uuid, user_id: Option<Uuid>) -> Layout {
        self.current().duplicated(new_id, user_id)
    }

    pub fn append_selected(&mut self, layout: Layout) {
        self.layouts.push(layout);
        self.current = self.layouts.len() - 1;
    }

    // Remove o layout no índice dado. A coleção nunca fica vazia; a seleção
    // permanece no mesmo índice, saturado no novo último.
    pub fn remove(&mut self, index: usize) -> Result<Layout, AppError> {
        if self.layouts.len() <= 1 {
            return Err(AppError::LastLayout);
        }
        if index >= self.layouts.len() {
            return Err(AppError::LayoutNotFound);
        }
        let removed = self.layouts.remove(index);
        if self.current >= self.layouts.len() {
            self.current = self.layouts.len() - 1;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_dentro_dos_limites() {
        assert_eq!(Position::clamped(10, 40), Position { x: 10, y: 40 });
        assert_eq!(Position::clamped(-5, -99), Position::ZERO);
        assert_eq!(
            Position::clamped(9_999, 9_999),
            Position { x: CARD_WIDTH, y: CARD_HEIGHT }
        );
        assert_eq!(
            Position::clamped(i32::MAX, i32::MIN),
            Position { x: CARD_WIDTH, y: 0 }
        );
    }

    #[test]
    fn test_set_position_satura() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        layout.set_position(Field::Name, 900, -10);
        assert_eq!(layout.name_position, Position { x: CARD_WIDTH, y: 0 });
    }

    #[test]
    fn test_plain_to_position_objeto() {
        let v = serde_json::json!({ "x": 120, "y": 80 });
        assert_eq!(plain_to_position(&v), Position { x: 120, y: 80 });
    }

    #[test]
    fn test_plain_to_position_string_json() {
        let v = Value::String("{\"x\": 120, \"y\": 80}".to_string());
        assert_eq!(plain_to_position(&v), Position { x: 120, y: 80 });
    }

    #[test]
    fn test_plain_to_position_lixo() {
        assert_eq!(plain_to_position(&Value::String("???".into())), Position::ZERO);
        assert_eq!(plain_to_position(&Value::Null), Position::ZERO);
        assert_eq!(
            plain_to_position(&serde_json::json!({ "x": "abc" })),
            Position::ZERO
        );
    }

    #[test]
    fn test_round_trip_posicao() {
        for p in [
            Position::ZERO,
            Position { x: 10, y: 40 },
            Position { x: CARD_WIDTH, y: CARD_HEIGHT },
        ] {
            assert_eq!(plain_to_position(&position_to_plain(p)), p);
        }
    }

    #[test]
    fn test_layout_novo_tem_os_nove_pares() {
        let layout = Layout::new(Uuid::new_v4(), "Novo Layout");
        for field in Field::ALL {
            assert_eq!(layout.position(field), Position::ZERO);
            assert!(!layout.visible(field));
        }
    }

    #[test]
    fn test_ordem_de_desenho_fixa() {
        let keys: Vec<&str> = Field::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(
            keys,
            vec![
                "photo",
                "name",
                "rg",
                "cpf",
                "role",
                "company",
                "association_date",
                "expiration_date",
                "dependent_name"
            ]
        );
    }

    #[test]
    fn test_adicionar_seleciona_o_novo() {
        let mut collection = LayoutCollection::from_store(vec![Layout::new(
            Uuid::new_v4(),
            "Novo Layout",
        )]);
        let added = collection.add();
        assert_eq!(added.title, "Layout 2");
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.current_index(), 1);
    }

    #[test]
    fn test_duplicar_preserva_geometria_com_id_novo() {
        let mut original = Layout::new(Uuid::new_v4(), "Padrão");
        original.set_position(Field::Cpf, 10, 80);
        original.set_visibility(Field::Cpf, true);

        let collection = LayoutCollection::from_store(vec![original.clone()]);
        let copy = collection.duplicate_current(Uuid::new_v4(), None);

        assert_eq!(copy.title, "Padrão (Cópia)");
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.cpf_position, original.cpf_position);
        assert_eq!(copy.show_cpf, original.show_cpf);
    }

    #[test]
    fn test_remover_ultimo_layout_recusado() {
        let mut collection = LayoutCollection::from_store(vec![Layout::new(
            Uuid::new_v4(),
            "Único",
        )]);
        assert!(matches!(collection.remove(0), Err(AppError::LastLayout)));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_remover_satura_selecao() {
        let mut collection = LayoutCollection::from_store(vec![
            Layout::new(Uuid::new_v4(), "A"),
            Layout::new(Uuid::new_v4(), "B"),
            Layout::new(Uuid::new_v4(), "C"),
        ]);
        collection.select(2);
        collection.remove(2).unwrap();
        assert_eq!(collection.current_index(), 1);

        // Remoção no meio mantém o mesmo índice
        collection.select(0);
        collection.remove(0).unwrap();
        assert_eq!(collection.current_index(), 0);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_loja_vazia_ganha_layout_padrao() {
        let collection = LayoutCollection::from_store(vec![]);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.current().title, "Novo Layout");
    }

    #[test]
    fn test_select_fora_da_faixa() {
        let mut collection = LayoutCollection::from_store(vec![Layout::new(
            Uuid::new_v4(),
            "Novo Layout",
        )]);
        assert!(!collection.select(5));
        assert_eq!(collection.current_index(), 0);
    }
}
