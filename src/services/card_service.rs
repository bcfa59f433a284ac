// src/services/card_service.rs

use chrono::NaiveDate;

use crate::models::layout::{Field, Layout, Position, CARD_HEIGHT, CARD_WIDTH};
use crate::models::print::{CardData, PhotoState};

// Desenha uma carteirinha 825×260 com posicionamento absoluto. O preview do
// editor e a impressão passam pelo mesmo caminho de composição; só os dados
// mudam, o que mantém os dois pixel-consistentes.
#[derive(Clone)]
pub struct CardService;

impl CardService {
    pub fn new() -> Self {
        Self
    }

    // Um cartão completo. Campos ocultos não geram nenhum nó na saída.
    pub fn render_card(&self, layout: &Layout, data: &CardData) -> String {
        let mut html = String::with_capacity(2048);
        html.push_str(&format!(
            "<div class=\"card-item\" style=\"position:relative;width:{CARD_WIDTH}px;height:{CARD_HEIGHT}px;overflow:hidden;background:#fff\">"
        ));

        if let Some(background) = &layout.background_image {
            html.push_str(&format!(
                "<img class=\"card-background\" src=\"{}\" alt=\"\" style=\"position:absolute;left:0;top:0;width:100%;height:100%;object-fit:cover\">",
                escape_html(background)
            ));
        }

        // Ordem fixa de desenho: campos posteriores sobrepõem os anteriores
        for field in Field::ALL {
            if !layout.visible(field) {
                continue;
            }
            if let Some(fragment) = field_fragment(field, layout.position(field), data) {
                html.push_str(&fragment);
            }
        }

        html.push_str("</div>");
        html
    }

    // Preview do editor: mesmo cartão, dados de amostra e datas de hoje.
    pub fn render_preview(&self, layout: &Layout, today: NaiveDate) -> String {
        self.render_card(layout, &CardData::sample(today))
    }
}

impl Default for CardService {
    fn default() -> Self {
        Self::new()
    }
}

// Um campo visível vira um <div> absoluto transladado para a sua posição.
// Campos sem conteúdo no contexto (cargo de dependente, nome de dependente
// num cartão de titular) não aparecem mesmo quando visíveis.
fn field_fragment(field: Field, position: Position, data: &CardData) -> Option<String> {
    let text = |content: String, size: &str, bold: bool| {
        let weight = if bold { "font-weight:bold;" } else { "" };
        format!(
            "<div class=\"card-field card-field-{}\" style=\"position:absolute;left:{}px;top:{}px;font-size:{size};{weight}\">{content}</div>",
            field.key(),
            position.x,
            position.y,
        )
    };

    let fragment = match field {
        Field::Photo => photo_fragment(position, &data.photo),
        Field::Name => text(escape_html(&data.name_slot), "0.95em", true),
        Field::Rg => text(format!("RG: {}", escape_html(&data.rg)), "0.85em", false),
        Field::Cpf => text(format!("CPF: {}", escape_html(&data.cpf)), "0.85em", false),
        Field::Role => {
            let role = data.role.as_ref()?;
            text(format!("CARGO: {}", escape_html(role)), "0.8em", false)
        }
        Field::Company => text(
            format!("EMPRESA: {}", escape_html(&data.company)),
            "0.8em",
            false,
        ),
        Field::AssociationDate => text(
            format!("Associação: {}", format_date(data.association_date)),
            "0.78em",
            false,
        ),
        Field::ExpirationDate => text(
            format!("Validade: {}", format_date(data.expiration_date)),
            "0.78em",
            false,
        ),
        Field::DependentName => {
            let name = data.dependent_name_slot.as_ref()?;
            text(escape_html(name), "0.95em", true)
        }
    };

    Some(fragment)
}

// A moldura da foto é fixa em 100×130. "Sem foto" e "Erro ao carregar foto"
// são estados distintos do cadastro sem imagem e da referência quebrada.
fn photo_fragment(position: Position, photo: &PhotoState) -> String {
    let inner = match photo {
        PhotoState::Resolved(url) => format!(
            "<img src=\"{}\" alt=\"\" style=\"width:100%;height:100%;object-fit:cover\">",
            escape_html(url)
        ),
        PhotoState::Missing => {
            "<span class=\"photo-placeholder\">Sem foto</span>".to_string()
        }
        PhotoState::Failed => "<span class=\"photo-error\">Erro ao carregar foto</span>".to_string(),
    };
    format!(
        "<div class=\"card-field card-field-photo\" style=\"position:absolute;left:{}px;top:{}px\">\
         <div style=\"width:100px;height:130px;background:#f3f4f6;border:1px solid #d1d5db;border-radius:4px;overflow:hidden;display:flex;align-items:center;justify-content:center\">{inner}</div></div>",
        position.x, position.y,
    )
}

// Datas no formato brasileiro; data ausente vira string vazia, nunca erro.
fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::Field;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn associate_data(name: &str, cpf: &str) -> CardData {
        CardData {
            name_slot: name.to_uppercase(),
            dependent_name_slot: None,
            rg: "12.345.678-9".to_string(),
            cpf: cpf.to_string(),
            role: Some("MOTORISTA".to_string()),
            company: "TRANSPORTES SILVA".to_string(),
            association_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            expiration_date: None,
            photo: PhotoState::Missing,
        }
    }

    #[test]
    fn test_campo_oculto_nao_gera_nenhum_no() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        layout.set_position(Field::Cpf, 10, 80);
        layout.set_visibility(Field::Cpf, false);
        layout.set_position(Field::Name, 10, 40);
        layout.set_visibility(Field::Name, true);

        let html = CardService::new().render_card(&layout, &associate_data("Maria Silva", "123.456.789-00"));

        assert!(html.contains("MARIA SILVA"));
        assert!(html.contains("left:10px;top:40px"));
        assert!(!html.contains("card-field-cpf"));
        assert!(!html.contains("CPF"));
    }

    #[test]
    fn test_substituicao_de_nomes_do_dependente() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        layout.set_position(Field::Name, 100, 20);
        layout.set_visibility(Field::Name, true);
        layout.set_position(Field::DependentName, 100, 60);
        layout.set_visibility(Field::DependentName, true);

        let data = CardData {
            name_slot: "MARIA SILVA".to_string(),
            dependent_name_slot: Some("JOÃO SILVA".to_string()),
            ..associate_data("x", "y")
        };
        let html = CardService::new().render_card(&layout, &data);

        // O slot "name" carrega o titular; o slot "dependent_name", o próprio
        let name_at = html.find("card-field-name").unwrap();
        let dependent_at = html.find("card-field-dependent_name").unwrap();
        assert!(html[name_at..dependent_at].contains("MARIA SILVA"));
        assert!(html[dependent_at..].contains("JOÃO SILVA"));
    }

    #[test]
    fn test_cargo_ausente_para_dependente() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        layout.set_position(Field::Role, 5, 5);
        layout.set_visibility(Field::Role, true);

        let data = CardData { role: None, ..associate_data("x", "y") };
        let html = CardService::new().render_card(&layout, &data);
        assert!(!html.contains("card-field-role"));
    }

    #[test]
    fn test_estados_da_foto_sao_distintos() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        layout.set_visibility(Field::Photo, true);
        let service = CardService::new();

        let missing = service.render_card(&layout, &associate_data("a", "b"));
        assert!(missing.contains("Sem foto"));
        assert!(!missing.contains("Erro ao carregar foto"));

        let failed_data = CardData { photo: PhotoState::Failed, ..associate_data("a", "b") };
        let failed = service.render_card(&layout, &failed_data);
        assert!(failed.contains("Erro ao carregar foto"));
        assert!(!failed.contains("Sem foto"));

        let resolved_data = CardData {
            photo: PhotoState::Resolved("http://fotos.local/x.png".to_string()),
            ..associate_data("a", "b")
        };
        let resolved = service.render_card(&layout, &resolved_data);
        assert!(resolved.contains("src=\"http://fotos.local/x.png\""));
        assert!(!resolved.contains("Sem foto"));
    }

    #[test]
    fn test_data_ausente_vira_string_vazia() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        layout.set_visibility(Field::ExpirationDate, true);
        layout.set_visibility(Field::AssociationDate, true);

        let html = CardService::new().render_card(&layout, &associate_data("a", "b"));
        assert!(html.contains("Validade: <"));
        assert!(html.contains("Associação: 15/03/2024"));
    }

    #[test]
    fn test_ordem_de_desenho_foto_primeiro() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        for field in Field::ALL {
            layout.set_visibility(field, true);
        }
        let html = CardService::new().render_card(&layout, &associate_data("a", "b"));
        let photo_at = html.find("card-field-photo").unwrap();
        let name_at = html.find("card-field-name").unwrap();
        let company_at = html.find("card-field-company").unwrap();
        assert!(photo_at < name_at);
        assert!(name_at < company_at);
    }

    #[test]
    fn test_conteudo_e_escapado() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        layout.set_visibility(Field::Name, true);
        let data = CardData {
            name_slot: "<SCRIPT>\"X\"</SCRIPT>".to_string(),
            ..associate_data("a", "b")
        };
        let html = CardService::new().render_card(&layout, &data);
        assert!(!html.contains("<SCRIPT>"));
        assert!(html.contains("&lt;SCRIPT&gt;&quot;X&quot;&lt;/SCRIPT&gt;"));
    }

    #[test]
    fn test_preview_usa_amostra_e_funciona_sem_fundo() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        layout.set_visibility(Field::Name, true);
        layout.set_visibility(Field::DependentName, true);
        layout.set_visibility(Field::AssociationDate, true);

        let today = Utc::now().date_naive();
        let html = CardService::new().render_preview(&layout, today);

        assert!(html.contains("Nome do Associado"));
        assert!(html.contains("Nome do Dependente"));
        assert!(html.contains(&today.format("%d/%m/%Y").to_string()));
        assert!(!html.contains("card-background"));
    }

    #[test]
    fn test_fundo_presente() {
        let mut layout = Layout::new(Uuid::new_v4(), "t");
        layout.background_image = Some("http://fotos.local/fundo.png".to_string());
        let html = CardService::new().render_card(&layout, &associate_data("a", "b"));
        assert!(html.contains("card-background"));
        assert!(html.contains("http://fotos.local/fundo.png"));
    }
}
