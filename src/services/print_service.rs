// src/services/print_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssociateRepository, LayoutRepository},
    models::{
        layout::Layout,
        print::{CardData, PhotoState, PrintSelection},
    },
    services::card_service::CardService,
    services::storage::ImageStore,
};

// Quatro carteirinhas por folha A4; um cartão nunca quebra entre páginas.
pub const CARDS_PER_PAGE: usize = 4;

// CSS de impressão: esconde tudo fora da área de impressão e força a
// quebra de página por folha (210mm × 297mm).
const PRINT_STYLE: &str = "\
@page { size: 210mm 297mm; margin: 0; padding: 0; }\n\
@media print {\n\
  body * { visibility: hidden; }\n\
  .print-only, .print-only * { visibility: visible; }\n\
  .print-only { position: absolute; left: 0; top: 0; width: 100%; }\n\
}\n\
.print-page {\n\
  width: 210mm;\n\
  min-height: 297mm;\n\
  padding: 10mm;\n\
  box-sizing: border-box;\n\
  page-break-after: always;\n\
  display: flex;\n\
  flex-direction: column;\n\
  gap: 10mm;\n\
}\n\
.print-page:last-child { page-break-after: auto; }\n\
.card-item { margin: 0 auto; page-break-inside: avoid; }\n";

#[derive(Clone)]
pub struct PrintService {
    associate_repo: AssociateRepository,
    layout_repo: LayoutRepository,
    card_service: CardService,
    image_store: Arc<dyn ImageStore>,
}

impl PrintService {
    pub fn new(
        associate_repo: AssociateRepository,
        layout_repo: LayoutRepository,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            associate_repo,
            layout_repo,
            card_service: CardService::new(),
            image_store,
        }
    }

    // Monta o documento de impressão completo para a seleção: valida a
    // atribuição de layouts, carrega pessoas e layouts, resolve fotos e
    // compõe as páginas. Titulares saem primeiro, na ordem da seleção,
    // depois os dependentes.
    pub async fn render_print_document(
        &self,
        selection: &PrintSelection,
    ) -> Result<String, AppError> {
        selection.validate()?;

        let layouts: HashMap<Uuid, Layout> = self
            .layout_repo
            .list()
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        let mut cards = Vec::with_capacity(selection.associates.len() + selection.dependents.len());

        for id in &selection.associates {
            let associate = self
                .associate_repo
                .find_by_id(*id)
                .await?
                .ok_or(AppError::AssociateNotFound)?;
            let layout = assigned_layout(&layouts, &selection.associate_layouts, *id)?;
            let photo = self.resolve_photo(associate.photo_url.as_deref()).await;
            let data = CardData::for_associate(&associate, photo);
            cards.push(self.card_service.render_card(layout, &data));
        }

        for id in &selection.dependents {
            let (dependent, associate_name) = self
                .associate_repo
                .find_dependent_with_parent(*id)
                .await?
                .ok_or(AppError::DependentNotFound)?;
            let layout = assigned_layout(&layouts, &selection.dependent_layouts, *id)?;
            let photo = self.resolve_photo(dependent.photo_url.as_deref()).await;
            let data = CardData::for_dependent(&dependent, &associate_name, photo);
            cards.push(self.card_service.render_card(layout, &data));
        }

        Ok(render_document(&cards))
    }

    // Sem referência é "Sem foto"; referência que não resolve degrada para
    // o placeholder de erro sem derrubar o restante da página.
    async fn resolve_photo(&self, photo_url: Option<&str>) -> PhotoState {
        match photo_url {
            None => PhotoState::Missing,
            Some(reference) => match self.image_store.resolve(reference).await {
                Ok(url) => PhotoState::Resolved(url),
                Err(e) => {
                    tracing::warn!("Não foi possível resolver a foto {}: {}", reference, e);
                    PhotoState::Failed
                }
            },
        }
    }
}

fn assigned_layout<'a>(
    layouts: &'a HashMap<Uuid, Layout>,
    assignments: &HashMap<Uuid, Uuid>,
    person_id: Uuid,
) -> Result<&'a Layout, AppError> {
    let layout_id = assignments
        .get(&person_id)
        .ok_or(AppError::IncompleteSelection)?;
    layouts.get(layout_id).ok_or(AppError::LayoutNotFound)
}

// Agrupa os cartões já renderizados em páginas de quatro e embrulha no
// documento final.
pub fn render_document(cards: &[String]) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(
        "<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">\
         <title>Impressão de Carteirinhas</title><style>",
    );
    html.push_str(PRINT_STYLE);
    html.push_str("</style></head><body><div class=\"print-only\">");

    for page in cards.chunks(CARDS_PER_PAGE) {
        html.push_str("<div class=\"print-page\">");
        for card in page {
            html.push_str(card);
        }
        html.push_str("</div>");
    }

    html.push_str("</div></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_paginacao_quatro_por_folha() {
        for (n, expected_pages) in [(0, 0), (1, 1), (4, 1), (5, 2), (9, 3), (12, 3)] {
            let cards: Vec<String> =
                (0..n).map(|i| format!("<div class=\"card-item\">c{i}</div>")).collect();
            let html = render_document(&cards);
            assert_eq!(
                count(&html, "<div class=\"print-page\">"),
                expected_pages,
                "N = {n}"
            );
            assert_eq!(count(&html, "<div class=\"card-item\">"), n);
        }
    }

    #[test]
    fn test_paginacao_preserva_a_ordem() {
        let cards: Vec<String> = (0..7).map(|i| format!("<i>carta-{i}</i>")).collect();
        let html = render_document(&cards);

        let mut last = 0;
        for i in 0..7 {
            let at = html.find(&format!("carta-{i}")).unwrap();
            assert!(at > last, "carta-{i} fora de ordem");
            last = at;
        }

        // As quatro primeiras na primeira página, as demais na segunda
        let second_page = html.rfind("print-page").unwrap();
        assert!(html.find("carta-3").unwrap() < second_page);
        assert!(html.find("carta-4").unwrap() > second_page);
    }

    #[test]
    fn test_documento_tem_tamanho_de_pagina_a4() {
        let html = render_document(&[]);
        assert!(html.contains("size: 210mm 297mm"));
        assert!(html.contains("page-break-inside: avoid"));
    }
}
