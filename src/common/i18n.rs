// src/common/i18n.rs

use std::collections::HashMap;

// Catálogo de mensagens por código de erro e idioma.
// O português é o idioma do produto; o inglês cobre integrações.
#[derive(Clone)]
pub struct I18nStore {
    // código -> (pt, en)
    messages: HashMap<&'static str, (&'static str, &'static str)>,
}

const MESSAGES: &[(&str, &str, &str)] = &[
    // (código, pt, en)
    ("validation_error", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("email_already_exists", "Este e-mail já está em uso.", "This e-mail is already in use."),
    ("cpf_already_exists", "CPF já cadastrado no sistema.", "CPF already registered."),
    ("rg_already_exists", "RG já cadastrado no sistema.", "RG already registered."),
    ("invalid_credentials", "E-mail ou senha inválidos.", "Invalid e-mail or password."),
    ("invalid_token", "Token de autenticação inválido ou ausente.", "Invalid or missing authentication token."),
    ("user_not_found", "Usuário não encontrado.", "User not found."),
    ("admin_only", "Esta página é restrita apenas para administradores.", "This area is restricted to administrators."),
    ("associate_not_found", "Associado não encontrado.", "Associate not found."),
    ("dependent_not_found", "Dependente não encontrado.", "Dependent not found."),
    ("layout_not_found", "Layout não encontrado.", "Layout not found."),
    ("last_layout", "Não é possível excluir o único layout existente.", "The only remaining layout cannot be deleted."),
    ("empty_selection", "Selecione pelo menos uma carteirinha para impressão.", "Select at least one card to print."),
    ("incomplete_selection", "Selecione um layout para todos os itens selecionados.", "Assign a layout to every selected item."),
    ("unsupported_image", "Formato de imagem não suportado. Use PNG, JPG ou WEBP.", "Unsupported image format. Use PNG, JPG or WEBP."),
    ("invalid_crop", "Área de recorte fora dos limites da imagem.", "Crop area outside the image bounds."),
    ("photo_not_found", "Foto não encontrada.", "Photo not found."),
    ("internal_error", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        for (code, pt, en) in MESSAGES {
            messages.insert(*code, (*pt, *en));
        }
        Self { messages }
    }

    // Idioma desconhecido cai no português; código desconhecido volta o
    // próprio código para não esconder o problema.
    pub fn message(&self, code: &str, lang: &str) -> String {
        match self.messages.get(code) {
            Some((pt, en)) => {
                if lang == "en" { en } else { pt }.to_string()
            }
            None => code.to_string(),
        }
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_por_idioma() {
        let store = I18nStore::new();
        assert_eq!(
            store.message("last_layout", "pt"),
            "Não é possível excluir o único layout existente."
        );
        assert_eq!(
            store.message("last_layout", "en"),
            "The only remaining layout cannot be deleted."
        );
    }

    #[test]
    fn test_idioma_desconhecido_cai_no_pt() {
        let store = I18nStore::new();
        assert_eq!(
            store.message("user_not_found", "de"),
            "Usuário não encontrado."
        );
    }

    #[test]
    fn test_codigo_desconhecido_retorna_codigo() {
        let store = I18nStore::new();
        assert_eq!(store.message("nao_existe", "pt"), "nao_existe");
    }
}
