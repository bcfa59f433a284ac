// src/common/documents.rs

use validator::ValidationError;

// Máscaras e validação de documentos brasileiros (CPF e RG).
// As máscaras são progressivas: aceitam entrada parcial durante a digitação
// e descartam qualquer caractere que não seja dígito.

// 000.000.000-00
pub fn mask_cpf(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).take(11).collect();
    let mut out = String::with_capacity(14);
    for (i, c) in digits.chars().enumerate() {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }
    out
}

// 00.000.000-0
pub fn mask_rg(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).take(9).collect();
    let mut out = String::with_capacity(12);
    for (i, c) in digits.chars().enumerate() {
        match i {
            2 | 5 => out.push('.'),
            8 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }
    out
}

// Validação dos dois dígitos verificadores do CPF (módulo 11).
// Aceita o CPF com ou sem máscara.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    // Sequências repetidas (111.111.111-11 etc.) passam no módulo 11
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, &d)| d * (len as u32 + 1 - i as u32))
            .sum();
        (sum * 10) % 11 % 10
    };

    check(9) == digits[9] && check(10) == digits[10]
}

// Integração com o `validator` para uso em payloads:
// #[validate(custom(function = "crate::common::documents::validate_cpf"))]
pub fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    if is_valid_cpf(cpf) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_cpf");
        err.message = Some("CPF inválido".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_cpf_progressiva() {
        assert_eq!(mask_cpf("5"), "5");
        assert_eq!(mask_cpf("5299"), "529.9");
        assert_eq!(mask_cpf("5299822472"), "529.982.247-2");
        assert_eq!(mask_cpf("52998224725"), "529.982.247-25");
        // Dígitos excedentes são descartados
        assert_eq!(mask_cpf("529982247259999"), "529.982.247-25");
        assert_eq!(mask_cpf("529.982.247-25"), "529.982.247-25");
    }

    #[test]
    fn test_mask_rg_progressiva() {
        assert_eq!(mask_rg("12"), "12");
        assert_eq!(mask_rg("123456"), "12.345.6");
        assert_eq!(mask_rg("123456789"), "12.345.678-9");
        assert_eq!(mask_rg("1234567890000"), "12.345.678-9");
    }

    #[test]
    fn test_cpf_valido() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("52998224725"));
    }

    #[test]
    fn test_cpf_invalido() {
        assert!(!is_valid_cpf("529.982.247-26"));
        assert!(!is_valid_cpf("111.111.111-11"));
        assert!(!is_valid_cpf("123"));
        assert!(!is_valid_cpf(""));
    }
}
