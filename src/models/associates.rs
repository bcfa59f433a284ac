// src/models/associates.rs

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// O titular da associação. Os renderizadores consomem estes dados somente
// para leitura; nenhuma mutação acontece fora dos handlers de cadastro.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Associate {
    pub id: Uuid,
    pub user_id: Option<Uuid>,

    pub name: String,
    pub rg: String,
    pub cpf: String,
    pub role: String,
    pub company: String,

    pub association_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,

    // Referência no armazenamento de imagens, não a URL final
    pub photo_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[sqlx(skip)]
    #[serde(default)]
    pub dependents: Vec<Dependent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dependent {
    pub id: Uuid,
    pub associate_id: Uuid,

    pub name: String,
    pub rg: String,
    pub cpf: String,
    pub company: String,

    pub association_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,

    pub photo_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// A validade padrão é de um ano a partir da associação. O campo continua
// livremente editável depois; nada reamarra as duas datas.
pub fn default_expiration(association_date: NaiveDate) -> NaiveDate {
    association_date
        .checked_add_months(Months::new(12))
        .unwrap_or(association_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validade_um_ano_depois() {
        let association = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            default_expiration(association),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_validade_ano_bissexto() {
        // 29/02 não existe no ano seguinte; chrono recua para 28/02
        let association = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            default_expiration(association),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }
}
