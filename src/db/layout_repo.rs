// src/db/layout_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::layout::{plain_to_position, position_to_plain, Layout},
};

// Linha crua da tabela 'layouts'. As posições chegam como JSONB e podem ter
// sido gravadas como objeto ou como string JSON por versões antigas do
// cliente; a normalização acontece em into_layout.
#[derive(FromRow)]
struct LayoutRow {
    id: Uuid,
    title: String,
    background_image: Option<String>,

    photo_position: Value,
    name_position: Value,
    rg_position: Value,
    cpf_position: Value,
    role_position: Value,
    company_position: Value,
    association_date_position: Value,
    expiration_date_position: Value,
    dependent_name_position: Value,

    show_photo: bool,
    show_name: bool,
    show_rg: bool,
    show_cpf: bool,
    show_role: bool,
    show_company: bool,
    show_association_date: bool,
    show_expiration_date: bool,
    show_dependent_name: bool,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_id: Option<Uuid>,
}

impl LayoutRow {
    fn into_layout(self) -> Layout {
        Layout {
            id: self.id,
            title: self.title,
            background_image: self.background_image,
            photo_position: plain_to_position(&self.photo_position),
            name_position: plain_to_position(&self.name_position),
            rg_position: plain_to_position(&self.rg_position),
            cpf_position: plain_to_position(&self.cpf_position),
            role_position: plain_to_position(&self.role_position),
            company_position: plain_to_position(&self.company_position),
            association_date_position: plain_to_position(&self.association_date_position),
            expiration_date_position: plain_to_position(&self.expiration_date_position),
            dependent_name_position: plain_to_position(&self.dependent_name_position),
            show_photo: self.show_photo,
            show_name: self.show_name,
            show_rg: self.show_rg,
            show_cpf: self.show_cpf,
            show_role: self.show_role,
            show_company: self.show_company,
            show_association_date: self.show_association_date,
            show_expiration_date: self.show_expiration_date,
            show_dependent_name: self.show_dependent_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
            user_id: self.user_id,
        }
    }
}

#[derive(Clone)]
pub struct LayoutRepository {
    pool: PgPool,
}

impl LayoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Ordenado como o editor apresenta: o mais recentemente salvo primeiro.
    pub async fn list(&self) -> Result<Vec<Layout>, AppError> {
        let rows = sqlx::query_as::<_, LayoutRow>(
            "SELECT * FROM layouts ORDER BY updated_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LayoutRow::into_layout).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Layout>, AppError> {
        let row = sqlx::query_as::<_, LayoutRow>("SELECT * FROM layouts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(LayoutRow::into_layout))
    }

    // Upsert pelo id: insere quando novo, sobrescreve quando existente.
    // As posições são sempre gravadas na forma estruturada {x,y}.
    pub async fn upsert(&self, layout: &Layout) -> Result<Layout, AppError> {
        let row = sqlx::query_as::<_, LayoutRow>(
            "INSERT INTO layouts \
               (id, title, background_image, \
                photo_position, name_position, rg_position, cpf_position, \
                role_position, company_position, association_date_position, \
                expiration_date_position, dependent_name_position, \
                show_photo, show_name, show_rg, show_cpf, show_role, show_company, \
                show_association_date, show_expiration_date, show_dependent_name, \
                user_id, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
                     $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, NOW()) \
             ON CONFLICT (id) DO UPDATE SET \
               title = EXCLUDED.title, \
               background_image = EXCLUDED.background_image, \
               photo_position = EXCLUDED.photo_position, \
               name_position = EXCLUDED.name_position, \
               rg_position = EXCLUDED.rg_position, \
               cpf_position = EXCLUDED.cpf_position, \
               role_position = EXCLUDED.role_position, \
               company_position = EXCLUDED.company_position, \
               association_date_position = EXCLUDED.association_date_position, \
               expiration_date_position = EXCLUDED.expiration_date_position, \
               dependent_name_position = EXCLUDED.dependent_name_position, \
               show_photo = EXCLUDED.show_photo, \
               show_name = EXCLUDED.show_name, \
               show_rg = EXCLUDED.show_rg, \
               show_cpf = EXCLUDED.show_cpf, \
               show_role = EXCLUDED.show_role, \
               show_company = EXCLUDED.show_company, \
               show_association_date = EXCLUDED.show_association_date, \
               show_expiration_date = EXCLUDED.show_expiration_date, \
               show_dependent_name = EXCLUDED.show_dependent_name, \
               user_id = EXCLUDED.user_id, \
               updated_at = NOW() \
             RETURNING *",
        )
        .bind(layout.id)
        .bind(&layout.title)
        .bind(&layout.background_image)
        .bind(position_to_plain(layout.photo_position))
        .bind(position_to_plain(layout.name_position))
        .bind(position_to_plain(layout.rg_position))
        .bind(position_to_plain(layout.cpf_position))
        .bind(position_to_plain(layout.role_position))
        .bind(position_to_plain(layout.company_position))
        .bind(position_to_plain(layout.association_date_position))
        .bind(position_to_plain(layout.expiration_date_position))
        .bind(position_to_plain(layout.dependent_name_position))
        .bind(layout.show_photo)
        .bind(layout.show_name)
        .bind(layout.show_rg)
        .bind(layout.show_cpf)
        .bind(layout.show_role)
        .bind(layout.show_company)
        .bind(layout.show_association_date)
        .bind(layout.show_expiration_date)
        .bind(layout.show_dependent_name)
        .bind(layout.user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_layout())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM layouts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::LayoutNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layout::Field;

    // Uma linha gravada na forma estruturada volta com os nove pares
    // idênticos, mesmo quando alguma posição antiga chega como string.
    #[test]
    fn test_linha_e_layout_fazem_round_trip() {
        let mut original = Layout::new(Uuid::new_v4(), "Padrão");
        original.set_position(Field::Name, 10, 40);
        original.set_visibility(Field::Name, true);
        original.set_position(Field::Photo, 700, 100);
        original.set_visibility(Field::Photo, true);

        let row = LayoutRow {
            id: original.id,
            title: original.title.clone(),
            background_image: None,
            photo_position: position_to_plain(original.photo_position),
            name_position: Value::String(
                position_to_plain(original.name_position).to_string(),
            ),
            rg_position: position_to_plain(original.rg_position),
            cpf_position: position_to_plain(original.cpf_position),
            role_position: position_to_plain(original.role_position),
            company_position: position_to_plain(original.company_position),
            association_date_position: position_to_plain(original.association_date_position),
            expiration_date_position: position_to_plain(original.expiration_date_position),
            dependent_name_position: position_to_plain(original.dependent_name_position),
            show_photo: original.show_photo,
            show_name: original.show_name,
            show_rg: original.show_rg,
            show_cpf: original.show_cpf,
            show_role: original.show_role,
            show_company: original.show_company,
            show_association_date: original.show_association_date,
            show_expiration_date: original.show_expiration_date,
            show_dependent_name: original.show_dependent_name,
            created_at: original.created_at,
            updated_at: original.updated_at,
            user_id: None,
        };

        let loaded = row.into_layout();
        for field in Field::ALL {
            assert_eq!(loaded.position(field), original.position(field));
            assert_eq!(loaded.visible(field), original.visible(field));
        }
    }
}
