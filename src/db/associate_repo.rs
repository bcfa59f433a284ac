// src/db/associate_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::associates::{Associate, Dependent},
};

// Repositório dos associados e seus dependentes. As buscas por texto cobrem
// nome, CPF e RG, como na tela de pesquisa.
#[derive(Clone)]
pub struct AssociateRepository {
    pool: PgPool,
}

impl AssociateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    //  Associados
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn create_associate(
        &self,
        user_id: Uuid,
        name: &str,
        rg: &str,
        cpf: &str,
        role: &str,
        company: &str,
        association_date: NaiveDate,
        expiration_date: NaiveDate,
        photo_url: Option<&str>,
    ) -> Result<Associate, AppError> {
        sqlx::query_as::<_, Associate>(
            "INSERT INTO associates \
               (user_id, name, rg, cpf, role, company, association_date, expiration_date, photo_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING *",
        )
        .bind(user_id)
        .bind(name)
        .bind(rg)
        .bind(cpf)
        .bind(role)
        .bind(company)
        .bind(association_date)
        .bind(expiration_date)
        .bind(photo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_to_document_conflict)
    }

    pub async fn count(&self, search: Option<&str>) -> Result<i64, AppError> {
        let like = like_pattern(search);
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM associates \
             WHERE name ILIKE $1 OR cpf LIKE $1 OR rg LIKE $1",
        )
        .bind(like)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Associate>, AppError> {
        let like = like_pattern(search);
        let associates = sqlx::query_as::<_, Associate>(
            "SELECT * FROM associates \
             WHERE name ILIKE $1 OR cpf LIKE $1 OR rg LIKE $1 \
             ORDER BY name \
             LIMIT $2 OFFSET $3",
        )
        .bind(like)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(associates)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Associate>, AppError> {
        let associate = sqlx::query_as::<_, Associate>("SELECT * FROM associates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(associate)
    }

    // Unicidade de CPF/RG; `except` ignora o próprio registro na edição.
    pub async fn cpf_exists(&self, cpf: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM associates WHERE cpf = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(cpf)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn rg_exists(&self, rg: &str, except: Option<Uuid>) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM associates WHERE rg = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(rg)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_associate(
        &self,
        id: Uuid,
        name: &str,
        rg: &str,
        cpf: &str,
        role: &str,
        company: &str,
        association_date: NaiveDate,
        expiration_date: Option<NaiveDate>,
        photo_url: Option<&str>,
    ) -> Result<Associate, AppError> {
        sqlx::query_as::<_, Associate>(
            "UPDATE associates SET \
               name = $2, rg = $3, cpf = $4, role = $5, company = $6, \
               association_date = $7, expiration_date = $8, photo_url = $9, \
               updated_at = NOW() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(rg)
        .bind(cpf)
        .bind(role)
        .bind(company)
        .bind(association_date)
        .bind(expiration_date)
        .bind(photo_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_to_document_conflict)?
        .ok_or(AppError::AssociateNotFound)
    }

    pub async fn delete_associate(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM associates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::AssociateNotFound);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    //  Dependentes
    // ------------------------------------------------------------------

    pub async fn list_dependents(&self, associate_id: Uuid) -> Result<Vec<Dependent>, AppError> {
        let dependents = sqlx::query_as::<_, Dependent>(
            "SELECT * FROM dependents WHERE associate_id = $1 ORDER BY name",
        )
        .bind(associate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(dependents)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_dependent(
        &self,
        associate_id: Uuid,
        name: &str,
        rg: &str,
        cpf: &str,
        company: &str,
        association_date: Option<NaiveDate>,
        expiration_date: Option<NaiveDate>,
        photo_url: Option<&str>,
    ) -> Result<Dependent, AppError> {
        let dependent = sqlx::query_as::<_, Dependent>(
            "INSERT INTO dependents \
               (associate_id, name, rg, cpf, company, association_date, expiration_date, photo_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(associate_id)
        .bind(name)
        .bind(rg)
        .bind(cpf)
        .bind(company)
        .bind(association_date)
        .bind(expiration_date)
        .bind(photo_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(dependent)
    }

    pub async fn find_dependent(&self, id: Uuid) -> Result<Option<Dependent>, AppError> {
        let dependent = sqlx::query_as::<_, Dependent>("SELECT * FROM dependents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(dependent)
    }

    // O cartão do dependente precisa do nome do titular para o slot "name".
    pub async fn find_dependent_with_parent(
        &self,
        id: Uuid,
    ) -> Result<Option<(Dependent, String)>, AppError> {
        let Some(dependent) = self.find_dependent(id).await? else {
            return Ok(None);
        };
        let associate_name =
            sqlx::query_scalar::<_, String>("SELECT name FROM associates WHERE id = $1")
                .bind(dependent.associate_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(Some((dependent, associate_name)))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_dependent(
        &self,
        id: Uuid,
        name: &str,
        rg: &str,
        cpf: &str,
        company: &str,
        association_date: Option<NaiveDate>,
        expiration_date: Option<NaiveDate>,
        photo_url: Option<&str>,
    ) -> Result<Dependent, AppError> {
        sqlx::query_as::<_, Dependent>(
            "UPDATE dependents SET \
               name = $2, rg = $3, cpf = $4, company = $5, \
               association_date = $6, expiration_date = $7, photo_url = $8, \
               updated_at = NOW() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(rg)
        .bind(cpf)
        .bind(company)
        .bind(association_date)
        .bind(expiration_date)
        .bind(photo_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::DependentNotFound)
    }

    pub async fn delete_dependent(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM dependents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::DependentNotFound);
        }
        Ok(())
    }
}

fn like_pattern(search: Option<&str>) -> String {
    format!("%{}%", search.unwrap_or(""))
}

// A restrição única do banco é a rede de segurança para corridas entre a
// checagem e o insert.
fn unique_to_document_conflict(e: sqlx::Error) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("");
            if constraint.contains("cpf") {
                return AppError::CpfAlreadyExists;
            }
            if constraint.contains("rg") {
                return AppError::RgAlreadyExists;
            }
        }
    }
    AppError::DatabaseError(e)
}
