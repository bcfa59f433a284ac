// src/services/associate_service.rs

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::documents::{mask_cpf, mask_rg},
    common::error::AppError,
    db::AssociateRepository,
    models::associates::{default_expiration, Associate, Dependent},
};

// Dados de cadastro/edição já validados pelo handler. As máscaras são
// reaplicadas aqui para que o banco guarde sempre o formato canônico.
#[derive(Debug, Clone)]
pub struct AssociateInput {
    pub name: String,
    pub rg: String,
    pub cpf: String,
    pub role: String,
    pub company: String,
    pub association_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DependentInput {
    pub name: String,
    pub rg: String,
    pub cpf: String,
    pub company: Option<String>,
    pub association_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
}

#[derive(Clone)]
pub struct AssociateService {
    repo: AssociateRepository,
}

impl AssociateService {
    pub fn new(repo: AssociateRepository) -> Self {
        Self { repo }
    }

    pub async fn register(
        &self,
        user_id: Uuid,
        input: AssociateInput,
    ) -> Result<Associate, AppError> {
        let cpf = mask_cpf(&input.cpf);
        let rg = mask_rg(&input.rg);

        // CPF e RG são únicos no sistema; o banco tem a mesma restrição
        // como rede de segurança.
        if self.repo.cpf_exists(&cpf, None).await? {
            return Err(AppError::CpfAlreadyExists);
        }
        if self.repo.rg_exists(&rg, None).await? {
            return Err(AppError::RgAlreadyExists);
        }

        // Validade padrão: um ano após a associação. Edições posteriores
        // podem divergir livremente.
        let expiration_date = input
            .expiration_date
            .unwrap_or_else(|| default_expiration(input.association_date));

        self.repo
            .create_associate(
                user_id,
                &input.name,
                &rg,
                &cpf,
                &input.role,
                &input.company,
                input.association_date,
                expiration_date,
                input.photo_url.as_deref(),
            )
            .await
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Associate>, i64), AppError> {
        let total = self.repo.count(search).await?;
        let mut associates = self
            .repo
            .list(search, per_page, page * per_page)
            .await?;

        for associate in &mut associates {
            associate.dependents = self.repo.list_dependents(associate.id).await?;
        }

        Ok((associates, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<Associate, AppError> {
        let mut associate = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::AssociateNotFound)?;
        associate.dependents = self.repo.list_dependents(id).await?;
        Ok(associate)
    }

    pub async fn update(&self, id: Uuid, input: AssociateInput) -> Result<Associate, AppError> {
        let cpf = mask_cpf(&input.cpf);
        let rg = mask_rg(&input.rg);

        if self.repo.cpf_exists(&cpf, Some(id)).await? {
            return Err(AppError::CpfAlreadyExists);
        }
        if self.repo.rg_exists(&rg, Some(id)).await? {
            return Err(AppError::RgAlreadyExists);
        }

        self.repo
            .update_associate(
                id,
                &input.name,
                &rg,
                &cpf,
                &input.role,
                &input.company,
                input.association_date,
                input.expiration_date,
                input.photo_url.as_deref(),
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_associate(id).await
    }

    pub async fn add_dependent(
        &self,
        associate_id: Uuid,
        input: DependentInput,
    ) -> Result<Dependent, AppError> {
        let associate = self
            .repo
            .find_by_id(associate_id)
            .await?
            .ok_or(AppError::AssociateNotFound)?;

        let (company, association_date, expiration_date) = dependent_defaults(
            &associate,
            input.company,
            input.association_date,
            input.expiration_date,
        );

        self.repo
            .create_dependent(
                associate_id,
                &input.name,
                &mask_rg(&input.rg),
                &mask_cpf(&input.cpf),
                &company,
                association_date,
                expiration_date,
                input.photo_url.as_deref(),
            )
            .await
    }

    pub async fn update_dependent(
        &self,
        id: Uuid,
        input: DependentInput,
    ) -> Result<Dependent, AppError> {
        let current = self
            .repo
            .find_dependent(id)
            .await?
            .ok_or(AppError::DependentNotFound)?;

        // Depois de criado, o dependente tem dados próprios; ausência no
        // payload preserva o valor atual, sem voltar a herdar do titular.
        self.repo
            .update_dependent(
                id,
                &input.name,
                &mask_rg(&input.rg),
                &mask_cpf(&input.cpf),
                input.company.as_deref().unwrap_or(&current.company),
                input.association_date.or(current.association_date),
                input.expiration_date.or(current.expiration_date),
                input.photo_url.as_deref().or(current.photo_url.as_deref()),
            )
            .await
    }

    pub async fn delete_dependent(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete_dependent(id).await
    }
}

// Política de criação do dependente: empresa e datas não informadas são
// copiadas do titular no momento do cadastro e ficam independentes depois.
fn dependent_defaults(
    associate: &Associate,
    company: Option<String>,
    association_date: Option<NaiveDate>,
    expiration_date: Option<NaiveDate>,
) -> (String, Option<NaiveDate>, Option<NaiveDate>) {
    let company = company.unwrap_or_else(|| associate.company.clone());
    let association_date = association_date.or(associate.association_date);
    let expiration_date = expiration_date
        .or_else(|| association_date.map(default_expiration))
        .or(associate.expiration_date);
    (company, association_date, expiration_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn associate() -> Associate {
        Associate {
            id: Uuid::new_v4(),
            user_id: None,
            name: "Maria Silva".to_string(),
            rg: "12.345.678-9".to_string(),
            cpf: "529.982.247-25".to_string(),
            role: "Motorista".to_string(),
            company: "Transportes Silva".to_string(),
            association_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            expiration_date: NaiveDate::from_ymd_opt(2025, 3, 15),
            photo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            dependents: vec![],
        }
    }

    #[test]
    fn test_dependente_herda_do_titular_no_cadastro() {
        let (company, association, expiration) =
            dependent_defaults(&associate(), None, None, None);
        assert_eq!(company, "Transportes Silva");
        assert_eq!(association, NaiveDate::from_ymd_opt(2024, 3, 15));
        // Validade derivada da data de associação herdada
        assert_eq!(expiration, NaiveDate::from_ymd_opt(2025, 3, 15));
    }

    #[test]
    fn test_dados_informados_nao_sao_sobrescritos() {
        let own_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let (company, association, expiration) = dependent_defaults(
            &associate(),
            Some("Outra Empresa".to_string()),
            Some(own_date),
            None,
        );
        assert_eq!(company, "Outra Empresa");
        assert_eq!(association, Some(own_date));
        assert_eq!(expiration, NaiveDate::from_ymd_opt(2025, 6, 1));
    }
}
