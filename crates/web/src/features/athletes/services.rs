use sqlx::PgPool;
use storage::{
    dto::{
        athlete::{CreateAthleteRequest, UpdateAthleteRequest},
        common::{PaginatedResponse, PaginationParams},
    },
    error::StorageError,
    models::{Athlete, Cpf, format_cpf},
    repository::athlete::AthleteRepository,
};
use uuid::Uuid;

use crate::error::{OrNotFound, WebError, WebResult};

fn not_found_by_id(id: Uuid) -> impl FnOnce() -> String {
    move || format!("Atleta não encontrado no id: {}", id)
}

/// List all athletes, one page at a time
pub async fn list_athletes(
    pool: &PgPool,
    params: &PaginationParams,
) -> WebResult<PaginatedResponse<Athlete>> {
    let repo = AthleteRepository::new(pool);
    let (athletes, total_items) = repo.list(params).await?;

    Ok(PaginatedResponse::new(athletes, params, total_items))
}

/// Get athlete by ID
pub async fn get_athlete(pool: &PgPool, id: Uuid) -> WebResult<Athlete> {
    let repo = AthleteRepository::new(pool);
    repo.find_by_id(id).await.or_not_found(not_found_by_id(id))
}

/// Get athlete by CPF, raw or punctuated
pub async fn get_athlete_by_cpf(pool: &PgPool, raw_cpf: &str) -> WebResult<Athlete> {
    let not_found = || format!("Atleta não encontrado no CPF: {}", format_cpf(raw_cpf));

    let Ok(cpf) = Cpf::parse(raw_cpf) else {
        return Err(WebError::NotFound(not_found()));
    };

    let repo = AthleteRepository::new(pool);
    repo.find_by_cpf(cpf.as_str()).await.or_not_found(not_found)
}

/// Case-insensitive prefix search on the athlete name
pub async fn search_athletes_by_name(
    pool: &PgPool,
    name: &str,
    params: &PaginationParams,
) -> WebResult<PaginatedResponse<Athlete>> {
    let repo = AthleteRepository::new(pool);
    let (athletes, total_items) = repo.search_by_name(name, params).await?;

    if total_items == 0 {
        return Err(WebError::NotFound("Atleta não encontrado".to_string()));
    }

    Ok(PaginatedResponse::new(athletes, params, total_items))
}

/// Create a new athlete
pub async fn create_athlete(pool: &PgPool, request: CreateAthleteRequest) -> WebResult<Athlete> {
    let display_cpf = format_cpf(&request.cpf);
    let new_athlete = request
        .into_new_athlete()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let repo = AthleteRepository::new(pool);
    let athlete = repo.create(&new_athlete).await.map_err(|e| match e {
        StorageError::ConstraintViolation(_) => WebError::Conflict(format!(
            "Já existe um atleta cadastrado com o cpf: {}",
            display_cpf
        )),
        e @ (StorageError::CategoryNotFound(_) | StorageError::TrainingCenterNotFound(_)) => {
            WebError::Storage(e)
        }
        e => {
            tracing::error!("Failed to insert athlete: {:?}", e);
            WebError::InternalServerError("Ocorreu um erro ao inserir os dados no banco".to_string())
        }
    })?;

    tracing::info!(athlete_id = %athlete.athlete_id, "Athlete created");

    Ok(athlete)
}

/// Update an athlete
pub async fn update_athlete(
    pool: &PgPool,
    id: Uuid,
    request: &UpdateAthleteRequest,
) -> WebResult<Athlete> {
    let repo = AthleteRepository::new(pool);
    let athlete = repo
        .update(id, request)
        .await
        .or_not_found(not_found_by_id(id))?;

    tracing::info!(athlete_id = %id, "Athlete updated");

    Ok(athlete)
}

/// Delete an athlete
pub async fn delete_athlete(pool: &PgPool, id: Uuid) -> WebResult<()> {
    let repo = AthleteRepository::new(pool);
    repo.delete(id).await.or_not_found(not_found_by_id(id))?;

    tracing::info!(athlete_id = %id, "Athlete deleted");

    Ok(())
}
