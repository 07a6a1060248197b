use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;
use storage::{
    Database,
    dto::{
        athlete::{
            AthleteBasicResponse, AthleteResponse, CreateAthleteRequest, UpdateAthleteRequest,
        },
        common::{PaginatedResponse, PaginationParams},
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/atletas/",
    request_body = CreateAthleteRequest,
    responses(
        (status = 201, description = "Athlete created successfully", body = AthleteResponse),
        (status = 400, description = "Malformed or invalid payload, or unknown category or training center"),
        (status = 409, description = "An athlete with this CPF already exists"),
        (status = 500, description = "Database error while inserting")
    ),
    tag = "atletas"
)]
pub async fn create_athlete(
    State(db): State<Database>,
    WithRejection(Json(req), _): WithRejection<Json<CreateAthleteRequest>, WebError>,
) -> Result<Response, WebError> {
    req.validate()?;

    let athlete = services::create_athlete(db.pool(), req).await?;

    Ok((StatusCode::CREATED, Json(AthleteResponse::from(athlete))).into_response())
}

#[utoipa::path(
    get,
    path = "/atletas/",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of athletes", body = PaginatedResponse<AthleteResponse>),
        (status = 400, description = "Invalid pagination parameters")
    ),
    tag = "atletas"
)]
pub async fn list_athletes(
    State(db): State<Database>,
    WithRejection(Query(params), _): WithRejection<Query<PaginationParams>, WebError>,
) -> Result<Response, WebError> {
    params.validate().map_err(WebError::BadRequest)?;

    let page = services::list_athletes(db.pool(), &params).await?;

    Ok(Json(page.map(AthleteResponse::from)).into_response())
}

#[utoipa::path(
    get,
    path = "/atletas/all",
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of athletes showing name, category and training center", body = PaginatedResponse<AthleteBasicResponse>),
        (status = 400, description = "Invalid pagination parameters")
    ),
    tag = "atletas"
)]
pub async fn list_athletes_basic(
    State(db): State<Database>,
    WithRejection(Query(params), _): WithRejection<Query<PaginationParams>, WebError>,
) -> Result<Response, WebError> {
    params.validate().map_err(WebError::BadRequest)?;

    let page = services::list_athletes(db.pool(), &params).await?;

    Ok(Json(page.map(AthleteBasicResponse::from)).into_response())
}

#[utoipa::path(
    get,
    path = "/atletas/{id}",
    params(
        ("id" = Uuid, Path, description = "Athlete id")
    ),
    responses(
        (status = 200, description = "Athlete found", body = AthleteResponse),
        (status = 404, description = "Athlete not found")
    ),
    tag = "atletas"
)]
pub async fn get_athlete(
    State(db): State<Database>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, WebError>,
) -> Result<Response, WebError> {
    let athlete = services::get_athlete(db.pool(), id).await?;

    Ok(Json(AthleteResponse::from(athlete)).into_response())
}

#[utoipa::path(
    patch,
    path = "/atletas/{id}",
    params(
        ("id" = Uuid, Path, description = "Athlete id")
    ),
    request_body = UpdateAthleteRequest,
    responses(
        (status = 200, description = "Athlete updated successfully", body = AthleteResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Athlete not found")
    ),
    tag = "atletas"
)]
pub async fn update_athlete(
    State(db): State<Database>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, WebError>,
    WithRejection(Json(update_req), _): WithRejection<Json<UpdateAthleteRequest>, WebError>,
) -> Result<Response, WebError> {
    update_req.validate()?;

    let updated = services::update_athlete(db.pool(), id, &update_req).await?;

    Ok(Json(AthleteResponse::from(updated)).into_response())
}

#[utoipa::path(
    delete,
    path = "/atletas/{id}",
    params(
        ("id" = Uuid, Path, description = "Athlete id")
    ),
    responses(
        (status = 204, description = "Athlete deleted successfully"),
        (status = 404, description = "Athlete not found")
    ),
    tag = "atletas"
)]
pub async fn delete_athlete(
    State(db): State<Database>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, WebError>,
) -> Result<Response, WebError> {
    services::delete_athlete(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/atletas/cpf/{cpf}",
    params(
        ("cpf" = String, Path, description = "CPF, either 11 digits or 000.000.000-00")
    ),
    responses(
        (status = 200, description = "Athlete found", body = AthleteResponse),
        (status = 404, description = "Athlete not found")
    ),
    tag = "atletas"
)]
pub async fn get_athlete_by_cpf(
    State(db): State<Database>,
    WithRejection(Path(cpf), _): WithRejection<Path<String>, WebError>,
) -> Result<Response, WebError> {
    let athlete = services::get_athlete_by_cpf(db.pool(), &cpf).await?;

    Ok(Json(AthleteResponse::from(athlete)).into_response())
}

#[utoipa::path(
    get,
    path = "/atletas/nome/{nome}",
    params(
        ("nome" = String, Path, description = "Name prefix, case-insensitive"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Page of matching athletes", body = PaginatedResponse<AthleteResponse>),
        (status = 400, description = "Invalid pagination parameters"),
        (status = 404, description = "No athlete matches")
    ),
    tag = "atletas"
)]
pub async fn search_athletes_by_name(
    State(db): State<Database>,
    WithRejection(Path(name), _): WithRejection<Path<String>, WebError>,
    WithRejection(Query(params), _): WithRejection<Query<PaginationParams>, WebError>,
) -> Result<Response, WebError> {
    params.validate().map_err(WebError::BadRequest)?;

    let page = services::search_athletes_by_name(db.pool(), &name, &params).await?;

    Ok(Json(page.map(AthleteResponse::from)).into_response())
}
