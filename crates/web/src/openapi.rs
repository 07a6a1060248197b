use utoipa::OpenApi;

use crate::features::athletes::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WorkoutApi",
        description = "Athlete registry for workout tracking"
    ),
    paths(
        handlers::create_athlete,
        handlers::list_athletes,
        handlers::list_athletes_basic,
        handlers::get_athlete,
        handlers::update_athlete,
        handlers::delete_athlete,
        handlers::get_athlete_by_cpf,
        handlers::search_athletes_by_name,
    ),
    components(
        schemas(
            storage::dto::athlete::CreateAthleteRequest,
            storage::dto::athlete::UpdateAthleteRequest,
            storage::dto::athlete::AthleteResponse,
            storage::dto::athlete::AthleteBasicResponse,
            storage::dto::athlete::CategoryRef,
            storage::dto::athlete::TrainingCenterRef,
        )
    ),
    tags(
        (name = "atletas", description = "Athlete endpoints"),
    )
)]
pub struct ApiDoc;
