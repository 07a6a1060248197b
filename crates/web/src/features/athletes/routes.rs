use axum::{
    Router,
    response::Redirect,
    routing::get,
};
use storage::Database;

use super::handlers::{
    create_athlete, delete_athlete, get_athlete, get_athlete_by_cpf, list_athletes,
    list_athletes_basic, search_athletes_by_name, update_athlete,
};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/atletas", get(|| async { Redirect::to("/atletas/") }))
        .route("/atletas/", get(list_athletes).post(create_athlete))
        .route("/atletas/all", get(list_athletes_basic))
        .route(
            "/atletas/:id",
            get(get_athlete).patch(update_athlete).delete(delete_athlete),
        )
        .route("/atletas/cpf/:cpf", get(get_athlete_by_cpf))
        .route("/atletas/nome/:nome", get(search_athletes_by_name))
}
