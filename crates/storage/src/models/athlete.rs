use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// An athlete row joined with the names of its category and training center.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Athlete {
    pub athlete_id: Uuid,
    pub name: String,
    pub cpf: String,
    pub age: i32,
    pub weight: Decimal,
    pub height: Decimal,
    pub sex: String,
    pub created_at: chrono::NaiveDateTime,
    pub category_id: i32,
    pub category_name: String,
    pub training_center_id: i32,
    pub training_center_name: String,
}

/// A validated athlete ready to insert. The category and training center are
/// still referenced by name and get resolved inside the insert transaction.
#[derive(Debug, Clone)]
pub struct NewAthlete {
    pub athlete_id: Uuid,
    pub name: String,
    pub cpf: String,
    pub age: i32,
    pub weight: Decimal,
    pub height: Decimal,
    pub sex: String,
    pub created_at: chrono::NaiveDateTime,
    pub category_name: String,
    pub training_center_name: String,
}
