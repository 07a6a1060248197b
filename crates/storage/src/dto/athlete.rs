use std::borrow::Cow;

use chrono::{NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{Athlete, Cpf, InvalidCpf, NewAthlete};

/// Reference to an existing category, by name
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryRef {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, message = "Category name must not be empty"))]
    #[schema(example = "Scale")]
    pub name: String,
}

/// Reference to an existing training center, by name
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TrainingCenterRef {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, message = "Training center name must not be empty"))]
    #[schema(example = "CT King")]
    pub name: String,
}

/// Full athlete representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AthleteResponse {
    pub id: Uuid,
    pub created_at: NaiveDateTime,
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
    #[serde(rename = "idade")]
    pub age: i32,
    #[serde(rename = "peso", with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub weight: Decimal,
    #[serde(rename = "altura", with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub height: Decimal,
    #[serde(rename = "sexo")]
    pub sex: String,
    #[serde(rename = "categoria")]
    pub category: CategoryRef,
    #[serde(rename = "centro_treinamento")]
    pub training_center: TrainingCenterRef,
}

/// Reduced athlete view: name, category and training center only
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AthleteBasicResponse {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: CategoryRef,
    #[serde(rename = "centro_treinamento")]
    pub training_center: TrainingCenterRef,
}

/// Request payload for creating a new athlete
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAthleteRequest {
    #[serde(rename = "nome")]
    #[validate(length(
        min = 1,
        max = 50,
        message = "Name must be between 1 and 50 characters"
    ))]
    #[schema(example = "Joao")]
    pub name: String,

    #[validate(custom(function = "validate_cpf"))]
    #[schema(example = "12345678900")]
    pub cpf: String,

    #[serde(rename = "idade")]
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    #[schema(example = 25)]
    pub age: i32,

    #[serde(rename = "peso", with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_weight"))]
    #[schema(value_type = f64, example = 75.5)]
    pub weight: Decimal,

    #[serde(rename = "altura", with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_height"))]
    #[schema(value_type = f64, example = 1.70)]
    pub height: Decimal,

    #[serde(rename = "sexo")]
    #[validate(custom(function = "validate_sex"))]
    #[schema(example = "M")]
    pub sex: String,

    #[serde(rename = "categoria")]
    #[validate(nested)]
    pub category: CategoryRef,

    #[serde(rename = "centro_treinamento")]
    #[validate(nested)]
    pub training_center: TrainingCenterRef,
}

/// Request payload for a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAthleteRequest {
    #[serde(rename = "nome", default)]
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,

    #[serde(rename = "idade", default)]
    #[validate(range(min = 1, max = 150))]
    pub age: Option<i32>,

    #[serde(
        rename = "peso",
        default,
        with = "rust_decimal::serde::float_option"
    )]
    #[validate(custom(function = "validate_weight"))]
    #[schema(value_type = Option<f64>)]
    pub weight: Option<Decimal>,

    #[serde(
        rename = "altura",
        default,
        with = "rust_decimal::serde::float_option"
    )]
    #[validate(custom(function = "validate_height"))]
    #[schema(value_type = Option<f64>)]
    pub height: Option<Decimal>,
}

impl UpdateAthleteRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.weight.is_none() && self.height.is_none()
    }
}

impl CreateAthleteRequest {
    /// Assign identity and creation time. The CPF is normalized to bare digits.
    pub fn into_new_athlete(self) -> Result<NewAthlete, InvalidCpf> {
        let cpf = Cpf::parse(&self.cpf)?;

        Ok(NewAthlete {
            athlete_id: Uuid::new_v4(),
            name: self.name,
            cpf: cpf.into_inner(),
            age: self.age,
            weight: round_measure(self.weight),
            height: round_measure(self.height),
            sex: self.sex,
            created_at: Utc::now().naive_utc(),
            category_name: self.category.name,
            training_center_name: self.training_center.name,
        })
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    Cpf::parse(cpf)
        .map(|_| ())
        .map_err(|_| invalid("invalid_cpf", "CPF must contain exactly 11 digits"))
}

fn validate_sex(sex: &str) -> Result<(), ValidationError> {
    const VALID_SEXES: &[&str] = &["M", "F"];

    if VALID_SEXES.contains(&sex) {
        Ok(())
    } else {
        Err(invalid("invalid_sex", "Sex must be 'M' or 'F'"))
    }
}

/// Number of decimal places stored for weight and height.
pub const MEASURE_SCALE: u32 = 2;

/// Round a weight or height to the scale of its column, the way Postgres does
/// when it stores a `NUMERIC(p, 2)`.
pub fn round_measure(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MEASURE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

// Bounds follow the NUMERIC precision of the columns and apply to the stored value.
fn validate_weight(weight: &Decimal) -> Result<(), ValidationError> {
    let weight = round_measure(*weight);
    if weight.is_sign_positive() && !weight.is_zero() && weight < Decimal::from(10_000) {
        Ok(())
    } else {
        Err(invalid(
            "invalid_weight",
            "Weight must be greater than 0 and below 10000",
        ))
    }
}

fn validate_height(height: &Decimal) -> Result<(), ValidationError> {
    let height = round_measure(*height);
    if height.is_sign_positive() && !height.is_zero() && height < Decimal::from(100) {
        Ok(())
    } else {
        Err(invalid(
            "invalid_height",
            "Height must be greater than 0 and below 100",
        ))
    }
}

impl From<Athlete> for AthleteResponse {
    fn from(athlete: Athlete) -> Self {
        Self {
            id: athlete.athlete_id,
            created_at: athlete.created_at,
            name: athlete.name,
            cpf: athlete.cpf,
            age: athlete.age,
            weight: athlete.weight,
            height: athlete.height,
            sex: athlete.sex,
            category: CategoryRef {
                name: athlete.category_name,
            },
            training_center: TrainingCenterRef {
                name: athlete.training_center_name,
            },
        }
    }
}

impl From<Athlete> for AthleteBasicResponse {
    fn from(athlete: Athlete) -> Self {
        Self {
            name: athlete.name,
            category: CategoryRef {
                name: athlete.category_name,
            },
            training_center: TrainingCenterRef {
                name: athlete.training_center_name,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_payload() -> serde_json::Value {
        json!({
            "nome": "Joao",
            "cpf": "12345678900",
            "idade": 25,
            "peso": 75.5,
            "altura": 1.7,
            "sexo": "M",
            "categoria": { "nome": "Scale" },
            "centro_treinamento": { "nome": "CT King" }
        })
    }

    fn sample_athlete() -> Athlete {
        Athlete {
            athlete_id: Uuid::nil(),
            name: "Ana".to_string(),
            cpf: "12345678901".to_string(),
            age: 30,
            weight: Decimal::new(6250, 2),
            height: Decimal::new(168, 2),
            sex: "F".to_string(),
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            category_id: 1,
            category_name: "RX".to_string(),
            training_center_id: 2,
            training_center_name: "CT Norte".to_string(),
        }
    }

    #[test]
    fn test_create_request_reads_portuguese_fields() {
        let req: CreateAthleteRequest = serde_json::from_value(create_payload()).unwrap();
        assert_eq!(req.name, "Joao");
        assert_eq!(req.weight, Decimal::new(755, 1));
        assert_eq!(req.category.name, "Scale");
        assert_eq!(req.training_center.name, "CT King");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_bad_cpf() {
        let mut payload = create_payload();
        payload["cpf"] = json!("1234");
        let req: CreateAthleteRequest = serde_json::from_value(payload).unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cpf"));
    }

    #[test]
    fn test_create_request_rejects_non_positive_weight() {
        let mut payload = create_payload();
        payload["peso"] = json!(0);
        let req: CreateAthleteRequest = serde_json::from_value(payload).unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("weight"));
    }

    #[test]
    fn test_create_request_rejects_unknown_sex() {
        let mut payload = create_payload();
        payload["sexo"] = json!("X");
        let req: CreateAthleteRequest = serde_json::from_value(payload).unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_validates_nested_category() {
        let mut payload = create_payload();
        payload["categoria"] = json!({ "nome": "" });
        let req: CreateAthleteRequest = serde_json::from_value(payload).unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.errors().contains_key("category"));
    }

    #[test]
    fn test_reference_names_are_not_length_capped() {
        let mut payload = create_payload();
        payload["categoria"] = json!({ "nome": "a category name longer than any stored one" });
        let req: CreateAthleteRequest = serde_json::from_value(payload).unwrap();

        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_measures_that_round_past_the_column_are_rejected() {
        let mut payload = create_payload();
        payload["altura"] = json!(99.999);
        payload["peso"] = json!(9999.999);
        let req: CreateAthleteRequest = serde_json::from_value(payload).unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("height"));
        assert!(fields.contains_key("weight"));

        let req: UpdateAthleteRequest =
            serde_json::from_value(json!({ "peso": 9999.999, "altura": 0.001 })).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("weight"));
        assert!(fields.contains_key("height"));
    }

    #[test]
    fn test_into_new_athlete_rounds_measures() {
        let mut payload = create_payload();
        payload["peso"] = json!(75.456);
        payload["altura"] = json!(99.994);
        let req: CreateAthleteRequest = serde_json::from_value(payload).unwrap();
        assert!(req.validate().is_ok());

        let new_athlete = req.into_new_athlete().unwrap();
        assert_eq!(new_athlete.weight, Decimal::new(7546, 2));
        assert_eq!(new_athlete.height, Decimal::new(9999, 2));
    }

    #[test]
    fn test_round_measure_rounds_half_away_from_zero() {
        assert_eq!(round_measure(Decimal::new(1245, 3)), Decimal::new(125, 2));
        assert_eq!(round_measure(Decimal::new(1244, 3)), Decimal::new(124, 2));
    }

    #[test]
    fn test_into_new_athlete_normalizes_cpf() {
        let mut payload = create_payload();
        payload["cpf"] = json!("123.456.789-00");
        let req: CreateAthleteRequest = serde_json::from_value(payload).unwrap();

        let new_athlete = req.into_new_athlete().unwrap();
        assert_eq!(new_athlete.cpf, "12345678900");
        assert_eq!(new_athlete.category_name, "Scale");
        assert_eq!(new_athlete.training_center_name, "CT King");
    }

    #[test]
    fn test_update_request_fields_are_optional() {
        let req: UpdateAthleteRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.is_empty());
        assert!(req.validate().is_ok());

        let req: UpdateAthleteRequest =
            serde_json::from_value(json!({ "idade": 31, "peso": null })).unwrap();
        assert_eq!(req.age, Some(31));
        assert_eq!(req.weight, None);
        assert!(req.name.is_none());
    }

    #[test]
    fn test_update_request_validates_present_fields() {
        let req: UpdateAthleteRequest =
            serde_json::from_value(json!({ "nome": "", "altura": -1.0 })).unwrap();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("height"));
    }

    #[test]
    fn test_response_serializes_wire_shape() {
        let value = serde_json::to_value(AthleteResponse::from(sample_athlete())).unwrap();

        assert_eq!(value["nome"], "Ana");
        assert_eq!(value["peso"], json!(62.5));
        assert_eq!(value["altura"], json!(1.68));
        assert_eq!(value["categoria"]["nome"], "RX");
        assert_eq!(value["centro_treinamento"]["nome"], "CT Norte");
        assert_eq!(value["id"], Uuid::nil().to_string());
    }

    #[test]
    fn test_basic_response_has_only_three_fields() {
        let value = serde_json::to_value(AthleteBasicResponse::from(sample_athlete())).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert_eq!(value["nome"], "Ana");
        assert_eq!(value["categoria"]["nome"], "RX");
        assert_eq!(value["centro_treinamento"]["nome"], "CT Norte");
    }
}
