use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::athlete::{UpdateAthleteRequest, round_measure};
use crate::dto::common::PaginationParams;
use crate::error::{Result, StorageError};
use crate::models::{Athlete, Category, NewAthlete, TrainingCenter};

const SELECT_ATHLETE: &str = r#"
    SELECT a.athlete_id, a.name, a.cpf, a.age, a.weight, a.height, a.sex, a.created_at,
           a.category_id, c.name AS category_name,
           a.training_center_id, tc.name AS training_center_name
    FROM athletes a
    INNER JOIN categories c ON c.category_id = a.category_id
    INNER JOIN training_centers tc ON tc.training_center_id = a.training_center_id
"#;

pub struct AthleteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AthleteRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List athletes in creation order, one page at a time
    pub async fn list(&self, params: &PaginationParams) -> Result<(Vec<Athlete>, i64)> {
        let total_items = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM athletes")
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            "{SELECT_ATHLETE} ORDER BY a.created_at, a.athlete_id LIMIT $1 OFFSET $2"
        );
        let athletes = sqlx::query_as::<_, Athlete>(&sql)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(self.pool)
            .await?;

        Ok((athletes, total_items))
    }

    /// Find athlete by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Athlete> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut *conn, id, false)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Find athlete by CPF digits
    pub async fn find_by_cpf(&self, cpf: &str) -> Result<Athlete> {
        let sql = format!("{SELECT_ATHLETE} WHERE a.cpf = $1");
        let athlete = sqlx::query_as::<_, Athlete>(&sql)
            .bind(cpf)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        Ok(athlete)
    }

    /// Case-insensitive prefix search on the athlete name
    pub async fn search_by_name(
        &self,
        prefix: &str,
        params: &PaginationParams,
    ) -> Result<(Vec<Athlete>, i64)> {
        let pattern = format!("{}%", escape_like(prefix));

        let total_items = sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM athletes WHERE name ILIKE $1 ESCAPE '\'"#,
        )
        .bind(&pattern)
        .fetch_one(self.pool)
        .await?;

        let sql = format!(
            r#"{SELECT_ATHLETE}
            WHERE a.name ILIKE $1 ESCAPE '\'
            ORDER BY a.name, a.athlete_id
            LIMIT $2 OFFSET $3"#
        );
        let athletes = sqlx::query_as::<_, Athlete>(&sql)
            .bind(&pattern)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(self.pool)
            .await?;

        Ok((athletes, total_items))
    }

    /// Create a new athlete.
    ///
    /// Category and training center are resolved by exact name inside the same
    /// transaction as the insert. Any error drops the transaction, rolling it back.
    pub async fn create(&self, new: &NewAthlete) -> Result<Athlete> {
        let mut tx = self.pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(
            "SELECT category_id, id, name FROM categories WHERE name = $1",
        )
        .bind(&new.category_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::CategoryNotFound(new.category_name.clone()))?;

        let training_center = sqlx::query_as::<_, TrainingCenter>(
            r#"
            SELECT training_center_id, id, name, address, owner
            FROM training_centers
            WHERE name = $1
            "#,
        )
        .bind(&new.training_center_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::TrainingCenterNotFound(new.training_center_name.clone()))?;

        sqlx::query(
            r#"
            INSERT INTO athletes (
                athlete_id, name, cpf, age, weight, height, sex, created_at,
                category_id, training_center_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(new.athlete_id)
        .bind(&new.name)
        .bind(&new.cpf)
        .bind(new.age)
        .bind(new.weight)
        .bind(new.height)
        .bind(&new.sex)
        .bind(new.created_at)
        .bind(category.category_id)
        .bind(training_center.training_center_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let error = StorageError::from(e);
            if error.is_unique_violation() {
                StorageError::ConstraintViolation("cpf already exists".to_string())
            } else {
                error
            }
        })?;

        let athlete = fetch_by_id(&mut *tx, new.athlete_id, false)
            .await?
            .ok_or(StorageError::NotFound)?;

        tx.commit().await?;

        Ok(athlete)
    }

    /// Apply the fields present in `req`, keeping the stored value for the rest
    pub async fn update(&self, id: Uuid, req: &UpdateAthleteRequest) -> Result<Athlete> {
        let mut tx = self.pool.begin().await?;

        let existing = fetch_by_id(&mut *tx, id, true)
            .await?
            .ok_or(StorageError::NotFound)?;

        if req.is_empty() {
            tx.commit().await?;
            return Ok(existing);
        }

        let name = req.name.as_ref().unwrap_or(&existing.name);
        let age = req.age.unwrap_or(existing.age);
        let weight = req.weight.map(round_measure).unwrap_or(existing.weight);
        let height = req.height.map(round_measure).unwrap_or(existing.height);

        sqlx::query(
            r#"
            UPDATE athletes
            SET name = $2,
                age = $3,
                weight = $4,
                height = $5
            WHERE athlete_id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(age)
        .bind(weight)
        .bind(height)
        .execute(&mut *tx)
        .await?;

        let athlete = fetch_by_id(&mut *tx, id, false)
            .await?
            .ok_or(StorageError::NotFound)?;

        tx.commit().await?;

        Ok(athlete)
    }

    /// Delete an athlete by ID
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM athletes WHERE athlete_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

async fn fetch_by_id(
    conn: &mut PgConnection,
    id: Uuid,
    for_update: bool,
) -> Result<Option<Athlete>> {
    let lock = if for_update { "FOR UPDATE OF a" } else { "" };
    let sql = format!("{SELECT_ATHLETE} WHERE a.athlete_id = $1 {lock}");

    let athlete = sqlx::query_as::<_, Athlete>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(athlete)
}

/// Escape `LIKE` metacharacters so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_plain_text() {
        assert_eq!(escape_like("Ana"), "Ana");
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
