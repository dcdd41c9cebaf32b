use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    FinancialInput, FinancialInputRow, FinancialInputWithOwner, NewFinancialInput, NewUser,
    RecordPatch, User, UserRow,
};
use crate::database::store::{deletion_allowed, role_change_allowed, Guarded, Store};
use crate::types::Role;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

const RECORD_SELECT: &str = r#"
    SELECT
        f.id, f.user_id, f.units_sold, f.price_per_unit, f.cost,
        f.total_revenue, f.profit, f.created_at,
        u.name AS owner_name, u.email AS owner_email
    FROM financial_inputs f
    LEFT JOIN users u ON u.id = f.user_id
"#;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_record(&self, id: Uuid) -> Result<Option<FinancialInputWithOwner>, DatabaseError> {
        let sql = format!("{} WHERE f.id = $1", RECORD_SELECT);
        let row = sqlx::query_as::<_, FinancialInputRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(FinancialInputWithOwner::from))
    }
}

/// Map unique-constraint violations on `users.email` to a conflict
fn email_conflict(err: sqlx::Error) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DatabaseError::Conflict("Email already exists".to_string())
        }
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {}",
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(email_conflict)?;

        User::try_from(row)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at, id", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn save_profile(&self, user: &User) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, updated_at = $5
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(email_conflict)?
            .map(User::try_from)
            .transpose()
    }

    async fn set_role_guarded(&self, id: Uuid, role: Role) -> Result<Guarded<User>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Lock every admin row first (fixed order). A concurrent guarded call
        // blocks here and re-evaluates the predicate after we commit.
        let admins: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE role = 'admin' ORDER BY id FOR UPDATE")
                .fetch_all(&mut *tx)
                .await?;

        let select = format!("SELECT {} FROM users WHERE id = $1 FOR UPDATE", USER_COLUMNS);
        let target = match sqlx::query_as::<_, UserRow>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        {
            Some(row) => User::try_from(row)?,
            None => return Ok(Guarded::NotFound),
        };

        if !role_change_allowed(target.role, role, admins.len() as i64) {
            return Ok(Guarded::LastAdmin);
        }

        let update = format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&update)
            .bind(id)
            .bind(role.as_str())
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Guarded::Applied(User::try_from(row)?))
    }

    async fn delete_user_guarded(&self, id: Uuid) -> Result<Guarded<()>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let admins: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE role = 'admin' ORDER BY id FOR UPDATE")
                .fetch_all(&mut *tx)
                .await?;

        let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let role = match role {
            Some(text) => text
                .parse::<Role>()
                .map_err(|e| DatabaseError::QueryError(format!("user {}: {}", id, e)))?,
            None => return Ok(Guarded::NotFound),
        };

        if !deletion_allowed(role, admins.len() as i64) {
            return Ok(Guarded::LastAdmin);
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Guarded::Applied(()))
    }

    async fn insert_record(&self, record: NewFinancialInput) -> Result<FinancialInput, DatabaseError> {
        let created = FinancialInput {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            input_data: record.input_data,
            calculated_result: record.calculated_result,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO financial_inputs
                (id, user_id, units_sold, price_per_unit, cost, total_revenue, profit, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(created.id)
        .bind(created.user_id)
        .bind(created.input_data.units_sold)
        .bind(created.input_data.price_per_unit)
        .bind(created.input_data.cost)
        .bind(created.calculated_result.total_revenue)
        .bind(created.calculated_result.profit)
        .bind(created.created_at)
        .execute(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_records(&self) -> Result<Vec<FinancialInputWithOwner>, DatabaseError> {
        let sql = format!("{} ORDER BY f.created_at, f.id", RECORD_SELECT);
        let rows = sqlx::query_as::<_, FinancialInputRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(FinancialInputWithOwner::from).collect())
    }

    async fn update_record(
        &self,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<Option<FinancialInputWithOwner>, DatabaseError> {
        // COALESCE keeps the stored value for any part the patch omits
        let input = patch.input_data;
        let result = patch.calculated_result;

        let updated = sqlx::query(
            "UPDATE financial_inputs SET
                units_sold     = COALESCE($2, units_sold),
                price_per_unit = COALESCE($3, price_per_unit),
                cost           = COALESCE($4, cost),
                total_revenue  = COALESCE($5, total_revenue),
                profit         = COALESCE($6, profit)
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.map(|d| d.units_sold))
        .bind(input.map(|d| d.price_per_unit))
        .bind(input.map(|d| d.cost))
        .bind(result.map(|r| r.total_revenue))
        .bind(result.map(|r| r.profit))
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_record(id).await
    }

    async fn delete_record(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let deleted = sqlx::query("DELETE FROM financial_inputs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }
}
