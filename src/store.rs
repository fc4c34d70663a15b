use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::models::vacancy::{EmployerCount, NewVacancy, VacancyListing};

const LISTING_COLUMNS: &str = "title, employer, salary, currency, url, date_added";

/// Handle over the vacancy table.
///
/// Owns the connection pool for its whole lifetime; callers close it
/// explicitly when the run is done.
pub struct VacancyStore {
    pool: PgPool,
    table: String,
}

impl VacancyStore {
    /// Connect and validate the table name. Identifiers cannot be bound
    /// as statement parameters, so anything outside
    /// `[A-Za-z_][A-Za-z0-9_]*` is rejected before it can reach query
    /// text.
    pub async fn connect(database_url: &str, table: &str) -> Result<Self, AppError> {
        let pool = db::create_pool(database_url).await?;
        Self::with_pool(pool, table)
    }

    /// Wrap an existing pool. Used by callers that manage the pool
    /// themselves.
    pub fn with_pool(pool: PgPool, table: &str) -> Result<Self, AppError> {
        if !is_valid_table_name(table) {
            return Err(AppError::InvalidTableName(table.to_string()));
        }
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Create the vacancy table if it does not exist yet. Idempotent;
    /// never touches existing rows.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id SERIAL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                employer VARCHAR(255),
                salary INT,
                currency VARCHAR(5),
                rate DOUBLE PRECISION,
                url TEXT NOT NULL,
                date_added DATE NOT NULL
            )",
            self.table
        ))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Discard the current contents and insert `records` in order, all
    /// inside one transaction. On any failure the prior contents stay
    /// put.
    pub async fn replace_all(&self, records: &[NewVacancy]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("TRUNCATE TABLE {} RESTART IDENTITY", self.table))
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO {} (title, employer, salary, currency, rate, url, date_added) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            self.table
        );
        for record in records {
            sqlx::query(&insert)
                .bind(&record.title)
                .bind(&record.employer)
                .bind(record.salary)
                .bind(&record.currency)
                .bind(record.rate)
                .bind(&record.url)
                .bind(record.date_added)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Vacancy count per employer, with NULL employers forming their own
    /// group. Counts sum to the total row count.
    pub async fn count_by_employer(&self) -> Result<Vec<EmployerCount>, AppError> {
        let counts = sqlx::query_as::<_, EmployerCount>(&format!(
            "SELECT employer, COUNT(*) AS vacancies FROM {} GROUP BY employer",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Mean salary in the reference currency, rounded up to the nearest
    /// integer. `None` when no row carries a salary.
    pub async fn average_salary(&self) -> Result<Option<i64>, AppError> {
        let avg: Option<f64> = sqlx::query_scalar(&format!(
            "SELECT CEILING(SUM(salary / rate) / COUNT(salary)) \
             FROM {} WHERE salary IS NOT NULL",
            self.table
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(avg.map(|v| v as i64))
    }

    /// Every row, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<VacancyListing>, AppError> {
        let rows = sqlx::query_as::<_, VacancyListing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM {} ORDER BY id",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Rows earning strictly more than the average, with both sides of
    /// the comparison converted into the reference currency.
    pub async fn above_average_salary(&self) -> Result<Vec<VacancyListing>, AppError> {
        let rows = sqlx::query_as::<_, VacancyListing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM {t} \
             WHERE salary IS NOT NULL \
               AND salary / rate > ( \
                 SELECT SUM(salary / rate) / COUNT(salary) \
                 FROM {t} WHERE salary IS NOT NULL \
               ) \
             ORDER BY id",
            t = self.table
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Substring match on title. The keyword is bound as a parameter with
    /// its pattern metacharacters escaped, so it always matches
    /// literally and can never alter the query.
    pub async fn search_by_title(&self, keyword: &str) -> Result<Vec<VacancyListing>, AppError> {
        let pattern = format!("%{}%", escape_like(keyword));
        let rows = sqlx::query_as::<_, VacancyListing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM {} \
             WHERE title ILIKE $1 ESCAPE '\\' ORDER BY id",
            self.table
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
