#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Listing service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed listing data: {0}")]
    Source(String),

    #[error("No exchange rate for currency '{0}'")]
    MissingRate(String),

    #[error("Invalid table name {0:?}")]
    InvalidTableName(String),
}
