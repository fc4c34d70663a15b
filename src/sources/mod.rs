// Listing-source module.
// Defines the raw record shape and the trait vacancy sources implement.

pub mod hh;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::error::AppError;
use crate::normalize::RateTable;

/// One vacancy as returned by the listing service, before normalization.
/// The salary fields are jointly present-or-absent at the source.
#[derive(Debug, Clone)]
pub struct RawVacancy {
    pub employer: Option<String>,
    pub title: String,
    pub salary_from: Option<i32>,
    pub salary_currency: Option<String>,
    pub url: String,
    pub published_at: DateTime<FixedOffset>,
}

/// Trait that all vacancy sources must implement.
/// Both fetches are fresh per pipeline run; nothing is cached across runs.
#[async_trait]
pub trait VacancySource: Send + Sync {
    /// Exchange rates against the reference currency.
    async fn fetch_rates(&self) -> Result<RateTable, AppError>;

    /// Vacancies per employer, one inner vector per roster entry, in
    /// roster order.
    async fn fetch_vacancies(
        &self,
        employers: &[String],
    ) -> Result<Vec<Vec<RawVacancy>>, AppError>;
}
