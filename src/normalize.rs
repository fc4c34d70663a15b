use std::collections::HashMap;

use crate::error::AppError;
use crate::models::vacancy::NewVacancy;
use crate::sources::RawVacancy;

/// Exchange rates keyed by currency code, expressed as units of that
/// currency per unit of the reference currency. Built fresh every run.
#[derive(Debug, Clone, Default)]
pub struct RateTable(HashMap<String, f64>);

impl RateTable {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, code: &str, rate: f64) {
        self.0.insert(code.to_string(), rate);
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Flatten per-employer raw results into canonical records, preserving
/// roster order.
///
/// A vacancy with no salary amount keeps salary, currency and rate all
/// unset. A declared salary must resolve to a known rate; otherwise the
/// whole batch fails so nothing partial reaches the store.
pub fn normalize(
    raw: Vec<Vec<RawVacancy>>,
    rates: &RateTable,
) -> Result<Vec<NewVacancy>, AppError> {
    let mut records = Vec::new();
    for group in raw {
        for vacancy in group {
            records.push(normalize_one(vacancy, rates)?);
        }
    }
    Ok(records)
}

fn normalize_one(vacancy: RawVacancy, rates: &RateTable) -> Result<NewVacancy, AppError> {
    let (salary, currency, rate) = match vacancy.salary_from {
        None => (None, None, None),
        Some(amount) => {
            let code = vacancy.salary_currency.ok_or_else(|| {
                AppError::Source(format!(
                    "vacancy '{}' declares a salary without a currency",
                    vacancy.title
                ))
            })?;
            let rate = rates
                .get(&code)
                .ok_or_else(|| AppError::MissingRate(code.clone()))?;
            (Some(amount), Some(code), Some(rate))
        }
    };

    Ok(NewVacancy {
        title: vacancy.title,
        employer: vacancy.employer,
        salary,
        currency,
        rate,
        url: vacancy.url,
        // Truncate to the calendar date in the source's own offset.
        date_added: vacancy.published_at.date_naive(),
    })
}
