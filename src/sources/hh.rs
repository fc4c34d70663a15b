use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::error::AppError;
use crate::normalize::RateTable;
use crate::sources::{RawVacancy, VacancySource};

const PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the HeadHunter-style listing API.
///
/// One request per employer, capped at a single page of `PAGE_SIZE`
/// results; anything beyond the first page is not fetched.
pub struct HhClient {
    client: reqwest::Client,
    base_url: String,
}

impl HhClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_employer(&self, employer: &str) -> Result<Vec<RawVacancy>, AppError> {
        let url = format!("{}/vacancies/", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("text", employer),
                ("search_field", "company_name"),
                ("archived", "false"),
            ])
            .query(&[("per_page", PAGE_SIZE)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AppError::Source(format!(
                "listing service returned {} for employer '{employer}'",
                resp.status()
            )));
        }

        let data: Value = resp.json().await?;
        parse_items(&data)
    }
}

#[async_trait]
impl VacancySource for HhClient {
    async fn fetch_rates(&self) -> Result<RateTable, AppError> {
        let url = format!("{}/dictionaries/", self.base_url);
        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(AppError::Source(format!(
                "dictionary endpoint returned {}",
                resp.status()
            )));
        }

        let data: Value = resp.json().await?;
        parse_rates(&data)
    }

    async fn fetch_vacancies(
        &self,
        employers: &[String],
    ) -> Result<Vec<Vec<RawVacancy>>, AppError> {
        let mut results = Vec::with_capacity(employers.len());
        for employer in employers {
            let vacancies = self.fetch_employer(employer).await?;
            tracing::info!("Fetched {} vacancies for '{employer}'", vacancies.len());
            results.push(vacancies);
        }
        Ok(results)
    }
}

/// Extract the `currency` dictionary into a rate table.
fn parse_rates(data: &Value) -> Result<RateTable, AppError> {
    let currencies = data
        .get("currency")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::Source("missing 'currency' in dictionary response".to_string()))?;

    let mut rates = RateTable::new();
    for entry in currencies {
        let code = entry.get("code").and_then(|v| v.as_str());
        let rate = entry.get("rate").and_then(|v| v.as_f64());
        match (code, rate) {
            (Some(code), Some(rate)) => rates.insert(code, rate),
            _ => tracing::warn!("Skipping incomplete currency entry: {entry}"),
        }
    }
    Ok(rates)
}

fn parse_items(data: &Value) -> Result<Vec<RawVacancy>, AppError> {
    let items = data
        .get("items")
        .and_then(|v| v.as_array())
        .ok_or_else(|| AppError::Source("missing 'items' in listing response".to_string()))?;

    items.iter().map(parse_vacancy).collect()
}

/// Parse a single vacancy object. The salary block may be absent or carry
/// null `from`/`currency` fields.
fn parse_vacancy(raw: &Value) -> Result<RawVacancy, AppError> {
    let title = raw
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Source("vacancy without a name".to_string()))?
        .to_string();

    let employer = raw
        .get("employer")
        .and_then(|v| v.get("name"))
        .and_then(|v| v.as_str())
        .map(String::from);

    let salary = raw.get("salary").filter(|v| !v.is_null());
    let salary_from = salary
        .and_then(|s| s.get("from"))
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);
    let salary_currency = salary
        .and_then(|s| s.get("currency"))
        .and_then(|v| v.as_str())
        .map(String::from);

    let url = raw
        .get("alternate_url")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Source(format!("vacancy '{title}' without a URL")))?
        .to_string();

    let published_at = raw
        .get("published_at")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Source(format!("vacancy '{title}' without a publication date")))?;

    Ok(RawVacancy {
        employer,
        title,
        salary_from,
        salary_currency,
        url,
        published_at: parse_published_at(published_at)?,
    })
}

/// The API emits ISO-8601 timestamps with a zone offset and no colon,
/// e.g. `2024-05-12T14:03:59+0300`.
fn parse_published_at(s: &str) -> Result<DateTime<FixedOffset>, AppError> {
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z")
        .map_err(|e| AppError::Source(format!("bad publication date '{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_vacancy() {
        let raw = json!({
            "name": "Senior Developer",
            "employer": { "name": "Acme" },
            "salary": { "from": 90000, "to": 120000, "currency": "USD" },
            "alternate_url": "https://example.com/vacancy/1",
            "published_at": "2024-05-12T14:03:59+0300",
        });

        let vacancy = parse_vacancy(&raw).unwrap();
        assert_eq!(vacancy.title, "Senior Developer");
        assert_eq!(vacancy.employer.as_deref(), Some("Acme"));
        assert_eq!(vacancy.salary_from, Some(90000));
        assert_eq!(vacancy.salary_currency.as_deref(), Some("USD"));
        assert_eq!(vacancy.url, "https://example.com/vacancy/1");
        assert_eq!(
            vacancy.published_at.date_naive(),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 12).unwrap()
        );
    }

    #[test]
    fn absent_salary_block_leaves_fields_unset() {
        let raw = json!({
            "name": "QA Engineer",
            "employer": { "name": "Acme" },
            "salary": null,
            "alternate_url": "https://example.com/vacancy/2",
            "published_at": "2024-05-12T09:00:00+0300",
        });

        let vacancy = parse_vacancy(&raw).unwrap();
        assert_eq!(vacancy.salary_from, None);
        assert_eq!(vacancy.salary_currency, None);
    }

    #[test]
    fn null_salary_from_is_unset_amount() {
        let raw = json!({
            "name": "Analyst",
            "employer": { "name": "Acme" },
            "salary": { "from": null, "to": 50000, "currency": "RUR" },
            "alternate_url": "https://example.com/vacancy/3",
            "published_at": "2024-05-12T09:00:00+0300",
        });

        let vacancy = parse_vacancy(&raw).unwrap();
        assert_eq!(vacancy.salary_from, None);
        assert_eq!(vacancy.salary_currency.as_deref(), Some("RUR"));
    }

    #[test]
    fn missing_name_is_rejected() {
        let raw = json!({
            "employer": { "name": "Acme" },
            "alternate_url": "https://example.com/vacancy/4",
            "published_at": "2024-05-12T09:00:00+0300",
        });

        assert!(matches!(parse_vacancy(&raw), Err(AppError::Source(_))));
    }

    #[test]
    fn missing_url_is_rejected() {
        let raw = json!({
            "name": "Analyst",
            "published_at": "2024-05-12T09:00:00+0300",
        });

        assert!(matches!(parse_vacancy(&raw), Err(AppError::Source(_))));
    }

    #[test]
    fn parses_rate_dictionary() {
        let data = json!({
            "currency": [
                { "code": "RUR", "rate": 1.0, "name": "Рубли" },
                { "code": "USD", "rate": 0.0125, "name": "Доллары" },
                { "code": "XXX", "rate": null },
            ],
        });

        let rates = parse_rates(&data).unwrap();
        assert_eq!(rates.get("RUR"), Some(1.0));
        assert_eq!(rates.get("USD"), Some(0.0125));
        assert_eq!(rates.get("XXX"), None);
    }

    #[test]
    fn dictionary_without_currency_list_is_rejected() {
        let data = json!({ "employment": [] });
        assert!(matches!(parse_rates(&data), Err(AppError::Source(_))));
    }

    #[test]
    fn accepts_offsets_with_and_without_colon() {
        assert!(parse_published_at("2024-05-12T14:03:59+0300").is_ok());
        assert!(parse_published_at("2024-05-12T14:03:59+03:00").is_ok());
        assert!(parse_published_at("12.05.2024").is_err());
    }
}
