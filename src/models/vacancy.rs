use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// A normalized vacancy ready for insertion.
///
/// `salary`, `currency` and `rate` are either all set or all absent;
/// "salary unknown" is the all-`None` case. `rate` is the exchange rate
/// snapshotted at ingestion time, so conversion can happen at query time
/// without another rate fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVacancy {
    pub title: String,
    pub employer: Option<String>,
    pub salary: Option<i32>,
    pub currency: Option<String>,
    pub rate: Option<f64>,
    pub url: String,
    pub date_added: NaiveDate,
}

/// Row projection returned by the analytical queries.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct VacancyListing {
    pub title: String,
    pub employer: Option<String>,
    pub salary: Option<i32>,
    pub currency: Option<String>,
    pub url: String,
    #[serde(serialize_with = "serialize_mdy")]
    pub date_added: NaiveDate,
}

impl VacancyListing {
    pub fn date_display(&self) -> String {
        self.date_added.format("%m.%d.%Y").to_string()
    }
}

fn serialize_mdy<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format("%m.%d.%Y").to_string())
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct EmployerCount {
    pub employer: Option<String>,
    pub vacancies: i64,
}
