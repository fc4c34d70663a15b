use crate::error::AppError;
use crate::normalize;
use crate::sources::VacancySource;
use crate::store::VacancyStore;

/// Counters reported after a completed run.
#[derive(Debug)]
pub struct PipelineReport {
    pub employers: usize,
    pub stored: usize,
}

/// One end-to-end pass: rates, raw vacancies, normalization, full
/// replace. Any failure aborts before the store is touched, or rolls
/// back inside it; there is no partial ingestion.
pub async fn run(
    source: &dyn VacancySource,
    store: &VacancyStore,
    employers: &[String],
) -> Result<PipelineReport, AppError> {
    let rates = source.fetch_rates().await?;
    if rates.is_empty() {
        tracing::warn!("Rate table is empty; any salaried vacancy will fail normalization");
    }
    tracing::info!("Loaded {} currency rates", rates.len());

    let raw = source.fetch_vacancies(employers).await?;
    let records = normalize::normalize(raw, &rates)?;
    tracing::info!(
        "Normalized {} vacancies from {} employers",
        records.len(),
        employers.len()
    );

    store.replace_all(&records).await?;
    tracing::info!("Stored {} vacancies", records.len());

    Ok(PipelineReport {
        employers: employers.len(),
        stored: records.len(),
    })
}
