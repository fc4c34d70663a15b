mod config;
mod db;
mod error;
mod models;
mod normalize;
mod pipeline;
mod sources;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::vacancy::VacancyListing;
use crate::sources::hh::HhClient;
use crate::store::VacancyStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vacancyhub=info")),
        )
        .init();

    let config = Config::parse();

    tracing::info!("Connecting to database...");
    let store = VacancyStore::connect(&config.database_url, &config.table).await?;
    store.ensure_schema().await?;

    let source = HhClient::new(&config.api_url)?;
    let report = pipeline::run(&source, &store, &config.employers).await?;
    tracing::info!(
        "Ingestion complete: {} vacancies from {} employers",
        report.stored,
        report.employers
    );

    println!("All vacancies:");
    for listing in store.list_all().await? {
        print_listing(&listing);
    }

    match store.average_salary().await? {
        Some(avg) => println!("Average salary: {avg}"),
        None => println!("Average salary: no salary data"),
    }

    println!("Vacancies per employer:");
    for count in store.count_by_employer().await? {
        println!(
            "  {}: {}",
            count.employer.as_deref().unwrap_or("(unknown)"),
            count.vacancies
        );
    }

    let matches = store.search_by_title(&config.keyword).await?;
    println!("{} vacancies matching '{}':", matches.len(), config.keyword);
    for listing in &matches {
        print_listing(listing);
    }

    let above = store.above_average_salary().await?;
    println!("{} vacancies above the average salary:", above.len());
    for listing in &above {
        print_listing(listing);
    }

    store.close().await;
    Ok(())
}

fn print_listing(listing: &VacancyListing) {
    let employer = listing.employer.as_deref().unwrap_or("(unknown)");
    let salary = match (listing.salary, listing.currency.as_deref()) {
        (Some(amount), Some(code)) => format!("{amount} {code}"),
        _ => "salary not listed".to_string(),
    };
    println!(
        "  [{}] {} - {employer} ({salary}) {}",
        listing.date_display(),
        listing.title,
        listing.url
    );
}
