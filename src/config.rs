use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "vacancyhub", about = "Vacancy ingestion and salary analytics")]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Table holding the normalized vacancies
    #[arg(long, env = "VACANCY_TABLE", default_value = "vacancies")]
    pub table: String,

    /// Base URL of the listing service API
    #[arg(long, env = "LISTING_API_URL", default_value = "https://api.hh.ru")]
    pub api_url: String,

    /// Employer roster to ingest, comma-separated
    #[arg(long, env = "EMPLOYERS", value_delimiter = ',', required = true)]
    pub employers: Vec<String>,

    /// Keyword for the title-search report
    #[arg(long, env = "SEARCH_KEYWORD", default_value = "developer")]
    pub keyword: String,
}
