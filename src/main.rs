mod audit;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod reports;
mod service;

use audit::RequestContext;
use chrono::NaiveDate;
use clap::Parser;
use cli::{Args, Command};
use config::Config;
use db::Database;
use error::ReportError;
use log::{debug, error, info};
use models::ElectionStatus;
use serde::Serialize;
use serde_json::json;
use service::ReportService;
use std::sync::Arc;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), BoxError> {
    let config = Config::from_env()?;

    let database = Arc::new(Database::new(&config).await?);
    debug!("Connected to {}", config.database_url);

    let ctx = RequestContext::new(args.actor.unwrap_or(config.default_actor));
    let service = ReportService::new(Arc::clone(&database));

    match args.command {
        Command::InitSchema => {
            database.init_schema().await?;
            info!("Schema is up to date.");
        }
        Command::Tally { election_id } => print_json(&service.tally(&ctx, election_id).await?)?,
        Command::Turnout { election_id } => print_json(&service.turnout(&ctx, election_id).await?)?,
        Command::Timeline { election_id, fill_date } => {
            let buckets = service.timeline(&ctx, election_id).await?;
            match fill_date {
                Some(raw) => {
                    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .map_err(|e| ReportError::InvalidArgument(format!("fill-date {:?}: {}", raw, e)))?;
                    let hours = reports::timeline::fill_hours(&buckets, date);
                    print_json(&json!({ "date": date, "hours": hours }))?;
                }
                None => print_json(&buckets)?,
            }
        }
        Command::Summary { election } => print_json(&service.summary(&ctx, election).await?)?,
        Command::Elections { page, per_page, status } => {
            let status = status.as_deref().map(ElectionStatus::parse).transpose()?;
            print_json(&service.list_elections(&ctx, page, per_page, status).await?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
