use crate::infra::load_snapshot;
use bookkeeper_directory::config::AppConfig;
use bookkeeper_directory::directory::{
    CategoryId, CityId, DirectoryService, FilterRequest, InMemoryDirectoryStore,
};
use bookkeeper_directory::error::AppError;
use bookkeeper_directory::telemetry;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct SearchArgs {
    /// Directory of CSV table exports; defaults to APP_SEED_DIR, then the bundled sample
    #[arg(long)]
    pub(crate) seed_dir: Option<PathBuf>,
    /// Case-insensitive name search
    #[arg(long)]
    pub(crate) text: Option<String>,
    /// Entity code: fbih, rs or brcko
    #[arg(long)]
    pub(crate) entity: Option<String>,
    /// City id; takes precedence over --entity
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Service category id (repeatable, any match qualifies)
    #[arg(long = "service")]
    pub(crate) services: Vec<String>,
    /// Only profiles accepting new clients
    #[arg(long)]
    pub(crate) available: bool,
    /// Only profiles with a verified license
    #[arg(long)]
    pub(crate) verified: bool,
    /// Rank by distance from LAT,LNG
    #[arg(long, value_parser = parse_point)]
    pub(crate) near: Option<(f64, f64)>,
}

impl SearchArgs {
    pub(crate) fn to_request(&self) -> FilterRequest {
        FilterRequest {
            text: self.text.clone(),
            entity: self.entity.clone(),
            city: self.city.clone().map(CityId),
            services: self.services.iter().cloned().map(CategoryId).collect(),
            only_available: self.available,
            only_verified: self.verified,
            near_me: self.near.is_some(),
            user_lat: self.near.map(|(lat, _)| lat),
            user_lng: self.near.map(|(_, lng)| lng),
        }
    }
}

#[derive(Serialize)]
struct SearchOutput<T> {
    query: String,
    count: usize,
    results: Vec<T>,
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;

    let seed_dir = args.seed_dir.clone().or(config.directory.seed_dir);
    let snapshot = load_snapshot(seed_dir.as_deref())?;
    let service = DirectoryService::new(Arc::new(InMemoryDirectoryStore::new(snapshot)));

    let request = args.to_request();
    let results = service.search_summaries(&request)?;
    let output = SearchOutput {
        query: request.to_query(),
        count: results.len(),
        results,
    };

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output).map_err(std::io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}

fn parse_point(raw: &str) -> Result<(f64, f64), String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG but got '{raw}'"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid latitude: {err}"))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid longitude: {err}"))?;
    Ok((lat, lng))
}
