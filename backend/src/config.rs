use crate::error::ConfigError;
use anyhow::Result;
use env_logger::Builder;
use log::{info, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub youtube_api_key: String,
    pub youtube_api_base_url: String,
    pub data_dir: PathBuf,
    pub port: u16,
    /// `None` allows any origin.
    pub allowed_origins: Option<Vec<String>>,
    /// `None` waits on the upstream indefinitely.
    pub upstream_timeout: Option<Duration>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let youtube_api_key = non_blank("YOUTUBE_API_KEY")
            .or_else(|| non_blank("API_KEY"))
            .ok_or_else(|| ConfigError::MissingVar("YOUTUBE_API_KEY".to_string()))?;

        let youtube_api_base_url = non_blank("YOUTUBE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE_URL.to_string());

        let data_dir = non_blank("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let port = match non_blank("PORT") {
            Some(value) => parse_var("PORT", &value)?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = non_blank("CORS_ALLOWED_ORIGINS").map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        });

        let timeout_secs: u64 = match non_blank("UPSTREAM_TIMEOUT_SECS") {
            Some(value) => parse_var("UPSTREAM_TIMEOUT_SECS", &value)?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };
        let upstream_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        Ok(Settings {
            youtube_api_key,
            youtube_api_base_url,
            data_dir,
            port,
            allowed_origins,
            upstream_timeout,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
    })
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting Rocket backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_cors(settings: &Settings) -> Result<rocket_cors::Cors> {
    let allowed_origins = match &settings.allowed_origins {
        Some(origins) => AllowedOrigins::some_exact(origins.as_slice()),
        None => AllowedOrigins::all(),
    };

    let cors = CorsOptions::default()
        .allowed_origins(allowed_origins)
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
