pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

use crate::config::{create_cors, Settings};
use crate::services::{Archive, Comparator, YouTubeClient};
use anyhow::Result;
use rocket::{Build, Rocket};

pub struct AppState {
    pub comparator: Comparator,
    pub archive: Archive,
}

impl AppState {
    pub fn new(settings: &Settings) -> Result<Self> {
        let youtube = YouTubeClient::new(settings)?;
        let archive = Archive::open(&settings.data_dir)?;

        Ok(AppState {
            comparator: Comparator::new(youtube),
            archive,
        })
    }
}

pub fn build_rocket(settings: &Settings) -> Result<Rocket<Build>> {
    let state = AppState::new(settings)?;
    let cors = create_cors(settings)?;
    let figment = rocket::Config::figment().merge(("port", settings.port));

    Ok(rocket::custom(figment)
        .manage(state)
        .attach(cors)
        .mount(
            "/api",
            rocket::routes![
                api::compare_terms,
                api::save_json,
                api::load_json,
                api::list_json,
            ],
        ))
}
