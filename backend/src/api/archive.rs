use crate::error::ArchiveError;
use crate::models::{ErrorResponse, SaveResponse};
use crate::AppState;
use log::{error, info, warn};
use rocket::http::Status;
use rocket::serde::json::{Json, Value};
use rocket::{get, post, State};

#[post("/save-json", data = "<data>")]
pub async fn save_json(
    data: Json<Value>,
    state: &State<AppState>,
) -> Result<Json<SaveResponse>, ErrorResponse> {
    match state.archive.save(&data.into_inner()).await {
        Ok(filename) => Ok(Json(SaveResponse { filename })),
        Err(e) => {
            error!("Failed to save JSON: {e}");
            Err(ErrorResponse::new(
                Status::InternalServerError,
                "Failed to save JSON",
            ))
        }
    }
}

#[get("/load-json/<filename>")]
pub async fn load_json(
    filename: &str,
    state: &State<AppState>,
) -> Result<Json<Value>, ErrorResponse> {
    match state.archive.load::<Value>(filename).await {
        Ok(value) => {
            info!("Loaded {filename}");
            Ok(Json(value))
        }
        Err(e) => {
            let status = match e {
                ArchiveError::NotFound(_) | ArchiveError::InvalidFilename(_) => {
                    warn!("Failed to load JSON: {e}");
                    Status::NotFound
                }
                _ => {
                    error!("Failed to load JSON: {e}");
                    Status::InternalServerError
                }
            };
            Err(ErrorResponse::new(status, "Failed to load JSON"))
        }
    }
}

#[get("/list-json")]
pub async fn list_json(state: &State<AppState>) -> Result<Json<Vec<String>>, ErrorResponse> {
    match state.archive.list().await {
        Ok(filenames) => Ok(Json(filenames)),
        Err(e) => {
            error!("Failed to list JSON files: {e}");
            Err(ErrorResponse::new(
                Status::InternalServerError,
                "Failed to list JSON files",
            ))
        }
    }
}
