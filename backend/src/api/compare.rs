use crate::error::CompareError;
use crate::models::{ComparisonResult, ErrorResponse};
use crate::AppState;
use log::{error, warn};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, State};

const MISSING_TERMS: &str = "Both term1 and term2 are required";
const GENERIC_UPSTREAM_ERROR: &str = "YouTube API error";

#[get("/compare?<term1>&<term2>")]
pub async fn compare_terms(
    term1: Option<String>,
    term2: Option<String>,
    state: &State<AppState>,
) -> Result<Json<ComparisonResult>, ErrorResponse> {
    let (Some(term1), Some(term2)) = (term1, term2) else {
        return Err(ErrorResponse::new(Status::BadRequest, MISSING_TERMS));
    };

    match state.comparator.compare(&term1, &term2).await {
        Ok(result) => Ok(Json(result)),
        Err(CompareError::InvalidInput(message)) => {
            warn!("Rejected comparison request: {message}");
            Err(ErrorResponse::new(Status::BadRequest, MISSING_TERMS))
        }
        Err(CompareError::Upstream(e)) => {
            error!("API Error: {e}");
            let message = if e.message.trim().is_empty() {
                GENERIC_UPSTREAM_ERROR.to_string()
            } else {
                e.message
            };
            Err(ErrorResponse::new(Status::InternalServerError, message))
        }
    }
}
