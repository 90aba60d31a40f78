use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::{response, Response};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub published_at: String,
}

/// Aggregated statistics for one search term.
///
/// `total_views`, `total_likes` and `count` are always derived from `videos`;
/// build it through [`TermStats::from_videos`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TermStats {
    pub total_views: u64,
    pub total_likes: u64,
    pub count: usize,
    pub videos: Vec<VideoRecord>,
}

impl TermStats {
    pub fn from_videos(videos: Vec<VideoRecord>) -> Self {
        let total_views = videos
            .iter()
            .fold(0u64, |sum, video| sum.saturating_add(video.view_count));
        let total_likes = videos
            .iter()
            .fold(0u64, |sum, video| sum.saturating_add(video.like_count));

        TermStats {
            total_views,
            total_likes,
            count: videos.len(),
            videos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub term1: String,
    pub term2: String,
    pub total_results1: u64,
    pub total_results2: u64,
    pub stats1: TermStats,
    pub stats2: TermStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub filename: String,
}

/// JSON error body (`{"error": "..."}`) sent with an explicit status.
#[derive(Debug)]
pub struct ErrorResponse {
    pub status: Status,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(status: Status, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&ErrorBody { error: &self.error })
            .map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
