use crate::config::Settings;
use crate::error::{UpstreamError, UpstreamErrorKind};
use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde_json::Value;
use url::Url;

/// Upper bound the search endpoint accepts for `maxResults`.
pub const MAX_SEARCH_RESULTS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub video_id: String,
    pub title: String,
    pub published_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPage {
    /// Full match count reported by the API; may exceed `hits.len()`.
    pub total_results: u64,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStatistics {
    pub video_id: String,
    pub view_count: u64,
    pub like_count: u64,
    pub title: Option<String>,
    pub published_at: Option<String>,
}

/// Thin client over the YouTube Data API v3 `search` and `videos` endpoints.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.upstream_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("failed to build YouTube HTTP client")?;

        let base_url = settings.youtube_api_base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).context("invalid YouTube API base URL")?;

        Ok(Self {
            client,
            base_url,
            api_key: settings.youtube_api_key.clone(),
        })
    }

    // Documentation: https://developers.google.com/youtube/v3/docs/search/list
    pub async fn search_videos(&self, term: &str) -> Result<SearchPage, UpstreamError> {
        let max_results = MAX_SEARCH_RESULTS.to_string();
        let url = self.endpoint(
            "search",
            &[
                ("part", "id,snippet"),
                ("q", term),
                ("type", "video"),
                ("maxResults", &max_results),
                ("order", "relevance"),
            ],
        )?;

        let response = self.get_json(url).await?;

        let total_results = count_field(&response["pageInfo"]["totalResults"]);
        let hits: Vec<SearchHit> = items_of(&response, "search")?
            .iter()
            .filter_map(|item| {
                let video_id = item["id"]["videoId"].as_str()?;
                Some(SearchHit {
                    video_id: video_id.to_string(),
                    title: item["snippet"]["title"].as_str().unwrap_or("").to_string(),
                    published_at: item["snippet"]["publishedAt"]
                        .as_str()
                        .unwrap_or("")
                        .to_string(),
                })
            })
            .collect();

        debug!(
            "Search for {term:?} returned {} videos ({total_results} total matches)",
            hits.len()
        );

        Ok(SearchPage {
            total_results,
            hits,
        })
    }

    // Documentation: https://developers.google.com/youtube/v3/docs/videos/list
    pub async fn fetch_statistics(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoStatistics>, UpstreamError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = video_ids.join(",");
        let url = self.endpoint("videos", &[("part", "statistics,snippet"), ("id", &ids)])?;

        let response = self.get_json(url).await?;

        let statistics = items_of(&response, "videos")?
            .iter()
            .filter_map(|item| {
                let video_id = item["id"].as_str()?;
                Some(VideoStatistics {
                    video_id: video_id.to_string(),
                    view_count: count_field(&item["statistics"]["viewCount"]),
                    like_count: count_field(&item["statistics"]["likeCount"]),
                    title: item["snippet"]["title"].as_str().map(String::from),
                    published_at: item["snippet"]["publishedAt"].as_str().map(String::from),
                })
            })
            .collect();

        Ok(statistics)
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&format!("{}/{resource}", self.base_url)).map_err(|e| {
            UpstreamError::new(UpstreamErrorKind::Transport, format!("invalid URL: {e}"))
        })?;
        url.query_pairs_mut()
            .extend_pairs(params.iter())
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, UpstreamError> {
        // reqwest errors embed the URL, which carries the API key.
        let response = self.client.get(url).send().await.map_err(|e| {
            UpstreamError::new(UpstreamErrorKind::Transport, e.without_url().to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            UpstreamError::new(UpstreamErrorKind::Transport, e.without_url().to_string())
        })?;
        let parsed = serde_json::from_str::<Value>(&body).ok();

        if !status.is_success() {
            let message = parsed
                .as_ref()
                .and_then(api_error_message)
                .unwrap_or_else(|| format!("YouTube API returned status {status}"));
            return Err(UpstreamError::new(
                UpstreamErrorKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let value = parsed.ok_or_else(|| {
            UpstreamError::new(
                UpstreamErrorKind::MalformedResponse,
                "YouTube API response is not valid JSON",
            )
        })?;

        if value.get("error").is_some() {
            let message =
                api_error_message(&value).unwrap_or_else(|| "YouTube API error".to_string());
            return Err(UpstreamError::new(UpstreamErrorKind::Api, message));
        }

        Ok(value)
    }
}

/// A list response without an `items` array cannot be read, even when empty.
fn items_of<'a>(response: &'a Value, resource: &str) -> Result<&'a Vec<Value>, UpstreamError> {
    response["items"].as_array().ok_or_else(|| {
        UpstreamError::new(
            UpstreamErrorKind::MalformedResponse,
            format!("YouTube API {resource} response has no items array"),
        )
    })
}

fn api_error_message(body: &Value) -> Option<String> {
    body["error"]["message"].as_str().map(String::from)
}

/// Counters arrive as decimal strings; anything unparsable counts as zero.
fn count_field(value: &Value) -> u64 {
    match value {
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Number(n) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}
