use crate::error::CompareError;
use crate::models::{ComparisonResult, TermStats, VideoRecord};
use crate::services::youtube_service::{SearchHit, VideoStatistics, YouTubeClient};
use log::{error, info};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Comparator {
    youtube: YouTubeClient,
}

impl Comparator {
    pub fn new(youtube: YouTubeClient) -> Self {
        Self { youtube }
    }

    /// Runs the search + statistics pipeline for both terms concurrently and
    /// pairs the results. Any upstream failure aborts the whole comparison.
    pub async fn compare(
        &self,
        term1: &str,
        term2: &str,
    ) -> Result<ComparisonResult, CompareError> {
        if term1.is_empty() || term2.is_empty() {
            return Err(CompareError::InvalidInput(
                "Both term1 and term2 are required".to_string(),
            ));
        }

        info!("Comparing {term1:?} against {term2:?}");

        let ((total_results1, stats1), (total_results2, stats2)) =
            tokio::try_join!(self.term_stats(term1), self.term_stats(term2)).map_err(|e| {
                error!("Comparison of {term1:?} and {term2:?} failed: {e}");
                e
            })?;

        info!(
            "Compared {term1:?} ({} videos, {} views) with {term2:?} ({} videos, {} views)",
            stats1.count, stats1.total_views, stats2.count, stats2.total_views
        );

        Ok(ComparisonResult {
            term1: term1.to_string(),
            term2: term2.to_string(),
            total_results1,
            total_results2,
            stats1,
            stats2,
        })
    }

    async fn term_stats(&self, term: &str) -> Result<(u64, TermStats), CompareError> {
        let page = self.youtube.search_videos(term).await?;

        let video_ids: Vec<String> = page.hits.iter().map(|hit| hit.video_id.clone()).collect();
        let statistics = self.youtube.fetch_statistics(&video_ids).await?;

        let videos = merge_statistics(page.hits, statistics);
        Ok((page.total_results, TermStats::from_videos(videos)))
    }
}

/// Joins search hits with their statistics by video id, keeping the search
/// (relevance) order. Hits the statistics endpoint did not return are dropped.
fn merge_statistics(hits: Vec<SearchHit>, statistics: Vec<VideoStatistics>) -> Vec<VideoRecord> {
    let mut by_id: HashMap<String, VideoStatistics> = statistics
        .into_iter()
        .map(|stats| (stats.video_id.clone(), stats))
        .collect();

    hits.into_iter()
        .filter_map(|hit| {
            let stats = by_id.remove(&hit.video_id)?;
            let title = if hit.title.is_empty() {
                stats.title.unwrap_or_default()
            } else {
                hit.title
            };
            let published_at = if hit.published_at.is_empty() {
                stats.published_at.unwrap_or_default()
            } else {
                hit.published_at
            };
            Some(VideoRecord {
                video_id: hit.video_id,
                title,
                view_count: stats.view_count,
                like_count: stats.like_count,
                published_at,
            })
        })
        .collect()
}
