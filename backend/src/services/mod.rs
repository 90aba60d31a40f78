pub mod archive_service;
pub mod compare_service;
pub mod youtube_service;

pub use archive_service::Archive;
pub use compare_service::Comparator;
pub use youtube_service::YouTubeClient;
