//! naroudl: download a range of Syosetu (Narou) episodes into one offline HTML file.

pub mod cli;
pub mod config;
pub mod document;
pub mod model;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use document::{assemble, output_file_name, write_document, DocumentError};
pub use model::{ChapterFragment, EpisodeRange, Novel, WorkMetadata};
pub use scraper::{
    backoff_delay, download_range, episode_url, DownloadError, DownloadOptions, FetchError,
    PoliteClient, PoliteClientBuilder,
};
