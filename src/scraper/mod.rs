//! Episode download loop: URL construction, the polite client, and Narou page parsing.

mod client;
mod error;

pub mod narou;

pub use client::{backoff_delay, PoliteClient, PoliteClientBuilder};
pub use error::FetchError;

use crate::model::{ChapterFragment, EpisodeRange, Novel, WorkMetadata};
use log::{debug, info};
use thiserror::Error;

/// Base URL of the Syosetu novel host.
pub const NAROU_BASE: &str = "https://ncode.syosetu.com";

/// A fetch that failed permanently, with the episode it was for.
#[derive(Debug, Error)]
#[error("Error downloading episode {episode}: {source}")]
pub struct DownloadError {
    pub episode: u32,
    pub url: String,
    #[source]
    pub source: FetchError,
}

/// Options for a download run.
pub struct DownloadOptions<'a> {
    /// Host base URL, normally [NAROU_BASE].
    pub base_url: &'a str,
    /// Called before each fetch with (episodes started, total).
    pub progress: Option<&'a dyn Fn(u32, u32)>,
}

impl Default for DownloadOptions<'_> {
    fn default() -> Self {
        Self {
            base_url: NAROU_BASE,
            progress: None,
        }
    }
}

/// `{base}/{code}/{episode}/`
pub fn episode_url(base: &str, code: &str, episode: u32) -> String {
    format!("{}/{}/{}/", base.trim_end_matches('/'), code, episode)
}

/// Fetch and transform every episode in `range`, in ascending order.
///
/// Metadata comes from the first episode only. The first fetch failure aborts the run
/// and the fragments collected so far are dropped.
pub fn download_range(
    client: &mut PoliteClient,
    code: &str,
    range: EpisodeRange,
    options: &DownloadOptions<'_>,
) -> Result<Novel, DownloadError> {
    let total = range.len();
    let mut metadata: Option<WorkMetadata> = None;
    // Reserve lazily; a range can be far larger than the host actually serves.
    let mut fragments = Vec::with_capacity(total.min(1024) as usize);

    for (done, episode) in range.iter().enumerate() {
        if let Some(ref p) = options.progress {
            p(done as u32 + 1, total);
        }
        let url = episode_url(options.base_url, code, episode);
        debug!("Downloading episode {} from {}", episode, url);
        let html = client.get_text(&url).map_err(|source| DownloadError {
            episode,
            url: url.clone(),
            source,
        })?;

        if metadata.is_none() {
            let meta = narou::extract_metadata(&html);
            info!("Novel: {}", meta.title);
            info!("Author: {}", meta.author);
            metadata = Some(meta);
        }

        fragments.push(ChapterFragment {
            episode,
            html: narou::transform_episode(&html),
        });
        debug!("Episode {} downloaded and processed", episode);
    }

    Ok(Novel {
        code: code.to_string(),
        range,
        metadata: metadata.unwrap_or_default(),
        fragments,
    })
}
