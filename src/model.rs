//! Data model for one download run.
//!
//! Everything here is transient: built during the run, consumed by the document writer.

/// Placeholder title used when the first page has no `<title>`.
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Placeholder author used when the first page has no author metadata.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Contiguous, inclusive range of episode numbers. Always `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRange {
    start: u32,
    end: u32,
}

impl EpisodeRange {
    /// Returns None when `start > end` or `start` is zero.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        if start == 0 || start > end {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of episodes in the range (`end - start + 1`).
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Never true; a range holds at least one episode.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Episode numbers in ascending order.
    pub fn iter(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

/// Title and author of the whole work, taken from the first page of the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkMetadata {
    pub title: String,
    pub author: String,
}

impl Default for WorkMetadata {
    fn default() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
        }
    }
}

/// Transformed markup for one episode: a `<div class="chapter">` with heading and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterFragment {
    pub episode: u32,
    pub html: String,
}

/// Result of a complete download. `fragments` holds one entry per episode, ascending.
#[derive(Debug, Clone)]
pub struct Novel {
    pub code: String,
    pub range: EpisodeRange,
    pub metadata: WorkMetadata,
    pub fragments: Vec<ChapterFragment>,
}
