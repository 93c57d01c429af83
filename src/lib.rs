pub mod cache;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod summarize;
pub mod transcript;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;

pub use error::{Error, Result};

/// A single captioned segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Each pattern anchors the token to a marker; a bare ID on its own is not a link.
static LINK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // youtube.com/watch?v=ID (v may follow other query params)
        r"youtube\.com/watch\?(?:.*&)?v=([0-9A-Za-z_-]{11})",
        // youtu.be/ID
        r"youtu\.be/([0-9A-Za-z_-]{11})",
        // googleusercontent.com/youtube.com/ID, optionally with a numeric path segment
        r"googleusercontent\.com/youtube\.com/(?:\d+/)?([0-9A-Za-z_-]{11})",
        // youtube.com/{embed,shorts,live,v}/ID
        r"youtube\.com/(?:embed|shorts|live|v)/([0-9A-Za-z_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static link pattern"))
    .collect()
});

/// Extract video ID from the supported YouTube URL formats
pub fn extract_video_id(link: &str) -> Result<VideoId> {
    let link = link.trim();

    LINK_PATTERNS
        .iter()
        .find_map(|re| re.captures(link))
        .map(|caps| VideoId(caps[1].to_string()))
        .ok_or_else(|| Error::InvalidLinkFormat(link.to_string()))
}

#[cfg(test)]
impl VideoId {
    pub(crate) fn new_unchecked(id: &str) -> Self {
        VideoId(id.to_string())
    }
}
