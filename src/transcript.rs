use async_trait::async_trait;
use log::{debug, info, warn};

use crate::{Error, Result, Segment, VideoId};

/// One transcript track available for a video
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
    pub base_url: String,
}

/// All transcript tracks a video offers
#[derive(Debug, Clone)]
pub struct TranscriptList {
    pub video_id: VideoId,
    pub tracks: Vec<TranscriptTrack>,
}

impl TranscriptList {
    /// First manually created track matching the languages, in preference order
    pub fn find_manually_created(&self, languages: &[String]) -> Option<&TranscriptTrack> {
        self.find(languages, false)
    }

    /// First auto-generated track matching the languages, in preference order
    pub fn find_generated(&self, languages: &[String]) -> Option<&TranscriptTrack> {
        self.find(languages, true)
    }

    /// Manual tracks win over generated ones; a generated track is only used
    /// when no requested language has a manual track.
    pub fn select(&self, languages: &[String]) -> Result<&TranscriptTrack> {
        self.find_manually_created(languages)
            .or_else(|| self.find_generated(languages))
            .ok_or_else(|| Error::NoTranscriptAvailable {
                video_id: self.video_id.to_string(),
                languages: languages.to_vec(),
            })
    }

    fn find(&self, languages: &[String], generated: bool) -> Option<&TranscriptTrack> {
        languages.iter().find_map(|lang| {
            self.tracks
                .iter()
                .find(|t| t.is_generated == generated && &t.language_code == lang)
        })
    }
}

/// Remote source of transcripts
#[async_trait]
pub trait TranscriptService: Send + Sync {
    async fn list_transcripts(&self, video_id: &VideoId) -> Result<TranscriptList>;

    async fn fetch_segments(&self, track: &TranscriptTrack) -> Result<Vec<Segment>>;
}

/// Fetch the preferred transcript for a video and flatten it into one line of text
pub async fn fetch_transcript(
    service: &dyn TranscriptService,
    video_id: &VideoId,
    languages: &[String],
) -> Result<String> {
    let list = service.list_transcripts(video_id).await?;
    debug!("Video {video_id} offers {} transcript track(s)", list.tracks.len());

    let track = list.select(languages)?;
    info!(
        "Using {} transcript: lang={} ({})",
        if track.is_generated { "auto-generated" } else { "manual" },
        track.language_code,
        track.language
    );

    let segments = service.fetch_segments(track).await?;
    let text = join_segments(&segments);
    if text.trim().is_empty() {
        warn!("Transcript track {} for {video_id} has no text", track.language_code);
        return Err(Error::NoTranscriptAvailable {
            video_id: video_id.to_string(),
            languages: languages.to_vec(),
        });
    }
    Ok(text)
}

/// Join segment texts with a single space, preserving order
pub fn join_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// In-memory transcript service; `None` for a video means transcripts are disabled.
    #[derive(Default)]
    pub struct FakeTranscriptService {
        pub videos: HashMap<String, Option<Vec<(TranscriptTrack, Vec<Segment>)>>>,
        pub list_calls: AtomicUsize,
        pub fetched: Mutex<Vec<String>>,
    }

    pub fn track(lang: &str, generated: bool) -> TranscriptTrack {
        TranscriptTrack {
            language_code: lang.to_string(),
            language: lang.to_string(),
            is_generated: generated,
            base_url: format!("https://example.test/{lang}/{}", if generated { "asr" } else { "manual" }),
        }
    }

    pub fn segments(texts: &[&str]) -> Vec<Segment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Segment {
                text: t.to_string(),
                start: i as f64,
                duration: 1.0,
            })
            .collect()
    }

    impl FakeTranscriptService {
        pub fn with_video(mut self, id: &str, tracks: Vec<(TranscriptTrack, Vec<Segment>)>) -> Self {
            self.videos.insert(id.to_string(), Some(tracks));
            self
        }

        pub fn with_disabled(mut self, id: &str) -> Self {
            self.videos.insert(id.to_string(), None);
            self
        }

        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranscriptService for FakeTranscriptService {
        async fn list_transcripts(&self, video_id: &VideoId) -> Result<TranscriptList> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            match self.videos.get(video_id.as_str()) {
                Some(Some(tracks)) => Ok(TranscriptList {
                    video_id: video_id.clone(),
                    tracks: tracks.iter().map(|(t, _)| t.clone()).collect(),
                }),
                Some(None) => Err(Error::TranscriptsDisabled(video_id.to_string())),
                None => Err(Error::TranscriptServiceUnavailable {
                    reason: "video unavailable".to_string(),
                    rate_limited: false,
                }),
            }
        }

        async fn fetch_segments(&self, track: &TranscriptTrack) -> Result<Vec<Segment>> {
            self.fetched.lock().unwrap().push(track.base_url.clone());
            self.videos
                .values()
                .flatten()
                .flatten()
                .find(|(t, _)| t == track)
                .map(|(_, s)| s.clone())
                .ok_or_else(|| Error::UnknownFetchError("unknown track".to_string()))
        }
    }
}
