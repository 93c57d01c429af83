use std::sync::Arc;

use log::{info, warn};

use crate::cache::TranscriptCache;
use crate::config::Settings;
use crate::summarize::{TextGenerator, generate_summary};
use crate::transcript::{TranscriptService, fetch_transcript};
use crate::{Error, Result, VideoId, extract_video_id};

/// How loudly a message should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// User-facing advice attached to a failed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guidance {
    InvalidLink,
    TranscriptsDisabled,
    NoTranscript,
    RateLimited,
    PayloadTooLarge,
    Unexpected,
}

impl Guidance {
    pub fn for_error(error: &Error) -> Self {
        match error {
            Error::InvalidLinkFormat(_) => Guidance::InvalidLink,
            Error::TranscriptsDisabled(_) => Guidance::TranscriptsDisabled,
            Error::NoTranscriptAvailable { .. } => Guidance::NoTranscript,
            Error::TranscriptServiceUnavailable { rate_limited: true, .. } => Guidance::RateLimited,
            Error::TranscriptServiceUnavailable { rate_limited: false, .. } => Guidance::Unexpected,
            Error::GenerationFailed { status, .. } => match status {
                Some(400 | 413) => Guidance::PayloadTooLarge,
                Some(401 | 403 | 429) => Guidance::RateLimited,
                _ => Guidance::Unexpected,
            },
            Error::UnknownFetchError(_) | Error::MissingCredential(_) => Guidance::Unexpected,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Guidance::InvalidLink => {
                "Please ensure the YouTube URL is valid and correctly formatted. \
                 Examples: https://www.youtube.com/watch?v=YOUR_ID or https://youtu.be/YOUR_ID"
            }
            Guidance::TranscriptsDisabled => "Transcripts are disabled for this video by the uploader.",
            Guidance::NoTranscript => {
                "This video might not have English transcripts available, \
                 or the language is not supported by default."
            }
            Guidance::RateLimited => {
                "API rate limit exceeded or access denied. Please check your API key or try again later."
            }
            Guidance::PayloadTooLarge => {
                "Bad request to Gemini API. The video transcript might be too long for the model, \
                 or there's an issue with the prompt. Try a shorter video."
            }
            Guidance::Unexpected => {
                "An unexpected error occurred. Please check the video link and your internet connection."
            }
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Guidance::TranscriptsDisabled | Guidance::NoTranscript => Severity::Info,
            Guidance::InvalidLink => Severity::Warning,
            Guidance::RateLimited | Guidance::PayloadTooLarge | Guidance::Unexpected => Severity::Error,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Guidance::InvalidLink => "invalid_link",
            Guidance::TranscriptsDisabled => "transcripts_disabled",
            Guidance::NoTranscript => "no_transcript",
            Guidance::RateLimited => "rate_limited",
            Guidance::PayloadTooLarge => "payload_too_large",
            Guidance::Unexpected => "unexpected",
        }
    }
}

/// A successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub video_id: VideoId,
    pub transcript_chars: usize,
    pub cached: bool,
    pub summary: String,
}

/// Result of one submit action
#[derive(Debug)]
pub enum Outcome {
    EmptyInput,
    Success(Report),
    Failed { error: Error, guidance: Guidance },
}

/// Runs link -> video id -> transcript -> summary, one submission at a time.
pub struct Pipeline {
    transcripts: Arc<dyn TranscriptService>,
    generator: Arc<dyn TextGenerator>,
    cache: TranscriptCache,
    languages: Vec<String>,
    prompt: String,
}

impl Pipeline {
    pub fn new(
        settings: &Settings,
        transcripts: Arc<dyn TranscriptService>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            transcripts,
            generator,
            cache: TranscriptCache::new(settings.cache_capacity, settings.cache_ttl),
            languages: settings.languages.clone(),
            prompt: settings.prompt.clone(),
        }
    }

    /// Handle one submission. Every expected failure ends up in `Outcome::Failed`.
    pub async fn submit(&mut self, link: &str) -> Outcome {
        if link.trim().is_empty() {
            warn!("Empty link submitted");
            return Outcome::EmptyInput;
        }

        match self.run(link).await {
            Ok(report) => {
                info!(
                    "Summarized {} ({} transcript chars, cached={})",
                    report.video_id, report.transcript_chars, report.cached
                );
                Outcome::Success(report)
            }
            Err(error) => {
                let guidance = Guidance::for_error(&error);
                warn!("Submission failed [{}]: {error}", error.kind());
                Outcome::Failed { error, guidance }
            }
        }
    }

    async fn run(&mut self, link: &str) -> Result<Report> {
        let video_id = extract_video_id(link)?;

        let (transcript, cached) = match self.cache.get(link) {
            Some(text) => (text, true),
            None => {
                let text = fetch_transcript(self.transcripts.as_ref(), &video_id, &self.languages).await?;
                self.cache.insert(link.to_string(), text.clone());
                (text, false)
            }
        };

        let summary = generate_summary(self.generator.as_ref(), &transcript, &self.prompt).await?;

        Ok(Report {
            video_id,
            transcript_chars: transcript.chars().count(),
            cached,
            summary,
        })
    }
}
