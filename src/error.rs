use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a submission can end in.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid YouTube URL format: {0:?}")]
    InvalidLinkFormat(String),

    #[error("transcripts are disabled for video {0} by the uploader")]
    TranscriptsDisabled(String),

    #[error("no transcript found for video {video_id} in languages [{}] (manual or auto-generated)", .languages.join(", "))]
    NoTranscriptAvailable { video_id: String, languages: Vec<String> },

    /// `rate_limited` is set when YouTube throttled or blocked the client (403, 429, reCAPTCHA)
    #[error("could not retrieve transcript from YouTube: {reason}")]
    TranscriptServiceUnavailable { reason: String, rate_limited: bool },

    #[error("failed to fetch transcript: {0}")]
    UnknownFetchError(String),

    #[error("Gemini API call failed: {message}")]
    GenerationFailed { status: Option<u16>, message: String },

    #[error("missing credential: {0}")]
    MissingCredential(String),
}

impl Error {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidLinkFormat(_) => "invalid_link_format",
            Error::TranscriptsDisabled(_) => "transcripts_disabled",
            Error::NoTranscriptAvailable { .. } => "no_transcript_available",
            Error::TranscriptServiceUnavailable { .. } => "transcript_service_unavailable",
            Error::UnknownFetchError(_) => "unknown_fetch_error",
            Error::GenerationFailed { .. } => "generation_failed",
            Error::MissingCredential(_) => "missing_credential",
        }
    }
}
