use std::sync::LazyLock;

use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;

use crate::transcript::{TranscriptList, TranscriptService, TranscriptTrack};
use crate::{Error, Result, Segment, VideoId};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const WATCH_URL: &str = "https://www.youtube.com/watch";
const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";

// The WEB client no longer returns usable caption URLs without a PO token.
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    name: Option<TrackName>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackName {
    #[serde(rename = "simpleText")]
    simple_text: Option<String>,
    runs: Option<Vec<TextRun>>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TrackName {
    fn text(&self) -> Option<String> {
        self.simple_text.clone().or_else(|| {
            self.runs
                .as_ref()
                .map(|runs| runs.iter().map(|r| r.text.as_str()).collect())
        })
    }
}

/// Transcript service backed by YouTube's caption tracks via the InnerTube API
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
}

impl YouTubeClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn fetch_watch_page(&self, video_id: &VideoId) -> Result<String> {
        debug!("Fetching watch page: {WATCH_URL}?v={video_id}");

        let html = self
            .http
            .get(WATCH_URL)
            .query(&[("v", video_id.as_str())])
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", "en-US")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(request_error)?
            .text()
            .await
            .map_err(request_error)?;

        if is_ip_blocked(&html) {
            return Err(Error::TranscriptServiceUnavailable {
                reason: "YouTube is blocking requests from this IP (reCAPTCHA challenge)".to_string(),
                rate_limited: true,
            });
        }
        Ok(html)
    }

    async fn fetch_player(&self, video_id: &VideoId, api_key: &str) -> Result<InnerTubePlayerResponse> {
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video_id.as_str()
        });

        self.http
            .post(PLAYER_URL)
            .query(&[("key", api_key), ("prettyPrint", "false")])
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(request_error)?
            .json()
            .await
            .map_err(request_error)
    }
}

#[async_trait]
impl TranscriptService for YouTubeClient {
    async fn list_transcripts(&self, video_id: &VideoId) -> Result<TranscriptList> {
        let page_html = self.fetch_watch_page(video_id).await?;
        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key");

        let resp = self.fetch_player(video_id, &api_key).await?;
        build_transcript_list(video_id, resp)
    }

    async fn fetch_segments(&self, track: &TranscriptTrack) -> Result<Vec<Segment>> {
        debug!("Fetching caption track: lang={} generated={}", track.language_code, track.is_generated);

        let caption_xml = self
            .http
            .get(&track.base_url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(request_error)?
            .text()
            .await
            .map_err(request_error)?;

        parse_caption_xml(&caption_xml)
    }
}

/// Map transport and HTTP status failures onto the fetch error kinds.
/// 403/429 are throttling, 5xx and transport failures are outages, other statuses are unexpected.
fn request_error(e: reqwest::Error) -> Error {
    if e.is_decode() || e.is_builder() {
        return Error::UnknownFetchError(e.to_string());
    }
    match e.status() {
        Some(status) if matches!(status.as_u16(), 403 | 429) => Error::TranscriptServiceUnavailable {
            reason: format!("YouTube refused the request ({status})"),
            rate_limited: true,
        },
        Some(status) if status.is_server_error() => Error::TranscriptServiceUnavailable {
            reason: format!("YouTube request failed ({status})"),
            rate_limited: false,
        },
        Some(status) => Error::UnknownFetchError(format!("YouTube returned {status}")),
        None => Error::TranscriptServiceUnavailable {
            reason: format!("could not reach YouTube: {e}"),
            rate_limited: false,
        },
    }
}

fn is_ip_blocked(html: &str) -> bool {
    html.contains(r#"class="g-recaptcha""#)
}

// Page config first, then the newer inline assignment.
static API_KEY_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).expect("static pattern"),
        Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).expect("static pattern"),
    ]
});

fn extract_api_key(html: &str) -> Result<String> {
    if let Some(caps) = API_KEY_PATTERNS.iter().find_map(|re| re.captures(html)) {
        return Ok(caps[1].to_string());
    }

    Err(Error::UnknownFetchError(
        "could not extract InnerTube API key from watch page".to_string(),
    ))
}

fn build_transcript_list(video_id: &VideoId, resp: InnerTubePlayerResponse) -> Result<TranscriptList> {
    if let Some(ps) = resp.playability_status.filter(|ps| ps.status != "OK") {
        let reason = ps.reason.unwrap_or_else(|| "no reason given".to_string());
        warn!("Video {video_id} not playable: {} ({reason})", ps.status);
        return Err(Error::TranscriptServiceUnavailable {
            reason: format!("video {video_id} is not playable ({}): {reason}", ps.status),
            rate_limited: false,
        });
    }

    let tracks = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(Error::TranscriptsDisabled(video_id.to_string()));
    }

    let tracks = tracks
        .into_iter()
        .map(|t| TranscriptTrack {
            language: t
                .name
                .as_ref()
                .and_then(TrackName::text)
                .unwrap_or_else(|| t.language_code.clone()),
            is_generated: t.kind.as_deref() == Some("asr"),
            base_url: t.base_url.replace("&fmt=srv3", ""),
            language_code: t.language_code,
        })
        .collect();

    Ok(TranscriptList {
        video_id: video_id.clone(),
        tracks,
    })
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                // dur is optional on the last cue of some tracks
                current_dur = dur.or(Some(0.0));
            }
            Ok(Event::Empty(_)) => {
                // Self-closing <text .../> with no content
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(dur)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.is_empty() {
                        segments.push(Segment {
                            text,
                            start,
                            duration: dur,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::UnknownFetchError(format!("error parsing caption XML: {e}"))),
            _ => {}
        }
    }

    Ok(segments)
}
