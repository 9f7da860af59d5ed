//! Transcript retrieval
//!
//! Captions are fetched as timed fragments and joined into one transcript
//! string. Sources are tried in order through [`FallbackSource`]: manual
//! captions first, then auto-generated ones.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

lazy_static! {
    /// Bare video id
    static ref VIDEO_ID_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();

    /// Video id embedded in a watch, short, embed, live or youtu.be URL
    static ref VIDEO_URL_PATTERN: Regex = Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|shorts/|embed/|live/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)"
    )
    .unwrap();
}

/// One timed piece of caption text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionFragment {
    pub text: String,
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl CaptionFragment {
    pub fn new(text: impl Into<String>, start_ms: u64, duration_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            duration_ms,
        }
    }
}

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("No captions available for video {0}")]
    NotAvailable(String),

    #[error("Caption request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Caption service returned HTTP {0}")]
    Status(u16),

    #[error("Malformed caption payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Anything that can produce caption fragments for a video id
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionFragment>, TranscriptError>;
}

/// Join fragment texts in order with single spaces. Text is kept as-is,
/// blank fragments included.
pub fn join_fragments(fragments: &[CaptionFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract a video id from a bare id or a YouTube URL
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if VIDEO_ID_PATTERN.is_match(input) {
        return Some(input.to_string());
    }
    VIDEO_URL_PATTERN
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// json3 caption payload: {"events": [{"tStartMs", "dDurationMs", "segs": [{"utf8"}]}]}

#[derive(Deserialize)]
struct TimedTextDocument {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

/// Parse a json3 timed-text body. An empty body means "no captions".
pub fn parse_timed_text(body: &str) -> Result<Vec<CaptionFragment>, TranscriptError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: TimedTextDocument = serde_json::from_str(body)?;
    let fragments = document
        .events
        .into_iter()
        .filter(|event| !event.segs.is_empty())
        .map(|event| {
            let text: String = event.segs.into_iter().map(|s| s.utf8).collect();
            CaptionFragment::new(text, event.t_start_ms, event.d_duration_ms)
        })
        // json3 emits "\n"-only append events between cues; they carry no caption
        .filter(|fragment| !fragment.text.trim().is_empty())
        .collect();

    Ok(fragments)
}

/// Captions from the YouTube timed-text endpoint
pub struct TimedTextSource {
    client: reqwest::Client,
    base_url: String,
    lang: String,
    auto_generated: bool,
    name: String,
}

impl TimedTextSource {
    pub fn new(client: reqwest::Client, lang: impl Into<String>) -> Self {
        let lang = lang.into();
        Self {
            client,
            base_url: "https://www.youtube.com".to_string(),
            name: format!("timedtext:{}", lang),
            lang,
            auto_generated: false,
        }
    }

    /// Request speech-recognition captions instead of uploaded ones
    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self.name = format!("timedtext-asr:{}", self.lang);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TranscriptSource for TimedTextSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionFragment>, TranscriptError> {
        let mut request = self
            .client
            .get(format!("{}/api/timedtext", self.base_url))
            .query(&[("v", video_id), ("lang", self.lang.as_str()), ("fmt", "json3")]);
        if self.auto_generated {
            request = request.query(&[("kind", "asr")]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TranscriptError::NotAvailable(video_id.to_string()));
        }
        if !status.is_success() {
            return Err(TranscriptError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let fragments = parse_timed_text(&body)?;
        if fragments.is_empty() {
            return Err(TranscriptError::NotAvailable(video_id.to_string()));
        }

        debug!(
            "Fetched {} caption fragments for {} via {}",
            fragments.len(),
            video_id,
            self.name
        );
        Ok(fragments)
    }
}

/// Try each source in order; the first non-empty result wins
pub struct FallbackSource {
    sources: Vec<Box<dyn TranscriptSource>>,
}

impl FallbackSource {
    pub fn new(sources: Vec<Box<dyn TranscriptSource>>) -> Self {
        Self { sources }
    }

    /// Uploaded captions, then auto-generated captions, in `lang`
    pub fn default_chain(client: reqwest::Client, lang: &str) -> Self {
        Self::new(vec![
            Box::new(TimedTextSource::new(client.clone(), lang)),
            Box::new(TimedTextSource::new(client, lang).auto_generated()),
        ])
    }
}

#[async_trait]
impl TranscriptSource for FallbackSource {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionFragment>, TranscriptError> {
        let mut last_error = TranscriptError::NotAvailable(video_id.to_string());

        for source in &self.sources {
            match source.fetch(video_id).await {
                Ok(fragments) if !fragments.is_empty() => return Ok(fragments),
                Ok(_) => {
                    debug!("{} returned no captions for {}", source.name(), video_id);
                    last_error = TranscriptError::NotAvailable(video_id.to_string());
                }
                Err(e) => {
                    warn!("Transcript source {} failed for {}: {}", source.name(), video_id, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
