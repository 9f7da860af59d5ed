//! API handlers for the compliance server
//!
//! Provides REST endpoints for:
//! - Transcript analysis (by video id or raw text)
//! - Listing the configured compliance terms

use std::time::Duration;

use axum::{extract::State, response::Html, Form, Json};
use compliance_engine::{ComplianceEngine, MatchRecord, PositionIndex, TermList};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::transcript::{join_fragments, parse_video_id};
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "compliance-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Term list response
#[derive(Serialize)]
pub struct TermListResponse {
    pub success: bool,
    pub count: usize,
    pub terms: TermList,
}

/// Handler: GET /api/terms
pub async fn handle_list_terms(
    State(state): State<AppState>,
) -> Result<Json<TermListResponse>, ServerError> {
    let terms = load_terms(&state).await?;

    Ok(Json(TermListResponse {
        success: true,
        count: terms.len(),
        terms,
    }))
}

/// Analysis request, as JSON or form fields.
/// `text` wins over `video_id` when both are given.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Video id or video URL to fetch captions for
    #[serde(default)]
    pub video_id: Option<String>,

    /// Transcript text supplied directly
    #[serde(default)]
    pub text: Option<String>,
}

/// Where the analyzed transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptOrigin {
    Text,
    Video,
}

/// Analysis response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub source: TranscriptOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub transcript: String,
    pub compliant: bool,
    pub match_count: usize,
    pub occurrence_count: usize,
    pub matches: Vec<MatchRecord>,
    pub positions: PositionIndex,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Analysis form page; posts to `/analyze` and highlights via `/api/analyze`
const INDEX_PAGE: &str = include_str!("../static/index.html");

/// Handler: GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Handler: POST /api/analyze (JSON body)
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    run_analysis(&state, req).await.map(Json)
}

/// Handler: POST /analyze (form body)
pub async fn handle_analyze_form(
    State(state): State<AppState>,
    Form(req): Form<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    run_analysis(&state, req).await.map(Json)
}

async fn run_analysis(state: &AppState, req: AnalyzeRequest) -> Result<AnalyzeResponse, ServerError> {
    let text = req.text.filter(|t| !t.trim().is_empty());
    let video_input = req.video_id.filter(|v| !v.trim().is_empty());

    let (origin, video_id, transcript) = match (text, video_input) {
        (Some(text), _) => (TranscriptOrigin::Text, None, text),
        (None, Some(input)) => {
            let video_id = parse_video_id(&input).ok_or_else(|| {
                ServerError::InvalidRequest(format!("'{}' is not a valid video ID or URL", input))
            })?;
            let transcript = fetch_transcript(state, &video_id).await?;
            (TranscriptOrigin::Video, Some(video_id), transcript)
        }
        (None, None) => {
            return Err(ServerError::InvalidRequest(
                "No video ID or transcript text provided".to_string(),
            ));
        }
    };

    info!(
        "Analyze request: source={:?}, video_id={:?}, transcript_len={}",
        origin,
        video_id,
        transcript.len()
    );

    let terms = load_terms(state).await?;
    let analysis = ComplianceEngine::new().analyze(&transcript, &terms);

    let match_count = analysis.matches.len();
    let occurrence_count = analysis.occurrence_count();
    debug!("{} terms matched, {} occurrences", match_count, occurrence_count);

    Ok(AnalyzeResponse {
        success: true,
        source: origin,
        video_id,
        transcript,
        compliant: match_count == 0,
        match_count,
        occurrence_count,
        matches: analysis.matches,
        positions: analysis.positions,
        message: (match_count == 0).then(|| "No compliance issues found".to_string()),
    })
}

/// Fetch captions and join them, bounded by the configured timeout
async fn fetch_transcript(state: &AppState, video_id: &str) -> Result<String, ServerError> {
    let timeout = Duration::from_millis(state.fetch_timeout_ms);
    let fragments = tokio::time::timeout(timeout, state.transcripts.fetch(video_id))
        .await
        .map_err(|_| ServerError::Timeout(state.fetch_timeout_ms))??;

    debug!(
        "Fetched {} caption fragments for {} from {}",
        fragments.len(),
        video_id,
        state.transcripts.name()
    );
    Ok(join_fragments(&fragments))
}

/// Load the word list fresh for each request
async fn load_terms(state: &AppState) -> Result<TermList, ServerError> {
    let path = state.word_list.clone();
    let config = state.term_config.clone();

    let terms = tokio::task::spawn_blocking(move || TermList::from_path(path, &config))
        .await
        .map_err(|e| ServerError::Internal(format!("Term list loader panicked: {}", e)))??;
    Ok(terms)
}
