//! Endpoint and property tests for the compliance server
//!
//! Test categories:
//! - Analysis by raw text and by video id (stubbed caption sources)
//! - Request validation and error mapping
//! - Video id parsing and fragment joining properties

#[cfg(test)]
mod http_endpoint_tests {
    //! HTTP endpoint integration tests using axum-test

    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum_test::TestServer;
    use compliance_engine::TermListConfig;
    use serde_json::json;
    use tempfile::NamedTempFile;

    use crate::transcript::{CaptionFragment, TranscriptError, TranscriptSource};
    use crate::{router, AppState};

    const WORD_LIST: &str = "Name,Risk Rating\n\
                             guaranteed,High\n\
                             risk free,Medium\n\
                             cure,Low\n\
                             ,Low\n";

    /// Serves fixed captions for one video id
    struct StubCaptions {
        video_id: &'static str,
        fragments: Vec<CaptionFragment>,
    }

    #[async_trait]
    impl TranscriptSource for StubCaptions {
        fn name(&self) -> &str {
            "stub"
        }

        async fn fetch(&self, video_id: &str) -> Result<Vec<CaptionFragment>, TranscriptError> {
            if video_id == self.video_id {
                Ok(self.fragments.clone())
            } else {
                Err(TranscriptError::NotAvailable(video_id.to_string()))
            }
        }
    }

    /// Never answers within the test timeout
    struct SlowCaptions;

    #[async_trait]
    impl TranscriptSource for SlowCaptions {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch(&self, _video_id: &str) -> Result<Vec<CaptionFragment>, TranscriptError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    fn word_list_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(WORD_LIST.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn stub_captions() -> Arc<dyn TranscriptSource> {
        Arc::new(StubCaptions {
            video_id: "pxiP-HJLCx0",
            fragments: vec![
                CaptionFragment::new("Returns are guaranteed", 0, 2000),
                CaptionFragment::new("and totally risk free.", 2000, 2000),
            ],
        })
    }

    fn test_server(word_list: PathBuf, transcripts: Arc<dyn TranscriptSource>) -> TestServer {
        let state = AppState {
            word_list,
            term_config: TermListConfig::default(),
            transcripts,
            fetch_timeout_ms: 200,
        };

        TestServer::new(router(state)).unwrap()
    }

    /// Create a test server over the standard word list.
    /// The temp file must outlive the server.
    fn create_test_server() -> (TestServer, NamedTempFile) {
        let file = word_list_file();
        let server = test_server(file.path().to_path_buf(), stub_captions());
        (server, file)
    }

    #[tokio::test]
    async fn test_health_returns_200() {
        let (server, _file) = create_test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "compliance-server");
    }

    #[tokio::test]
    async fn test_terms_lists_complete_rows() {
        let (server, _file) = create_test_server();
        let response = server.get("/api/terms").await;
        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["count"], 3);
        assert_eq!(json["terms"][0], json!({"word": "guaranteed", "risk": "High"}));
        assert_eq!(json["terms"][1], json!({"word": "risk free", "risk": "Medium"}));
    }

    #[tokio::test]
    async fn test_analyze_text() {
        let (server, _file) = create_test_server();

        let response = server
            .post("/api/analyze")
            .json(&json!({
                "text": "GUARANTEED returns, guaranteed."
            }))
            .await;

        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], true);
        assert_eq!(json["source"], "text");
        assert_eq!(json["transcript"], "GUARANTEED returns, guaranteed.");
        assert_eq!(json["compliant"], false);
        assert_eq!(json["match_count"], 1);
        assert_eq!(json["occurrence_count"], 2);
        assert_eq!(
            json["matches"],
            json!([{"word": "guaranteed", "risk": "High"}])
        );
        assert_eq!(
            json["positions"],
            json!({
                "0": {"word": "guaranteed", "risk": "High", "length": 10},
                "20": {"word": "guaranteed", "risk": "High", "length": 10}
            })
        );
        assert!(json.get("video_id").is_none());
        assert!(json.get("message").is_none());
    }

    #[tokio::test]
    async fn test_analyze_text_without_matches() {
        let (server, _file) = create_test_server();

        let response = server
            .post("/api/analyze")
            .json(&json!({"text": "the quick brown fox"}))
            .await;

        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["compliant"], true);
        assert_eq!(json["matches"], json!([]));
        assert_eq!(json["positions"], json!({}));
        assert_eq!(json["message"], "No compliance issues found");
    }

    #[tokio::test]
    async fn test_analyze_video_joins_captions() {
        let (server, _file) = create_test_server();

        let response = server
            .post("/api/analyze")
            .json(&json!({"video_id": "pxiP-HJLCx0"}))
            .await;

        response.assert_status_ok();

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["source"], "video");
        assert_eq!(json["video_id"], "pxiP-HJLCx0");
        assert_eq!(
            json["transcript"],
            "Returns are guaranteed and totally risk free."
        );
        assert_eq!(json["match_count"], 2);
        assert_eq!(json["positions"]["12"]["word"], "guaranteed");
        assert_eq!(json["positions"]["35"]["word"], "risk free");
        assert_eq!(json["positions"]["35"]["length"], 9);
    }

    #[tokio::test]
    async fn test_analyze_accepts_video_url() {
        let (server, _file) = create_test_server();

        let response = server
            .post("/api/analyze")
            .json(&json!({"video_id": "https://youtu.be/pxiP-HJLCx0"}))
            .await;

        response.assert_status_ok();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["video_id"], "pxiP-HJLCx0");
    }

    #[tokio::test]
    async fn test_analyze_prefers_text_over_video() {
        let (server, _file) = create_test_server();

        let response = server
            .post("/api/analyze")
            .json(&json!({"video_id": "pxiP-HJLCx0", "text": "a cure for all"}))
            .await;

        response.assert_status_ok();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["source"], "text");
        assert_eq!(json["matches"], json!([{"word": "cure", "risk": "Low"}]));
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_input() {
        let (server, _file) = create_test_server();

        let response = server
            .post("/api/analyze")
            .json(&json!({"video_id": "  ", "text": ""}))
            .await;

        response.assert_status_bad_request();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_analyze_rejects_invalid_video_id() {
        let (server, _file) = create_test_server();

        let response = server
            .post("/api/analyze")
            .json(&json!({"video_id": "not a video"}))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_analyze_unknown_video_is_not_found() {
        let (server, _file) = create_test_server();

        let response = server
            .post("/api/analyze")
            .json(&json!({"video_id": "AAAAAAAAAAA"}))
            .await;

        response.assert_status(axum::http::StatusCode::NOT_FOUND);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["code"], "TRANSCRIPT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_analyze_fetch_timeout() {
        let file = word_list_file();
        let server = test_server(file.path().to_path_buf(), Arc::new(SlowCaptions));

        let response = server
            .post("/api/analyze")
            .json(&json!({"video_id": "pxiP-HJLCx0"}))
            .await;

        response.assert_status(axum::http::StatusCode::GATEWAY_TIMEOUT);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["code"], "TIMEOUT");
    }

    #[tokio::test]
    async fn test_unreadable_word_list_is_an_error_not_empty_result() {
        let server = test_server(
            PathBuf::from("/nonexistent/Compliant Word List.csv"),
            stub_captions(),
        );

        let response = server
            .post("/api/analyze")
            .json(&json!({"text": "guaranteed"}))
            .await;

        response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["code"], "TERM_LIST_UNAVAILABLE");
        assert_eq!(json["error"], crate::error::TERM_LIST_UNAVAILABLE);
        assert!(!response.text().contains("/nonexistent"));
    }

    #[tokio::test]
    async fn test_index_page_serves_analysis_form() {
        let (server, _file) = create_test_server();

        let response = server.get("/").await;

        response.assert_status_ok();
        let page = response.text();
        assert!(page.contains(r#"action="/analyze""#));
        assert!(page.contains(r#"name="video_id""#));
        assert!(page.contains(r#"name="text""#));
    }

    #[tokio::test]
    async fn test_form_endpoint() {
        let (server, _file) = create_test_server();

        let response = server
            .post("/analyze")
            .form(&[("video_id", "pxiP-HJLCx0")])
            .await;

        response.assert_status_ok();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["source"], "video");
        assert_eq!(json["match_count"], 2);
    }

    #[tokio::test]
    async fn test_form_endpoint_rejects_missing_input() {
        let (server, _file) = create_test_server();

        let response = server.post("/analyze").form(&[("video_id", "")]).await;

        response.assert_status_bad_request();
    }
}

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use crate::transcript::{join_fragments, parse_video_id, CaptionFragment};

    proptest! {
        /// Property: any 11-character id parses to itself, bare or in a URL
        #[test]
        fn video_ids_round_trip(id in "[A-Za-z0-9_-]{11}") {
            let expected = Some(id.clone());
            prop_assert_eq!(parse_video_id(&id), expected.clone());
            prop_assert_eq!(
                parse_video_id(&format!("https://www.youtube.com/watch?v={}", id)),
                expected.clone()
            );
            prop_assert_eq!(parse_video_id(&format!("https://youtu.be/{}", id)), expected);
        }

        /// Property: ids of the wrong length are rejected
        #[test]
        fn wrong_length_ids_rejected(id in "[A-Za-z0-9]{1,10}") {
            prop_assert_eq!(parse_video_id(&id), None);
        }

        /// Property: joined text keeps fragment order with single separators
        #[test]
        fn joined_fragments_preserve_order(words in prop::collection::vec("[a-z ]{0,8}", 0..12)) {
            let fragments: Vec<CaptionFragment> = words
                .iter()
                .enumerate()
                .map(|(i, w)| CaptionFragment::new(w.clone(), i as u64 * 1000, 1000))
                .collect();

            prop_assert_eq!(join_fragments(&fragments), words.join(" "));
        }
    }
}
