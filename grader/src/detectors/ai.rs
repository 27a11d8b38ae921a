//! AI qualitative scoring client.
//!
//! Implementation-style C# questions are scored by an external AI service
//! treated as a black box: one synchronous JSON request, one JSON-shaped
//! assessment back. The capability is a trait so tests and alternative
//! backends can stand in for the HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use util::config;

/// What the capability is asked to assess.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRequest {
    /// Grading mode tag (e.g. "implementation", "debugging").
    pub mode: String,
    /// The student's source code.
    pub source: String,
    /// The instructor's requirement text.
    pub requirement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

/// JSON-shaped assessment returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Assessment {
    /// Fraction of credit awarded, 0.0–1.0.
    pub score_rate: f64,
    /// Free-text reasoning, surfaced as result details.
    #[serde(default)]
    pub reasoning: String,
}

/// Capability interface for qualitative source assessment.
#[async_trait]
pub trait ScoringCapability: Send + Sync {
    async fn assess_source(&self, request: &AssessmentRequest) -> Result<Assessment, String>;
}

/// Request body sent to the scoring service.
#[derive(Serialize)]
struct AiScoringRequest<'a> {
    mode: &'a str,
    source: &'a str,
    requirement: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    program_input: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_output: Option<&'a str>,
}

/// Response envelope from the scoring service.
#[derive(Deserialize)]
struct AiScoringResponse {
    score_rate: f64,
    #[serde(default)]
    reasoning: String,
}

/// HTTP-backed scoring capability.
///
/// Endpoint and key come from the application config; an unconfigured
/// endpoint is an error the caller degrades to a zero-credit result, not a
/// panic.
pub struct AiScoringClient {
    client: reqwest::Client,
}

impl AiScoringClient {
    pub fn new() -> Self {
        AiScoringClient {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for AiScoringClient {
    fn default() -> Self {
        AiScoringClient::new()
    }
}

#[async_trait]
impl ScoringCapability for AiScoringClient {
    async fn assess_source(&self, request: &AssessmentRequest) -> Result<Assessment, String> {
        dotenvy::dotenv().ok();

        let endpoint = config::ai_scoring_endpoint();
        if endpoint.is_empty() {
            return Err("AI scoring endpoint is not configured".to_string());
        }
        let api_key = config::ai_scoring_key();

        let body = AiScoringRequest {
            mode: &request.mode,
            source: &request.source,
            requirement: &request.requirement,
            program_input: request.program_input.as_deref(),
            expected_output: request.expected_output.as_deref(),
        };

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("AI scoring request failed: {e}"))?;

        let response_text = response
            .text()
            .await
            .map_err(|e| format!("AI scoring response unreadable: {e}"))?;

        let parsed = serde_json::from_str::<AiScoringResponse>(&response_text).map_err(|e| {
            format!("error decoding AI scoring response: {e}. Full response: {response_text}")
        })?;

        Ok(Assessment {
            score_rate: parsed.score_rate.clamp(0.0, 1.0),
            reasoning: parsed.reasoning,
        })
    }
}
