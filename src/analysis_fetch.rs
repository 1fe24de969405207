use reqwest::StatusCode;
use thiserror::Error;

use crate::http_client::http_client;
use crate::state::{AccountOption, AnalysisResult};

/// Failures at the analysis-service boundary. A response that arrives but
/// does not match the expected shape is `Malformed`, distinct from
/// transport-level trouble.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("http {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub fn fetch_accounts(base_url: &str) -> Result<Vec<AccountOption>, FetchError> {
    let client = http_client()?;
    let url = format!("{}/api/users", base_url.trim_end_matches('/'));
    let resp = client.get(&url).send()?;
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            body: snippet(&body),
        });
    }
    parse_accounts_json(&body)
}

pub fn fetch_analysis(
    base_url: &str,
    account_id: &str,
    pattern: &str,
) -> Result<AnalysisResult, FetchError> {
    let client = http_client()?;
    let url = format!(
        "{}/api/analyze/{account_id}",
        base_url.trim_end_matches('/')
    );
    let resp = client.get(&url).query(&[("pattern", pattern)]).send()?;
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            body: snippet(&body),
        });
    }
    parse_analysis_json(&body)
}

pub fn parse_accounts_json(raw: &str) -> Result<Vec<AccountOption>, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::Malformed("empty body".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|err| FetchError::Malformed(err.to_string()))
}

/// Parses and schema-validates an analysis payload. Required fields missing
/// from the body fail here rather than crashing a renderer later; extra
/// fields the collaborator sends alongside are ignored.
pub fn parse_analysis_json(raw: &str) -> Result<AnalysisResult, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::Malformed("empty body".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|err| FetchError::Malformed(err.to_string()))
}

fn snippet(body: &str) -> String {
    const MAX: usize = 160;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut end = MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
