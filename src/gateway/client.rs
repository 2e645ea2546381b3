use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, warn};

use crate::core::ProjectReport;
use crate::error::{ReadmeAiError, Result};
use super::models::{ErrorResponse, GenerateResponse};

/// Talks to a running gateway on behalf of the CLI
pub struct GatewayClient {
    client: reqwest::Client,
    server_url: String,
}

impl GatewayClient {
    pub fn new(server_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            server_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.server_url)
    }

    /// Submit a report and sample, returning the generated README
    pub async fn generate(&self, report: &ProjectReport, sample_code: &str) -> Result<GenerateResponse> {
        let url = self.generate_url();
        debug!(url = %url, project = %report.name, "Submitting project to gateway");

        let response = self
            .client
            .post(&url)
            .json(&json!({ "projectInfo": report, "sampleCode": sample_code }))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ReadmeAiError::Gateway(format!(
                        "Could not connect to server at {}. Make sure the server is running or set README_AI_SERVER_URL",
                        self.server_url
                    ))
                } else {
                    ReadmeAiError::Gateway(format!("Request to {} failed: {}", self.server_url, e))
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(url = %url, "Gateway rate limit exceeded");
            return Err(ReadmeAiError::RateLimited);
        }

        if !status.is_success() {
            let detail = match response.json::<ErrorResponse>().await {
                Ok(body) => match body.message {
                    Some(message) => format!("{}: {}", body.error, message),
                    None => body.error,
                },
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string(),
            };
            return Err(ReadmeAiError::Gateway(format!(
                "Server returned {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ReadmeAiError::Gateway(format!("Unreadable server response: {}", e)))?;

        if !body.success || body.readme.is_empty() {
            return Err(ReadmeAiError::Gateway(
                "Failed to generate README from server".to_string(),
            ));
        }

        Ok(body)
    }
}
