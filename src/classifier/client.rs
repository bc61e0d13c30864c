use std::time::Duration;

use tracing::{debug, info};

use super::types::{
    AnalyzeOutcome, AnalyzeRequest, AnalyzeResponse, EndSessionRequest, ServiceErrorBody,
    ServiceStatus,
};
use super::Classifier;
use crate::config::ClassifierConfig;
use crate::error::ClassifierError;

/// HTTP client for the emotion classification service.
pub struct HttpClassifier {
    base_url: String,
    client: reqwest::Client,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        // A client without the configured timeout is worse than no client:
        // analyze calls could hang the worker indefinitely.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response to [`ClassifierError::Rejected`], pulling
    /// the service's error body out when it sent one.
    async fn rejection(response: reqwest::Response) -> ClassifierError {
        let status = response.status().as_u16();
        let message = match response.json::<ServiceErrorBody>().await {
            Ok(body) => body.message.unwrap_or(body.error),
            Err(_) => "no error body".to_string(),
        };
        ClassifierError::Rejected { status, message }
    }
}

#[async_trait::async_trait]
impl Classifier for HttpClassifier {
    async fn check_status(&self) -> Result<ServiceStatus, ClassifierError> {
        let response = self.client.get(self.url("/api/check-status")).send().await?;

        // The service answers 500 with {configured: false} when no API key
        // is present; treat any parseable body as an authoritative answer.
        match response.json::<ServiceStatus>().await {
            Ok(status) => {
                info!(
                    "Classifier status: configured={} ({})",
                    status.configured,
                    status.message.as_deref().unwrap_or("no message")
                );
                Ok(status)
            }
            Err(e) => Err(ClassifierError::InvalidResponse(e.to_string())),
        }
    }

    async fn analyze_segment(
        &self,
        request: AnalyzeRequest,
    ) -> Result<AnalyzeOutcome, ClassifierError> {
        debug!(
            "Sending segment for analysis (session={}, {} chars of audio)",
            request.session_id,
            request.audio.len()
        );

        let response = self
            .client
            .post(self.url("/api/analyze-chunk"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        body.try_into()
    }

    async fn end_session(&self, session_id: &str) -> Result<(), ClassifierError> {
        let response = self
            .client
            .post(self.url("/api/end-session"))
            .json(&EndSessionRequest {
                session_id: session_id.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        debug!("Session end notice delivered for {}", session_id);
        Ok(())
    }
}
