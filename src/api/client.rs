use crate::api::errors::ApiError;
use crate::api::types::{
    BulkUpdateRequest, BulkUpdateResponse, InboxResponse, InboxStats, Profile, StatusUpdateRequest,
    WorkflowId, WorkflowItem,
};
use crate::config::{BackendConfig, RateLimitConfig};
use crate::observability::api_metrics;
use crate::workflows::WorkflowStatus;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Operations the CLI needs from the workflow backend
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Identity and role of the authenticated user
    async fn profile(&self) -> Result<Profile, ApiError>;

    /// Workflows routed to the authenticated user
    async fn inbox(&self) -> Result<Vec<WorkflowItem>, ApiError>;

    async fn stats(&self) -> Result<InboxStats, ApiError>;

    async fn update_status(
        &self,
        id: WorkflowId,
        status: WorkflowStatus,
        comment: &str,
    ) -> Result<(), ApiError>;

    /// One request for many ids; the response partitions them into updated and failed
    async fn bulk_update(
        &self,
        ids: &[WorkflowId],
        status: WorkflowStatus,
        comment: &str,
    ) -> Result<BulkUpdateResponse, ApiError>;
}

/// reqwest-backed client with bearer auth and client-side pacing
#[derive(Debug, Clone)]
pub struct HttpWorkflowBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl HttpWorkflowBackend {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
        rate_limit: &RateLimitConfig,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url));
        }

        let client = Client::builder().timeout(timeout).build()?;

        let per_second = NonZeroU32::new(rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(rate_limit.burst_capacity).unwrap_or(per_second);
        let rate_limiter = Arc::new(RateLimiter::direct(
            Quota::per_second(per_second).allow_burst(burst),
        ));

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
            rate_limiter,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.base_url,
            config.token.clone(),
            Duration::from_secs(config.timeout_seconds),
            &config.rate_limit,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        api_metrics().record_request();
        request.send().await.map_err(|e| {
            api_metrics().record_error();
            warn!("Request to workflow backend failed: {}", e);
            ApiError::from(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self.send(self.client.get(&url)).await?;
        self.handle_response(response).await
    }

    async fn put<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Response, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "PUT");
        self.send(self.client.put(&url).json(body)).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            api_metrics().record_error();
            Err(ApiError::Api {
                status: status.as_u16(),
                message: error_message(&body, "Request failed"),
            })
        }
    }
}

/// Pull the human message out of an error body (`{"error": ..}` or `{"message": ..}`)
fn error_message(body: &str, fallback: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("error").or_else(|| v.get("message")))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl WorkflowBackend for HttpWorkflowBackend {
    async fn profile(&self) -> Result<Profile, ApiError> {
        self.get("/me").await
    }

    async fn inbox(&self) -> Result<Vec<WorkflowItem>, ApiError> {
        let response: InboxResponse = self.get("/documents/inbox").await?;
        Ok(response.into_items())
    }

    async fn stats(&self) -> Result<InboxStats, ApiError> {
        self.get("/staff/stats").await
    }

    async fn update_status(
        &self,
        id: WorkflowId,
        status: WorkflowStatus,
        comment: &str,
    ) -> Result<(), ApiError> {
        let body = StatusUpdateRequest {
            status,
            comment: comment.to_string(),
        };
        let response = self.put(&format!("/workflows/{}", id), &body).await?;
        let code = response.status();
        if code.is_success() {
            return Ok(());
        }

        api_metrics().record_error();
        let text = response.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status: code.as_u16(),
            message: error_message(&text, "Update failed"),
        })
    }

    async fn bulk_update(
        &self,
        ids: &[WorkflowId],
        status: WorkflowStatus,
        comment: &str,
    ) -> Result<BulkUpdateResponse, ApiError> {
        let body = BulkUpdateRequest {
            workflow_ids: ids.to_vec(),
            status,
            comment: comment.to_string(),
        };
        let response = self.put("/workflows/bulk", &body).await?;
        let code = response.status();
        let text = response.text().await?;

        // Failed responses may still carry a partition worth showing
        let partition: Option<BulkUpdateResponse> = serde_json::from_str(&text).ok();

        if code.is_success() {
            let partition = partition.ok_or_else(|| {
                ApiError::Decode(format!("bulk response was not a partition: {text}"))
            })?;
            api_metrics().record_bulk_result(partition.updated.len(), partition.errors.len());
            Ok(partition)
        } else {
            api_metrics().record_error();
            Err(ApiError::BulkRejected {
                status: code.as_u16(),
                message: error_message(&text, "Bulk failed"),
                partial: partition.unwrap_or_default(),
            })
        }
    }
}
