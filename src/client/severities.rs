//! Severities (API v1).

use serde::{Deserialize, Serialize};

use super::{segment, ApiError, Client};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityV1 {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rank: i64,
}

/// Shared by create and update. Without a rank the API places the severity
/// after the existing ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityRequestBody {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeverityResponseBody {
    pub severity: SeverityV1,
}

impl Client {
    pub async fn create_severity(&self, body: &SeverityRequestBody) -> Result<SeverityV1, ApiError> {
        let response: SeverityResponseBody = self.post("/v1/severities", body).await?;
        Ok(response.severity)
    }

    pub async fn show_severity(&self, id: &str) -> Result<SeverityV1, ApiError> {
        let response: SeverityResponseBody = self
            .get(&format!("/v1/severities/{}", segment(id)))
            .await?;
        Ok(response.severity)
    }

    pub async fn update_severity(
        &self,
        id: &str,
        body: &SeverityRequestBody,
    ) -> Result<SeverityV1, ApiError> {
        let response: SeverityResponseBody = self
            .put(&format!("/v1/severities/{}", segment(id)), body)
            .await?;
        Ok(response.severity)
    }

    pub async fn destroy_severity(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/v1/severities/{}", segment(id))).await
    }
}
