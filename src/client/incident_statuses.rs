//! Custom incident statuses (API v1).

use serde::{Deserialize, Serialize};

use super::{segment, ApiError, Client};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentStatusV1 {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIncidentStatusRequestBody {
    pub name: String,
    pub description: String,
    pub category: String,
}

/// A status cannot change category once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateIncidentStatusRequestBody {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncidentStatusResponseBody {
    pub incident_status: IncidentStatusV1,
}

impl Client {
    pub async fn create_incident_status(
        &self,
        body: &CreateIncidentStatusRequestBody,
    ) -> Result<IncidentStatusV1, ApiError> {
        let response: IncidentStatusResponseBody =
            self.post("/v1/incident_statuses", body).await?;
        Ok(response.incident_status)
    }

    pub async fn show_incident_status(&self, id: &str) -> Result<IncidentStatusV1, ApiError> {
        let response: IncidentStatusResponseBody = self
            .get(&format!("/v1/incident_statuses/{}", segment(id)))
            .await?;
        Ok(response.incident_status)
    }

    pub async fn update_incident_status(
        &self,
        id: &str,
        body: &UpdateIncidentStatusRequestBody,
    ) -> Result<IncidentStatusV1, ApiError> {
        let response: IncidentStatusResponseBody = self
            .put(&format!("/v1/incident_statuses/{}", segment(id)), body)
            .await?;
        Ok(response.incident_status)
    }

    pub async fn destroy_incident_status(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/v1/incident_statuses/{}", segment(id)))
            .await
    }
}
