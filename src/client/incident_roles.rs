//! Incident roles (API v1).

use serde::{Deserialize, Serialize};

use super::{segment, ApiError, Client};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRoleV1 {
    pub id: String,
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub shortform: String,
    /// `lead` for the built-in incident lead, `custom` otherwise.
    #[serde(default)]
    pub role_type: String,
}

/// Shared by create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentRoleRequestBody {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub shortform: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncidentRoleResponseBody {
    pub incident_role: IncidentRoleV1,
}

impl Client {
    pub async fn create_incident_role(
        &self,
        body: &IncidentRoleRequestBody,
    ) -> Result<IncidentRoleV1, ApiError> {
        let response: IncidentRoleResponseBody = self.post("/v1/incident_roles", body).await?;
        Ok(response.incident_role)
    }

    pub async fn show_incident_role(&self, id: &str) -> Result<IncidentRoleV1, ApiError> {
        let response: IncidentRoleResponseBody = self
            .get(&format!("/v1/incident_roles/{}", segment(id)))
            .await?;
        Ok(response.incident_role)
    }

    pub async fn update_incident_role(
        &self,
        id: &str,
        body: &IncidentRoleRequestBody,
    ) -> Result<IncidentRoleV1, ApiError> {
        let response: IncidentRoleResponseBody = self
            .put(&format!("/v1/incident_roles/{}", segment(id)), body)
            .await?;
        Ok(response.incident_role)
    }

    pub async fn destroy_incident_role(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/v1/incident_roles/{}", segment(id)))
            .await
    }
}
