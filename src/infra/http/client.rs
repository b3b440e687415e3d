use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::document::{
    AssignmentRequest, DashboardCounts, Document, ReviewSubmission, Stage, User, UserId, UserRole,
};
use crate::usecase::ports::api::{ApiError, DocumentApi};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoAssignBody {
    request_user_id: UserId,
}

/// JSON-over-HTTP implementation of the document service.
pub struct HttpDocumentApi {
    base_url: String,
    client: Client,
}

impl HttpDocumentApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn send(&self, request: RequestBuilder) -> Result<reqwest::blocking::Response, ApiError> {
        let response = request
            .send()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Status(status.as_u16(), body));
        }
        Ok(response)
    }

    fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.send(self.client.get(&url).query(query))?;
        let envelope: Envelope<T> = response
            .json()
            .map_err(|err| ApiError::Decode(err.to_string()))?;
        Ok(envelope.data)
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        self.send(self.client.post(&url).json(body)).map(|_| ())
    }
}

impl DocumentApi for HttpDocumentApi {
    fn fetch_documents(&self, stage: Stage) -> Result<Vec<Document>, ApiError> {
        self.get_data("documents", &[("status", stage.slug())])
    }

    fn fetch_users(&self, role: Option<UserRole>) -> Result<Vec<User>, ApiError> {
        match role {
            Some(role) => self.get_data("users", &[("role", role.slug())]),
            None => self.get_data("users", &[]),
        }
    }

    fn fetch_dashboard_counts(&self) -> Result<DashboardCounts, ApiError> {
        self.get_data("dashboard/counts", &[])
    }

    fn assign_documents(&self, request: &AssignmentRequest) -> Result<(), ApiError> {
        self.post("documents/assign", request)
    }

    fn auto_assign(&self, requesting_user_id: UserId) -> Result<(), ApiError> {
        self.post(
            "documents/auto-assign",
            &AutoAssignBody {
                request_user_id: requesting_user_id,
            },
        )
    }

    fn submit_review(&self, review: &ReviewSubmission) -> Result<(), ApiError> {
        self.post(&format!("documents/{}/review", review.document_id), review)
    }
}
