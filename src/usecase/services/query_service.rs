use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::document::{DashboardCounts, Document, Stage, User};
use crate::usecase::ports::api::{ApiError, DocumentApi};

/// Read side of the dashboard: queues, users, aggregate counts.
pub struct QueryService {
    api: Arc<dyn DocumentApi>,
}

impl QueryService {
    pub fn new(api: Arc<dyn DocumentApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &dyn DocumentApi {
        self.api.as_ref()
    }

    pub fn documents(&self, stage: Stage) -> Result<Vec<Document>, ApiError> {
        let documents = self.api.fetch_documents(stage)?;
        debug!(stage = stage.slug(), count = documents.len(), "documents loaded");
        Ok(documents)
    }

    pub fn all_documents(&self) -> Result<BTreeMap<Stage, Vec<Document>>, ApiError> {
        Stage::ALL
            .into_iter()
            .map(|stage| self.documents(stage).map(|documents| (stage, documents)))
            .collect()
    }

    pub fn assignees(&self, stage: Stage) -> Result<Vec<User>, ApiError> {
        match stage.assignee_role() {
            Some(role) => self.api.fetch_users(Some(role)),
            None => Ok(Vec::new()),
        }
    }

    pub fn counts(&self) -> Result<DashboardCounts, ApiError> {
        self.api.fetch_dashboard_counts()
    }
}
