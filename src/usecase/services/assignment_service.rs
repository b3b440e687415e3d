use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::domain::entities::document::{
    AssignmentRequest, DashboardCounts, Document, DocumentId, Stage, UserId,
};
use crate::domain::entities::table_state::{RouteKey, RowId};
use crate::usecase::ports::api::{ApiError, DocumentApi};
use crate::usecase::services::table_state_store::TableViewStore;

/// Actions guarded against duplicate concurrent submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlightKey {
    Assign(Stage),
    AutoAssign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignError {
    EmptySelection,
    MissingAssignee,
    NotAssignable(Stage),
    InvalidDocumentId(RowId),
    Api(ApiError),
    /// The server accepted the request; only the follow-up reload failed.
    RefreshFailed(ApiError),
}

impl std::fmt::Display for AssignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignError::EmptySelection => write!(f, "select at least one document"),
            AssignError::MissingAssignee => write!(f, "choose an assignee first"),
            AssignError::NotAssignable(stage) => {
                write!(f, "{} documents cannot be assigned", stage.label())
            }
            AssignError::InvalidDocumentId(id) => write!(f, "invalid document id {}", id.0),
            AssignError::Api(err) => write!(f, "assignment failed: {err}"),
            AssignError::RefreshFailed(err) => {
                write!(f, "documents were assigned, but reloading failed: {err}")
            }
        }
    }
}

impl std::error::Error for AssignError {}

impl From<ApiError> for AssignError {
    fn from(value: ApiError) -> Self {
        AssignError::Api(value)
    }
}

/// Collections reloaded after a successful assignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Refresh {
    pub documents: BTreeMap<Stage, Vec<Document>>,
    pub counts: Option<DashboardCounts>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    Completed(Refresh),
    /// Another request for the same action was still outstanding.
    Ignored,
}

/// Marks a flight as outstanding until dropped.
#[derive(Debug)]
pub struct InFlightGuard {
    key: FlightKey,
    in_flight: Arc<Mutex<BTreeSet<FlightKey>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.key);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct AssignmentCoordinator {
    in_flight: Arc<Mutex<BTreeSet<FlightKey>>>,
    assignees: Mutex<BTreeMap<Stage, UserId>>,
}

impl AssignmentCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self, key: FlightKey) -> Option<InFlightGuard> {
        if !lock(&self.in_flight).insert(key) {
            return None;
        }
        Some(InFlightGuard {
            key,
            in_flight: self.in_flight.clone(),
        })
    }

    pub fn is_in_flight(&self, key: FlightKey) -> bool {
        lock(&self.in_flight).contains(&key)
    }

    pub fn select_assignee(&self, stage: Stage, assignee: Option<UserId>) {
        let mut assignees = lock(&self.assignees);
        match assignee {
            Some(user) => {
                assignees.insert(stage, user);
            }
            None => {
                assignees.remove(&stage);
            }
        }
    }

    pub fn selected_assignee(&self, stage: Stage) -> Option<UserId> {
        lock(&self.assignees).get(&stage).copied()
    }

    /// Document ids currently selected in a stage's grid.
    pub fn selected_documents(
        store: &TableViewStore,
        stage: Stage,
    ) -> Result<Vec<DocumentId>, AssignError> {
        store
            .selection(&RouteKey::for_stage(stage))
            .iter()
            .map(|row_id| {
                row_id
                    .0
                    .parse::<i64>()
                    .map(DocumentId)
                    .map_err(|_| AssignError::InvalidDocumentId(row_id.clone()))
            })
            .collect()
    }

    /// Assigns the stage's selected documents to the picked assignee.
    ///
    /// If the request itself fails the selection and the picker keep their values.
    /// Once the server accepts it both are cleared, even when the reload fails.
    pub fn assign(
        &self,
        api: &dyn DocumentApi,
        store: &mut TableViewStore,
        stage: Stage,
        requesting_user_id: UserId,
    ) -> Result<AssignOutcome, AssignError> {
        if stage.assign_action_label().is_none() {
            return Err(AssignError::NotAssignable(stage));
        }
        let document_ids = Self::selected_documents(store, stage)?;
        if document_ids.is_empty() {
            return Err(AssignError::EmptySelection);
        }
        let Some(assignee_id) = self.selected_assignee(stage) else {
            return Err(AssignError::MissingAssignee);
        };

        let Some(_guard) = self.try_begin(FlightKey::Assign(stage)) else {
            info!(stage = stage.slug(), "assignment already in flight, ignoring");
            return Ok(AssignOutcome::Ignored);
        };

        let request = AssignmentRequest {
            document_ids,
            assignee_id: Some(assignee_id),
            requesting_user_id,
            stage,
        };
        info!(
            stage = stage.slug(),
            documents = request.document_ids.len(),
            assignee = %assignee_id,
            "submitting assignment"
        );
        if let Err(err) = api.assign_documents(&request) {
            warn!(stage = stage.slug(), error = %err, "assignment failed");
            return Err(err.into());
        }

        store.set_selection(&RouteKey::for_stage(stage), Vec::new());
        self.select_assignee(stage, None);

        let refresh = Self::reload(api, &[stage], stage == Stage::Pending).map_err(|err| {
            warn!(stage = stage.slug(), error = %err, "reload after assignment failed");
            AssignError::RefreshFailed(err)
        })?;
        info!(stage = stage.slug(), "assignment completed");
        Ok(AssignOutcome::Completed(refresh))
    }

    pub fn auto_assign(
        &self,
        api: &dyn DocumentApi,
        requesting_user_id: UserId,
    ) -> Result<AssignOutcome, AssignError> {
        let Some(_guard) = self.try_begin(FlightKey::AutoAssign) else {
            info!("auto-assign already in flight, ignoring");
            return Ok(AssignOutcome::Ignored);
        };

        info!(user = %requesting_user_id, "requesting auto-assign");
        if let Err(err) = api.auto_assign(requesting_user_id) {
            warn!(error = %err, "auto-assign failed");
            return Err(err.into());
        }

        let refresh = Self::reload(api, &[Stage::Pending, Stage::Assigned], true).map_err(|err| {
            warn!(error = %err, "reload after auto-assign failed");
            AssignError::RefreshFailed(err)
        })?;
        Ok(AssignOutcome::Completed(refresh))
    }

    fn reload(api: &dyn DocumentApi, stages: &[Stage], counts: bool) -> Result<Refresh, ApiError> {
        let mut refresh = Refresh::default();
        for &stage in stages {
            refresh.documents.insert(stage, api.fetch_documents(stage)?);
        }
        if counts {
            refresh.counts = Some(api.fetch_dashboard_counts()?);
        }
        Ok(refresh)
    }
}
