use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub i64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow phase a document collection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Pending,
    Assigned,
    Audit,
    Completed,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Pending,
        Stage::Assigned,
        Stage::Audit,
        Stage::Completed,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Assigned => "assigned",
            Stage::Audit => "audit",
            Stage::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Pending => "Pending",
            Stage::Assigned => "Assigned",
            Stage::Audit => "Audit",
            Stage::Completed => "Completed",
        }
    }

    /// Label of the bulk assignment button, `None` where assignment is not offered.
    pub fn assign_action_label(self) -> Option<&'static str> {
        match self {
            Stage::Pending => Some("Assign"),
            Stage::Assigned => Some("Reassign"),
            Stage::Audit => Some("Reassign auditor"),
            Stage::Completed => None,
        }
    }

    /// Role expected of the assignee picked for this stage.
    pub fn assignee_role(self) -> Option<UserRole> {
        match self {
            Stage::Pending | Stage::Assigned => Some(UserRole::Analyst),
            Stage::Audit => Some(UserRole::Auditor),
            Stage::Completed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub file_name: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub page_count: u32,
    /// `MM-DD-YYYY`, as delivered by the API.
    #[serde(default)]
    pub received_date: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub auditor: Option<String>,
    #[serde(default)]
    pub hcc_codes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Analyst,
    Auditor,
    Admin,
}

impl UserRole {
    pub fn slug(self) -> &'static str {
        match self {
            UserRole::Analyst => "analyst",
            UserRole::Auditor => "auditor",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub assigned: u64,
    #[serde(default)]
    pub audit: u64,
    #[serde(default)]
    pub completed: u64,
}

impl DashboardCounts {
    pub fn for_stage(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Pending => self.pending,
            Stage::Assigned => self.assigned,
            Stage::Audit => self.audit,
            Stage::Completed => self.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub document_ids: Vec<DocumentId>,
    #[serde(rename = "analystId")]
    pub assignee_id: Option<UserId>,
    #[serde(rename = "requestUserId")]
    pub requesting_user_id: UserId,
    pub stage: Stage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    pub document_id: DocumentId,
    pub reviewer_id: UserId,
    pub codes_missed: Vec<String>,
    pub codes_corrected: Vec<String>,
    pub remarks: String,
    pub rating: u8,
}
